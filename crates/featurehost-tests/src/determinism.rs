//! Idempotence checks for routines.
//!
//! A routine that keeps no state must give the same output and the same
//! diagnostics on every invocation with the same input. Each run is
//! fingerprinted with BLAKE3 over its success flag, output JSON and
//! diagnostics; timing is excluded.

use featurehost_cli::host::Host;
use featurehost_cli::routine::Routine;
use featurehost_payload::{ExecutionResult, Payload};
use std::fmt;
use std::sync::Arc;

/// Outcome of repeated invocations.
#[derive(Debug, Clone)]
pub struct IdempotenceResult {
    /// Whether every run produced the same fingerprint.
    pub is_idempotent: bool,
    /// Number of runs performed.
    pub runs: usize,
    /// Fingerprint of the first run.
    pub hash: String,
    /// Index of the first run whose fingerprint differed.
    pub first_mismatch: Option<usize>,
}

impl fmt::Display for IdempotenceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_mismatch {
            None => write!(f, "{} runs, all {}", self.runs, &self.hash[..16]),
            Some(run) => write!(
                f,
                "run {} of {} differs from run 0 ({})",
                run,
                self.runs,
                &self.hash[..16]
            ),
        }
    }
}

/// BLAKE3 fingerprint of a result, ignoring timing.
pub fn result_hash(result: &ExecutionResult) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[result.success as u8]);
    if let Some(output) = &result.output {
        let json = serde_json::to_vec(output).unwrap_or_default();
        hasher.update(&json);
    }
    hasher.update(&[0]);
    hasher.update(result.diagnostics.as_bytes());
    if let Some(fault) = &result.fault {
        hasher.update(fault.code.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Invokes `routine` `runs` times with the same input and compares fingerprints.
pub fn verify_idempotence<R>(
    host: &Host,
    routine: &Arc<R>,
    input: Option<Payload>,
    runs: usize,
) -> IdempotenceResult
where
    R: Routine + ?Sized + 'static,
{
    let runs = runs.max(2);
    let hashes: Vec<String> = (0..runs)
        .map(|_| result_hash(&host.invoke(routine, input.clone())))
        .collect();
    let first_mismatch = hashes.iter().position(|h| *h != hashes[0]);

    IdempotenceResult {
        is_idempotent: first_mismatch.is_none(),
        runs,
        hash: hashes[0].clone(),
        first_mismatch,
    }
}

/// Panics with a readable message if `routine` is not idempotent.
pub fn assert_idempotent<R>(host: &Host, routine: &Arc<R>, input: Option<Payload>, runs: usize)
where
    R: Routine + ?Sized + 'static,
{
    let result = verify_idempotence(host, routine, input, runs);
    assert!(
        result.is_idempotent,
        "{} is not idempotent: {}",
        routine.name(),
        result
    );
}
