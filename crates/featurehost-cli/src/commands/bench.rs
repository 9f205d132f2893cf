//! Bench command implementation
//!
//! Times a script routine against a native builtin on the same input and
//! checks that the two agree.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use super::common::{lookup_builtin, InputArgs};
use crate::host::Host;
use crate::routine::{Routine, ScriptRoutine};
use crate::runtime::RuntimeConfig;
use featurehost_payload::{ExecutionResult, Payload};

/// Tolerance for comparing script and native outputs.
pub const AGREEMENT_TOLERANCE: f64 = 1e-9;

/// Timing summary for one side of the comparison.
#[derive(Debug, Clone, Serialize)]
pub struct BenchSide {
    pub routine: String,
    pub avg_ms: f64,
    pub failures: usize,
}

/// Outcome of a benchmark run.
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub iterations: usize,
    pub script: BenchSide,
    pub native: BenchSide,
    /// `script.avg_ms / native.avg_ms`; `None` if the native side took no measurable time.
    pub ratio: Option<f64>,
    pub outputs_agree: bool,
}

fn measure<R>(
    host: &Host,
    routine: &Arc<R>,
    input: &Payload,
    iterations: usize,
) -> (BenchSide, Option<ExecutionResult>)
where
    R: Routine + ?Sized + 'static,
{
    let mut total_ms = 0.0;
    let mut failures = 0;
    let mut last = None;
    for _ in 0..iterations {
        let result = host.invoke(routine, Some(input.clone()));
        total_ms += result.elapsed_ms;
        if !result.success {
            failures += 1;
        }
        last = Some(result);
    }
    let side = BenchSide {
        routine: routine.name().to_string(),
        avg_ms: total_ms / iterations.max(1) as f64,
        failures,
    };
    (side, last)
}

/// Times both routines over `iterations` invocations each.
pub fn compare<S, N>(
    host: &Host,
    script: &Arc<S>,
    native: &Arc<N>,
    input: &Payload,
    iterations: usize,
) -> BenchReport
where
    S: Routine + ?Sized + 'static,
    N: Routine + ?Sized + 'static,
{
    let (script_side, script_last) = measure(host, script, input, iterations);
    let (native_side, native_last) = measure(host, native, input, iterations);

    let outputs_agree = match (
        script_last.as_ref().and_then(ExecutionResult::output),
        native_last.as_ref().and_then(ExecutionResult::output),
    ) {
        (Some(a), Some(b)) => a.approx_eq(b, AGREEMENT_TOLERANCE),
        _ => false,
    };

    let ratio = if native_side.avg_ms > 0.0 {
        Some(script_side.avg_ms / native_side.avg_ms)
    } else {
        None
    };

    BenchReport {
        iterations,
        script: script_side,
        native: native_side,
        ratio,
        outputs_agree,
    }
}

/// Run the bench command
///
/// # Returns
/// Exit code: 0 if both sides succeeded and agree, 1 otherwise
pub fn run(
    script_path: &str,
    builtin: &str,
    input: &InputArgs,
    iterations: usize,
    json: bool,
) -> Result<ExitCode> {
    let script = ScriptRoutine::load(Path::new(script_path), &RuntimeConfig::default())?;
    let script = Arc::new(script);
    let native = Arc::new(lookup_builtin(builtin)?);
    let payload = input.load()?.unwrap_or_default();

    // Timing should cover the routine, not a worker thread per call.
    let host = Host::new().with_timeout(None);
    let report = compare(&host, &script, &native, &payload, iterations.max(1));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize bench report")?
        );
    } else {
        print_report(&report);
    }

    let ok = report.outputs_agree && report.script.failures == 0 && report.native.failures == 0;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

fn print_report(report: &BenchReport) {
    println!("{} ({} iterations)", "Benchmark".bold(), report.iterations);
    for side in [&report.script, &report.native] {
        println!(
            "  {:<24} {:>10.4} ms/call  {} failures",
            side.routine, side.avg_ms, side.failures
        );
    }
    if let Some(ratio) = report.ratio {
        println!("  script/native: {:.2}x", ratio);
    }
    if report.outputs_agree {
        println!("  {}", "outputs agree".green());
    } else {
        println!("  {}", "outputs differ".red().bold());
    }
}
