//! The host side of the routine contract.
//!
//! [`Host::invoke`] runs one routine once: it binds the input (or the
//! empty default), opens a fresh diagnostics capture, runs the routine
//! under the configured deadline, applies the shape policy, and packages
//! output, diagnostics and timing into an [`ExecutionResult`]. Faults
//! never escape as panics; they become failed results with whatever the
//! routine printed up to that point.

use crate::config::HostConfig;
use crate::diagnostics::{Capture, Diagnostics};
use crate::routine::Routine;
use crate::runtime::{ExecError, DEFAULT_TIMEOUT_SECONDS};
use featurehost_payload::{validate_payload, ExecutionResult, Payload, ShapePolicy};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// A successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub output: Payload,
    pub diagnostics: String,
    pub elapsed: Duration,
}

/// A failed invocation, with the diagnostics captured before the fault.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct Failure {
    pub error: ExecError,
    pub diagnostics: String,
    pub elapsed: Duration,
}

/// Runs routines under the host contract.
#[derive(Debug, Clone)]
pub struct Host {
    timeout: Option<Duration>,
    shape_policy: ShapePolicy,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// Creates a host with the default deadline and no shape check.
    pub fn new() -> Self {
        Self {
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)),
            shape_policy: ShapePolicy::Any,
        }
    }

    /// Sets the per-invocation deadline. `None` runs the routine inline
    /// on the calling thread with no deadline.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the output shape policy.
    pub fn with_shape_policy(mut self, policy: ShapePolicy) -> Self {
        self.shape_policy = policy;
        self
    }

    /// Creates a host from a loaded configuration.
    pub fn from_config(config: &HostConfig) -> Self {
        Self::new()
            .with_timeout(config.timeout())
            .with_shape_policy(config.shape_policy)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn shape_policy(&self) -> ShapePolicy {
        self.shape_policy
    }

    /// Invokes `routine` once and returns the aggregate result.
    ///
    /// `None` input binds the empty sequence.
    pub fn invoke<R>(&self, routine: &Arc<R>, input: Option<Payload>) -> ExecutionResult
    where
        R: Routine + ?Sized + 'static,
    {
        let name = routine.name().to_string();
        match self.try_invoke(routine, input) {
            Ok(done) => ExecutionResult::succeeded(name, done.output, done.diagnostics, done.elapsed),
            Err(failure) => ExecutionResult::failed(
                name,
                failure.error.to_report(),
                failure.diagnostics,
                failure.elapsed,
            ),
        }
    }

    /// Invokes `routine` once for each input, in order.
    pub fn invoke_batch<R, I>(&self, routine: &Arc<R>, inputs: I) -> Vec<ExecutionResult>
    where
        R: Routine + ?Sized + 'static,
        I: IntoIterator<Item = Payload>,
    {
        inputs
            .into_iter()
            .map(|input| self.invoke(routine, Some(input)))
            .collect()
    }

    /// Invokes `routine` once, keeping the typed error on failure.
    pub fn try_invoke<R>(&self, routine: &Arc<R>, input: Option<Payload>) -> Result<Invocation, Failure>
    where
        R: Routine + ?Sized + 'static,
    {
        let input = input.unwrap_or_default();
        let start = Instant::now();

        if let Err(e) = validate_payload(&input) {
            return Err(Failure {
                error: ExecError::binding(e.to_string()),
                diagnostics: String::new(),
                elapsed: start.elapsed(),
            });
        }

        tracing::debug!(
            routine = routine.name(),
            kind = routine.kind().as_str(),
            scalars = input.scalar_count(),
            "invoking routine"
        );

        let capture = Capture::begin();
        let outcome = match self.timeout {
            None => run_inline(routine.as_ref(), &input, capture.sink()),
            Some(limit) => run_with_timeout(
                Arc::clone(routine),
                input.clone(),
                capture.sink().clone(),
                limit,
            ),
        }
        .and_then(|output| {
            self.shape_policy
                .check(&input, &output)
                .map_err(|message| ExecError::ShapeMismatch { message })?;
            Ok(output)
        });
        let diagnostics = capture.finish();
        let elapsed = start.elapsed();

        if !diagnostics.is_empty() {
            tracing::info!(
                routine = routine.name(),
                "captured output:\n{}",
                diagnostics.trim_end()
            );
        }

        match outcome {
            Ok(output) => {
                tracing::debug!(
                    routine = routine.name(),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "routine finished"
                );
                Ok(Invocation {
                    output,
                    diagnostics,
                    elapsed,
                })
            }
            Err(error) => {
                tracing::warn!(routine = routine.name(), code = error.code(), "{}", error);
                Err(Failure {
                    error,
                    diagnostics,
                    elapsed,
                })
            }
        }
    }
}

fn run_inline<R>(routine: &R, input: &Payload, sink: &Diagnostics) -> Result<Payload, ExecError>
where
    R: Routine + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| routine.invoke(input, sink))).unwrap_or_else(
        |payload| {
            Err(ExecError::RoutineFault {
                location: routine.name().to_string(),
                message: format!("routine panicked: {}", panic_message(payload.as_ref())),
            })
        },
    )
}

/// Runs the routine on a blocking worker and stops waiting at `limit`.
///
/// The worker is not cancelled on timeout. It runs to completion in the
/// background, and its late diagnostics are dropped by the closed sink.
fn run_with_timeout<R>(
    routine: Arc<R>,
    input: Payload,
    sink: Diagnostics,
    limit: Duration,
) -> Result<Payload, ExecError>
where
    R: Routine + ?Sized + 'static,
{
    use tokio::runtime::Builder;
    use tokio::time::timeout;

    let location = routine.name().to_string();

    // Use Builder API since rt feature doesn't include Runtime::new()
    let rt = Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| ExecError::RoutineFault {
            location: location.clone(),
            message: format!("failed to create runtime: {}", e),
        })?;

    let result = rt.block_on(async {
        let worker = tokio::task::spawn_blocking(move || routine.invoke(&input, &sink));
        match timeout(limit, worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                let message = if join_error.is_panic() {
                    let payload = join_error.into_panic();
                    format!("routine panicked: {}", panic_message(payload.as_ref()))
                } else {
                    format!("worker cancelled: {}", join_error)
                };
                Err(ExecError::RoutineFault { location, message })
            }
            Err(_) => Err(ExecError::Timeout { limit }),
        }
    });

    // Dropping the runtime would block on a still-running worker.
    rt.shutdown_background();
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
