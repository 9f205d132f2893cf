//! The aggregate outcome of one routine invocation.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{FaultCode, FaultReport, PayloadError};
use crate::payload::Payload;

/// Output, captured diagnostics, and success flag for one invocation.
///
/// There are no partial results: `output` is `Some` exactly when
/// `success` is true. Diagnostics are kept in both cases, up to the fault
/// point when the routine failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Name of the routine that ran.
    pub routine: String,
    /// Whether the invocation completed and produced output.
    pub success: bool,
    /// The value the routine assigned to `output_data`.
    #[serde(rename = "output_data", skip_serializing_if = "Option::is_none", default)]
    pub output: Option<Payload>,
    /// Everything the routine printed, one newline-terminated line per print.
    #[serde(rename = "captured_output")]
    pub diagnostics: String,
    /// What went wrong, on failure.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fault: Option<FaultReport>,
    /// Wall-clock duration of the invocation in milliseconds.
    pub elapsed_ms: f64,
}

impl ExecutionResult {
    /// Creates a successful result.
    pub fn succeeded(
        routine: impl Into<String>,
        output: Payload,
        diagnostics: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            routine: routine.into(),
            success: true,
            output: Some(output),
            diagnostics,
            fault: None,
            elapsed_ms: duration_ms(elapsed),
        }
    }

    /// Creates a failed result.
    pub fn failed(
        routine: impl Into<String>,
        fault: FaultReport,
        diagnostics: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            routine: routine.into(),
            success: false,
            output: None,
            diagnostics,
            fault: Some(fault),
            elapsed_ms: duration_ms(elapsed),
        }
    }

    /// Returns true if the invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the output payload, if any.
    pub fn output(&self) -> Option<&Payload> {
        self.output.as_ref()
    }

    /// Consumes the result and returns the output payload, if any.
    pub fn into_output(self) -> Option<Payload> {
        self.output
    }

    /// Returns the fault kind of a failed invocation.
    pub fn fault_code(&self) -> Option<FaultCode> {
        self.fault.as_ref().map(|f| f.kind)
    }

    /// Iterates over captured diagnostic lines without their terminators.
    pub fn diagnostic_lines(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.lines()
    }

    /// Serializes the result to compact JSON.
    pub fn to_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(PayloadError::Json)
    }

    /// Serializes the result to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, PayloadError> {
        serde_json::to_string_pretty(self).map_err(PayloadError::Json)
    }
}

fn duration_ms(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}
