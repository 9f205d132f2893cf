//! Error types for routine loading and execution.
//!
//! Codes match [`featurehost_payload::FaultCode`]:
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | R001, R008 | load | Source could not be read or parsed |
//! | R002-R005 | execution | Fault raised by or about the routine |
//! | R006, R007 | host | Deadline or shape policy enforced by the host |

use featurehost_payload::{FaultCode, FaultReport};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or invoking a routine.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    /// R001: Syntax error in routine source.
    #[error("R001: syntax error in {location}: {message}")]
    Syntax { location: String, message: String },

    /// R002: Uncaught fault during execution.
    #[error("R002: routine fault in {location}: {message}")]
    RoutineFault { location: String, message: String },

    /// R003: `output_data` was never assigned.
    #[error("R003: routine finished without assigning 'output_data'")]
    OutputMissing,

    /// R004: Input could not be bound, or the routine rejected its shape.
    #[error("R004: unusable input: {message}")]
    Binding { message: String },

    /// R005: `output_data` is not a numeric structure.
    #[error("R005: cannot read 'output_data': {message}")]
    OutputConversion { message: String },

    /// R006: Host deadline elapsed.
    #[error("R006: routine timed out after {limit:?}")]
    Timeout { limit: Duration },

    /// R007: Output shape rejected by the shape policy.
    #[error("R007: {message}")]
    ShapeMismatch { message: String },

    /// R008: Routine source could not be read.
    #[error("R008: cannot read routine source {path}: {message}")]
    SourceRead { path: String, message: String },
}

impl ExecError {
    /// Returns the fault kind.
    pub fn fault_code(&self) -> FaultCode {
        match self {
            ExecError::Syntax { .. } => FaultCode::Syntax,
            ExecError::RoutineFault { .. } => FaultCode::RoutineFault,
            ExecError::OutputMissing => FaultCode::OutputMissing,
            ExecError::Binding { .. } => FaultCode::BindingError,
            ExecError::OutputConversion { .. } => FaultCode::OutputConversion,
            ExecError::Timeout { .. } => FaultCode::Timeout,
            ExecError::ShapeMismatch { .. } => FaultCode::ShapeMismatch,
            ExecError::SourceRead { .. } => FaultCode::SourceRead,
        }
    }

    /// Returns the error code (e.g., "R002").
    pub fn code(&self) -> &'static str {
        self.fault_code().code()
    }

    /// Returns the error category.
    pub fn category(&self) -> &'static str {
        match self {
            ExecError::Syntax { .. } | ExecError::SourceRead { .. } => "load",
            ExecError::RoutineFault { .. }
            | ExecError::OutputMissing
            | ExecError::Binding { .. }
            | ExecError::OutputConversion { .. } => "execution",
            ExecError::Timeout { .. } | ExecError::ShapeMismatch { .. } => "host",
        }
    }

    /// Builds the report attached to a failed result.
    pub fn to_report(&self) -> FaultReport {
        FaultReport::new(self.fault_code(), self.to_string())
    }

    /// Shorthand for a binding error raised by a routine.
    pub fn binding(message: impl Into<String>) -> Self {
        ExecError::Binding {
            message: message.into(),
        }
    }
}
