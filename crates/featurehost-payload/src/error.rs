//! Fault codes and payload errors.
//!
//! ## Fault Code Ranges
//!
//! | Range | Category | Description |
//! |-------|----------|-------------|
//! | R001-R008 | Invocation | Load, execution, extraction, and host faults |

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable fault codes for a failed routine invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCode {
    /// R001: Routine source failed to parse
    Syntax,
    /// R002: Uncaught fault raised while the routine ran
    RoutineFault,
    /// R003: Routine finished without assigning `output_data`
    OutputMissing,
    /// R004: Input could not be bound or was rejected by the routine
    BindingError,
    /// R005: `output_data` is not a numeric structure
    OutputConversion,
    /// R006: Host deadline elapsed before the routine finished
    Timeout,
    /// R007: Output shape rejected by the configured shape policy
    ShapeMismatch,
    /// R008: Routine source could not be read
    SourceRead,
}

impl FaultCode {
    /// Returns the fault code string (e.g., "R002").
    pub fn code(&self) -> &'static str {
        match self {
            FaultCode::Syntax => "R001",
            FaultCode::RoutineFault => "R002",
            FaultCode::OutputMissing => "R003",
            FaultCode::BindingError => "R004",
            FaultCode::OutputConversion => "R005",
            FaultCode::Timeout => "R006",
            FaultCode::ShapeMismatch => "R007",
            FaultCode::SourceRead => "R008",
        }
    }

    /// Returns true for faults detected before any routine code ran.
    pub fn is_load_time(&self) -> bool {
        matches!(self, FaultCode::Syntax | FaultCode::SourceRead)
    }
}

impl std::fmt::Display for FaultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A fault attached to a failed [`crate::ExecutionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultReport {
    /// Fault kind.
    pub kind: FaultCode,
    /// Stable code string, always `kind.code()`.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl FaultReport {
    /// Creates a fault report.
    pub fn new(kind: FaultCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code().to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FaultReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for FaultReport {}

/// Errors from payload parsing and serialization.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// JSON was malformed or not a numeric structure.
    #[error("payload JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A float was NaN or infinite where a finite value is required.
    #[error("payload contains a non-finite value")]
    NonFinite,

    /// Nesting exceeded the allowed depth.
    #[error("payload nesting depth {depth} exceeds limit {limit}")]
    TooDeep { depth: usize, limit: usize },
}
