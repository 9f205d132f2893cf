//! FeatureHost Payload Library
//!
//! This crate provides the data model shared by a FeatureHost host and the
//! routines it runs: numeric payloads, the aggregate result of one
//! invocation, stable fault codes, and hashing.
//!
//! # Overview
//!
//! A host binds an input [`Payload`] to the reserved `input_data` name,
//! runs a routine, reads `output_data` back, and collects everything the
//! routine printed. The outcome is an [`ExecutionResult`]:
//!
//! ```
//! use featurehost_payload::{ExecutionResult, Payload};
//! use std::time::Duration;
//!
//! let result = ExecutionResult::succeeded(
//!     "add_one",
//!     Payload::from(vec![2i64, 3, 4]),
//!     "Processed features: [2, 3, 4]\n".to_string(),
//!     Duration::from_millis(1),
//! );
//! assert!(result.is_success());
//! assert_eq!(result.output().unwrap().to_string(), "[2, 3, 4]");
//! ```
//!
//! # Modules
//!
//! - [`error`]: Fault codes and payload errors
//! - [`hash`]: BLAKE3 fingerprints for sources and payloads
//! - [`payload`]: The numeric payload type
//! - [`result`]: The per-invocation result
//! - [`validation`]: Payload checks and the shape policy

pub mod error;
pub mod hash;
pub mod payload;
pub mod result;
pub mod validation;

/// Reserved name the input payload is bound to.
pub const INPUT_DATA: &str = "input_data";

/// Reserved name the routine assigns its result to.
pub const OUTPUT_DATA: &str = "output_data";

/// Name under which captured diagnostics are reported.
pub const CAPTURED_OUTPUT: &str = "captured_output";

pub use error::{FaultCode, FaultReport, PayloadError};
pub use hash::{payload_hash, source_hash};
pub use payload::Payload;
pub use result::ExecutionResult;
pub use validation::{validate_payload, ShapePolicy, MAX_PAYLOAD_DEPTH};
