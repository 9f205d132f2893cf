//! FeatureHost Integration Test Infrastructure
//!
//! This crate exercises the host/routine contract end to end:
//!
//! - Binding: input payloads reach `input_data`, absent input is `[]`
//! - Capture: prints come back in order, and survive faults
//! - **Idempotence**: a stateless routine gives the same output and
//!   diagnostics on every invocation
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p featurehost-tests
//! ```
//!
//! ## Idempotence Testing
//!
//! ```rust,ignore
//! use featurehost_tests::determinism::verify_idempotence;
//!
//! let result = verify_idempotence(&host, &routine, Some(input), 5);
//! assert!(result.is_idempotent, "{}", result);
//! ```

pub mod determinism;
pub mod fixtures;

// Re-export commonly used items
pub use determinism::{assert_idempotent, result_hash, verify_idempotence, IdempotenceResult};
pub use fixtures::{bundled_routines_dir, RoutineFixture};
