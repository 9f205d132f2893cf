//! FeatureHost CLI library.
//!
//! This crate hosts feature-transformation routines: it loads Starlark
//! scripts or native builtins, binds input payloads, captures what the
//! routine prints, and returns the output with its diagnostics.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod host;
pub mod input;
pub mod logging;
pub mod routine;
pub mod runtime;

pub use diagnostics::{Capture, Diagnostics};
pub use host::{Failure, Host, Invocation};
pub use routine::{NativeRoutine, Routine, ScriptRoutine};
pub use runtime::{ExecError, RuntimeConfig};
