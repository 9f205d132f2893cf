//! Starlark runtime for feature routines.
//!
//! This module evaluates routine source under the host/routine contract:
//!
//! - Parses Starlark source once at load time to catch syntax errors early
//! - Binds the input payload to `input_data` as a frozen value
//! - Routes `print` into the invocation's diagnostics
//! - Reads `output_data` back and converts it to a payload
//!
//! # Safety
//!
//! - **Termination**: recursion and `while` are unavailable in the dialect
//! - **Confined loads**: `load()` only reads from the configured module
//!   directory
//! - **No ambient IO**: the stdlib has no filesystem, clock, or randomness

mod convert;
mod error;
pub mod eval;
pub mod loader;
pub mod stdlib;

pub use convert::{payload_to_frozen, value_to_payload};
pub use error::ExecError;
pub use eval::{build_globals, execute, parse_routine, ScriptContext};
pub use loader::ModuleCache;

use std::path::PathBuf;

/// Current stdlib version.
/// Increment when stdlib changes affect routine output.
pub const STDLIB_VERSION: &str = "0.1.0";

/// Default host timeout in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Starlark-side settings for script routines.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Whether `load()` statements are allowed (default: true).
    pub enable_load: bool,
    /// Directory `load()` paths resolve against. Script files default to
    /// their own directory when this is unset.
    pub module_path: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            enable_load: true,
            module_path: None,
        }
    }
}

impl RuntimeConfig {
    /// Sets the module directory.
    pub fn with_module_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.module_path = Some(path.into());
        self
    }

    /// Disables `load()`.
    pub fn without_load(mut self) -> Self {
        self.enable_load = false;
        self
    }
}
