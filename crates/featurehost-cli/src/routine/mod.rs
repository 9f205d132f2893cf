//! Transformation routines.
//!
//! A routine maps an input payload to an output payload and may write
//! diagnostic lines while it runs. Two kinds exist:
//!
//! - [`ScriptRoutine`]: Starlark source, parsed at load time and reused
//!   across invocations
//! - [`NativeRoutine`]: a precompiled Rust closure, see [`builtins`]

pub mod builtins;
mod native;
mod script;

pub use native::NativeRoutine;
pub use script::ScriptRoutine;

use crate::diagnostics::Diagnostics;
use crate::runtime::ExecError;
use featurehost_payload::Payload;

/// Which implementation backs a routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineKind {
    Script,
    Native,
}

impl RoutineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineKind::Script => "script",
            RoutineKind::Native => "native",
        }
    }
}

/// A loaded routine that the host can invoke any number of times.
///
/// Implementations must not keep per-invocation state: every call sees
/// only its own input and its own diagnostics sink.
pub trait Routine: Send + Sync {
    /// Name used in results and logs.
    fn name(&self) -> &str;

    /// Implementation kind.
    fn kind(&self) -> RoutineKind;

    /// Runs the routine once.
    ///
    /// Anything written to `diagnostics` before an error is returned stays
    /// in the sink.
    fn invoke(&self, input: &Payload, diagnostics: &Diagnostics) -> Result<Payload, ExecError>;
}
