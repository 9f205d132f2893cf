//! Routines backed by Rust closures.

use super::{Routine, RoutineKind};
use crate::diagnostics::Diagnostics;
use crate::runtime::ExecError;
use featurehost_payload::Payload;
use std::fmt;

type NativeFn = dyn Fn(&Payload, &Diagnostics) -> Result<Payload, ExecError> + Send + Sync;

/// A precompiled routine.
pub struct NativeRoutine {
    name: String,
    func: Box<NativeFn>,
}

impl NativeRoutine {
    /// Wraps a closure as a routine.
    ///
    /// # Example
    ///
    /// ```
    /// use featurehost_cli::routine::{NativeRoutine, Routine};
    /// use featurehost_cli::diagnostics::Diagnostics;
    /// use featurehost_payload::Payload;
    ///
    /// let double = NativeRoutine::new("double", |input, _diagnostics| {
    ///     Ok(input.map_scalars(&|x| Payload::Float(x.as_f64().unwrap_or(0.0) * 2.0)))
    /// });
    /// let out = double.invoke(&Payload::from(vec![1.0, 2.0]), &Diagnostics::new()).unwrap();
    /// assert_eq!(out, Payload::from(vec![2.0, 4.0]));
    /// ```
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Payload, &Diagnostics) -> Result<Payload, ExecError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for NativeRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRoutine")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Routine for NativeRoutine {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RoutineKind {
        RoutineKind::Native
    }

    fn invoke(&self, input: &Payload, diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
        (self.func)(input, diagnostics)
    }
}
