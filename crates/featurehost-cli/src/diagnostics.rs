//! Per-invocation diagnostic capture.
//!
//! Each invocation gets its own [`Capture`]: a scope that owns a fresh
//! in-memory sink for as long as the routine runs. Script routines reach
//! the sink through Starlark's `print`; native routines receive it as an
//! explicit [`Diagnostics`] argument. The process stdout is never swapped,
//! so concurrent invocations on different threads do not contend for it.
//!
//! The scope closes the sink when it ends, on every exit path. Anything a
//! routine emits after that (for example a timed-out worker that is still
//! running) is dropped rather than leaking into a later read.

use starlark::PrintHandler;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct SinkState {
    text: String,
    lines: usize,
    closed: bool,
}

/// A shared handle to one invocation's diagnostic buffer.
///
/// Cloning yields another handle to the same buffer.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    state: Arc<Mutex<SinkState>>,
}

impl Diagnostics {
    /// Creates an open, empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Appends one line. Ignored once the sink is closed.
    pub fn emit(&self, line: &str) {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        state.text.push_str(line);
        state.text.push('\n');
        state.lines += 1;
    }

    /// Returns a copy of everything captured so far.
    pub fn contents(&self) -> String {
        self.lock().text.clone()
    }

    /// Number of lines captured so far.
    pub fn line_count(&self) -> usize {
        self.lock().lines
    }

    /// Returns true once the owning capture scope has ended.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn close(&self) -> String {
        let mut state = self.lock();
        state.closed = true;
        state.lines = 0;
        std::mem::take(&mut state.text)
    }
}

impl PrintHandler for Diagnostics {
    fn println(&self, text: &str) -> anyhow::Result<()> {
        self.emit(text);
        Ok(())
    }
}

/// The capture scope for one invocation.
///
/// Ending the scope with [`Capture::finish`] returns the captured text;
/// dropping it without finishing still closes the sink.
#[derive(Debug)]
pub struct Capture {
    sink: Diagnostics,
}

impl Capture {
    /// Opens a fresh sink.
    pub fn begin() -> Self {
        Self {
            sink: Diagnostics::new(),
        }
    }

    /// The sink to hand to the routine.
    pub fn sink(&self) -> &Diagnostics {
        &self.sink
    }

    /// Closes the sink and returns everything captured.
    pub fn finish(self) -> String {
        self.sink.close()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        self.sink.close();
    }
}
