//! CLI command implementations

pub mod bench;
pub mod batch;
pub mod builtins;
pub mod check;
pub mod common;
pub mod run;

mod reporting;

pub use common::{InputArgs, RoutineArgs};
