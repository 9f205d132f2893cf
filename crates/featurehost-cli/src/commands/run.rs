//! Run command implementation
//!
//! Invokes one routine once and prints its output.

use anyhow::{Context, Result};
use std::process::ExitCode;

use super::common::{InputArgs, RoutineArgs};
use super::reporting::print_result;

/// Run the run command
///
/// # Arguments
/// * `routine` - Routine selection and host settings
/// * `input` - Input payload source; empty list when absent
/// * `json` - Print the full execution result as JSON
///
/// # Returns
/// Exit code: 0 on success, 1 if the routine failed
pub fn run(routine: &RoutineArgs, input: &InputArgs, json: bool) -> Result<ExitCode> {
    let resolved = routine.resolve()?;
    let payload = input.load()?;

    let result = resolved.host.invoke(&resolved.routine, payload);

    if json {
        let text = result
            .to_json_pretty()
            .context("Failed to serialize result to JSON")?;
        println!("{}", text);
    } else {
        print_result(&result)?;
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
