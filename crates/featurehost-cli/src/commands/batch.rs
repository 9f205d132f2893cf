//! Batch command implementation
//!
//! Runs one loaded routine over every row of a JSON, JSONL or CSV file.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use super::common::RoutineArgs;
use super::reporting::{print_result, print_summary};
use crate::input::load_rows;

/// Run the batch command
///
/// With `json`, prints one `ExecutionResult` per line (JSON Lines).
/// Otherwise prints each output on its own line and a summary on stderr.
///
/// # Returns
/// Exit code: 0 if every row succeeded, 1 otherwise
pub fn run(routine: &RoutineArgs, rows_path: &str, json: bool) -> Result<ExitCode> {
    let resolved = routine.resolve()?;
    let rows = load_rows(Path::new(rows_path))
        .with_context(|| format!("Failed to load rows from '{}'", rows_path))?;

    tracing::info!(
        routine = resolved.routine.name(),
        rows = rows.len(),
        "starting batch"
    );

    let results = resolved.host.invoke_batch(&resolved.routine, rows);

    for result in &results {
        if json {
            let line = result
                .to_json()
                .context("Failed to serialize result to JSON")?;
            println!("{}", line);
        } else {
            print_result(result)?;
        }
    }

    let failed = results.iter().filter(|r| !r.success).count();
    if !json {
        print_summary(results.len() - failed, failed);
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
