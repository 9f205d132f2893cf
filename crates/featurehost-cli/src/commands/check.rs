//! Check command implementation
//!
//! Loads a routine (which parses script source) and dry-runs it with the
//! empty default input.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use super::common::RoutineArgs;
use super::reporting::{print_diagnostics, print_fault};
use crate::runtime::STDLIB_VERSION;

/// Run the check command
///
/// # Returns
/// Exit code: 0 if the routine loads and the dry run succeeds, 1 otherwise
pub fn run(routine: &RoutineArgs, json: bool) -> Result<ExitCode> {
    let resolved = routine.resolve()?;
    let result = resolved.host.invoke(&resolved.routine, None);

    if json {
        let report = serde_json::json!({
            "routine": resolved.routine.name(),
            "kind": resolved.routine.kind().as_str(),
            "source_hash": resolved.source_hash,
            "stdlib_version": STDLIB_VERSION,
            "dry_run": result,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} {} ({})",
            "Loaded".green().bold(),
            resolved.routine.name(),
            resolved.routine.kind().as_str()
        );
        if let Some(hash) = &resolved.source_hash {
            println!("  source hash: {}", hash.dimmed());
        }
        println!("  stdlib: {}", STDLIB_VERSION);
        print_diagnostics(&result.routine, &result.diagnostics);
        match (&result.output, &result.fault) {
            (Some(output), _) => println!(
                "{} empty input -> {}",
                "Dry run ok:".green().bold(),
                output
            ),
            (None, Some(fault)) => print_fault(fault),
            (None, None) => {}
        }
    }

    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
