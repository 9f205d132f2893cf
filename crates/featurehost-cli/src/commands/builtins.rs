//! Builtins command implementation
//!
//! Lists the native routines available to `--builtin`.

use anyhow::Result;
use colored::Colorize;
use std::process::ExitCode;

use crate::routine::builtins::{describe, BUILTIN_NAMES};

/// Run the builtins command
pub fn run(json: bool) -> Result<ExitCode> {
    if json {
        let list: Vec<_> = BUILTIN_NAMES
            .iter()
            .map(|name| {
                serde_json::json!({
                    "name": name,
                    "description": describe(name).unwrap_or_default(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for name in BUILTIN_NAMES {
            println!(
                "{} {}",
                format!("{:<16}", name).cyan(),
                describe(name).unwrap_or_default()
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}
