//! FeatureHost CLI - Command-line host for feature-transformation routines
//!
//! This binary runs Starlark or native routines over numeric payloads,
//! captures their diagnostics, and reports the results.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

// Use modules from the library crate
use featurehost_cli::commands::{self, InputArgs, RoutineArgs};
use featurehost_cli::logging::init_tracing;

/// FeatureHost - Sandboxed feature-transformation routines
#[derive(Parser)]
#[command(name = "featurehost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a routine once and print its output
    Run {
        #[command(flatten)]
        routine: RoutineArgs,

        #[command(flatten)]
        input: InputArgs,

        /// Print the full execution result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a routine over every row of a JSON, JSONL or CSV file
    Batch {
        #[command(flatten)]
        routine: RoutineArgs,

        /// Rows file (.json, .jsonl, .ndjson or .csv)
        #[arg(short, long)]
        rows: String,

        /// Print one execution result per line as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a routine and dry-run it with empty input
    Check {
        #[command(flatten)]
        routine: RoutineArgs,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Time a script routine against a native builtin
    Bench {
        /// Starlark routine file
        #[arg(short, long)]
        script: String,

        /// Builtin native routine to compare against
        #[arg(short, long)]
        builtin: String,

        #[command(flatten)]
        input: InputArgs,

        /// Invocations per routine
        #[arg(
            short = 'n',
            long,
            default_value_t = 100,
            value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
        )]
        iterations: usize,

        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// List builtin native routines
    Builtins {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            routine,
            input,
            json,
        } => commands::run::run(&routine, &input, json),
        Commands::Batch {
            routine,
            rows,
            json,
        } => commands::batch::run(&routine, &rows, json),
        Commands::Check { routine, json } => commands::check::run(&routine, json),
        Commands::Bench {
            script,
            builtin,
            input,
            iterations,
            json,
        } => commands::bench::run(&script, &builtin, &input, iterations, json),
        Commands::Builtins { json } => commands::builtins::run(json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
