use colored::Colorize;
use featurehost_payload::{ExecutionResult, FaultReport};

/// Echo captured diagnostics to stderr, one dimmed line per print.
pub(crate) fn print_diagnostics(routine: &str, diagnostics: &str) {
    for line in diagnostics.lines() {
        eprintln!("{} {}", format!("[{}]", routine).dimmed(), line);
    }
}

pub(crate) fn print_fault(fault: &FaultReport) {
    eprintln!("{} {}", "error:".red().bold(), fault);
}

/// Print a result in human form: diagnostics to stderr, output JSON to stdout.
pub(crate) fn print_result(result: &ExecutionResult) -> anyhow::Result<()> {
    print_diagnostics(&result.routine, &result.diagnostics);
    match (&result.output, &result.fault) {
        (Some(output), _) => println!("{}", output.to_json()?),
        (None, Some(fault)) => print_fault(fault),
        (None, None) => {}
    }
    Ok(())
}

pub(crate) fn print_summary(succeeded: usize, failed: usize) {
    let failed_text = format!("{} failed", failed);
    eprintln!(
        "{} {} succeeded, {}",
        "summary:".bold(),
        succeeded.to_string().green(),
        if failed > 0 {
            failed_text.red()
        } else {
            failed_text.normal()
        }
    );
}
