//! Tracing subscriber setup for the binary.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `featurehost=debug`.
pub const LOG_ENV: &str = "FEATUREHOST_LOG";

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Maps `-v` repetitions to a default filter.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs a stderr subscriber. `FEATUREHOST_LOG` wins over `verbosity`.
///
/// Safe to call more than once; only the first call installs.
pub fn init_tracing(verbosity: u8) {
    if TRACING_INITIALIZED.get().is_some() {
        return;
    }

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        tracing::debug!(error = %error, "Tracing subscriber already initialized");
    }
    let _ = TRACING_INITIALIZED.set(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(0), "warn");
        assert_eq!(default_filter(1), "info");
        assert_eq!(default_filter(2), "debug");
        assert_eq!(default_filter(7), "trace");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(0);
        init_tracing(2);
    }
}
