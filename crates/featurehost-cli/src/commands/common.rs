//! Routine and input selection shared by the commands.

use anyhow::{Context, Result};
use clap::Args;
use featurehost_payload::{Payload, ShapePolicy};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{load_config, HostConfig, RoutineSource};
use crate::host::Host;
use crate::input::{load_payload, parse_payload};
use crate::routine::builtins::{self, BUILTIN_NAMES};
use crate::routine::{Routine, ScriptRoutine};

/// Which routine to run and how to host it.
#[derive(Debug, Clone, Default, Args)]
pub struct RoutineArgs {
    /// Starlark routine file
    #[arg(short, long, conflicts_with = "builtin")]
    pub script: Option<String>,

    /// Builtin native routine name (see `featurehost builtins`)
    #[arg(short, long)]
    pub builtin: Option<String>,

    /// Host config file (JSON); flags override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory `load()` resolves against
    #[arg(long)]
    pub module_path: Option<String>,

    /// Disable `load()` in scripts
    #[arg(long)]
    pub no_load: bool,

    /// Per-invocation timeout in seconds (0 disables)
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output shape policy
    #[arg(long, value_parser = ["any", "same"])]
    pub shape_policy: Option<String>,
}

/// Where the input payload comes from.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Input payload as inline JSON (default: empty list)
    #[arg(short, long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the input payload from a JSON file
    #[arg(long)]
    pub input_file: Option<String>,
}

impl InputArgs {
    /// Loads the payload; `None` when no input was given.
    pub fn load(&self) -> Result<Option<Payload>> {
        if let Some(text) = &self.input {
            return parse_payload(text)
                .map(Some)
                .context("Failed to parse --input");
        }
        if let Some(path) = &self.input_file {
            return load_payload(Path::new(path))
                .map(Some)
                .with_context(|| format!("Failed to load input file '{}'", path));
        }
        Ok(None)
    }
}

/// A routine ready to run, with the host configured for it.
pub struct Resolved {
    pub routine: Arc<dyn Routine>,
    pub host: Host,
    /// BLAKE3 hash of the script source; `None` for builtins.
    pub source_hash: Option<String>,
}

impl RoutineArgs {
    /// Merges the config file (if any) with command-line overrides.
    pub fn host_config(&self) -> Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(Path::new(path))?,
            None => HostConfig::default(),
        };
        if let Some(path) = &self.module_path {
            config.module_path = Some(PathBuf::from(path));
        }
        if self.no_load {
            config.enable_load = false;
        }
        if let Some(secs) = self.timeout {
            config.timeout_seconds = secs;
        }
        if let Some(policy) = &self.shape_policy {
            config.shape_policy = policy
                .parse::<ShapePolicy>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Some(script) = &self.script {
            config.routine = Some(RoutineSource::Script(PathBuf::from(script)));
        } else if let Some(name) = &self.builtin {
            config.routine = Some(RoutineSource::Builtin(name.clone()));
        }
        Ok(config)
    }

    /// Loads the selected routine and builds its host.
    pub fn resolve(&self) -> Result<Resolved> {
        let config = self.host_config()?;
        let host = Host::from_config(&config);

        match &config.routine {
            Some(RoutineSource::Script(path)) => {
                let routine = ScriptRoutine::load(path, &config.runtime_config())?;
                let hash = routine.source_hash().to_string();
                Ok(Resolved {
                    routine: Arc::new(routine),
                    host,
                    source_hash: Some(hash),
                })
            }
            Some(RoutineSource::Builtin(name)) => Ok(Resolved {
                routine: Arc::new(lookup_builtin(name)?),
                host,
                source_hash: None,
            }),
            None => Err(anyhow::anyhow!(
                "no routine given: pass --script, --builtin, or a config with a routine"
            )),
        }
    }
}

/// Looks up a builtin, listing the valid names on failure.
pub fn lookup_builtin(name: &str) -> Result<crate::routine::NativeRoutine> {
    builtins::lookup(name).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown builtin '{}' (expected one of: {})",
            name,
            BUILTIN_NAMES.join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_flags_override_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("host.json");
        std::fs::write(
            &config_path,
            r#"{"routine": {"builtin": "square"}, "timeout_seconds": 5}"#,
        )
        .unwrap();

        let args = RoutineArgs {
            config: Some(config_path.to_string_lossy().into_owned()),
            builtin: Some("add_one".to_string()),
            timeout: Some(0),
            shape_policy: Some("same".to_string()),
            ..RoutineArgs::default()
        };
        let config = args.host_config().unwrap();
        assert_eq!(
            config.routine,
            Some(RoutineSource::Builtin("add_one".to_string()))
        );
        assert_eq!(config.timeout(), None);
        assert_eq!(config.shape_policy, ShapePolicy::Same);
    }

    #[test]
    fn test_config_supplies_routine() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("host.json");
        std::fs::write(
            &config_path,
            r#"{"routine": {"builtin": "square"}, "timeout_seconds": 5}"#,
        )
        .unwrap();

        let args = RoutineArgs {
            config: Some(config_path.to_string_lossy().into_owned()),
            ..RoutineArgs::default()
        };
        let resolved = args.resolve().unwrap();
        assert_eq!(resolved.routine.name(), "square");
        assert_eq!(resolved.host.timeout(), Some(Duration::from_secs(5)));
        assert!(resolved.source_hash.is_none());
    }

    #[test]
    fn test_resolve_script_has_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("noop.star");
        std::fs::write(&script, "output_data = input_data\n").unwrap();

        let args = RoutineArgs {
            script: Some(script.to_string_lossy().into_owned()),
            ..RoutineArgs::default()
        };
        let resolved = args.resolve().unwrap();
        assert_eq!(resolved.routine.name(), "noop");
        assert_eq!(resolved.source_hash.map(|h| h.len()), Some(64));
    }

    #[test]
    fn test_resolve_errors() {
        let err = RoutineArgs::default().resolve().err().unwrap();
        assert!(err.to_string().contains("no routine given"));

        let args = RoutineArgs {
            builtin: Some("cube".to_string()),
            ..RoutineArgs::default()
        };
        let err = args.resolve().err().unwrap();
        assert!(err.to_string().contains("unknown builtin 'cube'"));
    }

    #[test]
    fn test_input_args() {
        assert_eq!(InputArgs::default().load().unwrap(), None);

        let args = InputArgs {
            input: Some("[1, 2]".to_string()),
            input_file: None,
        };
        assert_eq!(args.load().unwrap(), Some(Payload::from(vec![1i64, 2])));

        let args = InputArgs {
            input: Some("nope".to_string()),
            input_file: None,
        };
        assert!(args.load().is_err());
    }
}
