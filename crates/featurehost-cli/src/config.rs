//! Host configuration files.
//!
//! A config file is JSON:
//!
//! ```json
//! {
//!   "routine": { "script": "routines/features.star" },
//!   "module_path": "routines/lib",
//!   "enable_load": true,
//!   "timeout_seconds": 30,
//!   "shape_policy": "any"
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file. Command-line flags override values from the file.

use crate::runtime::{RuntimeConfig, DEFAULT_TIMEOUT_SECONDS};
use featurehost_payload::ShapePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where a configured routine comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineSource {
    /// A Starlark file.
    Script(PathBuf),
    /// A builtin native routine, by name.
    Builtin(String),
}

/// Host settings loaded from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    /// Routine to run when none is given on the command line.
    #[serde(default)]
    pub routine: Option<RoutineSource>,
    /// Directory `load()` resolves against.
    #[serde(default)]
    pub module_path: Option<PathBuf>,
    /// Whether scripts may use `load()`.
    #[serde(default = "default_enable_load")]
    pub enable_load: bool,
    /// Per-invocation deadline in seconds; 0 disables it.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Output shape policy.
    #[serde(default)]
    pub shape_policy: ShapePolicy,
}

fn default_enable_load() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            routine: None,
            module_path: None,
            enable_load: default_enable_load(),
            timeout_seconds: default_timeout_seconds(),
            shape_policy: ShapePolicy::default(),
        }
    }
}

impl HostConfig {
    /// The per-invocation deadline, or `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Starlark-side settings derived from this config.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            enable_load: self.enable_load,
            module_path: self.module_path.clone(),
        }
    }

    /// Makes relative paths absolute against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(RoutineSource::Script(path)) = &mut self.routine {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(path) = &mut self.module_path {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Errors that can occur while loading a config file.
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read.
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    /// File is not a valid config.
    Parse { path: PathBuf, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead { path, source } => {
                write!(f, "failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "invalid config '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::FileRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Loads a config file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use featurehost_cli::config::load_config;
///
/// let config = load_config(Path::new("featurehost.json")).unwrap();
/// println!("timeout: {:?}", config.timeout());
/// ```
pub fn load_config(path: &Path) -> Result<HostConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut config: HostConfig =
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config: HostConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.enable_load);
        assert_eq!(config.shape_policy, ShapePolicy::Any);
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = HostConfig {
            timeout_seconds: 0,
            ..HostConfig::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_routine_sources() {
        let config: HostConfig =
            serde_json::from_str(r#"{"routine": {"builtin": "standardize"}}"#).unwrap();
        assert_eq!(
            config.routine,
            Some(RoutineSource::Builtin("standardize".to_string()))
        );

        let config: HostConfig =
            serde_json::from_str(r#"{"routine": {"script": "a.star"}, "shape_policy": "same"}"#)
                .unwrap();
        assert_eq!(
            config.routine,
            Some(RoutineSource::Script(PathBuf::from("a.star")))
        );
        assert_eq!(config.shape_policy, ShapePolicy::Same);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<HostConfig>(r#"{"timeout": 5}"#).is_err());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("featurehost.json");
        std::fs::write(
            &path,
            r#"{"routine": {"script": "features.star"}, "module_path": "lib", "enable_load": false}"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(
            config.routine,
            Some(RoutineSource::Script(tmp.path().join("features.star")))
        );
        assert_eq!(config.module_path, Some(tmp.path().join("lib")));

        let runtime = config.runtime_config();
        assert!(!runtime.enable_load);
        assert_eq!(runtime.module_path, Some(tmp.path().join("lib")));
    }

    #[test]
    fn test_load_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.json");
        assert!(matches!(
            load_config(&missing),
            Err(ConfigError::FileRead { .. })
        ));

        let bad = tmp.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = load_config(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("invalid config"));
    }
}
