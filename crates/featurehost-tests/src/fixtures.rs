//! Test fixture utilities for routine directories.

use featurehost_cli::routine::ScriptRoutine;
use featurehost_cli::runtime::RuntimeConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// The `routines/` directory shipped at the workspace root.
pub fn bundled_routines_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("routines")
}

/// A temporary directory of routine scripts and helper modules.
pub struct RoutineFixture {
    pub root: TempDir,
}

impl Default for RoutineFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineFixture {
    /// Create a new empty fixture.
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        Self { root }
    }

    /// Get the fixture root path.
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Write a file below the root, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
        path
    }

    /// Write a routine script named `<name>.star`.
    pub fn add_script(&self, name: &str, source: &str) -> PathBuf {
        self.write(&format!("{}.star", name), source)
    }

    /// Write and load a routine script with the default runtime config.
    pub fn load(&self, name: &str, source: &str) -> Arc<ScriptRoutine> {
        let path = self.add_script(name, source);
        Arc::new(
            ScriptRoutine::load(&path, &RuntimeConfig::default())
                .expect("Failed to load fixture routine"),
        )
    }
}
