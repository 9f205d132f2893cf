//! Routines backed by Starlark source.

use super::{Routine, RoutineKind};
use crate::diagnostics::Diagnostics;
use crate::runtime::{
    build_globals, execute, parse_routine, ExecError, ModuleCache, RuntimeConfig, ScriptContext,
};
use featurehost_payload::{source_hash, Payload};
use starlark::environment::Globals;
use std::fmt;
use std::path::{Path, PathBuf};

/// A Starlark routine, loaded once and invoked many times.
///
/// Loading reads and parses the source, so syntax errors surface before
/// the first invocation. Each invocation evaluates in a fresh module;
/// only modules pulled in with `load()` are shared between invocations.
pub struct ScriptRoutine {
    name: String,
    filename: String,
    source: String,
    source_hash: String,
    config: RuntimeConfig,
    globals: Globals,
    modules: Option<ModuleCache>,
}

impl ScriptRoutine {
    /// Loads a routine from a file.
    ///
    /// The routine is named after the file stem. When `load()` is enabled
    /// and no module directory is configured, modules resolve against the
    /// script's own directory.
    pub fn load(path: &Path, config: &RuntimeConfig) -> Result<Self, ExecError> {
        let source = std::fs::read_to_string(path).map_err(|e| ExecError::SourceRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let module_root = config.module_path.clone().or_else(|| {
            path.parent()
                .map(|dir| {
                    if dir.as_os_str().is_empty() {
                        PathBuf::from(".")
                    } else {
                        dir.to_path_buf()
                    }
                })
        });

        Self::build(
            name,
            path.display().to_string(),
            source,
            config,
            module_root,
        )
    }

    /// Creates a routine from in-memory source.
    ///
    /// `load()` only works here if the config names a module directory.
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<String>,
        config: &RuntimeConfig,
    ) -> Result<Self, ExecError> {
        let name = name.into();
        let filename = format!("{}.star", name);
        Self::build(
            name,
            filename,
            source.into(),
            config,
            config.module_path.clone(),
        )
    }

    fn build(
        name: String,
        filename: String,
        source: String,
        config: &RuntimeConfig,
        module_root: Option<PathBuf>,
    ) -> Result<Self, ExecError> {
        parse_routine(&filename, &source, config)?;

        let modules = if config.enable_load {
            module_root.map(ModuleCache::new)
        } else {
            None
        };

        Ok(Self {
            name,
            filename,
            source_hash: source_hash(&source),
            source,
            config: config.clone(),
            globals: build_globals(),
            modules,
        })
    }

    /// BLAKE3 hash of the routine source.
    pub fn source_hash(&self) -> &str {
        &self.source_hash
    }

    /// The routine source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Filename used in error locations.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Directory `load()` resolves against, if loading is available.
    pub fn module_root(&self) -> Option<&Path> {
        self.modules.as_ref().map(ModuleCache::root)
    }

    /// Number of modules loaded and memoized so far.
    pub fn loaded_module_count(&self) -> usize {
        self.modules.as_ref().map_or(0, ModuleCache::len)
    }
}

impl fmt::Debug for ScriptRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptRoutine")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("source_hash", &self.source_hash)
            .field("modules", &self.modules)
            .finish_non_exhaustive()
    }
}

impl Routine for ScriptRoutine {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> RoutineKind {
        RoutineKind::Script
    }

    fn invoke(&self, input: &Payload, diagnostics: &Diagnostics) -> Result<Payload, ExecError> {
        let ctx = ScriptContext {
            filename: &self.filename,
            source: &self.source,
            config: &self.config,
            globals: &self.globals,
            modules: self.modules.as_ref(),
        };
        execute(&ctx, input, diagnostics)
    }
}
