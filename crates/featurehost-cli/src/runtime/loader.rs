//! Module directory support for `load()`.
//!
//! A routine may `load("lib/stats.star", "zscore")` helper modules from a
//! host-controlled directory. Each module is evaluated once, frozen, and
//! memoized for the lifetime of the routine, so later invocations reuse it.
//! Paths are resolved relative to the directory root; absolute paths and
//! `..` components are rejected.

use super::eval::create_dialect;
use super::RuntimeConfig;
use crate::diagnostics::Diagnostics;
use starlark::environment::{FrozenModule, Globals, Module};
use starlark::eval::{Evaluator, FileLoader};
use starlark::syntax::AstModule;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

/// Memoized modules loaded from one directory.
#[derive(Debug)]
pub struct ModuleCache {
    root: PathBuf,
    modules: Mutex<HashMap<String, FrozenModule>>,
}

impl ModuleCache {
    /// Creates an empty cache rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: Mutex::new(HashMap::new()),
        }
    }

    /// The directory `load()` paths are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of modules loaded so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, FrozenModule>> {
        self.modules
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(&self, path: &str) -> Option<FrozenModule> {
        self.lock().get(path).cloned()
    }

    fn insert(&self, path: &str, module: FrozenModule) -> FrozenModule {
        // Two invocations may race to load the same module; keep the first.
        self.lock()
            .entry(path.to_string())
            .or_insert(module)
            .clone()
    }

    /// Resolves a `load()` path to a file under the root.
    pub fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty() {
            return Err(anyhow::anyhow!("load(): empty module path"));
        }
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(anyhow::anyhow!(
                        "load(): module path '{}' must stay inside the module directory",
                        path
                    ))
                }
            }
        }
        Ok(self.root.join(relative))
    }
}

/// The `FileLoader` handed to one evaluation.
///
/// Wraps the routine's shared cache with the invocation's diagnostics, so
/// anything a module prints while it is first evaluated lands in the
/// invocation that triggered the load.
pub struct InvocationLoader<'a> {
    cache: &'a ModuleCache,
    config: &'a RuntimeConfig,
    globals: &'a Globals,
    diagnostics: &'a Diagnostics,
    loading: RefCell<Vec<String>>,
}

impl<'a> InvocationLoader<'a> {
    pub fn new(
        cache: &'a ModuleCache,
        config: &'a RuntimeConfig,
        globals: &'a Globals,
        diagnostics: &'a Diagnostics,
    ) -> Self {
        Self {
            cache,
            config,
            globals,
            diagnostics,
            loading: RefCell::new(Vec::new()),
        }
    }

    fn evaluate(&self, path: &str) -> anyhow::Result<FrozenModule> {
        let file = self.cache.resolve(path)?;
        let source = std::fs::read_to_string(&file).map_err(|e| {
            anyhow::anyhow!("load(): cannot read module '{}': {}", file.display(), e)
        })?;
        let ast = AstModule::parse(path, source, &create_dialect(self.config))
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        let module = Module::new();
        {
            let mut eval = Evaluator::new(&module);
            eval.set_loader(self);
            eval.set_print_handler(self.diagnostics);
            eval.eval_module(ast, self.globals)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
        }
        module.freeze()
    }
}

impl FileLoader for InvocationLoader<'_> {
    fn load(&self, path: &str) -> anyhow::Result<FrozenModule> {
        if let Some(module) = self.cache.get(path) {
            return Ok(module);
        }

        if self.loading.borrow().iter().any(|p| p == path) {
            let mut chain = self.loading.borrow().clone();
            chain.push(path.to_string());
            return Err(anyhow::anyhow!(
                "load(): cycle detected: {}",
                chain.join(" -> ")
            ));
        }

        self.loading.borrow_mut().push(path.to_string());
        let result = self.evaluate(path);
        self.loading.borrow_mut().pop();

        tracing::debug!(module = path, ok = result.is_ok(), "loaded module");
        Ok(self.cache.insert(path, result?))
    }
}
