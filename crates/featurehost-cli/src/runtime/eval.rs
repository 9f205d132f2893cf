//! Starlark evaluation of one routine invocation.
//!
//! Binds `input_data` into a fresh module, routes `print` to the
//! invocation's diagnostics, evaluates the routine body, and reads the
//! top-level `output_data` binding back as a payload.

use super::convert::{payload_to_frozen, value_to_payload};
use super::error::ExecError;
use super::loader::{InvocationLoader, ModuleCache};
use super::stdlib::register_stdlib;
use super::RuntimeConfig;
use crate::diagnostics::Diagnostics;
use featurehost_payload::{Payload, INPUT_DATA, OUTPUT_DATA};
use starlark::environment::{Globals, GlobalsBuilder, LibraryExtension, Module};
use starlark::eval::Evaluator;
use starlark::syntax::{AstModule, Dialect};

/// Creates the Starlark dialect configuration.
///
/// - Functions (`def`) and lambdas are enabled for abstraction
/// - Top-level statements are enabled, since routines are scripts
/// - `load()` follows the runtime configuration
/// - Recursion and `while` stay disabled, so every routine terminates
pub(crate) fn create_dialect(config: &RuntimeConfig) -> Dialect {
    Dialect {
        enable_def: true,
        enable_lambda: true,
        enable_load: config.enable_load,
        enable_top_level_stmt: true,
        ..Dialect::Standard
    }
}

/// Builds the globals every routine sees: standard Starlark, `print`,
/// `map`, `filter`, and the numeric stdlib.
pub fn build_globals() -> Globals {
    GlobalsBuilder::extended_by(&[
        LibraryExtension::Print,
        LibraryExtension::Map,
        LibraryExtension::Filter,
    ])
    .with(register_stdlib)
    .build()
}

/// Parses routine source, mapping failures to R001.
pub fn parse_routine(
    filename: &str,
    source: &str,
    config: &RuntimeConfig,
) -> Result<AstModule, ExecError> {
    AstModule::parse(filename, source.to_string(), &create_dialect(config)).map_err(|e| {
        ExecError::Syntax {
            location: filename.to_string(),
            message: e.to_string(),
        }
    })
}

/// Everything one evaluation needs besides the input.
pub struct ScriptContext<'a> {
    pub filename: &'a str,
    pub source: &'a str,
    pub config: &'a RuntimeConfig,
    pub globals: &'a Globals,
    pub modules: Option<&'a ModuleCache>,
}

/// Evaluates a routine once against `input`.
///
/// Prints go to `diagnostics` as they happen, so a fault partway through
/// leaves everything printed before it in the sink.
pub fn execute(
    ctx: &ScriptContext<'_>,
    input: &Payload,
    diagnostics: &Diagnostics,
) -> Result<Payload, ExecError> {
    let ast = parse_routine(ctx.filename, ctx.source, ctx.config)?;

    let module = Module::new();
    let bound = payload_to_frozen(module.frozen_heap(), input);
    module.set(INPUT_DATA, bound.to_value());

    let loader = ctx
        .modules
        .map(|cache| InvocationLoader::new(cache, ctx.config, ctx.globals, diagnostics));

    {
        let mut eval = Evaluator::new(&module);
        eval.set_print_handler(diagnostics);
        if let Some(loader) = &loader {
            eval.set_loader(loader);
        }
        eval.eval_module(ast, ctx.globals)
            .map_err(|e| ExecError::RoutineFault {
                location: ctx.filename.to_string(),
                message: e.to_string(),
            })?;
    }

    let output = module.get(OUTPUT_DATA).ok_or(ExecError::OutputMissing)?;
    value_to_payload(output, OUTPUT_DATA)
}
