//! Starlark stdlib for FeatureHost routines.
//!
//! Routines run in standard Starlark with `print`, `map` and `filter`
//! enabled, plus the functions registered here. Nothing in the stdlib
//! touches the filesystem, the clock, or randomness, so a routine's output
//! depends only on its input.
//!
//! ## Function Categories
//!
//! - **Numeric**: `sqrt()`, `sum()`, `mean()`, `stdev()`, `transpose()`,
//!   `column_mean()`, `column_stdev()`

pub mod numeric;

use starlark::environment::GlobalsBuilder;

/// Registers all FeatureHost stdlib functions into a GlobalsBuilder.
///
/// # Example
///
/// ```ignore
/// use starlark::environment::{GlobalsBuilder, LibraryExtension};
/// use featurehost_cli::runtime::stdlib::register_stdlib;
///
/// let globals = GlobalsBuilder::extended_by(&[LibraryExtension::Print])
///     .with(register_stdlib)
///     .build();
/// ```
pub fn register_stdlib(builder: &mut GlobalsBuilder) {
    numeric::register(builder);
}
