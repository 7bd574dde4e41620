//! Predicate-to-filter compilation.
//!
//! - [`FilterCompiler`]: the recursive-descent translator
//! - [`LiteralFormatter`]: per-dialect literal rules injected into the compiler
//! - [`CallTranslator`]: optional comparison extensions such as [`OrdinalComparison`]

mod extension;
mod filter;
mod literal;

pub use extension::{CallTranslator, OrdinalComparison, Rewritten};
pub use filter::FilterCompiler;
pub use literal::{LiteralFormatter, ODataLiteralFormatter, iso_8601};
