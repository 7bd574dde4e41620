//! Expression model for filters.
//!
//! - [`ast`]: the predicate tree ([`Expr`], [`Param`], [`Predicate`]) and its builders
//! - [`value`]: literal values carried by constants and closures
//! - [`enums`]: enumeration descriptors mapping ordinals to wire strings

pub mod ast;
pub mod enums;
pub mod value;

pub use ast::{
    Bindings, COMPARE_ORDINAL, Closure, ComparisonOp, Expr, LogicalOp, Param, Predicate,
    QuantifierKind,
};
pub use enums::{EnumDescriptor, EnumMember};
pub use value::{EnumValue, Value};
