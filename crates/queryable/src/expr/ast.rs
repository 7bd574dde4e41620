//! Predicate trees.
//!
//! Callers describe filters as a tagged-union tree rooted at a lambda
//! parameter standing for the entity under query:
//!
//! ```
//! use odata_queryable::expr::Predicate;
//!
//! let adults_in_us = Predicate::build("u", |u| {
//!     u.field("Age").ge(18).and(u.field("Country").eq("US"))
//! });
//! ```
//!
//! The compiler only reads these trees; nothing here talks to a service.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Not;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

use super::value::{EnumValue, Value};

/// Method name recognized by the ordinal string comparison extension.
pub const COMPARE_ORDINAL: &str = "compare_ordinal";

/// Comparison operators of the filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Ge,
    /// Less than
    Lt,
    /// Less than or equal
    Le,
}

impl ComparisonOp {
    /// Returns the grammar keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
        }
    }

    /// Returns the operator that keeps the meaning when operands swap sides.
    pub fn inverted(self) -> Self {
        match self {
            ComparisonOp::Gt => ComparisonOp::Lt,
            ComparisonOp::Lt => ComparisonOp::Gt,
            ComparisonOp::Ge => ComparisonOp::Le,
            ComparisonOp::Le => ComparisonOp::Ge,
            op => op,
        }
    }

    /// Returns true for `eq` and `ne`.
    pub fn is_equality(self) -> bool {
        matches!(self, ComparisonOp::Eq | ComparisonOp::Ne)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// Both sides hold.
    And,
    /// Either side holds.
    Or,
}

impl LogicalOp {
    /// Returns the grammar keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "and",
            LogicalOp::Or => "or",
        }
    }
}

/// Collection quantifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuantifierKind {
    /// At least one element matches.
    Any,
    /// Every element matches.
    All,
}

impl QuantifierKind {
    /// Returns the lambda operator name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantifierKind::Any => "any",
            QuantifierKind::All => "all",
        }
    }

    /// Returns the connective joining per-element clauses of a literal source.
    pub fn connective(&self) -> LogicalOp {
        match self {
            QuantifierKind::Any => LogicalOp::Or,
            QuantifierKind::All => LogicalOp::And,
        }
    }
}

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// A named lambda parameter.
///
/// Every call to [`Param::new`] creates a distinct parameter; clones refer to
/// the same one. Two parameters sharing a name never resolve to each other,
/// the name only matters to [`Bindings::get_named`] and diagnostics.
#[derive(Clone)]
pub struct Param {
    id: u64,
    name: Arc<str>,
}

impl Param {
    /// Creates a parameter.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed),
            name: Arc::from(name.as_ref()),
        }
    }

    /// Returns the parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accesses a field of the value bound to this parameter.
    pub fn field(&self, field: impl Into<String>) -> Expr {
        Expr::Member {
            target: self.clone(),
            field: field.into(),
        }
    }

    /// References the parameter itself.
    pub fn expr(&self) -> Expr {
        Expr::Parameter(self.clone())
    }
}

impl PartialEq for Param {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Param {}

impl Hash for Param {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param({}#{})", self.name, self.id)
    }
}

/// Values bound to quantifier parameters while a literal collection is expanded.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    entries: &'a [(Param, Value)],
}

impl<'a> Bindings<'a> {
    /// Wraps a binding list. Later entries shadow earlier ones.
    pub fn new(entries: &'a [(Param, Value)]) -> Self {
        Self { entries }
    }

    /// Returns the value bound to `param`, if any.
    pub fn get(&self, param: &Param) -> Option<&'a Value> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p == param)
            .map(|(_, v)| v)
    }

    /// Returns the value bound to the parameter with the given name.
    pub fn get_named(&self, name: &str) -> Option<&'a Value> {
        self.entries
            .iter()
            .rev()
            .find(|(p, _)| p.name() == name)
            .map(|(_, v)| v)
    }
}

type ClosureFn = dyn Fn(&Bindings<'_>) -> Value + Send + Sync;

/// A captured computation evaluated once at compile time.
#[derive(Clone)]
pub struct Closure(Arc<ClosureFn>);

impl Closure {
    /// Wraps a function of the current bindings.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Bindings<'_>) -> Value + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluates the closure.
    pub fn call(&self, bindings: &Bindings<'_>) -> Value {
        (self.0)(bindings)
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Closure(..)")
    }
}

/// A node of a predicate tree.
#[derive(Debug, Clone)]
pub enum Expr {
    /// `target.field`
    Member {
        /// Parameter whose field is read.
        target: Param,
        /// In-process field identifier.
        field: String,
    },
    /// A bare parameter reference.
    Parameter(Param),
    /// A literal value.
    Constant(Value),
    /// A value computed from captured state.
    Closure(Closure),
    /// Enum-to-integer conversion of the operand.
    Convert(Box<Expr>),
    /// Binary comparison.
    Compare {
        /// Operator.
        op: ComparisonOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Logical connective.
    Logical {
        /// Connective.
        op: LogicalOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Logical negation.
    Not(Box<Expr>),
    /// `left ?? right`
    Coalesce {
        /// Preferred value.
        left: Box<Expr>,
        /// Fallback when `left` is null.
        right: Box<Expr>,
    },
    /// `source.any(element => predicate)` / `source.all(element => predicate)`
    Quantifier {
        /// Any or all.
        kind: QuantifierKind,
        /// Collection being quantified.
        source: Box<Expr>,
        /// Lambda parameter bound to each element.
        element: Param,
        /// Per-element predicate. `None` only for `any()`.
        predicate: Option<Box<Expr>>,
    },
    /// A method call, only meaningful to compiler extensions.
    Call {
        /// Method name.
        method: String,
        /// Arguments.
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Creates a literal.
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    /// Creates a value computed when the predicate compiles.
    pub fn closure<F>(f: F) -> Self
    where
        F: Fn(&Bindings<'_>) -> Value + Send + Sync + 'static,
    {
        Expr::Closure(Closure::new(f))
    }

    /// Creates a method call node.
    pub fn call(method: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            method: method.into(),
            args,
        }
    }

    /// `compare_ordinal(left, right)`, an ordinal string comparison whose
    /// result is compared against zero.
    pub fn compare_ordinal(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::call(COMPARE_ORDINAL, vec![left.into(), right.into()])
    }

    /// Compares this node with another.
    pub fn compare(self, op: ComparisonOp, other: impl Into<Expr>) -> Self {
        Expr::Compare {
            op,
            left: Box::new(self),
            right: Box::new(other.into()),
        }
    }

    /// `self == other`
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, other: impl Into<Expr>) -> Self {
        self.compare(ComparisonOp::Eq, other)
    }

    /// `self != other`
    #[allow(clippy::should_implement_trait)]
    pub fn ne(self, other: impl Into<Expr>) -> Self {
        self.compare(ComparisonOp::Ne, other)
    }

    /// `self > other`
    pub fn gt(self, other: impl Into<Expr>) -> Self {
        self.compare(ComparisonOp::Gt, other)
    }

    /// `self >= other`
    pub fn ge(self, other: impl Into<Expr>) -> Self {
        self.compare(ComparisonOp::Ge, other)
    }

    /// `self < other`
    pub fn lt(self, other: impl Into<Expr>) -> Self {
        self.compare(ComparisonOp::Lt, other)
    }

    /// `self <= other`
    pub fn le(self, other: impl Into<Expr>) -> Self {
        self.compare(ComparisonOp::Le, other)
    }

    /// `self && other`
    pub fn and(self, other: impl Into<Expr>) -> Self {
        Expr::Logical {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(other.into()),
        }
    }

    /// `self || other`
    pub fn or(self, other: impl Into<Expr>) -> Self {
        Expr::Logical {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(other.into()),
        }
    }

    /// `self ?? fallback`
    pub fn coalesce(self, fallback: impl Into<Expr>) -> Self {
        Expr::Coalesce {
            left: Box::new(self),
            right: Box::new(fallback.into()),
        }
    }

    /// Wraps the node in an enum-to-integer conversion.
    pub fn as_number(self) -> Self {
        Expr::Convert(Box::new(self))
    }

    /// `self.any(element => predicate)`
    pub fn any(self, element: &Param, predicate: impl Into<Expr>) -> Self {
        self.quantify(QuantifierKind::Any, element, Some(predicate.into()))
    }

    /// `self.all(element => predicate)`
    pub fn all(self, element: &Param, predicate: impl Into<Expr>) -> Self {
        self.quantify(QuantifierKind::All, element, Some(predicate.into()))
    }

    /// `self.any()`: the collection has at least one element.
    pub fn exists(self) -> Self {
        self.quantify(QuantifierKind::Any, &Param::new("item"), None)
    }

    fn quantify(self, kind: QuantifierKind, element: &Param, predicate: Option<Expr>) -> Self {
        Expr::Quantifier {
            kind,
            source: Box::new(self),
            element: element.clone(),
            predicate: predicate.map(Box::new),
        }
    }

    /// Returns the node kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Member { .. } => "member access",
            Expr::Parameter(_) => "parameter",
            Expr::Constant(_) => "constant",
            Expr::Closure(_) => "closure",
            Expr::Convert(_) => "conversion",
            Expr::Compare { .. } => "comparison",
            Expr::Logical { .. } => "logical",
            Expr::Not(_) => "not",
            Expr::Coalesce { .. } => "coalesce",
            Expr::Quantifier { .. } => "quantifier",
            Expr::Call { .. } => "call",
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}

impl From<&Param> for Expr {
    fn from(param: &Param) -> Self {
        param.expr()
    }
}

impl From<Param> for Expr {
    fn from(param: Param) -> Self {
        Expr::Parameter(param)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Constant(Value::from(s))
    }
}

impl From<Vec<&str>> for Expr {
    fn from(items: Vec<&str>) -> Self {
        Expr::Constant(Value::from(items))
    }
}

macro_rules! impl_expr_from_constant {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Expr {
                fn from(v: $t) -> Self {
                    Expr::Constant(Value::from(v))
                }
            }
        )*
    };
}

impl_expr_from_constant!(
    String,
    bool,
    u8,
    i16,
    i32,
    i64,
    f32,
    f64,
    DateTime<FixedOffset>,
    DateTime<Utc>,
    NaiveDateTime,
    EnumValue,
    Vec<String>,
    Vec<i32>,
    Vec<i64>,
    Vec<Value>,
);

/// A boolean lambda over the entity under query.
#[derive(Debug, Clone)]
pub struct Predicate {
    param: Param,
    body: Expr,
}

impl Predicate {
    /// Creates a predicate from its parameter and body.
    pub fn new(param: Param, body: Expr) -> Self {
        Self { param, body }
    }

    /// Builds a predicate by handing a fresh parameter to `body`.
    pub fn build(name: &str, body: impl FnOnce(&Param) -> Expr) -> Self {
        let param = Param::new(name);
        let body = body(&param);
        Self { param, body }
    }

    /// Returns the entity parameter.
    pub fn param(&self) -> &Param {
        &self.param
    }

    /// Returns the predicate body.
    pub fn body(&self) -> &Expr {
        &self.body
    }
}
