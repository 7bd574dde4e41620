//! Comparison extensions.
//!
//! When neither side of a comparison names a field, the compiler offers the
//! comparison to each installed [`CallTranslator`] before giving up. A
//! translator recognizes a call pattern and rewrites it into an ordinary
//! field-versus-constant comparison.

use std::fmt;

use crate::expr::{COMPARE_ORDINAL, ComparisonOp, Expr};

/// A comparison rewritten by an extension.
#[derive(Debug, Clone)]
pub struct Rewritten {
    /// Operator of the rewritten comparison.
    pub op: ComparisonOp,
    /// Left operand.
    pub left: Expr,
    /// Right operand.
    pub right: Expr,
}

/// Rewrites call patterns into comparisons the compiler understands.
pub trait CallTranslator: Send + Sync + fmt::Debug {
    /// Returns the rewritten comparison, or `None` if the shape is not recognized.
    fn rewrite(&self, op: ComparisonOp, left: &Expr, right: &Expr) -> Option<Rewritten>;
}

/// `compare_ordinal(a, b) <op> 0` becomes `a <op> b`.
///
/// The mirrored shape `0 <op> compare_ordinal(a, b)` inverts the operator.
/// Which of `a` and `b` is the field is left to the compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalComparison;

impl OrdinalComparison {
    fn operands(expr: &Expr) -> Option<(&Expr, &Expr)> {
        match expr {
            Expr::Call { method, args } if method == COMPARE_ORDINAL => match args.as_slice() {
                [a, b] => Some((a, b)),
                _ => None,
            },
            _ => None,
        }
    }

    fn is_zero(expr: &Expr) -> bool {
        match expr {
            Expr::Constant(value) => value.as_i64() == Some(0),
            _ => false,
        }
    }
}

impl CallTranslator for OrdinalComparison {
    fn rewrite(&self, op: ComparisonOp, left: &Expr, right: &Expr) -> Option<Rewritten> {
        if let Some((a, b)) = Self::operands(left).filter(|_| Self::is_zero(right)) {
            return Some(Rewritten {
                op,
                left: a.clone(),
                right: b.clone(),
            });
        }
        let (a, b) = Self::operands(right).filter(|_| Self::is_zero(left))?;
        Some(Rewritten {
            op: op.inverted(),
            left: a.clone(),
            right: b.clone(),
        })
    }
}
