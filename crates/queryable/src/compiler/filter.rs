//! The filter compiler.
//!
//! Walks a [`Predicate`] recursively and emits a filter string in the
//! OData-style boolean grammar:
//!
//! | Node | Output |
//! |------|--------|
//! | field used as a boolean | `<wire>` |
//! | `a && b`, `a \|\| b` | `(<a>) and (<b>)`, `(<a>) or (<b>)` |
//! | `!a` | `not (<a>)` |
//! | `field <op> constant` | `<wire> <op> <literal>` |
//! | `constant <op> field` | `<wire> <inverted op> <literal>` |
//! | `field.any(x => p)` | `<wire>/any(item: <p>)` |
//! | `[c1, c2].any(x => p)` | `(<p[x=c1]>) or (<p[x=c2]>)` |
//!
//! Anything else fails with [`CompileError::UnsupportedExpression`]. The
//! compiler holds no state across calls.

use std::sync::Arc;

use tracing::debug;

use crate::error::CompileError;
use crate::expr::{Bindings, ComparisonOp, Expr, Param, Predicate, QuantifierKind, Value};
use crate::metadata::{EntityMetadata, FieldResolver, RANGE_VARIABLE, ResolvedField};

use super::extension::CallTranslator;
use super::literal::{LiteralFormatter, ODataLiteralFormatter};

/// Translates predicates into filter strings.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    formatter: Arc<dyn LiteralFormatter>,
    extensions: Vec<Arc<dyn CallTranslator>>,
    stringify_keys: bool,
}

struct Scope<'a> {
    resolver: FieldResolver<'a>,
    bindings: Vec<(Param, Value)>,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::odata()
    }
}

impl FilterCompiler {
    /// Creates a compiler using the given literal rules and no extensions.
    pub fn new(formatter: Arc<dyn LiteralFormatter>) -> Self {
        Self {
            formatter,
            extensions: Vec::new(),
            stringify_keys: false,
        }
    }

    /// The general-purpose OData dialect.
    pub fn odata() -> Self {
        Self::new(Arc::new(ODataLiteralFormatter))
    }

    /// Installs a comparison extension.
    pub fn with_extension(mut self, extension: Arc<dyn CallTranslator>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Renders non-string constants compared with substitute key fields as
    /// strings, allowing only `eq` and `ne` on them.
    pub fn with_key_stringification(mut self, enabled: bool) -> Self {
        self.stringify_keys = enabled;
        self
    }

    /// Returns the literal rules in use.
    pub fn formatter(&self) -> &dyn LiteralFormatter {
        self.formatter.as_ref()
    }

    /// Compiles a predicate over an entity described by `metadata`.
    pub fn compile(
        &self,
        metadata: &EntityMetadata,
        predicate: &Predicate,
    ) -> Result<String, CompileError> {
        self.compile_with_bindings(metadata, predicate, Vec::new())
    }

    /// Compiles a predicate with extra parameters already bound to values.
    ///
    /// Bound parameters evaluate as constants and are visible to closures.
    pub fn compile_with_bindings(
        &self,
        metadata: &EntityMetadata,
        predicate: &Predicate,
        bindings: Vec<(Param, Value)>,
    ) -> Result<String, CompileError> {
        let scope = Scope {
            resolver: FieldResolver::new(metadata, predicate.param()),
            bindings,
        };
        let filter = self.compile_expr(predicate.body(), &scope)?;
        debug!(
            dialect = self.formatter.name(),
            entity = metadata.entity_name(),
            filter = %filter,
            "Compiled predicate"
        );
        Ok(filter)
    }

    fn compile_expr(&self, expr: &Expr, scope: &Scope<'_>) -> Result<String, CompileError> {
        match expr {
            Expr::Member { .. } | Expr::Parameter(_) | Expr::Convert(_) => scope
                .resolver
                .resolve(expr)
                .map(|field| field.wire_name)
                .ok_or_else(|| CompileError::unsupported(expr.kind())),
            Expr::Logical { op, left, right } => {
                let left = self.compile_expr(left, scope)?;
                let right = self.compile_expr(right, scope)?;
                Ok(format!("({}) {} ({})", left, op.as_str(), right))
            }
            Expr::Not(operand) => {
                let operand = self.compile_expr(operand, scope)?;
                Ok(format!("not ({})", operand))
            }
            Expr::Coalesce { left, .. } => self.compile_expr(left, scope),
            Expr::Compare { op, left, right } => self.compile_comparison(*op, left, right, scope),
            Expr::Quantifier {
                kind,
                source,
                element,
                predicate,
            } => self.compile_quantifier(*kind, source, element, predicate.as_deref(), scope),
            Expr::Constant(_) | Expr::Closure(_) | Expr::Call { .. } => {
                Err(CompileError::unsupported(expr.kind()))
            }
        }
    }

    fn compile_comparison(
        &self,
        op: ComparisonOp,
        left: &Expr,
        right: &Expr,
        scope: &Scope<'_>,
    ) -> Result<String, CompileError> {
        match (scope.resolver.resolve(left), scope.resolver.resolve(right)) {
            (Some(_), Some(_)) => Err(CompileError::unsupported("field-to-field comparison")),
            (Some(field), None) => {
                let value = self.evaluate(right, scope)?;
                self.emit(&field, op, value)
            }
            (None, Some(field)) => {
                let value = self.evaluate(left, scope)?;
                self.emit(&field, op.inverted(), value)
            }
            (None, None) => {
                for extension in &self.extensions {
                    if let Some(rewritten) = extension.rewrite(op, left, right) {
                        return self.compile_comparison(
                            rewritten.op,
                            &rewritten.left,
                            &rewritten.right,
                            scope,
                        );
                    }
                }
                Err(CompileError::unsupported(format!(
                    "comparison of {} with {}",
                    left.kind(),
                    right.kind()
                )))
            }
        }
    }

    fn emit(
        &self,
        field: &ResolvedField,
        op: ComparisonOp,
        value: Value,
    ) -> Result<String, CompileError> {
        if value.is_null() {
            return Err(CompileError::UnsupportedComparison {
                field: field.wire_name.clone(),
            });
        }

        let literal = if let Some(enum_type) = &field.enum_type {
            let wire = enum_type
                .wire_string(&value)
                .ok_or_else(|| CompileError::UnknownEnumMember {
                    enum_type: enum_type.name().to_string(),
                    value: value
                        .to_plain_string()
                        .unwrap_or_else(|| value.type_name().to_string()),
                })?;
            self.formatter.format_string(&wire)
        } else if self.stringify_keys
            && field.substitute_key.is_some()
            && !matches!(value, Value::String(_))
        {
            if !op.is_equality() {
                return Err(CompileError::KeyOperationNotSupported {
                    field: field.wire_name.clone(),
                    operator: op,
                });
            }
            let text = value
                .to_plain_string()
                .ok_or_else(|| CompileError::UnsupportedType {
                    field: field.wire_name.clone(),
                    type_name: value.type_name(),
                })?;
            self.formatter.format_string(&text)
        } else {
            self.formatter.format(&field.wire_name, &value)?
        };

        Ok(format!("{} {} {}", field.wire_name, op, literal))
    }

    fn compile_quantifier(
        &self,
        kind: QuantifierKind,
        source: &Expr,
        element: &Param,
        predicate: Option<&Expr>,
        scope: &Scope<'_>,
    ) -> Result<String, CompileError> {
        if let Some(field) = scope.resolver.resolve(source) {
            // The grammar has one range variable name, so lambdas cannot nest.
            if scope.resolver.in_range() {
                return Err(CompileError::unsupported("nested collection lambda"));
            }
            let Some(predicate) = predicate else {
                return Ok(format!("{}/{}()", field.wire_name, kind.as_str()));
            };
            let inner = Scope {
                resolver: scope
                    .resolver
                    .with_range_variable(element, field.element.as_deref()),
                bindings: scope.bindings.clone(),
            };
            let body = self.compile_expr(predicate, &inner)?;
            return Ok(format!(
                "{}/{}({}: {})",
                field.wire_name,
                kind.as_str(),
                RANGE_VARIABLE,
                body
            ));
        }

        let items = match self.evaluate(source, scope)? {
            Value::List(items) => items,
            other => {
                return Err(CompileError::UnsupportedType {
                    field: element.name().to_string(),
                    type_name: other.type_name(),
                });
            }
        };

        let Some(predicate) = predicate else {
            let holds = match kind {
                QuantifierKind::Any => !items.is_empty(),
                QuantifierKind::All => true,
            };
            return Ok(format!("({})", self.formatter.format_bool(holds)));
        };

        let mut clauses = Vec::with_capacity(items.len());
        for item in items {
            let mut bindings = scope.bindings.clone();
            bindings.push((element.clone(), item));
            let inner = Scope {
                resolver: scope.resolver,
                bindings,
            };
            clauses.push(format!("({})", self.compile_expr(predicate, &inner)?));
        }

        if clauses.is_empty() {
            let vacuous = matches!(kind, QuantifierKind::All);
            return Ok(format!("({})", self.formatter.format_bool(vacuous)));
        }
        Ok(clauses.join(&format!(" {} ", kind.connective().as_str())))
    }

    /// Evaluates a constant-side expression against the current bindings.
    fn evaluate(&self, expr: &Expr, scope: &Scope<'_>) -> Result<Value, CompileError> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),
            Expr::Closure(closure) => Ok(closure.call(&Bindings::new(&scope.bindings))),
            Expr::Parameter(param) => Bindings::new(&scope.bindings)
                .get(param)
                .cloned()
                .ok_or_else(|| CompileError::unsupported(format!("unbound parameter {}", param.name()))),
            Expr::Convert(inner) => Ok(match self.evaluate(inner, scope)? {
                Value::Enum(e) => i32::try_from(e.ordinal)
                    .map(Value::Int)
                    .unwrap_or(Value::Long(e.ordinal)),
                other => other,
            }),
            Expr::Coalesce { left, right } => match self.evaluate(left, scope)? {
                Value::Null => self.evaluate(right, scope),
                value => Ok(value),
            },
            _ => Err(CompileError::unsupported(expr.kind())),
        }
    }
}
