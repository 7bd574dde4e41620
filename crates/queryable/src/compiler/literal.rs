//! Literal rendering strategies.
//!
//! The compiler hands every comparison constant to a [`LiteralFormatter`].
//! Formatters differ per target grammar only in a handful of rules (date
//! quoting, 64-bit integer suffixes, double formatting), so each rule is a
//! separate provided method a dialect overrides selectively.

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::error::CompileError;
use crate::expr::Value;

/// Renders an ISO-8601 round-trip date/time, `Z` for UTC.
pub fn iso_8601(value: &DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Renders scalar constants as filter literals.
pub trait LiteralFormatter: Send + Sync + fmt::Debug {
    /// Returns the dialect name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Quoted string. Embedded single quotes are doubled.
    fn format_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// `true` or `false`.
    fn format_bool(&self, value: bool) -> String {
        value.to_string()
    }

    /// Quoted ISO-8601 date/time.
    fn format_date_time(&self, value: &DateTime<FixedOffset>) -> String {
        format!("'{}'", iso_8601(value))
    }

    /// 8, 16 and 32-bit integers, and enum ordinals outside enumerated fields.
    fn format_integer(&self, value: i64) -> String {
        value.to_string()
    }

    /// 64-bit integers.
    fn format_long(&self, value: i64) -> String {
        value.to_string()
    }

    /// Finite floating point numbers.
    fn format_double(&self, value: f64) -> String {
        value.to_string()
    }

    /// `NaN`, `INF` and `-INF`, or `None` when the grammar has no literal
    /// for them.
    fn format_non_finite(&self, value: f64) -> Option<String> {
        let token = if value.is_nan() {
            "NaN"
        } else if value.is_sign_positive() {
            "INF"
        } else {
            "-INF"
        };
        Some(token.to_string())
    }

    /// Renders `value` compared against `field`.
    fn format(&self, field: &str, value: &Value) -> Result<String, CompileError> {
        match value {
            Value::Null => Err(CompileError::UnsupportedComparison {
                field: field.to_string(),
            }),
            Value::String(s) => Ok(self.format_string(s)),
            Value::Bool(b) => Ok(self.format_bool(*b)),
            Value::DateTime(_) | Value::LocalDateTime(_) => value
                .as_date_time()
                .map(|d| self.format_date_time(&d))
                .ok_or_else(|| unsupported_type(field, value)),
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Enum(_) => value
                .as_i64()
                .map(|i| self.format_integer(i))
                .ok_or_else(|| unsupported_type(field, value)),
            Value::Long(l) => Ok(self.format_long(*l)),
            // Shortest decimal form of the f32, not its widened binary value.
            Value::Float(f) => float_literal(
                self,
                field,
                value,
                f.to_string().parse::<f64>().unwrap_or(f64::from(*f)),
            ),
            Value::Double(d) => float_literal(self, field, value, *d),
            Value::Bytes(_) | Value::List(_) => Err(unsupported_type(field, value)),
        }
    }
}

fn float_literal<F>(
    formatter: &F,
    field: &str,
    value: &Value,
    number: f64,
) -> Result<String, CompileError>
where
    F: LiteralFormatter + ?Sized,
{
    if number.is_finite() {
        Ok(formatter.format_double(number))
    } else {
        formatter
            .format_non_finite(number)
            .ok_or_else(|| unsupported_type(field, value))
    }
}

fn unsupported_type(field: &str, value: &Value) -> CompileError {
    CompileError::UnsupportedType {
        field: field.to_string(),
        type_name: value.type_name(),
    }
}

/// General-purpose OData literals: every rule at its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ODataLiteralFormatter;

impl LiteralFormatter for ODataLiteralFormatter {
    fn name(&self) -> &'static str {
        "odata"
    }
}
