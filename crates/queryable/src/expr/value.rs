//! Literal values carried by predicate trees.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};

/// A constant that can appear on the value side of a comparison.
///
/// The variant decides which literal rule renders it; integer widths are
/// kept apart because the table grammar formats 64-bit integers differently.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. Never renderable.
    Null,
    /// Text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// Date/time with a UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// Date/time without an offset, treated as UTC.
    LocalDateTime(NaiveDateTime),
    /// Unsigned 8-bit integer.
    Byte(u8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Member of an enumeration, by ordinal.
    Enum(EnumValue),
    /// Raw bytes. No literal rule.
    Bytes(Vec<u8>),
    /// Sequence of values, used as a quantifier source. No literal rule.
    List(Vec<Value>),
}

/// An enumeration member identified by its numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    /// Name of the enumeration type.
    pub type_name: String,
    /// Numeric value of the member.
    pub ordinal: i64,
}

impl Value {
    /// Creates an enum member value.
    pub fn enumeration(type_name: impl Into<String>, ordinal: i64) -> Self {
        Value::Enum(EnumValue {
            type_name: type_name.into(),
            ordinal,
        })
    }

    /// Creates a byte-array value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Returns the name of the runtime type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::String(_) => "string",
            Value::Bool(_) => "bool",
            Value::DateTime(_) => "datetime",
            Value::LocalDateTime(_) => "local datetime",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Enum(_) => "enum",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the integral value of any integer-like variant, enums included.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Enum(e) => Some(e.ordinal),
            _ => None,
        }
    }

    /// Returns the date/time normalized to an offset-carrying value.
    pub fn as_date_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Value::DateTime(d) => Some(*d),
            Value::LocalDateTime(d) => Some(d.and_utc().fixed_offset()),
            _ => None,
        }
    }

    /// Renders the value as unquoted text, the way key columns store it.
    ///
    /// Returns `None` for values with no textual form (null, bytes, lists).
    pub fn to_plain_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::DateTime(_) | Value::LocalDateTime(_) => self
                .as_date_time()
                .map(|d| d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) | Value::Enum(_) => {
                self.as_i64().map(|i| i.to_string())
            }
            Value::Float(f) => Some(f.to_string()),
            Value::Double(d) => Some(d.to_string()),
            Value::Null | Value::Bytes(_) | Value::List(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Short(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Value::DateTime(d)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::DateTime(d.fixed_offset())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::LocalDateTime(d)
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_value_conversions() {
        assert_eq!(Value::from("a"), Value::String("a".to_string()));
        assert_eq!(Value::from(5i32), Value::Int(5));
        assert_eq!(Value::from(5i64), Value::Long(5));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(
            Value::from(vec!["a", "b"]),
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn test_as_i64_widens() {
        assert_eq!(Value::Byte(7).as_i64(), Some(7));
        assert_eq!(Value::Short(-3).as_i64(), Some(-3));
        assert_eq!(Value::enumeration("Status", 2).as_i64(), Some(2));
        assert_eq!(Value::Double(1.0).as_i64(), None);
    }

    #[test]
    fn test_local_date_time_is_utc() {
        let naive = Utc
            .with_ymd_and_hms(2021, 3, 4, 5, 6, 7)
            .unwrap()
            .naive_utc();
        let value = Value::from(naive);
        assert_eq!(
            value.to_plain_string().as_deref(),
            Some("2021-03-04T05:06:07Z")
        );
    }

    #[test]
    fn test_plain_string_rejects_lists() {
        assert_eq!(Value::from(vec![1i32]).to_plain_string(), None);
        assert_eq!(Value::Null.to_plain_string(), None);
        assert_eq!(Value::Int(42).to_plain_string().as_deref(), Some("42"));
    }
}
