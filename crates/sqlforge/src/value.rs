//! SQL literal values.
//!
//! [`Value`] holds one SQL literal (or an unbound placeholder) and renders itself
//! as escaping-safe SQL text. Source types are converted through the closed
//! [`IntoValue`] trait; anything without an impl fails to compile.
//!
//! # Example
//! ```
//! use sqlforge::Value;
//!
//! assert_eq!(Value::from("O'Brien").to_sql(), "'O''Brien'");
//! assert_eq!(Value::from(true).to_sql(), "1");
//! assert_eq!(Value::placeholder("user_id").to_sql(), ":user_id");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone};

/// How a placeholder is spelled in the rendered SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?`
    Unnamed,
    /// `:name`
    Colon,
    /// `@name`
    At,
    /// `$name`
    Dollar,
}

/// An unbound parameter marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    style: PlaceholderStyle,
    name: String,
}

impl Placeholder {
    /// The anonymous `?` placeholder.
    pub fn unnamed() -> Self {
        Self {
            style: PlaceholderStyle::Unnamed,
            name: String::new(),
        }
    }

    /// Infer the style from the leading sigil of `name`.
    ///
    /// - `""` or `"?"` → `?`
    /// - `":id"`, `"@id"`, `"$id"` → kept as written
    /// - `"id"` → `:id`
    pub fn parse(name: &str) -> Self {
        if name.is_empty() || name == "?" {
            return Self::unnamed();
        }
        let (style, rest) = match name.as_bytes()[0] {
            b':' => (PlaceholderStyle::Colon, &name[1..]),
            b'@' => (PlaceholderStyle::At, &name[1..]),
            b'$' => (PlaceholderStyle::Dollar, &name[1..]),
            _ => (PlaceholderStyle::Colon, name),
        };
        if rest.is_empty() {
            return Self::unnamed();
        }
        Self {
            style,
            name: rest.to_string(),
        }
    }

    pub fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Name without its sigil; `None` for `?`.
    pub fn name(&self) -> Option<&str> {
        match self.style {
            PlaceholderStyle::Unnamed => None,
            _ => Some(&self.name),
        }
    }

    fn write_sql(&self, out: &mut String) {
        let sigil = match self.style {
            PlaceholderStyle::Unnamed => {
                out.push('?');
                return;
            }
            PlaceholderStyle::Colon => ':',
            PlaceholderStyle::At => '@',
            PlaceholderStyle::Dollar => '$',
        };
        out.push(sigil);
        out.push_str(&self.name);
    }
}

/// A single SQL literal or placeholder.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// `NULL`
    #[default]
    Null,
    /// 64-bit signed integer
    Integer(i64),
    /// Double precision float
    Float(f64),
    /// Rendered as `1` / `0`
    Boolean(bool),
    /// Text, rendered single-quoted with `'` doubled
    Text(Cow<'static, str>),
    /// Unbound parameter marker
    Placeholder(Placeholder),
}

impl Value {
    /// Create a placeholder value, inferring its style from `name`.
    pub fn placeholder(name: &str) -> Self {
        Value::Placeholder(Placeholder::parse(name))
    }

    /// Create a text value from a static string without allocating.
    pub const fn static_text(text: &'static str) -> Self {
        Value::Text(Cow::Borrowed(text))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render the value as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("NULL"),
            Value::Integer(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Float(f) if f.is_finite() => {
                let _ = write!(out, "{f}");
            }
            // NaN / infinity have no SQL literal form.
            Value::Float(_) => out.push_str("NULL"),
            Value::Boolean(b) => out.push(if *b { '1' } else { '0' }),
            Value::Text(s) => quote_text(s, out),
            Value::Placeholder(p) => p.write_sql(out),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Append `text` as a single-quoted SQL string literal, doubling embedded quotes.
pub fn quote_text(text: &str, out: &mut String) {
    out.reserve(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

/// Return `text` as a single-quoted SQL string literal.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    quote_text(text, &mut out);
    out
}

/// Convert a Rust value into a [`Value`].
///
/// Implemented for a closed set of types: signed integers, `u8`/`u16`/`u32`,
/// floats, `bool`, text types, `Option<T>`, chrono date/time types,
/// `uuid::Uuid` and `serde_json::Value`. `u64` and `usize` are left out because
/// they do not fit an `i64` losslessly. Fieldless enums opt in through
/// [`impl_enum_value!`](crate::impl_enum_value).
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

impl IntoValue for Placeholder {
    fn into_value(self) -> Value {
        Value::Placeholder(self)
    }
}

macro_rules! impl_into_value_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Integer(i64::from(self))
                }
            }
        )*
    };
}

impl_into_value_integer!(i8, i16, i32, i64, u8, u16, u32);

impl IntoValue for isize {
    fn into_value(self) -> Value {
        // isize is at most 64 bits on every supported target.
        Value::Integer(self as i64)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Boolean(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.to_string()))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self))
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.clone()))
    }
}

impl IntoValue for Cow<'static, str> {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.format("%Y-%m-%d").to_string()))
    }
}

impl IntoValue for NaiveTime {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.format("%H:%M:%S%.f").to_string()))
    }
}

impl IntoValue for NaiveDateTime {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    }
}

impl<Tz> IntoValue for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }
}

impl IntoValue for uuid::Uuid {
    fn into_value(self) -> Value {
        Value::Text(Cow::Owned(self.hyphenated().to_string()))
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            serde_json::Value::String(s) => Value::Text(Cow::Owned(s)),
            // Arrays and objects are stored as their JSON text.
            other => Value::Text(Cow::Owned(other.to_string())),
        }
    }
}

macro_rules! impl_from_into_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    value.into_value()
                }
            }
        )*
    };
}

impl_from_into_value!(
    i8, i16, i32, i64, u8, u16, u32, isize, f32, f64, bool, &str, String, &String,
    Cow<'static, str>, Placeholder, NaiveDate, NaiveTime, NaiveDateTime, uuid::Uuid,
    serde_json::Value,
);

impl<T: IntoValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.into_value()
    }
}

impl<Tz> From<DateTime<Tz>> for Value
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    fn from(value: DateTime<Tz>) -> Self {
        value.into_value()
    }
}

/// Implement [`IntoValue`] for a fieldless enum, mapping each variant to its
/// integer discriminant.
///
/// ```
/// use sqlforge::{impl_enum_value, Value};
///
/// #[derive(Clone, Copy)]
/// enum Status {
///     Inactive = 0,
///     Active = 1,
/// }
/// impl_enum_value!(Status);
///
/// assert_eq!(Value::from(Status::Active), Value::Integer(1));
/// ```
#[macro_export]
macro_rules! impl_enum_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::IntoValue for $ty {
                fn into_value(self) -> $crate::Value {
                    $crate::Value::Integer(self as i64)
                }
            }

            impl From<$ty> for $crate::Value {
                fn from(value: $ty) -> Self {
                    $crate::IntoValue::into_value(value)
                }
            }
        )+
    };
}
