//! Typed condition values and the default literal coercion.
//!
//! Values in the DSL are text. Unless a field supplies its own parser, the
//! text is coerced with [`coerce`], which tries in order:
//!
//! 1. `"true"` / `"false"` → [`Value::Bool`]
//! 2. text that reads as a finite number → [`Value::Number`]
//! 3. anything else → [`Value::String`], unchanged
//!
//! Numbers accept an optional sign, a decimal point and an exponent
//! (`-1.5e3`), or an unsigned `0x`/`0o`/`0b` integer. `Infinity`, `NaN` and
//! overflowing literals stay strings.

use serde::Serialize;

/// A condition value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null, produced by the `null` literal under equality operators.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(f64),
    /// Text value.
    String(String),
}

impl Value {
    /// Returns `true` if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extracts the text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the name of this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
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

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Coerces a raw literal into a typed value.
///
/// ```
/// use sieve::{coerce, Value};
///
/// assert_eq!(coerce("true"), Value::Bool(true));
/// assert_eq!(coerce("42"), Value::Number(42.0));
/// assert_eq!(coerce("0x1f"), Value::Number(31.0));
/// assert_eq!(coerce("john"), Value::String("john".into()));
/// ```
pub fn coerce(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => match parse_number(raw) {
            Some(n) => Value::Number(n),
            None => Value::String(raw.to_string()),
        },
    }
}

const RADIX_PREFIXES: [(&str, u32); 6] = [
    ("0x", 16),
    ("0X", 16),
    ("0o", 8),
    ("0O", 8),
    ("0b", 2),
    ("0B", 2),
];

fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    for (prefix, radix) in RADIX_PREFIXES {
        if let Some(digits) = text.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    // f64's parser also accepts "inf" and "NaN", which are not numbers here.
    let numeric_chars = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric_chars {
        return None;
    }

    text.parse::<f64>().ok().filter(|n| n.is_finite())
}
