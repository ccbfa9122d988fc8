//! Field values read from in-memory records.
//!
//! A [`FieldValue`] borrows from the record it was read from, so matching
//! and sorting never clone record data.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// The value stored at a field path of a record.
///
/// # Example
///
/// ```
/// use sieve_memory::{FieldValue, Number};
///
/// struct Book {
///     title: String,
///     pages: u32,
/// }
///
/// fn read<'a>(book: &'a Book, path: &str) -> FieldValue<'a> {
///     match path {
///         "title" => FieldValue::String(&book.title),
///         "pages" => FieldValue::Number(Number::from(book.pages)),
///         _ => FieldValue::Null,
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    String(&'a str),
    Number(Number),
    Bool(bool),
    /// Missing, null, or not comparable.
    Null,
}

impl<'a> FieldValue<'a> {
    /// Returns `true` if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is one.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the bool, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value rendered as text, for substring matching. `None` for null.
    pub fn text(&self) -> Option<Cow<'a, str>> {
        match self {
            FieldValue::String(s) => Some(Cow::Borrowed(*s)),
            FieldValue::Number(n) => Some(Cow::Owned(n.to_string())),
            FieldValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            FieldValue::Null => None,
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(s: &'a str) -> Self {
        FieldValue::String(s)
    }
}

impl From<bool> for FieldValue<'_> {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl<'a, T: Into<FieldValue<'a>>> From<Option<T>> for FieldValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

/// A numeric field value.
///
/// Integers keep their exact representation so that large values compare
/// correctly against each other; mixed comparisons go through `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    I64(i64),
    U64(u64),
    F64(f64),
}

impl Number {
    /// Converts to `f64`, losing precision for large integers.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types. `None` involves NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{n}"),
            Number::U64(n) => write!(f, "{n}"),
            Number::F64(n) => write!(f, "{n}"),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::I64(n as i64)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::I64(n)
    }
}

impl From<u32> for Number {
    fn from(n: u32) -> Self {
        Number::U64(n as u64)
    }
}

impl From<u64> for Number {
    fn from(n: u64) -> Self {
        Number::U64(n)
    }
}

impl From<usize> for Number {
    fn from(n: usize) -> Self {
        Number::U64(n as u64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::F64(n)
    }
}

macro_rules! number_field_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue<'_> {
                fn from(n: $ty) -> Self {
                    FieldValue::Number(Number::from(n))
                }
            }
        )*
    };
}

number_field_value!(i32, i64, u32, u64, usize, f64);
