//! The [`Record`] trait: field access by storage path.

use crate::value::{FieldValue, Number};

/// Types whose fields can be read by the in-memory adapter.
///
/// `path` is the storage path a sieve field maps to. Unknown paths should
/// read as [`FieldValue::Null`].
///
/// # Example
///
/// ```
/// use sieve_memory::{FieldValue, Number, Record};
///
/// struct Post {
///     title: String,
///     likes: u64,
///     draft: bool,
/// }
///
/// impl Record for Post {
///     fn field_value(&self, path: &str) -> FieldValue<'_> {
///         match path {
///             "title" => FieldValue::String(&self.title),
///             "likes" => FieldValue::Number(Number::U64(self.likes)),
///             "draft" => FieldValue::Bool(self.draft),
///             _ => FieldValue::Null,
///         }
///     }
/// }
/// ```
pub trait Record {
    fn field_value(&self, path: &str) -> FieldValue<'_>;
}

impl<T: Record + ?Sized> Record for &T {
    fn field_value(&self, path: &str) -> FieldValue<'_> {
        (**self).field_value(path)
    }
}

/// JSON documents are records addressed by dotted paths (`author.name`).
///
/// Arrays and objects read as null since they have no scalar value.
impl Record for serde_json::Value {
    fn field_value(&self, path: &str) -> FieldValue<'_> {
        let mut current = self;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return FieldValue::Null,
            }
        }

        match current {
            serde_json::Value::String(s) => FieldValue::String(s),
            serde_json::Value::Bool(b) => FieldValue::Bool(*b),
            serde_json::Value::Number(n) => json_number(n),
            _ => FieldValue::Null,
        }
    }
}

fn json_number(n: &serde_json::Number) -> FieldValue<'static> {
    if let Some(i) = n.as_i64() {
        FieldValue::Number(Number::I64(i))
    } else if let Some(u) = n.as_u64() {
        FieldValue::Number(Number::U64(u))
    } else {
        n.as_f64()
            .map_or(FieldValue::Null, |f| FieldValue::Number(Number::F64(f)))
    }
}
