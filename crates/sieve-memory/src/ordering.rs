//! Multi-key ordering of records.

use std::cmp::Ordering;

use sieve::SortSpec;

use crate::traits::Record;
use crate::value::FieldValue;

/// Compares two values of the same type, ascending.
///
/// Nulls sort after every other value. Returns `None` on a type mismatch
/// or NaN.
pub fn compare_values(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Option<Ordering> {
    match (a, b) {
        (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
        (FieldValue::Number(a), FieldValue::Number(b)) => a.compare(*b),
        (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),

        (FieldValue::Null, FieldValue::Null) => Some(Ordering::Equal),
        (FieldValue::Null, _) => Some(Ordering::Greater),
        (_, FieldValue::Null) => Some(Ordering::Less),

        _ => None,
    }
}

/// Orders any two values, ascending.
///
/// Values of different types are ranked bool, number, string, then null.
/// NaN sorts after every other number. Unlike [`compare_values`] this is a
/// total order, so it is safe to hand to `sort_by`.
pub fn compare_total(a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    if let Some(ordering) = compare_values(a, b) {
        return ordering;
    }

    match (a, b) {
        (FieldValue::Number(x), FieldValue::Number(y)) => {
            x.to_f64().is_nan().cmp(&y.to_f64().is_nan())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &FieldValue<'_>) -> u8 {
    match value {
        FieldValue::Bool(_) => 0,
        FieldValue::Number(_) => 1,
        FieldValue::String(_) => 2,
        FieldValue::Null => 3,
    }
}

/// Compares two values under one sort key. Nulls stay last in both
/// directions.
pub fn compare_by_spec(spec: &SortSpec, a: &FieldValue<'_>, b: &FieldValue<'_>) -> Ordering {
    let ordering = compare_total(a, b);
    if spec.descending && !a.is_null() && !b.is_null() {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Compares two records key by key; later keys break ties.
pub fn compare_records<R: Record + ?Sized>(a: &R, b: &R, sorts: &[SortSpec]) -> Ordering {
    for spec in sorts {
        let left = a.field_value(&spec.field);
        let right = b.field_value(&spec.field);

        match compare_by_spec(spec, &left, &right) {
            Ordering::Equal => continue,
            ordering => return ordering,
        }
    }
    Ordering::Equal
}
