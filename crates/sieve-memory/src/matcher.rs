//! Condition evaluation against record values.
//!
//! Comparison rules:
//!
//! | Operator | Field value | Rule |
//! |----------|-------------|------|
//! | `equals` | any | null matches null; strings (case-folded when insensitive), numbers and bools by value |
//! | `notEquals` | any | negation of `equals`, except a null field against a non-null value matches only when nulls are not ignored |
//! | `>` `<` `>=` `<=` | string, number | same-type ordering; null never matches |
//! | `contains` `startsWith` `endsWith` | any non-null | substring test on the text form, inverted when negated |

use std::borrow::Cow;
use std::cmp::Ordering;

use sieve::{FilterOperator, QueryCondition, Value};

use crate::traits::Record;
use crate::value::{FieldValue, Number};

/// Returns `true` when the record passes every group.
///
/// A group passes when at least one of its conditions matches; an empty
/// group passes.
pub fn matches_groups<R: Record + ?Sized>(record: &R, groups: &[Vec<QueryCondition>]) -> bool {
    groups.iter().all(|group| matches_group(record, group))
}

/// Returns `true` when at least one condition matches, or none exist.
pub fn matches_group<R: Record + ?Sized>(record: &R, group: &[QueryCondition]) -> bool {
    group.is_empty()
        || group
            .iter()
            .any(|condition| matches_condition(condition, &record.field_value(&condition.field)))
}

/// Evaluates one condition against a field value.
pub fn matches_condition(condition: &QueryCondition, field: &FieldValue<'_>) -> bool {
    let insensitive = condition.operator_is_case_insensitive;

    match condition.parsed_operator {
        FilterOperator::Equals => equals(field, &condition.value, insensitive),
        FilterOperator::NotEquals => match (field, &condition.value) {
            (_, Value::Null) => !field.is_null(),
            (FieldValue::Null, _) => !condition.ignore_nulls_on_not_equal,
            _ => !equals(field, &condition.value, insensitive),
        },
        FilterOperator::GreaterThan => ordering(field, &condition.value, insensitive)
            .is_some_and(|o| o == Ordering::Greater),
        FilterOperator::LessThan => {
            ordering(field, &condition.value, insensitive).is_some_and(|o| o == Ordering::Less)
        }
        FilterOperator::GreaterThanOrEqual => ordering(field, &condition.value, insensitive)
            .is_some_and(|o| o != Ordering::Less),
        FilterOperator::LessThanOrEqual => ordering(field, &condition.value, insensitive)
            .is_some_and(|o| o != Ordering::Greater),
        op @ (FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith) => {
            // Null on either side never matches, negated or not.
            let (Some(haystack), Some(needle)) = (field.text(), condition_text(&condition.value))
            else {
                return false;
            };
            let haystack = fold(haystack, insensitive);
            let needle = fold(needle, insensitive);
            let found = match op {
                FilterOperator::StartsWith => haystack.starts_with(&*needle),
                FilterOperator::EndsWith => haystack.ends_with(&*needle),
                _ => haystack.contains(&*needle),
            };
            found != condition.operator_is_negated
        }
    }
}

fn equals(field: &FieldValue<'_>, value: &Value, insensitive: bool) -> bool {
    match (field, value) {
        (FieldValue::Null, Value::Null) => true,
        (FieldValue::Null, _) | (_, Value::Null) => false,
        (FieldValue::Number(a), Value::Number(b)) => {
            a.compare(Number::F64(*b)) == Some(Ordering::Equal)
        }
        (FieldValue::Bool(a), Value::Bool(b)) => a == b,
        // Coerced numbers and bools compare by their canonical text.
        (FieldValue::String(s), other) => match condition_text(other) {
            Some(text) => fold(Cow::Borrowed(*s), insensitive) == fold(text, insensitive),
            None => false,
        },
        _ => false,
    }
}

fn ordering(field: &FieldValue<'_>, value: &Value, insensitive: bool) -> Option<Ordering> {
    match (field, value) {
        (FieldValue::Number(a), Value::Number(b)) => a.compare(Number::F64(*b)),
        (FieldValue::String(a), Value::String(b)) => {
            Some(fold(Cow::Borrowed(*a), insensitive).cmp(&fold(Cow::Borrowed(b), insensitive)))
        }
        _ => None,
    }
}

fn condition_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

fn fold(text: Cow<'_, str>, insensitive: bool) -> Cow<'_, str> {
    if insensitive {
        Cow::Owned(text.to_lowercase())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(op: FilterOperator, value: impl Into<Value>) -> QueryCondition {
        QueryCondition {
            field: "f".into(),
            value: value.into(),
            parsed_operator: op,
            operator_is_negated: false,
            operator_is_case_insensitive: false,
            ignore_nulls_on_not_equal: true,
        }
    }

    fn num(n: i64) -> FieldValue<'static> {
        FieldValue::Number(Number::I64(n))
    }

    #[test]
    fn equality() {
        let c = cond(FilterOperator::Equals, 30);
        assert!(matches_condition(&c, &num(30)));
        assert!(!matches_condition(&c, &num(31)));
        assert!(!matches_condition(&c, &FieldValue::Null));

        let c = cond(FilterOperator::Equals, "Open");
        assert!(matches_condition(&c, &FieldValue::String("Open")));
        assert!(!matches_condition(&c, &FieldValue::String("open")));

        let mut c = c;
        c.operator_is_case_insensitive = true;
        assert!(matches_condition(&c, &FieldValue::String("OPEN")));
    }

    #[test]
    fn string_field_against_coerced_number() {
        let c = cond(FilterOperator::Equals, 42);
        assert!(matches_condition(&c, &FieldValue::String("42")));
        assert!(!matches_condition(&c, &FieldValue::String("042")));
    }

    #[test]
    fn null_equality() {
        let c = cond(FilterOperator::Equals, Value::Null);
        assert!(matches_condition(&c, &FieldValue::Null));
        assert!(!matches_condition(&c, &num(1)));

        let c = cond(FilterOperator::NotEquals, Value::Null);
        assert!(!matches_condition(&c, &FieldValue::Null));
        assert!(matches_condition(&c, &num(1)));
    }

    #[test]
    fn not_equals_and_null_fields() {
        let mut c = cond(FilterOperator::NotEquals, "closed");
        assert!(matches_condition(&c, &FieldValue::String("open")));
        assert!(!matches_condition(&c, &FieldValue::String("closed")));
        assert!(!matches_condition(&c, &FieldValue::Null));

        c.ignore_nulls_on_not_equal = false;
        assert!(matches_condition(&c, &FieldValue::Null));
    }

    #[test]
    fn orderings() {
        assert!(matches_condition(&cond(FilterOperator::GreaterThan, 5), &num(6)));
        assert!(!matches_condition(&cond(FilterOperator::GreaterThan, 5), &num(5)));
        assert!(matches_condition(&cond(FilterOperator::GreaterThanOrEqual, 5), &num(5)));
        assert!(matches_condition(&cond(FilterOperator::LessThan, 5), &num(4)));
        assert!(matches_condition(&cond(FilterOperator::LessThanOrEqual, 5), &num(5)));
        assert!(!matches_condition(&cond(FilterOperator::LessThan, 5), &FieldValue::Null));
        assert!(matches_condition(
            &cond(FilterOperator::LessThan, "m"),
            &FieldValue::String("apple")
        ));
        // Mismatched types never match.
        assert!(!matches_condition(
            &cond(FilterOperator::LessThan, "m"),
            &num(1)
        ));
    }

    #[test]
    fn substring_operators() {
        let c = cond(FilterOperator::Contains, "ohn");
        assert!(matches_condition(&c, &FieldValue::String("john")));
        assert!(!matches_condition(&c, &FieldValue::String("JOHN")));

        let mut c = cond(FilterOperator::StartsWith, "jo");
        c.operator_is_case_insensitive = true;
        assert!(matches_condition(&c, &FieldValue::String("JOHN")));

        c.operator_is_negated = true;
        assert!(!matches_condition(&c, &FieldValue::String("JOHN")));
        assert!(matches_condition(&c, &FieldValue::String("mary")));
        assert!(!matches_condition(&c, &FieldValue::Null));

        let c = cond(FilterOperator::EndsWith, 5);
        assert!(matches_condition(&c, &num(2025)));
    }
}
