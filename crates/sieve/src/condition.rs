//! Adapter-facing conditions, sort specs and pagination.

use serde::Serialize;

use crate::field::FieldMapping;
use crate::op::FilterOperator;
use crate::term::FilterTerm;
use crate::value::{coerce, Value};

const NULL_LITERAL: &str = "null";
const ESCAPED_NULL_LITERAL: &str = "\\null";

/// A single field comparison, ready for an adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCondition {
    /// Storage path of the field.
    pub field: String,
    /// Coerced value; [`Value::Null`] for the `null` literal.
    pub value: Value,
    /// The operator with negation and case flags stripped.
    pub parsed_operator: FilterOperator,
    /// Inverts the operator's result.
    pub operator_is_negated: bool,
    /// Compare text case-insensitively when `true`.
    pub operator_is_case_insensitive: bool,
    /// Copied from [`SieveOptions`](crate::SieveOptions) when the condition is built.
    pub ignore_nulls_on_not_equal: bool,
}

/// One resolved sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Storage path of the field.
    pub field: String,
    /// Sort from highest to lowest.
    pub descending: bool,
}

impl SortSpec {
    /// An ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        SortSpec {
            field: field.into(),
            descending: false,
        }
    }

    /// A descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        SortSpec {
            field: field.into(),
            descending: true,
        }
    }
}

/// Effective pagination handed to an adapter. Both numbers are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// One-based page number.
    pub page: u64,
    /// Items per page; always positive.
    pub page_size: u64,
}

impl Pagination {
    /// Number of rows before the first row of this page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}

/// Builds the condition for one value of a filter term.
///
/// The bare literal `null` under `==`/`!=` becomes [`Value::Null`]. The
/// escaped literal `\null` always means the text `"null"`. Everything else
/// goes through the field's parser, or [`coerce`] when it has none.
pub fn build_condition(
    term: &FilterTerm,
    field: &FieldMapping,
    raw: &str,
    ignore_nulls_on_not_equal: bool,
) -> QueryCondition {
    let value = if raw == NULL_LITERAL && term.parsed_operator.is_equality() {
        Value::Null
    } else {
        let literal = if raw == ESCAPED_NULL_LITERAL {
            NULL_LITERAL
        } else {
            raw
        };
        match &field.parse_value {
            Some(parser) => parser.parse(literal),
            None => coerce(literal),
        }
    };

    QueryCondition {
        field: field.path.clone(),
        value,
        parsed_operator: term.parsed_operator,
        operator_is_negated: term.operator_is_negated,
        operator_is_case_insensitive: term.operator_is_case_insensitive,
        ignore_nulls_on_not_equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::term::parse_filter_term;

    fn plain_field() -> FieldMapping {
        Field::new("status").path("status_col").filterable().into()
    }

    #[test]
    fn null_under_equality() {
        let term = parse_filter_term("status==null").unwrap();
        let cond = build_condition(&term, &plain_field(), "null", true);
        assert_eq!(cond.value, Value::Null);
        assert_eq!(cond.field, "status_col");

        let term = parse_filter_term("status!=null").unwrap();
        let cond = build_condition(&term, &plain_field(), "null", false);
        assert_eq!(cond.value, Value::Null);
        assert!(!cond.ignore_nulls_on_not_equal);
    }

    #[test]
    fn null_under_other_operators_is_text() {
        let term = parse_filter_term("status@=null").unwrap();
        let cond = build_condition(&term, &plain_field(), "null", true);
        assert_eq!(cond.value, Value::String("null".into()));
    }

    #[test]
    fn escaped_null_is_text() {
        let term = parse_filter_term(r"status==\null").unwrap();
        assert_eq!(term.values, vec![r"\null"]);
        let cond = build_condition(&term, &plain_field(), &term.values[0], true);
        assert_eq!(cond.value, Value::String("null".into()));
    }

    #[test]
    fn escaped_null_goes_through_parser() {
        let field: FieldMapping = Field::new("status")
            .filterable()
            .parse_with(|raw| Value::String(raw.to_uppercase()))
            .into();
        let term = parse_filter_term(r"status==\null").unwrap();
        let cond = build_condition(&term, &field, &term.values[0], true);
        assert_eq!(cond.value, Value::String("NULL".into()));
    }

    #[test]
    fn default_coercion_and_flags() {
        let term = parse_filter_term("status!_=*42").unwrap();
        let cond = build_condition(&term, &plain_field(), "42", true);
        assert_eq!(cond.value, Value::Number(42.0));
        assert_eq!(cond.parsed_operator, FilterOperator::StartsWith);
        assert!(cond.operator_is_negated);
        assert!(cond.operator_is_case_insensitive);
        assert!(cond.ignore_nulls_on_not_equal);
    }

    #[test]
    fn pagination_offset() {
        assert_eq!(Pagination { page: 1, page_size: 20 }.offset(), 0);
        assert_eq!(Pagination { page: 3, page_size: 20 }.offset(), 40);
    }

    #[test]
    fn condition_serializes_camel_case() {
        let term = parse_filter_term("status==open").unwrap();
        let cond = build_condition(&term, &plain_field(), "open", true);
        let json = serde_json::to_value(&cond).unwrap();
        assert_eq!(json["parsedOperator"], "equals");
        assert_eq!(json["value"], "open");
        assert_eq!(json["ignoreNullsOnNotEqual"], true);
    }
}
