//! Filter and sort term parsing.
//!
//! A filters string is a comma-separated list of clauses:
//!
//! ```text
//! clause := [ "(" name ("|" name)* ")" | name ] operator value ("|" value)*
//! ```
//!
//! Names inside one clause are OR-combined, as are values. Separate clauses
//! are AND-combined by the processor. A sorts string is a comma-separated
//! list of names, each optionally prefixed with `-` for descending order.

use std::collections::HashSet;

use serde::Serialize;

use crate::escape::{split_unescaped, unescape_operators, unescape_pipes};
use crate::op::{find_operator, FilterOperator};

/// One parsed filter clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterTerm {
    /// The trimmed clause text.
    pub raw: String,
    /// Field names, OR-combined.
    pub names: Vec<String>,
    /// Unescaped value literals, OR-combined against each name.
    pub values: Vec<String>,
    /// The operator token as written.
    pub operator: String,
    /// Canonical operator derived from [`FilterTerm::operator`].
    pub parsed_operator: FilterOperator,
    /// `true` when the token ends with `*`.
    pub operator_is_case_insensitive: bool,
    /// `true` when the token starts with `!` and is not already `notEquals`.
    pub operator_is_negated: bool,
}

/// One parsed sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortTerm {
    /// The trimmed clause text, including any leading `-`.
    pub raw: String,
    /// The field name without the direction prefix.
    pub name: String,
    /// `true` when the clause started with `-`.
    pub descending: bool,
}

/// Parses a single filter clause.
///
/// Returns `None` when the clause contains no unescaped operator token; such
/// clauses are dropped rather than reported.
///
/// ```
/// use sieve::{parse_filter_term, FilterOperator};
///
/// let term = parse_filter_term(r"(title|name)@=*jo\|hn").unwrap();
/// assert_eq!(term.names, vec!["title", "name"]);
/// assert_eq!(term.values, vec!["jo|hn"]);
/// assert_eq!(term.parsed_operator, FilterOperator::Contains);
/// assert!(term.operator_is_case_insensitive);
/// ```
pub fn parse_filter_term(raw: &str) -> Option<FilterTerm> {
    let cleaned = raw.trim();
    let found = find_operator(cleaned)?;
    let parsed_operator = FilterOperator::from_token(found.token)?;

    let names_segment = cleaned[..found.start].trim();
    let values_segment = cleaned[found.end()..].trim();

    let names_raw = names_segment
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(names_segment);

    let names = split_unescaped(names_raw, '|');
    let values = split_unescaped(values_segment, '|')
        .iter()
        .map(|value| unescape_pipes(&unescape_operators(value)))
        .collect();

    Some(FilterTerm {
        raw: cleaned.to_string(),
        names,
        values,
        operator: found.token.to_string(),
        parsed_operator,
        operator_is_case_insensitive: found.token.ends_with('*'),
        operator_is_negated: parsed_operator != FilterOperator::NotEquals
            && found.token.starts_with('!'),
    })
}

/// Parses a comma-separated filters string.
///
/// Escaped commas (`\,`) become literal commas inside their clause.
/// Clauses without an operator are skipped.
pub fn parse_filters(filters: &str) -> Vec<FilterTerm> {
    split_unescaped(filters, ',')
        .iter()
        .map(|token| token.replace("\\,", ","))
        .filter_map(|token| parse_filter_term(&token))
        .collect()
}

/// Parses a comma-separated sorts string.
///
/// Names are de-duplicated keeping the first occurrence, so `-a,b,a` sorts
/// by `a` descending then `b`.
pub fn parse_sorts(sorts: &str) -> Vec<SortTerm> {
    let mut seen = HashSet::new();
    let mut parsed = Vec::new();

    for token in split_unescaped(sorts, ',') {
        let (name, descending) = match token.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (token.as_str(), false),
        };

        if !seen.insert(name.to_string()) {
            continue;
        }

        parsed.push(SortTerm {
            raw: token.clone(),
            name: name.to_string(),
            descending,
        });
    }

    parsed
}
