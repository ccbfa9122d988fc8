//! Filter operators and the textual operator table.
//!
//! The DSL writes operators as short tokens (`==`, `@=*`, `!_-=`, ...). A
//! trailing `*` makes the comparison case-insensitive and a leading `!`
//! negates it. [`OPERATORS`] lists every token longest-first so that a
//! shorter token which is a prefix of a longer one (`!=` and `!=*`) never
//! shadows it.

use serde::Serialize;

use crate::escape::is_escaped_at;

/// Every recognised operator token, in match priority order.
pub const OPERATORS: [&str; 20] = [
    "!@=*", "!_=*", "!_-=*", "!=*", "!@=", "!_=", "!_-=", "==*", "@=*", "_=*", "_-=*", "==", "!=",
    ">=", "<=", ">", "<", "@=", "_=", "_-=",
];

/// Canonical comparison a filter term asks for.
///
/// Negation and case-insensitivity are carried separately on the term, so
/// `!@=*` is [`FilterOperator::Contains`] with both flags set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `<=`
    LessThanOrEqual,
    /// `@=`
    Contains,
    /// `_=`
    StartsWith,
    /// `_-=`
    EndsWith,
}

impl FilterOperator {
    /// Maps a raw operator token to its canonical operator.
    ///
    /// The case-insensitive suffix is ignored, as is the negation prefix of
    /// the string operators. Returns `None` for text that is not a token.
    pub fn from_token(token: &str) -> Option<FilterOperator> {
        let normalized = token.strip_suffix('*').unwrap_or(token);
        let op = match normalized {
            "@=" | "!@=" => FilterOperator::Contains,
            "_=" | "!_=" => FilterOperator::StartsWith,
            "_-=" | "!_-=" => FilterOperator::EndsWith,
            "==" => FilterOperator::Equals,
            "!=" => FilterOperator::NotEquals,
            ">" => FilterOperator::GreaterThan,
            "<" => FilterOperator::LessThan,
            ">=" => FilterOperator::GreaterThanOrEqual,
            "<=" => FilterOperator::LessThanOrEqual,
            _ => return None,
        };
        Some(op)
    }

    /// Returns `true` for the two equality operators.
    pub fn is_equality(self) -> bool {
        matches!(self, FilterOperator::Equals | FilterOperator::NotEquals)
    }

    /// Returns `true` for contains, startsWith and endsWith.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith
        )
    }

    /// Returns `true` for the four ordering comparisons.
    pub fn is_ordering_op(self) -> bool {
        matches!(
            self,
            FilterOperator::GreaterThan
                | FilterOperator::LessThan
                | FilterOperator::GreaterThanOrEqual
                | FilterOperator::LessThanOrEqual
        )
    }

    /// Returns the camelCase name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::NotEquals => "notEquals",
            FilterOperator::GreaterThan => "greaterThan",
            FilterOperator::LessThan => "lessThan",
            FilterOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            FilterOperator::LessThanOrEqual => "lessThanOrEqual",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startsWith",
            FilterOperator::EndsWith => "endsWith",
        }
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Location of an operator token inside a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorMatch {
    /// The matched token, as listed in [`OPERATORS`].
    pub token: &'static str,
    /// Byte offset of the token's first character.
    pub start: usize,
}

impl OperatorMatch {
    /// Byte offset just past the token.
    pub fn end(&self) -> usize {
        self.start + self.token.len()
    }
}

/// Finds the first unescaped operator token in `text`.
///
/// The leftmost position wins; at a given position the table order decides.
///
/// ```
/// use sieve::op::find_operator;
///
/// let found = find_operator("name!=*bob").unwrap();
/// assert_eq!(found.token, "!=*");
/// assert_eq!(found.start, 4);
/// ```
pub fn find_operator(text: &str) -> Option<OperatorMatch> {
    let chars: Vec<char> = text.chars().collect();

    for (index, (start, _)) in text.char_indices().enumerate() {
        if is_escaped_at(&chars, index) {
            continue;
        }
        let rest = &text[start..];
        if let Some(token) = OPERATORS.iter().copied().find(|token| rest.starts_with(token)) {
            return Some(OperatorMatch { token, start });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_maps_to_an_operator() {
        for token in OPERATORS {
            assert!(FilterOperator::from_token(token).is_some(), "{token}");
        }
        assert_eq!(FilterOperator::from_token("=~"), None);
    }

    #[test]
    fn token_mapping() {
        assert_eq!(FilterOperator::from_token("@=*"), Some(FilterOperator::Contains));
        assert_eq!(FilterOperator::from_token("!_=*"), Some(FilterOperator::StartsWith));
        assert_eq!(FilterOperator::from_token("_-="), Some(FilterOperator::EndsWith));
        assert_eq!(FilterOperator::from_token("==*"), Some(FilterOperator::Equals));
        assert_eq!(FilterOperator::from_token("!=*"), Some(FilterOperator::NotEquals));
        assert_eq!(FilterOperator::from_token(">="), Some(FilterOperator::GreaterThanOrEqual));
        assert_eq!(FilterOperator::from_token("<="), Some(FilterOperator::LessThanOrEqual));
        assert_eq!(FilterOperator::from_token(">"), Some(FilterOperator::GreaterThan));
        assert_eq!(FilterOperator::from_token("<"), Some(FilterOperator::LessThan));
    }

    #[test]
    fn longest_token_wins() {
        assert_eq!(find_operator("a!=*b").map(|m| m.token), Some("!=*"));
        assert_eq!(find_operator("a!_-=*b").map(|m| m.token), Some("!_-=*"));
        assert_eq!(find_operator("a>=1").map(|m| m.token), Some(">="));
        assert_eq!(find_operator("a_-=x").map(|m| m.token), Some("_-="));
    }

    #[test]
    fn leftmost_position_wins() {
        let found = find_operator("a==b>c").unwrap();
        assert_eq!(found.token, "==");
        assert_eq!(found.start, 1);
        assert_eq!(found.end(), 3);
    }

    #[test]
    fn escaped_tokens_are_skipped() {
        let found = find_operator(r"a\==b==c").unwrap();
        assert_eq!(found.token, "==");
        assert_eq!(found.start, 5);
        assert_eq!(find_operator(r"a\>b"), None);
    }

    #[test]
    fn no_operator() {
        assert_eq!(find_operator("plain"), None);
        assert_eq!(find_operator(""), None);
    }

    #[test]
    fn operator_display() {
        assert_eq!(FilterOperator::Equals.to_string(), "equals");
        assert_eq!(FilterOperator::GreaterThanOrEqual.to_string(), "greaterThanOrEqual");
        assert_eq!(FilterOperator::EndsWith.to_string(), "endsWith");
    }

    #[test]
    fn operator_groups() {
        assert!(FilterOperator::Equals.is_equality());
        assert!(!FilterOperator::Contains.is_equality());
        assert!(FilterOperator::StartsWith.is_string_op());
        assert!(FilterOperator::LessThan.is_ordering_op());
        assert!(!FilterOperator::NotEquals.is_ordering_op());
    }
}
