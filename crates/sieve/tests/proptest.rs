//! Property-based tests for the tokenizer and term parsers using proptest.

use proptest::prelude::*;
use sieve::escape::split_unescaped;
use sieve::op::{find_operator, OPERATORS};
use sieve::{coerce, parse_filter_term, parse_filters, parse_sorts, Value};

// ============================================================================
// Test helpers
// ============================================================================

/// Escapes every character the filter grammar treats specially.
fn escape_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '|' | ',') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// Plain identifiers that cannot contain operator characters.
fn name_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,8}"
}

// Values that may contain delimiters and backslashes but no operator
// characters and no whitespace.
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9|,\\\\]{1,12}"
}

fn operator_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(OPERATORS.to_vec())
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Splitting never yields empty or untrimmed parts.
    #[test]
    fn split_parts_are_trimmed_and_non_empty(text in ".{0,40}") {
        for part in split_unescaped(&text, ',') {
            prop_assert!(!part.is_empty());
            prop_assert_eq!(part.trim(), part.as_str());
        }
    }

    /// Escaped delimiters survive a full parse as literals.
    #[test]
    fn escaped_value_round_trips(
        name in name_strategy(),
        op in operator_strategy(),
        value in value_strategy(),
    ) {
        let clause = format!("{name}{op}{}", escape_literal(&value));
        let terms = parse_filters(&clause);

        prop_assert_eq!(terms.len(), 1);
        prop_assert_eq!(&terms[0].names, &vec![name]);
        prop_assert_eq!(terms[0].operator.as_str(), op);
        prop_assert_eq!(&terms[0].values, &vec![value]);
    }

    /// The operator found is never the strict prefix of a longer token that
    /// also starts at the same position.
    #[test]
    fn operator_match_is_longest(
        name in name_strategy(),
        op in operator_strategy(),
        value in "[a-z0-9]{1,6}",
    ) {
        let clause = format!("{name}{op}{value}");
        let found = find_operator(&clause).unwrap();
        prop_assert_eq!(found.start, name.len());
        prop_assert_eq!(found.token, op);
    }

    /// Grouped names parse the same as ungrouped ones.
    #[test]
    fn parentheses_only_group(
        names in prop::collection::vec(name_strategy(), 1..4),
        value in "[a-z0-9]{1,6}",
    ) {
        let joined = names.join("|");
        let plain = parse_filter_term(&format!("{joined}=={value}")).unwrap();
        let grouped = parse_filter_term(&format!("({joined})=={value}")).unwrap();
        prop_assert_eq!(&plain.names, &names);
        prop_assert_eq!(&grouped.names, &names);
    }

    /// Sort parsing keeps each name once, in first-seen order.
    #[test]
    fn sorts_are_unique_in_first_seen_order(
        entries in prop::collection::vec((name_strategy(), any::<bool>()), 0..12),
    ) {
        let text = entries
            .iter()
            .map(|(name, desc)| if *desc { format!("-{name}") } else { name.clone() })
            .collect::<Vec<_>>()
            .join(",");

        let mut expected: Vec<(String, bool)> = Vec::new();
        for (name, desc) in &entries {
            if !expected.iter().any(|(seen, _)| seen == name) {
                expected.push((name.clone(), *desc));
            }
        }

        let parsed: Vec<(String, bool)> = parse_sorts(&text)
            .into_iter()
            .map(|s| (s.name, s.descending))
            .collect();
        prop_assert_eq!(parsed, expected);
    }

    /// Integers always coerce to numbers of the same value.
    #[test]
    fn integers_coerce_to_numbers(n in -1_000_000_000i64..1_000_000_000) {
        prop_assert_eq!(coerce(&n.to_string()), Value::Number(n as f64));
    }

    /// Lowercase words never coerce to numbers.
    #[test]
    fn words_stay_strings(word in "[g-z]{1,10}") {
        prop_assert_eq!(coerce(&word), Value::String(word.clone()));
    }
}
