//! Backslash escaping and delimiter splitting.
//!
//! Every delimiter in the DSL (`,` between clauses, `|` between names and
//! values, the operator tokens themselves) can be written literally by
//! prefixing it with a backslash. A character is escaped when an *odd*
//! number of backslashes immediately precedes it, so `\\,` is an escaped
//! backslash followed by a real comma.
//!
//! All positions are character positions, not byte offsets.

use crate::op::OPERATORS;

/// The escape character.
pub const ESCAPE_CHAR: char = '\\';

/// Returns `true` if the character at `index` is escaped.
///
/// ```
/// use sieve::escape::is_escaped;
///
/// assert!(is_escaped(r"a\,b", 2));
/// assert!(!is_escaped(r"a\\,b", 3));
/// ```
pub fn is_escaped(text: &str, index: usize) -> bool {
    let chars: Vec<char> = text.chars().collect();
    is_escaped_at(&chars, index)
}

pub(crate) fn is_escaped_at(chars: &[char], index: usize) -> bool {
    let preceding = chars[..index.min(chars.len())]
        .iter()
        .rev()
        .take_while(|&&c| c == ESCAPE_CHAR)
        .count();
    preceding % 2 == 1
}

/// Splits `text` on every unescaped occurrence of `delimiter`.
///
/// Each part is trimmed and empty parts are dropped. Escape sequences are
/// left in place; callers unescape the parts themselves.
///
/// ```
/// use sieve::escape::split_unescaped;
///
/// assert_eq!(split_unescaped(r"a, b\,c ,,d", ','), vec!["a", r"b\,c", "d"]);
/// ```
pub fn split_unescaped(text: &str, delimiter: char) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut buffer = String::new();

    for (index, &current) in chars.iter().enumerate() {
        if current == delimiter && !is_escaped_at(&chars, index) {
            push_part(&mut parts, &buffer);
            buffer.clear();
            continue;
        }
        buffer.push(current);
    }
    push_part(&mut parts, &buffer);

    parts
}

fn push_part(parts: &mut Vec<String>, buffer: &str) {
    let trimmed = buffer.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

/// Replaces every escaped operator token (`\==`, `\@=*`, ...) with the bare
/// token, walking the operator table in order.
pub fn unescape_operators(text: &str) -> String {
    OPERATORS.iter().fold(text.to_string(), |current, token| {
        current.replace(&format!("{ESCAPE_CHAR}{token}"), token)
    })
}

/// Replaces `\|` with `|`, then `\\` with `\`.
pub fn unescape_pipes(text: &str) -> String {
    text.replace("\\|", "|").replace("\\\\", "\\")
}
