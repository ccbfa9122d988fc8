//! Raw request model and its parsed form.

use serde::{Deserialize, Deserializer, Serialize};

use crate::term::{parse_filters, parse_sorts, FilterTerm, SortTerm};

/// The four DSL inputs as they arrive, typically from query parameters.
///
/// Deserializes from `{ "filters", "sorts", "page", "pageSize" }`, where
/// `page` and `pageSize` may be strings or numbers.
///
/// ```
/// use sieve::SieveModel;
///
/// let model = SieveModel::new()
///     .filters("title@=john")
///     .sorts("-created")
///     .page(2)
///     .page_size(25);
/// assert_eq!(model.page.as_deref(), Some("2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SieveModel {
    /// Raw filter expression, e.g. `title@=rust,age>18`.
    pub filters: Option<String>,
    /// Raw sort expression, e.g. `-created,title`.
    pub sorts: Option<String>,
    /// Requested page; numbers and numeric text are both accepted.
    #[serde(deserialize_with = "text_or_number")]
    pub page: Option<String>,
    /// Requested page size, accepted like `page`.
    #[serde(deserialize_with = "text_or_number")]
    pub page_size: Option<String>,
}

impl SieveModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        SieveModel::default()
    }

    /// Sets the filter expression.
    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    /// Sets the sort expression.
    pub fn sorts(mut self, sorts: impl Into<String>) -> Self {
        self.sorts = Some(sorts.into());
        self
    }

    /// Sets a numeric page. Zero counts as not given.
    pub fn page(mut self, page: impl Into<i64>) -> Self {
        self.page = numeric_param(page.into());
        self
    }

    /// Sets a numeric page size. Zero counts as not given.
    pub fn page_size(mut self, page_size: impl Into<i64>) -> Self {
        self.page_size = numeric_param(page_size.into());
        self
    }

    /// Sets the page from unparsed text.
    pub fn page_raw(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Sets the page size from unparsed text.
    pub fn page_size_raw(mut self, page_size: impl Into<String>) -> Self {
        self.page_size = Some(page_size.into());
        self
    }
}

fn numeric_param(n: i64) -> Option<String> {
    (n != 0).then(|| n.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let param = Option::<TextOrNumber>::deserialize(deserializer)?;
    Ok(param.and_then(|param| match param {
        TextOrNumber::Text(text) => Some(text),
        TextOrNumber::Integer(n) => numeric_param(n),
        TextOrNumber::Float(f) if f == 0.0 || f.is_nan() => None,
        TextOrNumber::Float(f) => Some(f.to_string()),
    }))
}

/// The fully parsed request model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSieveModel {
    /// Filter terms in input order.
    pub filters: Vec<FilterTerm>,
    /// Sort terms, one per name.
    pub sorts: Vec<SortTerm>,
    /// Requested page, as given.
    pub page: Option<i64>,
    /// Requested page size, as given.
    pub page_size: Option<i64>,
}

/// Parses every part of a [`SieveModel`].
///
/// Empty strings count as absent. `page` and `pageSize` keep the leading
/// integer of their text (`"3rd"` is 3) and are absent when there is none.
pub fn parse_sieve_model(model: &SieveModel) -> ParsedSieveModel {
    ParsedSieveModel {
        filters: model.filters.as_deref().map(parse_filters).unwrap_or_default(),
        sorts: model.sorts.as_deref().map(parse_sorts).unwrap_or_default(),
        page: model.page.as_deref().and_then(parse_int),
        page_size: model.page_size.as_deref().and_then(parse_int),
    }
}

/// Reads the leading base-10 integer of `text`.
///
/// Leading whitespace and a single sign are allowed; parsing stops at the
/// first non-digit. Returns `None` when no digit is found or the number
/// does not fit in an `i64`.
pub fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => ("-", &trimmed[1..]),
        Some(b'+') => ("", &trimmed[1..]),
        _ => ("", trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    format!("{sign}{}", &rest[..digits_len]).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_int_like_leading_integer() {
        assert_eq!(parse_int("3"), Some(3));
        assert_eq!(parse_int("  25 "), Some(25));
        assert_eq!(parse_int("3rd"), Some(3));
        assert_eq!(parse_int("-4"), Some(-4));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("2.9"), Some(2));
        assert_eq!(parse_int("abc"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("-"), None);
        assert_eq!(parse_int("99999999999999999999"), None);
    }

    #[test]
    fn model_assembles_all_parts() {
        let model = SieveModel::new()
            .filters("age>=21")
            .sorts("-created")
            .page_raw("3")
            .page_size_raw("25");

        let parsed = parse_sieve_model(&model);
        assert_eq!(parsed.page, Some(3));
        assert_eq!(parsed.page_size, Some(25));
        assert_eq!(parsed.filters.len(), 1);
        assert_eq!(parsed.sorts.len(), 1);
    }

    #[test]
    fn empty_model() {
        let parsed = parse_sieve_model(&SieveModel::default());
        assert_eq!(parsed, ParsedSieveModel::default());
    }

    #[test]
    fn empty_page_text_is_absent() {
        let parsed = parse_sieve_model(&SieveModel::new().page_raw("").page_size_raw("x"));
        assert_eq!(parsed.page, None);
        assert_eq!(parsed.page_size, None);
    }

    #[test]
    fn numeric_zero_is_absent() {
        let model = SieveModel::new().page(0).page_size(0);
        assert_eq!(model.page, None);
        assert_eq!(model.page_size, None);
    }

    #[test]
    fn deserializes_strings_and_numbers() {
        let model: SieveModel = serde_json::from_str(
            r#"{"filters":"a==1","page":"2","pageSize":50}"#,
        )
        .unwrap();
        assert_eq!(model.filters.as_deref(), Some("a==1"));
        assert_eq!(model.page.as_deref(), Some("2"));
        assert_eq!(model.page_size.as_deref(), Some("50"));
        assert_eq!(model.sorts, None);

        let model: SieveModel = serde_json::from_str(r#"{"page":0,"pageSize":null}"#).unwrap();
        assert_eq!(model.page, None);
        assert_eq!(model.page_size, None);
    }
}
