//! Processor options and per-call execution settings.

use serde::{Deserialize, Serialize};

/// Options fixed when a processor is built.
///
/// Deserializes from camelCase keys; anything missing takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SieveOptions {
    /// Compare field and custom-method names case-sensitively.
    pub case_sensitive: bool,
    /// Page size used when the request gives none. `0` disables default
    /// pagination.
    pub default_page_size: i64,
    /// Upper bound for the page size. `0` means no cap.
    pub max_page_size: i64,
    /// Surface resolution and adapter errors instead of returning the
    /// partially processed query.
    pub throw_exceptions: bool,
    /// Copied onto every condition for adapters that treat not-equal
    /// against null specially.
    pub ignore_nulls_on_not_equal: bool,
}

impl Default for SieveOptions {
    fn default() -> Self {
        SieveOptions {
            case_sensitive: false,
            default_page_size: 0,
            max_page_size: 0,
            throw_exceptions: false,
            ignore_nulls_on_not_equal: true,
        }
    }
}

/// Per-call switches and the context handed to custom methods.
#[derive(Debug)]
pub struct Execution<'a, C = ()> {
    /// Run the filtering phase.
    pub apply_filtering: bool,
    /// Run the sorting phase.
    pub apply_sorting: bool,
    /// Run the pagination phase.
    pub apply_pagination: bool,
    /// Handed to every custom method.
    pub context: Option<&'a C>,
}

impl<C> Clone for Execution<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Execution<'_, C> {}

impl<C> Default for Execution<'_, C> {
    fn default() -> Self {
        Execution {
            apply_filtering: true,
            apply_sorting: true,
            apply_pagination: true,
            context: None,
        }
    }
}

impl<'a, C> Execution<'a, C> {
    /// All phases on, no context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes `context` to every custom method invoked during the call.
    pub fn with_context(mut self, context: &'a C) -> Self {
        self.context = Some(context);
        self
    }

    /// Turns the filtering phase on or off.
    pub fn filtering(mut self, enabled: bool) -> Self {
        self.apply_filtering = enabled;
        self
    }

    /// Turns the sorting phase on or off.
    pub fn sorting(mut self, enabled: bool) -> Self {
        self.apply_sorting = enabled;
        self
    }

    /// Turns the pagination phase on or off.
    pub fn pagination(mut self, enabled: bool) -> Self {
        self.apply_pagination = enabled;
        self
    }
}

pub(crate) fn names_match(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.to_lowercase() == b.to_lowercase()
    }
}
