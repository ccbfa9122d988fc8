//! Custom filter and sort methods.
//!
//! When a filter or sort name does not resolve to a field, the processor
//! looks it up among caller-supplied methods. A name can be registered with
//! a handler, or only *declared* (for example by a configuration file,
//! which can name a method but never provide code). Declared entries let the
//! processor report "exists but is not callable" instead of "not found".

use std::fmt;
use std::sync::Arc;

use crate::error::BoxError;
use crate::options::names_match;

/// Arguments passed to a custom filter method.
#[derive(Debug)]
pub struct FilterArgs<'a, C> {
    /// The raw operator token, e.g. `"=="` or `"@=*"`.
    pub operator: &'a str,
    /// The clause's unescaped values.
    pub values: &'a [String],
    /// Per-call context from [`Execution`](crate::Execution).
    pub context: Option<&'a C>,
}

/// Arguments passed to a custom sort method.
#[derive(Debug)]
pub struct SortArgs<'a, C> {
    /// `true` when an earlier sort term already resolved to a field.
    pub use_then_by: bool,
    /// The term asked for descending order.
    pub descending: bool,
    /// Per-call context from [`Execution`](crate::Execution).
    pub context: Option<&'a C>,
}

/// Why a custom method did not transform the query.
#[derive(Debug)]
pub enum MethodError {
    /// The method produced no query.
    NoQuery,
    /// The method failed.
    Failed(BoxError),
}

impl<E> From<E> for MethodError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        MethodError::Failed(Box::new(err))
    }
}

/// Outcome of a custom method.
pub type MethodResult = std::result::Result<(), MethodError>;

/// A custom filter. Receives the working query by reference and may
/// replace it by assigning through the reference.
pub type FilterMethod<Q, C> = Arc<dyn Fn(&mut Q, FilterArgs<'_, C>) -> MethodResult + Send + Sync>;

/// A custom sort. Same contract as [`FilterMethod`].
pub type SortMethod<Q, C> = Arc<dyn Fn(&mut Q, SortArgs<'_, C>) -> MethodResult + Send + Sync>;

/// One registered name.
#[derive(Clone)]
pub enum MethodSlot<H> {
    /// A callable handler.
    Handler(H),
    /// A name with no callable behind it; `actual_type` describes what was
    /// registered instead.
    Declared { actual_type: String },
}

impl<H> fmt::Debug for MethodSlot<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodSlot::Handler(_) => f.write_str("Handler(..)"),
            MethodSlot::Declared { actual_type } => f
                .debug_struct("Declared")
                .field("actual_type", actual_type)
                .finish(),
        }
    }
}

/// Ordered `name -> slot` registry.
#[derive(Clone)]
pub struct CustomMethods<H> {
    entries: Vec<(String, MethodSlot<H>)>,
}

impl<H> Default for CustomMethods<H> {
    fn default() -> Self {
        CustomMethods {
            entries: Vec::new(),
        }
    }
}

impl<H> fmt::Debug for CustomMethods<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(name, slot)| (name, slot)))
            .finish()
    }
}

impl<H> CustomMethods<H> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        CustomMethods::default()
    }

    /// Registers a handler, replacing any entry with exactly this name.
    pub fn insert(&mut self, name: impl Into<String>, handler: H) {
        self.set(name.into(), MethodSlot::Handler(handler));
    }

    /// Registers a non-callable entry, replacing any entry with exactly
    /// this name.
    pub fn declare(&mut self, name: impl Into<String>, actual_type: impl Into<String>) {
        self.set(
            name.into(),
            MethodSlot::Declared {
                actual_type: actual_type.into(),
            },
        );
    }

    fn set(&mut self, name: String, slot: MethodSlot<H>) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = slot,
            None => self.entries.push((name, slot)),
        }
    }

    /// Adds the entries of `lower` whose names are not already registered
    /// under the given case mode.
    pub fn fill_from(&mut self, lower: CustomMethods<H>, case_sensitive: bool) {
        for (name, slot) in lower.entries {
            let taken = self
                .entries
                .iter()
                .any(|(existing, _)| names_match(existing, &name, case_sensitive));
            if !taken {
                self.entries.push((name, slot));
            }
        }
    }

    /// Finds the first callable handler whose name matches.
    pub fn find(&self, name: &str, case_sensitive: bool) -> Option<&H> {
        self.entries.iter().find_map(|(key, slot)| match slot {
            MethodSlot::Handler(handler) if names_match(key, name, case_sensitive) => Some(handler),
            _ => None,
        })
    }

    /// Finds the first non-callable entry whose name matches and returns
    /// the type it was registered with.
    pub fn find_incompatible(&self, name: &str, case_sensitive: bool) -> Option<&str> {
        self.entries.iter().find_map(|(key, slot)| match slot {
            MethodSlot::Declared { actual_type } if names_match(key, name, case_sensitive) => {
                Some(actual_type.as_str())
            }
            _ => None,
        })
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no name is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
