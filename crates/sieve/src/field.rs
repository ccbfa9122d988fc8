//! Field declarations and capability-checked lookup.
//!
//! Fields are what filter and sort names resolve to. Each field has a
//! public name, a storage path handed to the adapter, capability flags and
//! an optional value parser. They can be declared two ways:
//!
//! ```
//! use sieve::{Field, FieldConfig, FieldMap};
//!
//! // As a list of builders
//! let listed = FieldMap::from_fields([
//!     Field::new("title").path("title_col").filterable(),
//!     Field::new("created").sortable(),
//! ]);
//!
//! // As name -> config entries; a bare path is filterable and sortable
//! let keyed = FieldMap::from_entries([
//!     ("title", FieldConfig::path("title_col")),
//!     ("created", Field::new("created").sortable().into()),
//! ]);
//!
//! assert_eq!(listed.len(), keyed.len());
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::options::names_match;
use crate::value::Value;

/// Converts a raw literal into a field-specific value.
#[derive(Clone)]
pub struct ValueParser(Arc<dyn Fn(&str) -> Value + Send + Sync>);

impl ValueParser {
    /// Wraps a parsing function.
    pub fn new<F>(parse: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        ValueParser(Arc::new(parse))
    }

    /// Parses one raw filter value.
    pub fn parse(&self, raw: &str) -> Value {
        (self.0)(raw)
    }
}

impl fmt::Debug for ValueParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueParser(..)")
    }
}

/// What a name is being resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Filter,
    Sort,
}

/// A normalized field declaration.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    /// Public name used in the DSL.
    pub name: String,
    /// Storage key handed to the adapter.
    pub path: String,
    /// Conditions may target this field.
    pub can_filter: bool,
    /// Sort terms may target this field.
    pub can_sort: bool,
    /// Replaces default coercion for this field's filter values.
    pub parse_value: Option<ValueParser>,
}

impl FieldMapping {
    /// Returns `true` if this field grants `capability`.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Filter => self.can_filter,
            Capability::Sort => self.can_sort,
        }
    }
}

/// Per-field settings shared by both declaration styles.
///
/// Missing flags default to `false` and a missing path to the field name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldOptions {
    /// Storage path; defaults to the field name.
    pub path: Option<String>,
    /// Conditions may target this field.
    pub can_filter: bool,
    /// Sort terms may target this field.
    pub can_sort: bool,
    /// Set in code only; files cannot carry a parser.
    #[serde(skip)]
    pub parse_value: Option<ValueParser>,
}

/// Configuration for one entry of a name-keyed field declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldConfig {
    /// A bare storage path; the field is filterable and sortable.
    Path(String),
    /// Explicit settings.
    Options(FieldOptions),
}

impl FieldConfig {
    /// A bare storage path entry.
    pub fn path(path: impl Into<String>) -> Self {
        FieldConfig::Path(path.into())
    }

    fn into_mapping(self, name: String) -> FieldMapping {
        match self {
            FieldConfig::Path(path) => FieldMapping {
                name,
                path,
                can_filter: true,
                can_sort: true,
                parse_value: None,
            },
            FieldConfig::Options(options) => FieldMapping {
                path: options.path.unwrap_or_else(|| name.clone()),
                name,
                can_filter: options.can_filter,
                can_sort: options.can_sort,
                parse_value: options.parse_value,
            },
        }
    }
}

/// Builder for a single field declaration.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    options: FieldOptions,
}

impl Field {
    /// Starts a field with no capabilities whose path is its name.
    pub fn new(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            options: FieldOptions::default(),
        }
    }

    /// Sets the storage path. Defaults to the field name.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.options.path = Some(path.into());
        self
    }

    /// Allows filtering on this field.
    pub fn filterable(mut self) -> Self {
        self.options.can_filter = true;
        self
    }

    /// Allows sorting on this field.
    pub fn sortable(mut self) -> Self {
        self.options.can_sort = true;
        self
    }

    /// Parses literals for this field with `parse` instead of the default
    /// coercion.
    pub fn parse_with<F>(mut self, parse: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.options.parse_value = Some(ValueParser::new(parse));
        self
    }

    /// The public name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<Field> for FieldConfig {
    fn from(field: Field) -> Self {
        FieldConfig::Options(field.options)
    }
}

impl From<Field> for FieldMapping {
    fn from(field: Field) -> Self {
        FieldConfig::Options(field.options).into_mapping(field.name)
    }
}

/// An ordered set of field mappings.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    mappings: Vec<FieldMapping>,
}

impl FieldMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        FieldMap::default()
    }

    /// Builds a map from a list of field builders.
    pub fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        FieldMap {
            mappings: fields.into_iter().map(FieldMapping::from).collect(),
        }
    }

    /// Builds a map from `name -> config` entries.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldConfig)>,
        K: Into<String>,
    {
        FieldMap {
            mappings: entries
                .into_iter()
                .map(|(name, config)| config.into_mapping(name.into()))
                .collect(),
        }
    }

    /// Adds a mapping, replacing one with exactly the same name in place.
    pub fn upsert(&mut self, mapping: FieldMapping) {
        match self.mappings.iter_mut().find(|m| m.name == mapping.name) {
            Some(existing) => *existing = mapping,
            None => self.mappings.push(mapping),
        }
    }

    /// Adds every mapping of `other`, replacing same-named ones.
    pub fn extend(&mut self, other: FieldMap) {
        for mapping in other.mappings {
            self.upsert(mapping);
        }
    }

    /// Adds the mappings of `lower` whose names are not already taken
    /// under the given case mode.
    pub fn fill_from(&mut self, lower: FieldMap, case_sensitive: bool) {
        for mapping in lower.mappings {
            let taken = self
                .mappings
                .iter()
                .any(|m| names_match(&m.name, &mapping.name, case_sensitive));
            if !taken {
                self.mappings.push(mapping);
            }
        }
    }

    /// Finds the first field named `name` that grants `capability`.
    ///
    /// A field that matches by name but lacks the capability is skipped,
    /// so it behaves exactly like an unknown name.
    pub fn find(
        &self,
        name: &str,
        capability: Capability,
        case_sensitive: bool,
    ) -> Option<&FieldMapping> {
        self.mappings
            .iter()
            .find(|m| names_match(&m.name, name, case_sensitive) && m.allows(capability))
    }

    /// Removes later mappings whose name collides with an earlier one under
    /// the given case mode. Returns the removed names.
    pub fn dedup(&mut self, case_sensitive: bool) -> Vec<String> {
        let mut kept: Vec<FieldMapping> = Vec::with_capacity(self.mappings.len());
        let mut dropped = Vec::new();

        for mapping in self.mappings.drain(..) {
            if kept
                .iter()
                .any(|k| names_match(&k.name, &mapping.name, case_sensitive))
            {
                dropped.push(mapping.name);
            } else {
                kept.push(mapping);
            }
        }

        self.mappings = kept;
        dropped
    }

    /// Iterates over the mappings in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.mappings.iter()
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl FromIterator<Field> for FieldMap {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        FieldMap::from_fields(iter)
    }
}
