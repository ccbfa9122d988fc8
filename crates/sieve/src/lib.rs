//! Sieve - filtering, sorting and pagination for query builders.
//!
//! Sieve turns three compact request strings into calls on a query builder
//! of your choice:
//!
//! - `filters`: comma-separated terms such as `title@=john`,
//!   `(title|body)@=*rust` or `priority>=3`
//! - `sorts`: comma-separated names, `-` prefix for descending
//! - `page` / `pageSize`: integers, clamped by the processor's options
//!
//! The crate never touches a database itself. A [`QueryAdapter`] receives
//! already-resolved [`QueryCondition`]s, [`SortSpec`]s and a [`Pagination`]
//! and applies them to whatever `Q` it understands.
//!
//! # Quick Start
//!
//! ```rust
//! use sieve::{
//!     BoxError, Execution, Field, Pagination, QueryAdapter, QueryCondition, SieveModel,
//!     SieveProcessor, SortSpec,
//! };
//!
//! // A query that just prints what it was asked to do.
//! #[derive(Default)]
//! struct Sql(Vec<String>);
//!
//! struct SqlAdapter;
//!
//! impl QueryAdapter<Sql> for SqlAdapter {
//!     fn apply_filter_group(
//!         &self,
//!         q: &mut Sql,
//!         conditions: &[QueryCondition],
//!     ) -> Result<(), BoxError> {
//!         let parts: Vec<String> = conditions
//!             .iter()
//!             .map(|c| format!("{} {} {}", c.field, c.parsed_operator, c.value))
//!             .collect();
//!         q.0.push(format!("WHERE ({})", parts.join(" OR ")));
//!         Ok(())
//!     }
//!
//!     fn apply_sorts(&self, q: &mut Sql, sorts: &[SortSpec]) -> Result<(), BoxError> {
//!         q.0.push(format!("ORDER BY {}", sorts.len()));
//!         Ok(())
//!     }
//!
//!     fn apply_pagination(&self, q: &mut Sql, p: Pagination) -> Result<(), BoxError> {
//!         q.0.push(format!("LIMIT {} OFFSET {}", p.page_size, p.offset()));
//!         Ok(())
//!     }
//! }
//!
//! let processor = SieveProcessor::<Sql>::builder(SqlAdapter)
//!     .field(Field::new("title").filterable().sortable())
//!     .default_page_size(10)
//!     .build();
//!
//! let model = SieveModel::new().filters("title==Rust").page(3);
//! let query = processor.apply_to(&model, Sql::default(), &Execution::default()).unwrap();
//!
//! assert_eq!(query.0, vec!["WHERE (title equals Rust)", "LIMIT 10 OFFSET 20"]);
//! ```
//!
//! # Filter Grammar
//!
//! A term is `names operator values`. Names and values are `|`-separated;
//! names may be wrapped in parentheses. The operator is the leftmost of
//! [`op::OPERATORS`] found in the term, longest token first.
//!
//! ```text
//! term  = names OP values
//! match = OR over (every name x every value)    within one term
//! query = AND over terms
//! ```
//!
//! A trailing `*` makes an operator case-insensitive. A leading `!` on a
//! string operator negates it. Backslash escapes `,`, `|`, operator tokens
//! and the literal `null`.
//!
//! # Errors
//!
//! With [`SieveOptions::throw_exceptions`] off (the default) every request
//! succeeds: unknown names are skipped and the first failure stops
//! processing, returning the partially built query. Turn it on to receive
//! [`SieveError`]s instead.

mod adapter;
mod condition;
mod config;
mod error;
/// Escape-aware splitting and unescaping.
pub mod escape;
mod field;
mod method;
mod model;
/// Operator tokens and their lookup.
pub mod op;
mod options;
mod processor;
mod term;
mod value;

// Re-export public API
pub use adapter::QueryAdapter;
pub use condition::{build_condition, Pagination, QueryCondition, SortSpec};
pub use config::{load_config, resolve_config_path, SieveConfig, CONFIG_FILE_NAMES};
pub use error::{BoxError, ConfigError, Result, SieveError};
pub use field::{Capability, Field, FieldConfig, FieldMap, FieldMapping, FieldOptions, ValueParser};
pub use method::{
    CustomMethods, FilterArgs, FilterMethod, MethodError, MethodResult, MethodSlot, SortArgs,
    SortMethod,
};
pub use model::{parse_int, parse_sieve_model, ParsedSieveModel, SieveModel};
pub use op::FilterOperator;
pub use options::{Execution, SieveOptions};
pub use processor::{SieveProcessor, SieveProcessorBuilder};
pub use term::{parse_filter_term, parse_filters, parse_sorts, FilterTerm, SortTerm};
pub use value::{coerce, Value};
