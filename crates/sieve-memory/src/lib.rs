//! In-memory query adapter for sieve.
//!
//! [`MemoryAdapter`] turns the conditions, sorts and pagination produced by a
//! [`sieve::SieveProcessor`] into a [`MemoryQuery`] that can run against any
//! slice of [`Record`]s: your own structs, or `serde_json::Value` documents.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use sieve::{Execution, Field, SieveModel, SieveProcessor};
//! use sieve_memory::{MemoryAdapter, MemoryQuery};
//!
//! let people = vec![
//!     json!({ "name": "Ada", "age": 36 }),
//!     json!({ "name": "Bob", "age": 17 }),
//!     json!({ "name": "Dee", "age": 52 }),
//! ];
//!
//! let processor = SieveProcessor::<MemoryQuery>::builder(MemoryAdapter)
//!     .field(Field::new("name").filterable().sortable())
//!     .field(Field::new("age").filterable().sortable())
//!     .build();
//!
//! let model = SieveModel::new().filters("age>=18").sorts("-age");
//! let query = processor
//!     .apply_to(&model, MemoryQuery::new(), &Execution::default())
//!     .unwrap();
//!
//! let names: Vec<_> = query.execute(&people).iter().map(|p| p["name"].clone()).collect();
//! assert_eq!(names, vec![json!("Dee"), json!("Ada")]);
//! ```
//!
//! # Matching
//!
//! ```text
//! match = AND over groups (OR over conditions in the group)
//! ```
//!
//! See [`matches_condition`] for the per-operator rules. Sorting puts nulls
//! last regardless of direction and ranks mixed types with
//! [`compare_total`].

mod matcher;
mod ordering;
mod query;
mod traits;
mod value;

// Re-export public API
pub use matcher::{matches_condition, matches_group, matches_groups};
pub use ordering::{compare_by_spec, compare_records, compare_total, compare_values};
pub use query::{MemoryAdapter, MemoryQuery};
pub use traits::Record;
pub use value::{FieldValue, Number};
