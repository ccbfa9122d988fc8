//! The capability contract between the processor and a query builder.

use crate::condition::{Pagination, QueryCondition, SortSpec};
use crate::error::BoxError;

/// Translates conditions, sorts and pagination into a concrete query.
///
/// The processor never inspects `Q`. It hands the working query to these
/// methods by mutable reference; an adapter whose builder is consumed on
/// each call replaces it in place. A query left behind by a failing call is
/// what the processor returns in best-effort mode, so adapters should only
/// touch it once the operation can no longer fail.
///
/// # Example
///
/// ```
/// use sieve::{BoxError, Pagination, QueryAdapter, QueryCondition, SortSpec};
///
/// #[derive(Default)]
/// struct Plan {
///     where_groups: Vec<Vec<String>>,
///     order_by: Vec<String>,
///     limit: Option<u64>,
/// }
///
/// struct PlanAdapter;
///
/// impl QueryAdapter<Plan> for PlanAdapter {
///     fn apply_filter_group(
///         &self,
///         plan: &mut Plan,
///         conditions: &[QueryCondition],
///     ) -> Result<(), BoxError> {
///         plan.where_groups.push(conditions.iter().map(|c| c.field.clone()).collect());
///         Ok(())
///     }
///
///     fn apply_sorts(&self, plan: &mut Plan, sorts: &[SortSpec]) -> Result<(), BoxError> {
///         plan.order_by.extend(sorts.iter().map(|s| s.field.clone()));
///         Ok(())
///     }
///
///     fn apply_pagination(
///         &self,
///         plan: &mut Plan,
///         pagination: Pagination,
///     ) -> Result<(), BoxError> {
///         plan.limit = Some(pagination.page_size);
///         Ok(())
///     }
/// }
/// ```
pub trait QueryAdapter<Q> {
    /// Applies one group of conditions. Conditions within a group are
    /// OR-combined; successive groups are AND-combined.
    fn apply_filter_group(&self, query: &mut Q, conditions: &[QueryCondition])
        -> Result<(), BoxError>;

    /// Applies the ordered sort keys, first key most significant.
    fn apply_sorts(&self, query: &mut Q, sorts: &[SortSpec]) -> Result<(), BoxError>;

    /// Restricts the query to one page.
    fn apply_pagination(&self, query: &mut Q, pagination: Pagination) -> Result<(), BoxError>;
}
