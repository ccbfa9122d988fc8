//! The in-memory query plan and its adapter.

use sieve::{BoxError, Pagination, QueryAdapter, QueryCondition, SortSpec};

use crate::matcher::matches_groups;
use crate::ordering::compare_records;
use crate::traits::Record;

/// A query over an in-memory collection.
///
/// The adapter fills it in; [`execute`](MemoryQuery::execute) runs it.
/// Groups are AND-combined, conditions within a group OR-combined.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryQuery {
    groups: Vec<Vec<QueryCondition>>,
    sorts: Vec<SortSpec>,
    pagination: Option<Pagination>,
}

impl MemoryQuery {
    /// Creates an empty query, which matches everything.
    pub fn new() -> Self {
        MemoryQuery::default()
    }

    /// Adds a group of OR-combined conditions.
    pub fn and_group(mut self, conditions: Vec<QueryCondition>) -> Self {
        self.groups.push(conditions);
        self
    }

    /// Appends a sort key.
    pub fn order_by(mut self, sort: SortSpec) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Sets the page to return.
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// The filter groups, in the order they were added.
    pub fn groups(&self) -> &[Vec<QueryCondition>] {
        &self.groups
    }

    /// The sort keys, most significant first.
    pub fn sorts(&self) -> &[SortSpec] {
        &self.sorts
    }

    /// The page to return, if any.
    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    /// Appends a sort key in place, for custom sort methods.
    pub fn push_sort(&mut self, sort: SortSpec) {
        self.sorts.push(sort);
    }

    /// Tests one record against the filter groups.
    pub fn matches<R: Record + ?Sized>(&self, record: &R) -> bool {
        matches_groups(record, &self.groups)
    }

    /// Filters, sorts, then pages `records`.
    ///
    /// Sorting is stable, so records equal under every key keep their input
    /// order.
    pub fn execute<'a, R: Record>(&self, records: &'a [R]) -> Vec<&'a R> {
        let mut results: Vec<&'a R> = records.iter().filter(|r| self.matches(*r)).collect();

        if !self.sorts.is_empty() {
            results.sort_by(|a, b| compare_records(*a, *b, &self.sorts));
        }

        match self.pagination {
            Some(page) => results
                .into_iter()
                .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
                .take(usize::try_from(page.page_size).unwrap_or(usize::MAX))
                .collect(),
            None => results,
        }
    }

    /// Like [`execute`](Self::execute) but clones the results.
    pub fn execute_cloned<R: Record + Clone>(&self, records: &[R]) -> Vec<R> {
        self.execute(records).into_iter().cloned().collect()
    }

    /// Number of matching records, ignoring pagination.
    pub fn count<R: Record>(&self, records: &[R]) -> usize {
        records.iter().filter(|r| self.matches(*r)).count()
    }
}

/// [`QueryAdapter`] that builds a [`MemoryQuery`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryAdapter;

impl QueryAdapter<MemoryQuery> for MemoryAdapter {
    fn apply_filter_group(
        &self,
        query: &mut MemoryQuery,
        conditions: &[QueryCondition],
    ) -> Result<(), BoxError> {
        query.groups.push(conditions.to_vec());
        Ok(())
    }

    fn apply_sorts(&self, query: &mut MemoryQuery, sorts: &[SortSpec]) -> Result<(), BoxError> {
        query.sorts.extend_from_slice(sorts);
        Ok(())
    }

    fn apply_pagination(
        &self,
        query: &mut MemoryQuery,
        pagination: Pagination,
    ) -> Result<(), BoxError> {
        query.pagination = Some(pagination);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value as Json};
    use sieve::{FilterOperator, Value};

    fn rows() -> Vec<Json> {
        vec![
            json!({ "name": "ada", "age": 36 }),
            json!({ "name": "bob", "age": 17 }),
            json!({ "name": "cy", "age": null }),
            json!({ "name": "dee", "age": 52 }),
        ]
    }

    fn gte(field: &str, n: f64) -> QueryCondition {
        QueryCondition {
            field: field.into(),
            value: Value::Number(n),
            parsed_operator: FilterOperator::GreaterThanOrEqual,
            operator_is_negated: false,
            operator_is_case_insensitive: false,
            ignore_nulls_on_not_equal: true,
        }
    }

    fn names(results: &[&Json]) -> Vec<String> {
        results
            .iter()
            .map(|r| r["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn empty_query_returns_all_in_order() {
        let data = rows();
        assert_eq!(MemoryQuery::new().execute(&data).len(), 4);
    }

    #[test]
    fn filter_sort_page() {
        let data = rows();
        let query = MemoryQuery::new()
            .and_group(vec![gte("age", 18.0)])
            .order_by(SortSpec::desc("age"))
            .paginate(Pagination { page: 1, page_size: 1 });

        assert_eq!(names(&query.execute(&data)), vec!["dee"]);
        assert_eq!(query.count(&data), 2);

        let second = query.clone().paginate(Pagination { page: 2, page_size: 1 });
        assert_eq!(names(&second.execute(&data)), vec!["ada"]);

        let past_end = query.paginate(Pagination { page: 9, page_size: 1 });
        assert!(past_end.execute(&data).is_empty());
    }

    #[test]
    fn adapter_records_plan() {
        let adapter = MemoryAdapter;
        let mut query = MemoryQuery::new();
        adapter.apply_filter_group(&mut query, &[gte("age", 1.0)]).unwrap();
        adapter.apply_sorts(&mut query, &[SortSpec::asc("name")]).unwrap();
        adapter
            .apply_pagination(&mut query, Pagination { page: 2, page_size: 10 })
            .unwrap();

        assert_eq!(query.groups().len(), 1);
        assert_eq!(query.sorts(), &[SortSpec::asc("name")]);
        assert_eq!(query.pagination(), Some(Pagination { page: 2, page_size: 10 }));
    }

    #[test]
    fn null_ages_sort_last() {
        let data = rows();
        let query = MemoryQuery::new().order_by(SortSpec::desc("age"));
        assert_eq!(names(&query.execute(&data)), vec!["dee", "ada", "bob", "cy"]);
    }
}
