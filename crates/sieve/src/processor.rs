//! The processor: resolves parsed terms and drives the adapter.
//!
//! [`SieveProcessor::apply`] runs three phases against the working query:
//!
//! 1. **Filtering** - every term's names resolve to fields or custom
//!    filters. Field conditions from one term (all names, all values) form a
//!    single OR group and trigger one adapter call, so separate terms are
//!    AND-combined. Custom filters transform the query directly, in name
//!    order, outside the group.
//! 2. **Sorting** - names resolve to sortable fields or custom sorts; field
//!    keys are collected and applied in one adapter call at the end.
//! 3. **Pagination** - page and size are clamped and applied when the
//!    resulting size is positive.
//!
//! All three phases share one failure scope. With `throw_exceptions` off, the
//! first failure stops processing and the query keeps whatever the finished
//! steps did to it. With it on, the failure is returned.

use std::fmt;
use std::sync::Arc;

use crate::adapter::QueryAdapter;
use crate::condition::{build_condition, Pagination, QueryCondition, SortSpec};
use crate::config::SieveConfig;
use crate::error::{BoxError, Result, SieveError};
use crate::field::{Capability, FieldMap, FieldMapping};
use crate::method::{
    CustomMethods, FilterArgs, FilterMethod, MethodError, MethodResult, SortArgs, SortMethod,
};
use crate::model::{parse_sieve_model, ParsedSieveModel, SieveModel};
use crate::options::{Execution, SieveOptions};
use crate::term::{FilterTerm, SortTerm};

const EXPECTED_METHOD_TYPE: &str = "function";
const EXPECTED_RETURN_TYPE: &str = "query-like object";
const MISSING_RETURN_TYPE: &str = "undefined";

/// Applies sieve models to queries of type `Q`.
///
/// `C` is the type of the per-call context handed to custom methods. A
/// processor is immutable once built and can be shared between threads.
///
/// # Example
///
/// ```
/// use sieve::{
///     BoxError, Execution, Field, Pagination, QueryAdapter, QueryCondition, SieveModel,
///     SieveProcessor, SortSpec,
/// };
///
/// #[derive(Default)]
/// struct Recorded {
///     groups: Vec<Vec<QueryCondition>>,
///     sorts: Vec<SortSpec>,
///     page: Option<Pagination>,
/// }
///
/// struct Recorder;
///
/// impl QueryAdapter<Recorded> for Recorder {
///     fn apply_filter_group(
///         &self,
///         q: &mut Recorded,
///         c: &[QueryCondition],
///     ) -> Result<(), BoxError> {
///         q.groups.push(c.to_vec());
///         Ok(())
///     }
///     fn apply_sorts(&self, q: &mut Recorded, s: &[SortSpec]) -> Result<(), BoxError> {
///         q.sorts = s.to_vec();
///         Ok(())
///     }
///     fn apply_pagination(&self, q: &mut Recorded, p: Pagination) -> Result<(), BoxError> {
///         q.page = Some(p);
///         Ok(())
///     }
/// }
///
/// let processor = SieveProcessor::<Recorded>::builder(Recorder)
///     .field(Field::new("title").path("title_col").filterable())
///     .field(Field::new("created").sortable())
///     .max_page_size(50)
///     .build();
///
/// let mut query = Recorded::default();
/// let model = SieveModel::new().filters("title@=john").sorts("-created").page_size(100);
/// processor.apply(&model, &mut query, &Execution::default()).unwrap();
///
/// assert_eq!(query.groups[0][0].field, "title_col");
/// assert_eq!(query.sorts, vec![SortSpec::desc("created")]);
/// assert_eq!(query.page, Some(Pagination { page: 1, page_size: 50 }));
/// ```
pub struct SieveProcessor<Q, C = ()> {
    options: SieveOptions,
    fields: FieldMap,
    adapter: Arc<dyn QueryAdapter<Q> + Send + Sync>,
    custom_filters: CustomMethods<FilterMethod<Q, C>>,
    custom_sorts: CustomMethods<SortMethod<Q, C>>,
}

impl<Q, C> Clone for SieveProcessor<Q, C> {
    fn clone(&self) -> Self {
        SieveProcessor {
            options: self.options.clone(),
            fields: self.fields.clone(),
            adapter: Arc::clone(&self.adapter),
            custom_filters: self.custom_filters.clone(),
            custom_sorts: self.custom_sorts.clone(),
        }
    }
}

impl<Q, C> fmt::Debug for SieveProcessor<Q, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveProcessor")
            .field("options", &self.options)
            .field("fields", &self.fields)
            .field("custom_filters", &self.custom_filters)
            .field("custom_sorts", &self.custom_sorts)
            .finish_non_exhaustive()
    }
}

impl<Q, C> SieveProcessor<Q, C> {
    /// Starts building a processor around `adapter`.
    pub fn builder<A>(adapter: A) -> SieveProcessorBuilder<Q, C>
    where
        A: QueryAdapter<Q> + Send + Sync + 'static,
    {
        SieveProcessorBuilder {
            adapter: Arc::new(adapter),
            loaded: None,
            overrides: OptionOverrides::default(),
            fields: FieldMap::new(),
            custom_filters: CustomMethods::new(),
            custom_sorts: CustomMethods::new(),
        }
    }

    /// The merged options this processor runs with.
    pub fn options(&self) -> &SieveOptions {
        &self.options
    }

    /// The declared fields, after deduplication.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Parses a model without applying it.
    pub fn parse_model(&self, model: &SieveModel) -> ParsedSieveModel {
        parse_sieve_model(model)
    }

    /// Applies `model` to `query` in place.
    ///
    /// Always returns `Ok` when `throw_exceptions` is off; the query then
    /// holds the result of every step completed before the first failure.
    pub fn apply(
        &self,
        model: &SieveModel,
        query: &mut Q,
        execution: &Execution<'_, C>,
    ) -> Result<()> {
        let parsed = parse_sieve_model(model);

        match self.run(&parsed, query, execution) {
            Ok(()) => Ok(()),
            Err(err) if self.options.throw_exceptions => Err(err),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "sieve processing stopped early, returning partial query"
                );
                Ok(())
            }
        }
    }

    /// Like [`apply`](Self::apply) but takes and returns the query by value.
    pub fn apply_to(
        &self,
        model: &SieveModel,
        mut query: Q,
        execution: &Execution<'_, C>,
    ) -> Result<Q> {
        self.apply(model, &mut query, execution)?;
        Ok(query)
    }

    /// The pagination the processor would apply for `model`, if any.
    ///
    /// The page defaults to 1 unless a positive page is given. The size is
    /// the requested size or the default size, capped by the maximum size
    /// when one is set.
    pub fn resolve_pagination(&self, model: &ParsedSieveModel) -> Option<Pagination> {
        let page = model.page.filter(|page| *page > 0).unwrap_or(1);
        let requested = model.page_size.unwrap_or(self.options.default_page_size);
        let cap = if self.options.max_page_size > 0 {
            self.options.max_page_size
        } else {
            requested
        };
        let page_size = requested.min(cap);

        (page_size > 0).then_some(Pagination {
            page: page as u64,
            page_size: page_size as u64,
        })
    }

    fn run(
        &self,
        model: &ParsedSieveModel,
        query: &mut Q,
        execution: &Execution<'_, C>,
    ) -> Result<()> {
        if execution.apply_filtering {
            self.apply_filters(&model.filters, query, execution)?;
        }
        if execution.apply_sorting {
            self.apply_sorts(&model.sorts, query, execution)?;
        }
        if execution.apply_pagination {
            match self.resolve_pagination(model) {
                Some(pagination) => self
                    .adapter
                    .apply_pagination(query, pagination)
                    .map_err(from_adapter)?,
                None => tracing::debug!("no positive page size, skipping pagination"),
            }
        }
        Ok(())
    }

    fn apply_filters(
        &self,
        terms: &[FilterTerm],
        query: &mut Q,
        execution: &Execution<'_, C>,
    ) -> Result<()> {
        let case_sensitive = self.options.case_sensitive;

        for term in terms {
            let mut conditions = Vec::new();

            for name in &term.names {
                if let Some(field) = self.fields.find(name, Capability::Filter, case_sensitive) {
                    conditions.extend(self.conditions_for(term, field));
                    continue;
                }

                if let Some(handler) = self.custom_filters.find(name, case_sensitive) {
                    tracing::debug!(
                        method = %name,
                        operator = %term.operator,
                        "invoking custom filter"
                    );
                    let args = FilterArgs {
                        operator: &term.operator,
                        values: &term.values,
                        context: execution.context,
                    };
                    check_method(name, handler(query, args))?;
                    continue;
                }

                self.unresolved(name, &self.custom_filters)?;
            }

            if !conditions.is_empty() {
                self.adapter
                    .apply_filter_group(query, &conditions)
                    .map_err(from_adapter)?;
            }
        }

        Ok(())
    }

    fn conditions_for<'a>(
        &'a self,
        term: &'a FilterTerm,
        field: &'a FieldMapping,
    ) -> impl Iterator<Item = QueryCondition> + 'a {
        term.values.iter().map(move |raw| {
            build_condition(term, field, raw, self.options.ignore_nulls_on_not_equal)
        })
    }

    fn apply_sorts(
        &self,
        terms: &[SortTerm],
        query: &mut Q,
        execution: &Execution<'_, C>,
    ) -> Result<()> {
        let case_sensitive = self.options.case_sensitive;
        let mut resolved: Vec<SortSpec> = Vec::new();

        for term in terms {
            if let Some(field) = self.fields.find(&term.name, Capability::Sort, case_sensitive) {
                resolved.push(SortSpec {
                    field: field.path.clone(),
                    descending: term.descending,
                });
                continue;
            }

            if let Some(handler) = self.custom_sorts.find(&term.name, case_sensitive) {
                tracing::debug!(
                    method = %term.name,
                    descending = term.descending,
                    "invoking custom sort"
                );
                let args = SortArgs {
                    use_then_by: !resolved.is_empty(),
                    descending: term.descending,
                    context: execution.context,
                };
                check_method(&term.name, handler(query, args))?;
                continue;
            }

            self.unresolved(&term.name, &self.custom_sorts)?;
        }

        if !resolved.is_empty() {
            self.adapter
                .apply_sorts(query, &resolved)
                .map_err(from_adapter)?;
        }

        Ok(())
    }

    // A name that is neither a field nor a callable method: skipped unless
    // errors are surfaced.
    fn unresolved<H>(&self, name: &str, methods: &CustomMethods<H>) -> Result<()> {
        if !self.options.throw_exceptions {
            tracing::debug!(name, "no field or custom method, skipping");
            return Ok(());
        }

        match methods.find_incompatible(name, self.options.case_sensitive) {
            Some(actual) => Err(SieveError::incompatible(name, EXPECTED_METHOD_TYPE, actual)),
            None => Err(SieveError::method_not_found(name)),
        }
    }
}

fn check_method(name: &str, result: MethodResult) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(MethodError::NoQuery) => Err(SieveError::incompatible(
            name,
            EXPECTED_RETURN_TYPE,
            MISSING_RETURN_TYPE,
        )),
        Err(MethodError::Failed(err)) => Err(from_adapter(err)),
    }
}

// Sieve errors raised inside adapters or methods pass through unchanged;
// anything else is wrapped.
fn from_adapter(err: BoxError) -> SieveError {
    match err.downcast::<SieveError>() {
        Ok(sieve) => *sieve,
        Err(other) => SieveError::wrap(other),
    }
}

/// Builder for [`SieveProcessor`].
///
/// Settings come from two layers. A loaded [`SieveConfig`] sits underneath
/// and every runtime call sits on top, so a runtime option, field or method
/// wins over the file regardless of call order.
pub struct SieveProcessorBuilder<Q, C = ()> {
    adapter: Arc<dyn QueryAdapter<Q> + Send + Sync>,
    loaded: Option<SieveConfig>,
    overrides: OptionOverrides,
    fields: FieldMap,
    custom_filters: CustomMethods<FilterMethod<Q, C>>,
    custom_sorts: CustomMethods<SortMethod<Q, C>>,
}

/// Options set explicitly on the builder.
#[derive(Debug, Clone, Copy, Default)]
struct OptionOverrides {
    case_sensitive: Option<bool>,
    default_page_size: Option<i64>,
    max_page_size: Option<i64>,
    throw_exceptions: Option<bool>,
    ignore_nulls_on_not_equal: Option<bool>,
}

impl OptionOverrides {
    fn all(options: SieveOptions) -> Self {
        OptionOverrides {
            case_sensitive: Some(options.case_sensitive),
            default_page_size: Some(options.default_page_size),
            max_page_size: Some(options.max_page_size),
            throw_exceptions: Some(options.throw_exceptions),
            ignore_nulls_on_not_equal: Some(options.ignore_nulls_on_not_equal),
        }
    }

    fn over(self, base: SieveOptions) -> SieveOptions {
        SieveOptions {
            case_sensitive: self.case_sensitive.unwrap_or(base.case_sensitive),
            default_page_size: self.default_page_size.unwrap_or(base.default_page_size),
            max_page_size: self.max_page_size.unwrap_or(base.max_page_size),
            throw_exceptions: self.throw_exceptions.unwrap_or(base.throw_exceptions),
            ignore_nulls_on_not_equal: self
                .ignore_nulls_on_not_equal
                .unwrap_or(base.ignore_nulls_on_not_equal),
        }
    }
}

impl<Q, C> SieveProcessorBuilder<Q, C> {
    /// Uses a loaded configuration file as the bottom layer.
    ///
    /// Replaces any configuration given earlier. Options, fields and
    /// methods set at runtime take precedence over it, before or after this
    /// call.
    pub fn config(mut self, config: SieveConfig) -> Self {
        self.loaded = Some(config);
        self
    }

    /// Sets every option at once.
    pub fn options(mut self, options: SieveOptions) -> Self {
        self.overrides = OptionOverrides::all(options);
        self
    }

    /// Matches field and method names case-sensitively.
    pub fn case_sensitive(mut self, enabled: bool) -> Self {
        self.overrides.case_sensitive = Some(enabled);
        self
    }

    /// Page size used when a request gives none.
    pub fn default_page_size(mut self, size: i64) -> Self {
        self.overrides.default_page_size = Some(size);
        self
    }

    /// Caps the page size. `0` disables the cap.
    pub fn max_page_size(mut self, size: i64) -> Self {
        self.overrides.max_page_size = Some(size);
        self
    }

    /// Returns failures from [`SieveProcessor::apply`] instead of the
    /// partial query.
    pub fn throw_exceptions(mut self, enabled: bool) -> Self {
        self.overrides.throw_exceptions = Some(enabled);
        self
    }

    /// Value copied onto every built condition.
    pub fn ignore_nulls_on_not_equal(mut self, enabled: bool) -> Self {
        self.overrides.ignore_nulls_on_not_equal = Some(enabled);
        self
    }

    /// Adds every field of `fields`, replacing same-named ones.
    pub fn fields(mut self, fields: FieldMap) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Adds one field, replacing a same-named one.
    pub fn field(mut self, field: impl Into<FieldMapping>) -> Self {
        self.fields.upsert(field.into());
        self
    }

    /// Registers a custom filter under `name`.
    pub fn custom_filter<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Q, FilterArgs<'_, C>) -> MethodResult + Send + Sync + 'static,
    {
        self.custom_filters.insert(name, Arc::new(handler));
        self
    }

    /// Registers a custom sort under `name`.
    pub fn custom_sort<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Q, SortArgs<'_, C>) -> MethodResult + Send + Sync + 'static,
    {
        self.custom_sorts.insert(name, Arc::new(handler));
        self
    }

    /// Registers a filter name with no callable behind it.
    pub fn declare_filter(
        mut self,
        name: impl Into<String>,
        actual_type: impl Into<String>,
    ) -> Self {
        self.custom_filters.declare(name, actual_type);
        self
    }

    /// Registers a sort name with no callable behind it.
    pub fn declare_sort(
        mut self,
        name: impl Into<String>,
        actual_type: impl Into<String>,
    ) -> Self {
        self.custom_sorts.declare(name, actual_type);
        self
    }

    /// Merges the runtime layer over the loaded one and freezes the result.
    pub fn build(self) -> SieveProcessor<Q, C> {
        let mut fields = self.fields;
        let mut custom_filters = self.custom_filters;
        let mut custom_sorts = self.custom_sorts;

        let options = match self.loaded {
            Some(config) => {
                let options = self.overrides.over(config.options.clone());
                let case_sensitive = options.case_sensitive;

                fields.fill_from(config.field_map(), case_sensitive);

                let mut loaded_filters = CustomMethods::new();
                for (name, actual_type) in config.declared_filters() {
                    loaded_filters.declare(name, actual_type);
                }
                custom_filters.fill_from(loaded_filters, case_sensitive);

                let mut loaded_sorts = CustomMethods::new();
                for (name, actual_type) in config.declared_sorts() {
                    loaded_sorts.declare(name, actual_type);
                }
                custom_sorts.fill_from(loaded_sorts, case_sensitive);

                options
            }
            None => self.overrides.over(SieveOptions::default()),
        };

        for name in fields.dedup(options.case_sensitive) {
            tracing::warn!(field = %name, "duplicate field name ignored");
        }

        SieveProcessor {
            options,
            fields,
            adapter: self.adapter,
            custom_filters,
            custom_sorts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;

    struct NoopAdapter;

    impl QueryAdapter<Vec<String>> for NoopAdapter {
        fn apply_filter_group(
            &self,
            q: &mut Vec<String>,
            c: &[QueryCondition],
        ) -> std::result::Result<(), BoxError> {
            q.push(format!("filter:{}", c.len()));
            Ok(())
        }
        fn apply_sorts(
            &self,
            q: &mut Vec<String>,
            s: &[SortSpec],
        ) -> std::result::Result<(), BoxError> {
            q.push(format!("sort:{}", s.len()));
            Ok(())
        }
        fn apply_pagination(
            &self,
            q: &mut Vec<String>,
            p: Pagination,
        ) -> std::result::Result<(), BoxError> {
            q.push(format!("page:{}:{}", p.page, p.page_size));
            Ok(())
        }
    }

    fn processor(default_size: i64, max_size: i64) -> SieveProcessor<Vec<String>> {
        SieveProcessor::<Vec<String>>::builder(NoopAdapter)
            .default_page_size(default_size)
            .max_page_size(max_size)
            .build()
    }

    fn parsed(page: Option<i64>, page_size: Option<i64>) -> ParsedSieveModel {
        ParsedSieveModel {
            page,
            page_size,
            ..ParsedSieveModel::default()
        }
    }

    #[test]
    fn pagination_cap() {
        let p = processor(20, 50);
        assert_eq!(
            p.resolve_pagination(&parsed(Some(2), Some(100))),
            Some(Pagination { page: 2, page_size: 50 })
        );
        assert_eq!(
            p.resolve_pagination(&parsed(None, None)),
            Some(Pagination { page: 1, page_size: 20 })
        );
    }

    #[test]
    fn pagination_uncapped_and_disabled() {
        let p = processor(0, 0);
        assert_eq!(p.resolve_pagination(&parsed(None, None)), None);
        assert_eq!(
            p.resolve_pagination(&parsed(Some(3), Some(500))),
            Some(Pagination { page: 3, page_size: 500 })
        );
        assert_eq!(p.resolve_pagination(&parsed(Some(1), Some(-5))), None);
    }

    #[test]
    fn non_positive_page_becomes_first() {
        let p = processor(10, 0);
        assert_eq!(p.resolve_pagination(&parsed(Some(0), None)).map(|x| x.page), Some(1));
        assert_eq!(p.resolve_pagination(&parsed(Some(-2), None)).map(|x| x.page), Some(1));
    }

    #[test]
    fn phases_can_be_disabled() {
        let p = SieveProcessor::<Vec<String>>::builder(NoopAdapter)
            .field(Field::new("a").filterable().sortable())
            .default_page_size(5)
            .build();
        let model = SieveModel::new().filters("a==1").sorts("a");

        let mut q = Vec::new();
        p.apply(&model, &mut q, &Execution::default()).unwrap();
        assert_eq!(q, vec!["filter:1", "sort:1", "page:1:5"]);

        let mut q = Vec::new();
        let exec = Execution::new().filtering(false).pagination(false);
        p.apply(&model, &mut q, &exec).unwrap();
        assert_eq!(q, vec!["sort:1"]);
    }

    #[test]
    fn build_drops_duplicate_fields() {
        let p = SieveProcessor::<Vec<String>>::builder(NoopAdapter)
            .field(Field::new("Title").path("first").filterable())
            .field(Field::new("title").path("second").filterable())
            .build();
        assert_eq!(p.fields().len(), 1);
    }

    #[test]
    fn processor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SieveProcessor<Vec<String>, String>>();
    }
}
