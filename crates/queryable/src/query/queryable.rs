//! The query descriptor.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::TryStreamExt;
use futures::stream::BoxStream;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::core::QueryProvider;
use crate::error::{QueryResult, ValidationError};
use crate::expr::{Expr, Param, Predicate};
use crate::metadata::{Entity, EntityMetadata};
use crate::types::{PaginatedRequest, PaginatedResponse};

use super::context::QueryContext;

/// An immutable description of a query over `E`.
///
/// Every operation returns a new descriptor and leaves the receiver
/// untouched, so a descriptor can serve as the shared base of several
/// chains. A failed operation returns an error and produces nothing.
pub struct Queryable<E> {
    context: Arc<QueryContext>,
    metadata: Arc<EntityMetadata>,
    filter: Option<String>,
    order: Vec<String>,
    select: Vec<String>,
    skip: i64,
    take: Option<i64>,
    extras: BTreeMap<String, JsonValue>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Queryable<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            metadata: self.metadata.clone(),
            filter: self.filter.clone(),
            order: self.order.clone(),
            select: self.select.clone(),
            skip: self.skip,
            take: self.take,
            extras: self.extras.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Queryable<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queryable")
            .field("entity", &self.metadata.entity_name())
            .field("filter", &self.filter)
            .field("order", &self.order)
            .field("select", &self.select)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("extras", &self.extras)
            .finish()
    }
}

impl<E: Entity> Queryable<E> {
    pub(crate) fn new(context: Arc<QueryContext>, metadata: Arc<EntityMetadata>) -> Self {
        Self {
            context,
            metadata,
            filter: None,
            order: Vec::new(),
            select: Vec::new(),
            skip: 0,
            take: None,
            extras: BTreeMap::new(),
            _entity: PhantomData,
        }
    }

    /// Adds a filter clause, AND-combined with any existing filter.
    pub fn filter(&self, predicate: &Predicate) -> QueryResult<Self> {
        let clause = self
            .context
            .compiler()
            .compile(&self.metadata, predicate)?;

        let mut next = self.clone();
        next.filter = Some(match &self.filter {
            Some(existing) => format!("{} and ({})", existing, clause),
            None => format!("({})", clause),
        });
        debug!(
            entity = self.metadata.entity_name(),
            clause = %clause,
            "Added filter clause"
        );
        Ok(next)
    }

    /// Builds a predicate over the entity and adds it as a filter clause.
    ///
    /// The entity parameter handed to `build` is fresh, so quantifier
    /// elements the caller creates never alias it, whatever their names.
    pub fn filter_by(&self, build: impl FnOnce(&Param) -> Expr) -> QueryResult<Self> {
        self.filter(&Predicate::build("e", build))
    }

    /// Appends an ascending sort key.
    pub fn order_by(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.order.push(self.metadata.wire_name(field));
        next
    }

    /// Appends a descending sort key.
    pub fn order_by_descending(&self, field: &str) -> Self {
        let mut next = self.clone();
        next.order
            .push(format!("{} desc", self.metadata.wire_name(field)));
        next
    }

    /// Appends sort keys already expressed in wire syntax.
    pub fn order_by_names<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.order.extend(names.into_iter().map(Into::into));
        next
    }

    /// Appends fields to the projection.
    pub fn select<I, S>(&self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut next = self.clone();
        next.select.extend(
            fields
                .into_iter()
                .map(|field| self.metadata.wire_name(field.as_ref())),
        );
        next
    }

    /// Sets how many items to skip.
    pub fn skip(&self, count: i64) -> QueryResult<Self> {
        if count < 0 {
            return Err(ValidationError::InvalidArgument {
                argument: "skip",
                message: format!("must not be negative, got {}", count),
            }
            .into());
        }
        let mut next = self.clone();
        next.skip = count;
        Ok(next)
    }

    /// Sets how many items to return.
    pub fn take(&self, count: i64) -> QueryResult<Self> {
        if count < 0 {
            return Err(ValidationError::InvalidArgument {
                argument: "take",
                message: format!("must not be negative, got {}", count),
            }
            .into());
        }
        let mut next = self.clone();
        next.take = Some(count);
        Ok(next)
    }

    /// Sets a provider-specific option.
    pub fn with_extra(&self, key: impl Into<String>, value: JsonValue) -> Self {
        let mut next = self.clone();
        next.extras.insert(key.into(), value);
        next
    }

    /// Returns the compiled filter, if any clause was added.
    pub fn filter_string(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Returns the sort keys in application order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns the projected fields.
    pub fn selected(&self) -> &[String] {
        &self.select
    }

    /// Returns the number of items to skip.
    pub fn skip_value(&self) -> i64 {
        self.skip
    }

    /// Returns the number of items to return, or `None` for all.
    pub fn take_value(&self) -> Option<i64> {
        self.take
    }

    /// Returns the provider-specific options.
    pub fn extras(&self) -> &BTreeMap<String, JsonValue> {
        &self.extras
    }

    /// Returns the entity metadata.
    pub fn metadata(&self) -> &EntityMetadata {
        &self.metadata
    }

    /// Returns the context this descriptor was created from.
    pub fn context(&self) -> &Arc<QueryContext> {
        &self.context
    }

    /// Returns a copy with the window replaced. Both bounds are trusted.
    pub(crate) fn window(&self, skip: i64, take: Option<i64>) -> Self {
        let mut next = self.clone();
        next.skip = skip;
        next.take = take;
        next
    }

    /// Executes the query for at most one item.
    pub async fn first_or_default<P>(&self, provider: &P) -> QueryResult<Option<E>>
    where
        P: QueryProvider<E> + ?Sized,
    {
        let page = provider
            .execute_query(&self.window(self.skip, Some(1)))
            .await?;
        Ok(page.items.into_iter().next())
    }

    /// Streams every matching item into a vector.
    pub async fn to_list<P>(&self, provider: &P) -> QueryResult<Vec<E>>
    where
        P: QueryProvider<E> + ?Sized,
    {
        provider.stream_query(self).try_collect().await
    }

    /// Executes the window described by `request`.
    ///
    /// The request's skip and take replace the descriptor's.
    pub async fn to_page<P>(
        &self,
        provider: &P,
        request: &PaginatedRequest,
    ) -> QueryResult<PaginatedResponse<E>>
    where
        P: QueryProvider<E> + ?Sized,
    {
        request.validate()?;
        let page = provider
            .execute_query(&self.window(request.skip, Some(request.take)))
            .await?;
        Ok(PaginatedResponse::from_page(request, page))
    }

    /// Executes the first window, sized by the context's default page size.
    pub async fn to_first_page<P>(&self, provider: &P) -> QueryResult<PaginatedResponse<E>>
    where
        P: QueryProvider<E> + ?Sized,
    {
        let request = self.context.settings().first_page();
        self.to_page(provider, &request).await
    }

    /// Streams every matching item.
    pub fn stream<'a, P>(&'a self, provider: &'a P) -> BoxStream<'a, QueryResult<E>>
    where
        P: QueryProvider<E> + ?Sized,
    {
        provider.stream_query(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::FilterCompiler;
    use crate::metadata::FieldMetadata;

    struct Person;

    impl Entity for Person {
        fn metadata() -> EntityMetadata {
            EntityMetadata::new("Person")
                .with_field(FieldMetadata::new("Age").renamed("age"))
                .with_field(FieldMetadata::new("Name").renamed("name"))
        }
    }

    fn base() -> Queryable<Person> {
        Arc::new(QueryContext::new(FilterCompiler::odata())).query::<Person>()
    }

    #[test]
    fn test_filters_accumulate_with_and() {
        let q = base()
            .filter_by(|p| p.field("Age").gt(1))
            .unwrap()
            .filter_by(|p| p.field("Name").eq("x"))
            .unwrap();
        assert_eq!(q.filter_string(), Some("(age gt 1) and (name eq 'x')"));
    }

    #[test]
    fn test_operations_do_not_touch_receiver() {
        let q = base().order_by("Age");
        let before_order = q.order().to_vec();
        let derived = q.order_by_descending("Name").select(["Name"]);
        assert_eq!(q.order(), before_order.as_slice());
        assert!(q.selected().is_empty());
        assert_eq!(derived.order(), ["age", "name desc"]);
        assert_eq!(derived.selected(), ["name"]);
    }

    #[test]
    fn test_failed_filter_leaves_no_trace() {
        let q = base().filter_by(|p| p.field("Age").ge(18)).unwrap();
        let err = q.filter_by(|p| p.field("Age").eq(p.field("Name")));
        assert!(err.is_err());
        assert_eq!(q.filter_string(), Some("(age ge 18)"));
    }

    #[test]
    fn test_negative_window_rejected() {
        assert!(matches!(
            base().skip(-1),
            Err(crate::error::QueryError::Validation(
                ValidationError::InvalidArgument { argument: "skip", .. }
            ))
        ));
        assert!(matches!(
            base().take(-1),
            Err(crate::error::QueryError::Validation(
                ValidationError::InvalidArgument { argument: "take", .. }
            ))
        ));
        let q = base().skip(5).unwrap().take(0).unwrap();
        assert_eq!(q.skip_value(), 5);
        assert_eq!(q.take_value(), Some(0));
    }

    #[test]
    fn test_extras_and_raw_order() {
        let q = base()
            .with_extra("searchMode", serde_json::json!("all"))
            .order_by_names(["search.score() desc"]);
        assert_eq!(q.extras().get("searchMode"), Some(&serde_json::json!("all")));
        assert_eq!(q.order(), ["search.score() desc"]);
    }
}
