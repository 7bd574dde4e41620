//! Search-service dialect.
//!
//! The search service takes date/time literals unquoted and accepts a few
//! options outside the filter grammar: free-text search, the fields it
//! covers, how terms combine, and the query parser. Those options ride in a
//! descriptor's provider extras and are read back when a request is built.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::compiler::{FilterCompiler, LiteralFormatter, iso_8601};
use crate::config::DataSettings;
use crate::error::QueryResult;
use crate::metadata::{ContainerKind, Entity};
use crate::query::{QueryContext, Queryable};

const SEARCH_KEY: &str = "search";
const SEARCH_FIELDS_KEY: &str = "searchFields";
const SEARCH_MODE_KEY: &str = "searchMode";
const QUERY_TYPE_KEY: &str = "queryType";

/// Search-service literal rules: unquoted ISO-8601 date/times.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLiteralFormatter;

impl LiteralFormatter for SearchLiteralFormatter {
    fn name(&self) -> &'static str {
        "search"
    }

    fn format_date_time(&self, value: &DateTime<FixedOffset>) -> String {
        iso_8601(value)
    }
}

impl FilterCompiler {
    /// The search-service dialect.
    pub fn search() -> Self {
        Self::new(Arc::new(SearchLiteralFormatter))
    }
}

impl QueryContext {
    /// Creates a context for the search service.
    pub fn search(settings: DataSettings) -> Self {
        Self::new(FilterCompiler::search()).with_settings(settings)
    }
}

/// How search terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// A document matches if any term matches.
    Any,
    /// A document matches only if every term matches.
    All,
}

/// Which parser interprets the search text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Simple query syntax.
    Simple,
    /// Full Lucene syntax.
    Full,
    /// Semantic ranking.
    Semantic,
}

/// Search-service options on a descriptor.
pub trait SearchQueryExt: Sized {
    /// Sets the free-text search and the fields it covers (all searchable
    /// fields when empty).
    fn search<I, S>(&self, text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>;

    /// Sets how search terms combine.
    fn search_mode(&self, mode: SearchMode) -> Self;

    /// Sets the query parser.
    fn query_type(&self, query_type: QueryType) -> Self;
}

impl<E: Entity> SearchQueryExt for Queryable<E> {
    fn search<I, S>(&self, text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<JsonValue> = fields
            .into_iter()
            .map(|field| JsonValue::String(self.metadata().wire_name(field.as_ref())))
            .collect();
        self.with_extra(SEARCH_KEY, JsonValue::String(text.into()))
            .with_extra(SEARCH_FIELDS_KEY, JsonValue::Array(fields))
    }

    fn search_mode(&self, mode: SearchMode) -> Self {
        self.with_extra(SEARCH_MODE_KEY, serde_json::to_value(mode).unwrap_or_default())
    }

    fn query_type(&self, query_type: QueryType) -> Self {
        self.with_extra(
            QUERY_TYPE_KEY,
            serde_json::to_value(query_type).unwrap_or_default(),
        )
    }
}

/// Search-service options read back from provider extras.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Free-text search.
    pub search: Option<String>,
    /// Fields the search covers.
    pub search_fields: Vec<String>,
    /// How search terms combine.
    pub search_mode: Option<SearchMode>,
    /// Which parser interprets the search text.
    pub query_type: Option<QueryType>,
}

impl SearchOptions {
    /// Reads the options set through [`SearchQueryExt`]. Unrecognized or
    /// malformed entries are ignored.
    pub fn from_extras(extras: &BTreeMap<String, JsonValue>) -> Self {
        Self {
            search: extras
                .get(SEARCH_KEY)
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            search_fields: extras
                .get(SEARCH_FIELDS_KEY)
                .and_then(JsonValue::as_array)
                .map(|fields| {
                    fields
                        .iter()
                        .filter_map(JsonValue::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            search_mode: extras
                .get(SEARCH_MODE_KEY)
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            query_type: extras
                .get(QUERY_TYPE_KEY)
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }
}

/// A search request ready for transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Target index, resolved and lower-cased.
    #[serde(skip)]
    pub index: String,

    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Filter string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,

    /// Comma-joined sort keys.
    #[serde(rename = "orderby", skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// Comma-joined projection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<String>,

    /// Comma-joined search fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_fields: Option<String>,

    /// How search terms combine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,

    /// Which parser interprets the search text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_type: Option<QueryType>,

    /// Items to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,

    /// Items to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<i64>,

    /// Whether the service should report the total count.
    pub count: bool,
}

fn joined(items: &[String]) -> Option<String> {
    (!items.is_empty()).then(|| items.join(","))
}

impl SearchRequest {
    /// Describes the request for a descriptor.
    pub fn from_query<E: Entity>(query: &Queryable<E>) -> QueryResult<Self> {
        let index = query
            .metadata()
            .container_name(query.context().settings(), ContainerKind::SearchIndex)?;
        let options = SearchOptions::from_extras(query.extras());

        Ok(Self {
            index,
            search: options.search,
            filter: query.filter_string().map(str::to_string),
            order_by: joined(query.order()),
            select: joined(query.selected()),
            search_fields: joined(&options.search_fields),
            search_mode: options.search_mode,
            query_type: options.query_type,
            skip: (query.skip_value() > 0).then(|| query.skip_value()),
            top: query.take_value(),
            count: true,
        })
    }
}
