//! In-memory provider for exercising descriptor execution.
//!
//! [`RecordingProvider`] serves windows over a fixed item list without
//! evaluating filters, and records every descriptor it executes so tests can
//! assert on what would have gone over the wire.

use async_trait::async_trait;
use parking_lot::Mutex;

use odata_queryable::core::QueryProvider;
use odata_queryable::error::{ProviderError, QueryResult};
use odata_queryable::metadata::Entity;
use odata_queryable::query::Queryable;
use odata_queryable::types::QueryPage;

/// The parts of a descriptor a provider received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Filter string.
    pub filter: Option<String>,
    /// Sort keys.
    pub order: Vec<String>,
    /// Window start.
    pub skip: i64,
    /// Window size.
    pub take: Option<i64>,
}

/// A provider over an in-memory list.
pub struct RecordingProvider<E> {
    items: Vec<E>,
    calls: Mutex<Vec<RecordedCall>>,
    fail_at: Option<usize>,
    claim_more_when_empty: bool,
    repeating: bool,
}

impl<E: Entity + Clone> RecordingProvider<E> {
    /// Creates a provider serving `items`.
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items,
            calls: Mutex::new(Vec::new()),
            fail_at: None,
            claim_more_when_empty: false,
            repeating: false,
        }
    }

    /// Fails the call with the given zero-based index.
    pub fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    /// Reports more results even when a window is past the end.
    pub fn claiming_more_when_empty(mut self) -> Self {
        self.claim_more_when_empty = true;
        self
    }

    /// Serves every window from the first item and always reports more.
    pub fn repeating(mut self) -> Self {
        self.repeating = true;
        self
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl<E: Entity + Clone> QueryProvider<E> for RecordingProvider<E> {
    fn provider_name(&self) -> &'static str {
        "recording"
    }

    async fn execute_query(&self, query: &Queryable<E>) -> QueryResult<QueryPage<E>> {
        let index = {
            let mut calls = self.calls.lock();
            calls.push(RecordedCall {
                filter: query.filter_string().map(str::to_string),
                order: query.order().to_vec(),
                skip: query.skip_value(),
                take: query.take_value(),
            });
            calls.len() - 1
        };

        if self.fail_at == Some(index) {
            return Err(ProviderError::Unavailable {
                provider: "recording".to_string(),
                message: format!("call {} failed", index),
            }
            .into());
        }

        let len = self.items.len();
        let start = if self.repeating {
            0
        } else {
            (query.skip_value().max(0) as usize).min(len)
        };
        let end = query
            .take_value()
            .map_or(len, |take| (start + take.max(0) as usize).min(len));
        let items = self.items[start..end].to_vec();
        let has_more =
            self.repeating || end < len || (self.claim_more_when_empty && items.is_empty());

        Ok(QueryPage::new(items)
            .with_total(len as i64)
            .with_more(has_more))
    }
}
