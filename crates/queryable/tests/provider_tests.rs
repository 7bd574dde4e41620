//! Provider execution integration tests.
//!
//! These tests drive the execution helpers and the default paged stream
//! against the recording provider.

mod common;

use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};

use common::*;
use odata_queryable::core::{DEFAULT_STREAM_PAGE_SIZE, QueryProvider, paged_stream};
use odata_queryable::error::{ProviderError, QueryError};
use odata_queryable::query::QueryContext;

// ============================================================================
// Single Page Helpers
// ============================================================================

#[tokio::test]
async fn test_first_or_default_takes_one() {
    let provider = RecordingProvider::new(users(3));
    let query = search_context()
        .query::<User>()
        .filter_by(|u| u.field("Country").eq("US"))
        .unwrap()
        .skip(1)
        .unwrap();

    let first = query.first_or_default(&provider).await.unwrap();
    assert_eq!(first.map(|u| u.id), Some(2));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].skip, 1);
    assert_eq!(calls[0].take, Some(1));
    assert_eq!(calls[0].filter.as_deref(), Some("(country eq 'US')"));
}

#[tokio::test]
async fn test_first_or_default_on_empty() {
    let provider = RecordingProvider::<User>::new(Vec::new());
    let first = search_context()
        .query::<User>()
        .first_or_default(&provider)
        .await
        .unwrap();
    assert!(first.is_none());
}

#[tokio::test]
async fn test_execute_query_passes_descriptor() {
    let provider = RecordingProvider::new(users(4));
    let query = search_context()
        .query::<User>()
        .order_by_descending("Age")
        .take(3)
        .unwrap();

    let page = provider.execute_query(&query).await.unwrap();
    assert_eq!(page.len(), 3);
    assert!(page.has_more);
    assert_eq!(page.total, Some(4));
    assert_eq!(provider.calls()[0].order, vec!["age desc".to_string()]);
}

// ============================================================================
// Streaming
// ============================================================================

#[tokio::test]
async fn test_stream_fetches_default_windows() {
    let provider = RecordingProvider::new(users(2500));
    let all = search_context()
        .query::<User>()
        .to_list(&provider)
        .await
        .unwrap();

    assert_eq!(all.len(), 2500);
    assert_eq!(all.last().map(|u| u.id), Some(2500));

    let windows: Vec<_> = provider
        .calls()
        .iter()
        .map(|c| (c.skip, c.take))
        .collect();
    assert_eq!(
        windows,
        vec![
            (0, Some(DEFAULT_STREAM_PAGE_SIZE)),
            (1000, Some(DEFAULT_STREAM_PAGE_SIZE)),
            (2000, Some(DEFAULT_STREAM_PAGE_SIZE)),
        ]
    );
}

#[tokio::test]
async fn test_stream_honors_skip_and_take() {
    let provider = RecordingProvider::new(users(50));
    let query = search_context()
        .query::<User>()
        .skip(5)
        .unwrap()
        .take(12)
        .unwrap();

    let ids: Vec<u32> = paged_stream(&provider, &query, 5)
        .map_ok(|u| u.id)
        .try_collect()
        .await
        .unwrap();

    assert_eq!(ids, (6..=17).collect::<Vec<_>>());
    let windows: Vec<_> = provider
        .calls()
        .iter()
        .map(|c| (c.skip, c.take))
        .collect();
    assert_eq!(windows, vec![(5, Some(5)), (10, Some(5)), (15, Some(2))]);
}

#[tokio::test]
async fn test_stream_uses_configured_page_size() {
    let provider = RecordingProvider::new(users(7));
    let context = Arc::new(QueryContext::search(settings().with_stream_page_size(3)));
    let all = context.query::<User>().to_list(&provider).await.unwrap();
    assert_eq!(all.len(), 7);
    assert_eq!(provider.calls().len(), 3);
}

#[tokio::test]
async fn test_stream_yields_error_once_then_ends() {
    let provider = RecordingProvider::new(users(30)).failing_at(1);
    let query = search_context().query::<User>();

    let results: Vec<_> = paged_stream(&provider, &query, 10).collect().await;

    assert_eq!(results.len(), 11);
    assert!(results[..10].iter().all(Result::is_ok));
    assert!(matches!(
        results[10],
        Err(QueryError::Provider(ProviderError::Unavailable { .. }))
    ));
    assert_eq!(provider.calls().len(), 2);
}

#[tokio::test]
async fn test_to_list_surfaces_provider_error() {
    let provider = RecordingProvider::new(users(3)).failing_at(0);
    let err = search_context()
        .query::<User>()
        .to_list(&provider)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Provider(_)));
}

#[tokio::test]
async fn test_stream_stops_on_empty_page_claiming_more() {
    let provider = RecordingProvider::<User>::new(Vec::new()).claiming_more_when_empty();
    let query = search_context().query::<User>();

    let items: Vec<_> = query.stream(&provider).collect().await;
    assert!(items.is_empty());
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn test_stream_ends_when_next_window_overflows() {
    let provider = RecordingProvider::new(users(10)).repeating();
    let query = search_context()
        .query::<User>()
        .skip(i64::MAX - 3)
        .unwrap();

    let results: Vec<_> = paged_stream(&provider, &query, 5).collect().await;

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(Result::is_ok));
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].skip, i64::MAX - 3);
}

#[tokio::test]
async fn test_stream_with_zero_take_makes_no_calls() {
    let provider = RecordingProvider::new(users(3));
    let query = search_context().query::<User>().take(0).unwrap();

    let items: Vec<_> = query.stream(&provider).collect().await;
    assert!(items.is_empty());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_dropping_stream_stops_fetching() {
    let provider = RecordingProvider::new(users(100));
    let query = search_context().query::<User>();

    let first_three: Vec<_> = paged_stream(&provider, &query, 10)
        .take(3)
        .collect()
        .await;
    assert_eq!(first_three.len(), 3);
    assert_eq!(provider.calls().len(), 1);
}
