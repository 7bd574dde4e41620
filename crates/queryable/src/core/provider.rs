//! The provider collaborator contract.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::warn;

use crate::error::QueryResult;
use crate::metadata::Entity;
use crate::query::Queryable;
use crate::types::QueryPage;

/// Window size used by streams when no settings say otherwise.
pub const DEFAULT_STREAM_PAGE_SIZE: i64 = 1000;

/// Executes descriptors against a remote service.
///
/// Transport, authentication and retries are the implementor's concern.
/// Cancelling a stream is dropping it.
///
/// # Example
///
/// ```ignore
/// use odata_queryable::core::QueryProvider;
///
/// async fn adults<P: QueryProvider<User>>(provider: &P, users: &Queryable<User>) -> QueryResult<Vec<User>> {
///     users.filter_by(|u| u.field("Age").ge(18))?.to_list(provider).await
/// }
/// ```
#[async_trait]
pub trait QueryProvider<E: Entity>: Send + Sync {
    /// Returns a human-readable name for this provider.
    fn provider_name(&self) -> &'static str;

    /// Fetches the single page described by the descriptor's window.
    async fn execute_query(&self, query: &Queryable<E>) -> QueryResult<QueryPage<E>>;

    /// Streams every item matching the descriptor.
    ///
    /// Defaults to [`paged_stream`] with the context's stream page size.
    fn stream_query<'a>(&'a self, query: &'a Queryable<E>) -> BoxStream<'a, QueryResult<E>> {
        let page_size = query.context().settings().stream_page_size;
        paged_stream(self, query, page_size)
    }
}

struct Cursor {
    skip: i64,
    remaining: Option<i64>,
    done: bool,
}

/// Streams a descriptor's results by repeatedly executing windows of
/// `page_size` items.
///
/// Starts at the descriptor's skip and stops once the descriptor's take is
/// reached, after a page without more results, after an empty page, or when
/// the next window start would overflow. An error from the provider is
/// yielded once and ends the stream.
pub fn paged_stream<'a, E, P>(
    provider: &'a P,
    query: &'a Queryable<E>,
    page_size: i64,
) -> BoxStream<'a, QueryResult<E>>
where
    E: Entity,
    P: QueryProvider<E> + ?Sized,
{
    let page_size = if page_size > 0 {
        page_size
    } else {
        DEFAULT_STREAM_PAGE_SIZE
    };
    let start = Cursor {
        skip: query.skip_value(),
        remaining: query.take_value(),
        done: false,
    };

    stream::unfold(start, move |cursor| async move {
        if cursor.done || cursor.remaining == Some(0) {
            return None;
        }

        let take = cursor
            .remaining
            .map_or(page_size, |remaining| remaining.min(page_size));
        let window = query.window(cursor.skip, Some(take));

        match provider.execute_query(&window).await {
            Err(err) => {
                let finished = Cursor {
                    done: true,
                    ..cursor
                };
                Some((stream::iter(vec![Err(err)]), finished))
            }
            Ok(mut page) => {
                page.items.truncate(usize::try_from(take).unwrap_or(usize::MAX));
                let fetched = page.items.len() as i64;
                if page.is_empty() && page.has_more {
                    warn!(
                        provider = provider.provider_name(),
                        entity = query.metadata().entity_name(),
                        skip = cursor.skip,
                        "Provider returned an empty page but reported more results, stopping"
                    );
                }
                let skip = cursor.skip.checked_add(fetched);
                let next = Cursor {
                    skip: skip.unwrap_or(i64::MAX),
                    remaining: cursor.remaining.map(|r| (r - fetched).max(0)),
                    done: !page.has_more || page.is_empty() || skip.is_none(),
                };
                let items: Vec<QueryResult<E>> = page.items.into_iter().map(Ok).collect();
                Some((stream::iter(items), next))
            }
        }
    })
    .flatten()
    .boxed()
}
