//! Result envelopes and offset pagination.
//!
//! A provider answers every execution with a [`QueryPage`]. Callers paging
//! through results describe a window with [`PaginatedRequest`] and receive a
//! [`PaginatedResponse`] whose continuation token encodes the next window.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::error::{PaginationError, ValidationError};

/// One page of results returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPage<E> {
    /// The items in this page.
    pub items: Vec<E>,

    /// Total count of matching items, when the service reports it.
    pub total: Option<i64>,

    /// Whether more items follow this page.
    pub has_more: bool,
}

impl<E> QueryPage<E> {
    /// Creates a final page with no reported total.
    pub fn new(items: Vec<E>) -> Self {
        Self {
            items,
            total: None,
            has_more: false,
        }
    }

    /// Creates an empty final page.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Sets the total count.
    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    /// Sets the has-more flag.
    pub fn with_more(mut self, has_more: bool) -> Self {
        self.has_more = has_more;
        self
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> QueryPage<U>
    where
        F: FnMut(E) -> U,
    {
        QueryPage {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            has_more: self.has_more,
        }
    }
}

impl<E> Default for QueryPage<E> {
    fn default() -> Self {
        Self::empty()
    }
}

/// An offset window into a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedRequest {
    /// Items to skip.
    #[serde(rename = "s", default)]
    pub skip: i64,

    /// Items to return.
    #[serde(rename = "t", default = "default_take")]
    pub take: i64,
}

fn default_take() -> i64 {
    20
}

impl Default for PaginatedRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            take: default_take(),
        }
    }
}

impl PaginatedRequest {
    /// Creates a window.
    pub fn new(skip: i64, take: i64) -> Self {
        Self { skip, take }
    }

    /// Creates the first window of the given size.
    pub fn first(take: i64) -> Self {
        Self { skip: 0, take }
    }

    /// Checks both bounds are non-negative and the window end is
    /// representable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.skip < 0 {
            return Err(ValidationError::InvalidArgument {
                argument: "skip",
                message: format!("must not be negative, got {}", self.skip),
            });
        }
        if self.take < 0 {
            return Err(ValidationError::InvalidArgument {
                argument: "take",
                message: format!("must not be negative, got {}", self.take),
            });
        }
        if self.next().is_none() {
            return Err(ValidationError::InvalidArgument {
                argument: "skip",
                message: format!("window {} + {} overflows", self.skip, self.take),
            });
        }
        Ok(())
    }

    /// Returns the window following this one, or `None` when its start
    /// overflows.
    pub fn next(&self) -> Option<Self> {
        Some(Self {
            skip: self.skip.checked_add(self.take)?,
            take: self.take,
        })
    }

    /// Encodes the window as an opaque continuation token.
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(&json)
    }

    /// Decodes a continuation token.
    pub fn decode(token: &str) -> Result<Self, PaginationError> {
        let invalid = || PaginationError::InvalidToken {
            token: token.to_string(),
        };
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        serde_json::from_slice(&bytes).map_err(|_| invalid())
    }
}

/// A page of results for a [`PaginatedRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    /// Whether more items follow this page.
    #[serde(rename = "hm")]
    pub has_more: bool,

    /// Token for the next window, present when `has_more` is set.
    #[serde(rename = "ct", skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,

    /// Skip of the window that produced this page.
    #[serde(rename = "s")]
    pub skip: i64,

    /// Take of the window that produced this page.
    #[serde(rename = "t")]
    pub take: i64,

    /// Total count of matching items, when reported.
    #[serde(rename = "tt", skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,

    /// The items in this page.
    pub items: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// Wraps a provider page answering `request`.
    pub fn from_page(request: &PaginatedRequest, page: QueryPage<T>) -> Self {
        let continuation_token = request
            .next()
            .filter(|_| page.has_more)
            .map(|next| next.encode());
        Self {
            has_more: page.has_more,
            continuation_token,
            skip: request.skip,
            take: request.take,
            total: page.total,
            items: page.items,
        }
    }

    /// Returns the window this page answered.
    pub fn request(&self) -> PaginatedRequest {
        PaginatedRequest::new(self.skip, self.take)
    }

    /// Returns the following window. Depends only on this page's window,
    /// not on how many items came back.
    pub fn next_page(&self) -> Option<PaginatedRequest> {
        self.request().next()
    }

    /// Maps the items to a different type.
    pub fn map<U, F>(self, f: F) -> PaginatedResponse<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResponse {
            has_more: self.has_more,
            continuation_token: self.continuation_token,
            skip: self.skip,
            take: self.take,
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}
