//! Data-access settings.
//!
//! Settings carry the service endpoints handed to provider collaborators, the
//! page sizes used by descriptor execution helpers, and the table used to
//! resolve `%setting%` container-name references.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ODATA_SEARCH_ENDPOINT` | (none) | Search service endpoint |
//! | `ODATA_SEARCH_API_KEY` | (none) | Search service API key |
//! | `ODATA_STORAGE_CONNECTION_STRING` | (none) | Table storage connection string |
//! | `ODATA_DEFAULT_PAGE_SIZE` | 20 | Size of the first page when a caller names none |
//! | `ODATA_STREAM_PAGE_SIZE` | 1000 | Window size used by paged streams |
//! | `ODATA_NAME_<KEY>` | (none) | Container name for the `%<key>%` reference |
//!
//! # Example
//!
//! ```rust
//! use odata_queryable::DataSettings;
//!
//! let settings = DataSettings::default().with_name("UsersIndex", "Users-Prod");
//! assert_eq!(settings.resolve_name("%UsersIndex%").unwrap(), "Users-Prod");
//! assert_eq!(settings.resolve_name("orders").unwrap(), "orders");
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MetadataError;
use crate::types::PaginatedRequest;

const NAME_PREFIX: &str = "ODATA_NAME_";

/// Settings shared by query descriptors and provider collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Search service endpoint.
    pub search_endpoint: Option<String>,

    /// Search service API key.
    pub search_api_key: Option<String>,

    /// Table storage connection string.
    pub storage_connection_string: Option<String>,

    /// Size of the window returned by [`first_page`](Self::first_page).
    pub default_page_size: i64,

    /// Window size fetched per round trip by paged streams.
    pub stream_page_size: i64,

    /// Container names keyed by setting key.
    pub names: HashMap<String, String>,
}

fn default_page_size() -> i64 {
    20
}

fn default_stream_page_size() -> i64 {
    1000
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            search_endpoint: None,
            search_api_key: None,
            storage_connection_string: None,
            default_page_size: default_page_size(),
            stream_page_size: default_stream_page_size(),
            names: HashMap::new(),
        }
    }
}

impl DataSettings {
    /// Creates settings from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Creates settings from an explicit variable list.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut settings = Self::default();
        for (key, value) in vars {
            match key.as_str() {
                "ODATA_SEARCH_ENDPOINT" => settings.search_endpoint = Some(value),
                "ODATA_SEARCH_API_KEY" => settings.search_api_key = Some(value),
                "ODATA_STORAGE_CONNECTION_STRING" => {
                    settings.storage_connection_string = Some(value)
                }
                "ODATA_DEFAULT_PAGE_SIZE" => {
                    settings.default_page_size = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .unwrap_or_else(default_page_size)
                }
                "ODATA_STREAM_PAGE_SIZE" => {
                    settings.stream_page_size = value
                        .parse()
                        .ok()
                        .filter(|n| *n > 0)
                        .unwrap_or_else(default_stream_page_size)
                }
                other => {
                    if let Some(name_key) = other.strip_prefix(NAME_PREFIX) {
                        if !name_key.is_empty() {
                            settings.names.insert(name_key.to_string(), value);
                        }
                    }
                }
            }
        }
        settings
    }

    /// Adds a container name under a setting key.
    pub fn with_name(mut self, key: impl Into<String>, name: impl Into<String>) -> Self {
        self.names.insert(key.into(), name.into());
        self
    }

    /// Sets the stream window size.
    pub fn with_stream_page_size(mut self, size: i64) -> Self {
        self.stream_page_size = size;
        self
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, size: i64) -> Self {
        self.default_page_size = size;
        self
    }

    /// Returns the first window of [`default_page_size`](Self::default_page_size)
    /// items. A non-positive size falls back to 20.
    pub fn first_page(&self) -> PaginatedRequest {
        let take = if self.default_page_size > 0 {
            self.default_page_size
        } else {
            default_page_size()
        };
        PaginatedRequest::first(take)
    }

    /// Resolves a declared container name.
    ///
    /// Names starting with `%` are setting references: the surrounding `%`
    /// characters are trimmed and the remainder looked up in [`names`](Self::names).
    /// Other names are returned as declared.
    pub fn resolve_name(&self, declared: &str) -> Result<String, MetadataError> {
        if !declared.starts_with('%') {
            return Ok(declared.to_string());
        }
        let key = declared.trim_matches('%');
        self.names
            .get(key)
            .cloned()
            .ok_or_else(|| MetadataError::MissingSetting {
                key: key.to_string(),
            })
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.default_page_size <= 0 {
            errors.push("Default page size must be positive".to_string());
        }

        if self.stream_page_size <= 0 {
            errors.push("Stream page size must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
