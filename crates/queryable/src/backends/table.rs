//! Table-storage dialect.
//!
//! Table storage types its literals (`datetime'...'`, `42L`, `2.0`), keeps
//! every row identity in string `PartitionKey`/`RowKey` columns, and cannot
//! sort. The dialect installs [`OrdinalComparison`] for string range filters
//! and stringifies constants compared with substitute key fields.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::compiler::{FilterCompiler, LiteralFormatter, OrdinalComparison, iso_8601};
use crate::config::DataSettings;
use crate::error::{QueryResult, ValidationError};
use crate::metadata::{ContainerKind, Entity, KeyRole};
use crate::query::{QueryContext, Queryable};

const PROVIDER: &str = "table storage";

/// Table-storage literal rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLiteralFormatter;

impl LiteralFormatter for TableLiteralFormatter {
    fn name(&self) -> &'static str {
        "table"
    }

    fn format_date_time(&self, value: &DateTime<FixedOffset>) -> String {
        format!("datetime'{}'", iso_8601(value))
    }

    fn format_long(&self, value: i64) -> String {
        format!("{}L", value)
    }

    fn format_double(&self, value: f64) -> String {
        let text = value.to_string();
        if text.contains(['.', 'e', 'E']) {
            text
        } else {
            format!("{}.0", text)
        }
    }

    // Table storage has no literal for non-finite doubles.
    fn format_non_finite(&self, _value: f64) -> Option<String> {
        None
    }
}

impl FilterCompiler {
    /// The table-storage dialect.
    pub fn table() -> Self {
        Self::new(Arc::new(TableLiteralFormatter))
            .with_extension(Arc::new(OrdinalComparison))
            .with_key_stringification(true)
    }
}

impl QueryContext {
    /// Creates a context for table storage.
    pub fn table(settings: DataSettings) -> Self {
        Self::new(FilterCompiler::table()).with_settings(settings)
    }
}

/// A table query ready for transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRequest {
    /// Target table.
    pub table: String,

    /// Filter compiled from the descriptor.
    pub filter: Option<String>,

    /// Projected columns.
    pub select: Vec<String>,

    /// Items to return.
    pub top: Option<i64>,

    /// Items to skip. The service has no skip, so providers apply it while
    /// reading segments.
    pub skip: i64,

    /// Partition key every row of the entity shares, if declared.
    pub partition_key: Option<String>,

    /// Row key every row of the entity shares, if declared.
    pub row_key: Option<String>,
}

impl TableRequest {
    /// Describes the request for a descriptor.
    ///
    /// Fails with [`ValidationError::UnsupportedByProvider`] when the
    /// descriptor has sort keys.
    pub fn from_query<E: Entity>(query: &Queryable<E>) -> QueryResult<Self> {
        if !query.order().is_empty() {
            return Err(ValidationError::UnsupportedByProvider {
                provider: PROVIDER,
                feature: "ordering",
            }
            .into());
        }

        let metadata = query.metadata();
        let table = metadata.container_name(query.context().settings(), ContainerKind::Table)?;

        Ok(Self {
            table,
            filter: query.filter_string().map(str::to_string),
            select: query.selected().to_vec(),
            top: query.take_value(),
            skip: query.skip_value(),
            partition_key: metadata.partition_key().map(str::to_string),
            row_key: metadata.row_key().map(str::to_string),
        })
    }

    /// Returns the clause pinning the declared fixed keys, if any.
    pub fn key_filter(&self) -> Option<String> {
        let formatter = TableLiteralFormatter;
        let clauses: Vec<String> = [
            (KeyRole::Partition, &self.partition_key),
            (KeyRole::Row, &self.row_key),
        ]
        .into_iter()
        .filter_map(|(role, value)| {
            value.as_ref().map(|v| {
                format!("{} eq {}", role.storage_name(), formatter.format_string(v))
            })
        })
        .collect();

        (!clauses.is_empty()).then(|| clauses.join(" and "))
    }

    /// Returns the filter to send: the fixed-key clause AND-combined with
    /// the descriptor's filter.
    pub fn effective_filter(&self) -> Option<String> {
        match (self.key_filter(), &self.filter) {
            (Some(keys), Some(filter)) => Some(format!("({}) and {}", keys, filter)),
            (Some(keys), None) => Some(keys),
            (None, filter) => filter.clone(),
        }
    }
}
