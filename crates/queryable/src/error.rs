//! Error types for the query layer.
//!
//! Errors are grouped by concern: compiling predicates, validating descriptor
//! arguments, resolving entity metadata, decoding pagination tokens, and
//! failures reported by provider collaborators. [`QueryError`] wraps them all.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::expr::ComparisonOp;

/// The primary error type for all query operations.
#[derive(Error, Debug)]
pub enum QueryError {
    /// Predicate compilation errors
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// Argument validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Entity metadata errors
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Pagination token errors
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// Errors raised by a provider while executing a query
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Errors raised while translating a predicate into a filter string.
///
/// Compilation is all-or-nothing per clause: when any of these is returned,
/// no partial filter text escapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The expression shape has no translation in the filter grammar.
    #[error("unsupported expression: {kind}")]
    UnsupportedExpression { kind: String },

    /// A constant's runtime type has no literal rendering rule.
    #[error("unsupported literal type {type_name} compared with {field}")]
    UnsupportedType {
        field: String,
        type_name: &'static str,
    },

    /// Comparisons against null are not expressible in the filter grammar.
    #[error("null values comparison is not supported: {field}")]
    UnsupportedComparison { field: String },

    /// Substitute keys only accept equality checks against non-string values.
    #[error("only eq and ne are supported on key field {field}, got {operator}")]
    KeyOperationNotSupported {
        field: String,
        operator: ComparisonOp,
    },

    /// The value does not name a member of the field's enumeration.
    #[error("value {value} is not a member of enum {enum_type}")]
    UnknownEnumMember { enum_type: String, value: String },
}

impl CompileError {
    /// Creates an unsupported-expression error for the given node kind.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        CompileError::UnsupportedExpression { kind: kind.into() }
    }
}

/// Errors related to descriptor arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An argument is outside its accepted range.
    #[error("invalid argument {argument}: {message}")]
    InvalidArgument {
        argument: &'static str,
        message: String,
    },

    /// The target service cannot honor part of the descriptor.
    #[error("{provider} does not support {feature}")]
    UnsupportedByProvider {
        provider: &'static str,
        feature: &'static str,
    },
}

/// Errors related to entity metadata and container names.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// The entity declares no index or table name.
    #[error("entity {entity} does not declare a container name")]
    MissingContainer { entity: String },

    /// A `%setting%` container reference names an absent setting.
    #[error("container setting '{key}' is not configured")]
    MissingSetting { key: String },

    /// Metadata for the entity was registered before.
    #[error("metadata for entity {entity} is already registered")]
    AlreadyRegistered { entity: String },
}

/// Errors related to pagination tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// The continuation token could not be decoded.
    #[error("invalid continuation token: {token}")]
    InvalidToken { token: String },
}

/// Errors reported by provider collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The remote service rejected or failed the request.
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// The remote service could not be reached.
    #[error("{provider} unavailable: {message}")]
    Unavailable { provider: String, message: String },
}

/// Result type alias for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
