//! Error types for GraphDoc core.

use graphdoc_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in GraphDoc core operations.
///
/// "Not found" is never an error: lookups return `Option` and removals
/// return `bool`. Validation errors are raised before any statement is
/// sent to the engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage engine error, including engine-level constraint violations.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A filter key or sort field contains characters outside `[A-Za-z0-9_.]`.
    #[error("invalid field name: {name:?}")]
    InvalidFieldName {
        /// The rejected name.
        name: String,
    },

    /// A payload is not a JSON object.
    #[error("invalid document: {reason}")]
    InvalidDocument {
        /// Why the payload was rejected.
        reason: String,
    },

    /// A document or record id is unusable.
    #[error("invalid id: {reason}")]
    InvalidId {
        /// Why the id was rejected.
        reason: String,
    },

    /// Query options are inconsistent.
    #[error("invalid query options: {message}")]
    InvalidQueryOptions {
        /// Description of the problem.
        message: String,
    },

    /// A required collaborator is not configured.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of what is missing.
        message: String,
    },

    /// A `$`-prefixed key is not a known filter operator (strict filters only).
    #[error("unknown filter operator: {operator}")]
    UnknownOperator {
        /// The unrecognized key.
        operator: String,
    },

    /// The injected similarity matcher failed.
    #[error("matcher failed: {message}")]
    Matcher {
        /// Failure reported by the matcher.
        message: String,
    },

    /// A stored payload does not decode as the expected record.
    #[error("corrupted record {id:?} in collection {collection}: {message}")]
    Corrupted {
        /// Collection holding the record.
        collection: String,
        /// Id of the record.
        id: String,
        /// Decoder message.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid field name error.
    pub fn invalid_field_name(name: impl Into<String>) -> Self {
        Self::InvalidFieldName { name: name.into() }
    }

    /// Creates an invalid document error.
    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// Creates an invalid id error.
    pub fn invalid_id(reason: impl Into<String>) -> Self {
        Self::InvalidId {
            reason: reason.into(),
        }
    }

    /// Creates an invalid query options error.
    pub fn invalid_query_options(message: impl Into<String>) -> Self {
        Self::InvalidQueryOptions {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a matcher failure.
    pub fn matcher(message: impl Into<String>) -> Self {
        Self::Matcher {
            message: message.into(),
        }
    }

    /// Returns true for errors raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFieldName { .. }
                | Self::InvalidDocument { .. }
                | Self::InvalidId { .. }
                | Self::InvalidQueryOptions { .. }
                | Self::UnknownOperator { .. }
        )
    }
}
