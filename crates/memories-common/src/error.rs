//! Unified error type for the memories workspace.
//!
//! Store implementations, the database layer and the ingestion service all
//! report failures through [`Error`]. Per-asset failures inside a batch are
//! recorded rather than propagated; only [`Error::Unauthorized`] aborts one.

use std::fmt;

use crate::content::Collection;

/// Unified error type covering all failure modes in memories.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No authenticated session is available for a mutating operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Storing an asset in the object bucket failed.
    #[error("Upload failed for {path}: {message}")]
    UploadFailed {
        /// The bucket path that was being written.
        path: String,
        /// Human-readable error description.
        message: String,
    },

    /// Inserting a row that references an uploaded asset failed.
    #[error("Insert into {collection} failed: {message}")]
    InsertFailed {
        /// The collection the row was destined for.
        collection: Collection,
        /// Human-readable error description.
        message: String,
    },

    /// A bulk delete did not complete; no rows are reported as deleted.
    #[error("Bulk delete failed: {0}")]
    BulkDeleteFailed(String),

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "slider item", "user").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conflicting resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }

    /// Convenience constructor for [`Error::UploadFailed`].
    pub fn upload(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::UploadFailed {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Convenience constructor for [`Error::InsertFailed`].
    pub fn insert(collection: Collection, message: impl fmt::Display) -> Self {
        Error::InsertFailed {
            collection,
            message: message.to_string(),
        }
    }

    /// Whether the error means the caller has no valid session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
