//! Error types and result types for document store operations.
//!
//! Use [`StoreResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when talking to a document store.
///
/// This enum covers serialization failures, connection setup, value shape
/// problems, filter derivation, and backend rejections.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Failed to establish or verify a connection to the store.
    #[error("Connection error: {0}")]
    Connection(String),
    /// The value has the wrong shape for the operation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A field named as an upsert filter does not exist on the document.
    #[error("Field not found: {0}")]
    FieldNotFound(String),
    /// The store rejected an operation, or the operation timed out.
    #[error("Persistence error: {0}")]
    Persistence(String),
    /// The operation is deliberately not supported by this backend.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

/// A specialized `Result` type for document store operations.
///
/// This type alias is used throughout the crate to indicate operations that may fail
/// with a [`StoreError`].
pub type StoreResult<T> = Result<T, StoreError>;

impl From<BsonError> for StoreError {
    fn from(err: BsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for StoreError {
    fn from(err: SerdeJsonError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
