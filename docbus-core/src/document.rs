//! Core traits and types for document representation and serialization.
//!
//! This module provides the fundamental trait that all stored documents must implement,
//! as well as utilities for converting documents between formats (BSON, JSON).

use bson::{Bson, de::deserialize_from_bson, ser::serialize_to_bson};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::{StoreError, StoreResult};

/// Core trait that all persisted document types must implement.
///
/// The only requirement beyond serde support is naming the collection the type
/// routes to. Prefer `#[derive(Document)]` from the facade crate, which also
/// wires the type into the shape mapper; a manual implementation needs a
/// matching [`ToDocuments`](crate::mapper::ToDocuments) leaf impl to be usable
/// with the store.
///
/// # Example
///
/// ```ignore
/// use docbus_core::document::Document;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// pub struct User {
///     pub name: String,
///     pub email: String,
/// }
///
/// impl Document for User {
///     fn collection_name() -> &'static str {
///         "User"
///     }
/// }
/// ```
pub trait Document: Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static {
    /// Returns the name of the collection this document belongs to.
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization/deserialization utilities for documents.
///
/// This trait is automatically implemented for all types that implement [`Document`].
/// It provides convenient methods to convert documents to and from BSON and JSON.
pub trait DocumentExt: Document {
    /// Converts this document to a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_bson(&self) -> StoreResult<Bson>;

    /// Creates a document from a BSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_bson(bson: Bson) -> StoreResult<Self>;

    /// Converts this document to a flat BSON document ready for persistence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails, or if the value serializes to
    /// something other than a document (a bare scalar, for example).
    fn to_document(&self) -> StoreResult<bson::Document>;

    /// Creates a document from a raw BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_document(document: bson::Document) -> StoreResult<Self>;

    /// Converts this document to a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> StoreResult<Value>;

    /// Creates a document from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> StoreResult<Self>;
}

impl<D: Document> DocumentExt for D {
    fn to_bson(&self) -> StoreResult<Bson> {
        Ok(serialize_to_bson(self)?)
    }

    fn from_bson(bson: Bson) -> StoreResult<Self> {
        Ok(deserialize_from_bson(bson)?)
    }

    fn to_document(&self) -> StoreResult<bson::Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            _ => Err(StoreError::InvalidDocument(
                "value did not serialize to a document".to_string(),
            )),
        }
    }

    fn from_document(document: bson::Document) -> StoreResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> StoreResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> StoreResult<Self> {
        Ok(from_value(value)?)
    }
}
