//! Main document store interface.
//!
//! [`DocumentStore`] ties the shape mapper to a backend: values go in, get
//! routed to the collection named by their root shape, and come back out
//! through lazy cursors. The store holds no mutable state and is safe to
//! share across tasks.
//!
//! # Example
//!
//! ```ignore
//! use docbus_core::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! store.save(&users, Some("email")).await?;
//! let mut cursor = store.find::<User>(doc! { "name": "alice" }).await?;
//! ```

use tracing::debug;

use crate::{
    backend::DocumentBackend,
    cursor::{DocumentCursor, TypedCursor},
    error::{StoreError, StoreResult},
    mapper::{FilterSpec, ToDocuments},
};

/// Totals from a [`DocumentStore::save`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Documents written by the bulk-insert path.
    pub inserted: u64,
    /// Documents newly created by the upsert path.
    pub upserted: u64,
    /// Documents replaced in place by the upsert path.
    pub replaced: u64,
}

/// A document store bound to a specific backend implementation.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
#[derive(Debug)]
pub struct DocumentStore<B: DocumentBackend> {
    backend: B,
}

impl<B: DocumentBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Persists `value` into the collection named by its root shape.
    ///
    /// With no filter field, the flattened documents go out as one bulk
    /// insert. With `Some(field)`, each document is upserted independently,
    /// keyed on that field's value in that document: the first failing upsert
    /// stops the call, and documents already upserted stay written. An empty
    /// sequence is a no-op.
    ///
    /// # Errors
    ///
    /// [`StoreError::FieldNotFound`] if a document lacks the filter field;
    /// [`StoreError::Persistence`] if the store rejects a write or the
    /// operation times out.
    pub async fn save<S>(&self, value: &S, filter_field: Option<&str>) -> StoreResult<SaveReport>
    where
        S: ToDocuments + ?Sized,
    {
        let collection = S::collection();
        let documents = value.to_documents()?;
        if documents.is_empty() {
            return Ok(SaveReport::default());
        }

        let mut report = SaveReport::default();
        match filter_field {
            None => {
                report.inserted = self.backend.insert_many(collection, documents).await?;
                debug!(collection, inserted = report.inserted, "saved documents");
            }
            Some(field) => {
                for document in documents {
                    let filter = FilterSpec::from_document(&document, field)?;
                    let outcome = self
                        .backend
                        .upsert_one(collection, filter.into_query(), document)
                        .await?;
                    report.upserted += outcome.upserted;
                    report.replaced += outcome.replaced;
                }
                debug!(
                    collection,
                    upserted = report.upserted,
                    replaced = report.replaced,
                    "saved documents"
                );
            }
        }
        Ok(report)
    }

    /// Deletes every document matching `value` field-for-field.
    ///
    /// The value becomes the equality query, so it must flatten to exactly
    /// one document; sequences are rejected with
    /// [`StoreError::InvalidDocument`]. Returns the number of documents
    /// removed.
    pub async fn delete<S>(&self, value: &S) -> StoreResult<u64>
    where
        S: ToDocuments + ?Sized,
    {
        let collection = S::collection();
        let mut documents = value.to_documents()?;
        let filter = match (documents.pop(), documents.is_empty()) {
            (Some(document), true) => document,
            _ => {
                return Err(StoreError::InvalidDocument(
                    "delete takes a single document as its match query".to_string(),
                ));
            }
        };
        let deleted = self.backend.delete_many(collection, filter).await?;
        debug!(collection, deleted, "deleted documents");
        Ok(deleted)
    }

    /// Runs `query` against the collection of `S`'s root shape and returns a
    /// lazy typed cursor over the matches.
    ///
    /// Wrapper layers on `S` only steer the routing: `find::<Vec<&User>>` and
    /// `find::<User>` read the same collection and yield the same values.
    pub async fn find<S>(&self, query: bson::Document) -> StoreResult<TypedCursor<S::Root>>
    where
        S: ToDocuments + ?Sized,
    {
        let cursor = self.find_raw(S::collection(), query).await?;
        Ok(cursor.typed())
    }

    /// Like [`find`](Self::find), but against an explicitly named collection
    /// and yielding raw documents.
    pub async fn find_raw(
        &self,
        collection: &str,
        query: bson::Document,
    ) -> StoreResult<DocumentCursor> {
        self.backend.find(collection, query).await
    }

    /// Drops the named collection. Dropping an absent collection succeeds.
    pub async fn drop_collection(&self, name: &str) -> StoreResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Drops the entire database behind this store. Irreversible.
    pub async fn drop_database(&self) -> StoreResult<()> {
        self.backend.drop_database().await
    }

    /// Closes the store, disconnecting the backend.
    pub async fn close(self) -> StoreResult<()> {
        self.backend.close().await
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
