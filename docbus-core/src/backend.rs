//! Storage backend abstraction for the document store.
//!
//! [`DocumentBackend`] is the contract every storage implementation fulfils:
//! batched inserts, filtered upserts, query-matched deletes and finds, and
//! collection/database teardown. The store facade adds no locking of its own,
//! so implementations must be safe for concurrent use from multiple async
//! tasks.
//!
//! Operations return [`StoreResult<T>`](crate::error::StoreResult);
//! implementers should map driver errors into [`StoreError`](crate::error::StoreError)
//! variants at this boundary.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{cursor::DocumentCursor, error::StoreResult};

/// Outcome of a single upsert. Exactly one of the counters is 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// 1 when nothing matched the filter and the document was created.
    pub upserted: u64,
    /// 1 when the filter matched and the document was replaced in place.
    pub replaced: u64,
}

/// Abstract interface for document storage backends.
#[async_trait]
pub trait DocumentBackend: Send + Sync + Debug {
    /// Inserts a batch of documents into `collection` as a single operation.
    ///
    /// # Returns
    ///
    /// The number of documents inserted. If the store rejects the batch (for
    /// example on a duplicate key) the batch fails as a whole, as reported by
    /// the store; callers must not assume any document was written.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<bson::Document>,
    ) -> StoreResult<u64>;

    /// Inserts `document` if nothing in `collection` matches `filter`,
    /// otherwise replaces the first match in place.
    async fn upsert_one(
        &self,
        collection: &str,
        filter: bson::Document,
        document: bson::Document,
    ) -> StoreResult<UpsertOutcome>;

    /// Deletes every document in `collection` matching `filter`.
    ///
    /// # Returns
    ///
    /// The number of documents removed; 0 when nothing matched.
    async fn delete_many(&self, collection: &str, filter: bson::Document) -> StoreResult<u64>;

    /// Runs an equality query against `collection` and returns a lazy cursor
    /// over the matches.
    async fn find(&self, collection: &str, query: bson::Document) -> StoreResult<DocumentCursor>;

    /// Drops `collection` and everything in it. Dropping an absent collection
    /// succeeds.
    async fn drop_collection(&self, collection: &str) -> StoreResult<()>;

    /// Drops the entire logical database this backend is bound to.
    async fn drop_database(&self) -> StoreResult<()>;

    /// Cleanly closes the backend, releasing its connection.
    ///
    /// The default implementation is a no-op; backends holding external
    /// connections should override it.
    async fn close(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B> DocumentBackend for &B
where
    B: DocumentBackend,
{
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<bson::Document>,
    ) -> StoreResult<u64> {
        (*self).insert_many(collection, documents).await
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: bson::Document,
        document: bson::Document,
    ) -> StoreResult<UpsertOutcome> {
        (*self)
            .upsert_one(collection, filter, document)
            .await
    }

    async fn delete_many(&self, collection: &str, filter: bson::Document) -> StoreResult<u64> {
        (*self).delete_many(collection, filter).await
    }

    async fn find(&self, collection: &str, query: bson::Document) -> StoreResult<DocumentCursor> {
        (*self).find(collection, query).await
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        (*self).drop_collection(collection).await
    }

    async fn drop_database(&self) -> StoreResult<()> {
        (*self).drop_database().await
    }
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait BackendBuilder {
    type Backend: DocumentBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
