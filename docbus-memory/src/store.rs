//! In-memory document backend.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use docbus_core::{
    backend::{BackendBuilder, DocumentBackend, UpsertOutcome},
    cursor::DocumentCursor,
    error::{StoreError, StoreResult},
    value,
};
use futures::{StreamExt, stream};
use mea::rwlock::RwLock;

use crate::matcher;

type CollectionMap = HashMap<String, Vec<bson::Document>>;

/// Backend that stores collections as in-process vectors of documents.
///
/// Cloning is cheap; clones share the same underlying store. All access goes
/// through an async read-write lock, so the backend is safe to use from
/// multiple tasks concurrently.
///
/// # Example
///
/// ```ignore
/// use docbus_memory::MemoryBackend;
///
/// let backend = MemoryBackend::new();
/// let store = DocumentStore::new(backend);
/// ```
#[derive(Default, Clone, Debug)]
pub struct MemoryBackend {
    collections: Arc<RwLock<CollectionMap>>,
}

impl MemoryBackend {
    /// Creates a new empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for constructing a `MemoryBackend`.
    ///
    /// There is nothing to configure today; the builder exists so the memory
    /// backend plugs into builder-driven setup paths.
    pub fn builder() -> MemoryBackendBuilder {
        MemoryBackendBuilder::default()
    }

    /// Number of documents currently held by `collection`.
    pub async fn collection_len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<bson::Document>,
    ) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let existing = collections.entry(collection.to_string()).or_default();

        // The whole batch is validated before anything is committed, so a
        // duplicate key leaves the collection untouched.
        let mut incoming_ids: Vec<&bson::Bson> = Vec::new();
        for document in &documents {
            let Some(id) = document.get("_id") else {
                continue;
            };
            let duplicate = existing
                .iter()
                .filter_map(|other| other.get("_id"))
                .chain(incoming_ids.iter().copied())
                .any(|other| value::loose_eq(other, id));
            if duplicate {
                return Err(StoreError::Persistence(format!(
                    "duplicate key: _id {id} already exists in {collection}"
                )));
            }
            incoming_ids.push(id);
        }

        let count = documents.len() as u64;
        existing.extend(documents);
        Ok(count)
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: bson::Document,
        document: bson::Document,
    ) -> StoreResult<UpsertOutcome> {
        let mut collections = self.collections.write().await;
        let existing = collections.entry(collection.to_string()).or_default();

        let mut position = None;
        for (index, candidate) in existing.iter().enumerate() {
            if matcher::matches(candidate, &filter)? {
                position = Some(index);
                break;
            }
        }

        Ok(match position {
            Some(index) => {
                existing[index] = document;
                UpsertOutcome {
                    replaced: 1,
                    ..UpsertOutcome::default()
                }
            }
            None => {
                existing.push(document);
                UpsertOutcome {
                    upserted: 1,
                    ..UpsertOutcome::default()
                }
            }
        })
    }

    async fn delete_many(&self, collection: &str, filter: bson::Document) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;
        let Some(existing) = collections.get_mut(collection) else {
            return Ok(0);
        };

        // Matched in full before anything is removed, so a filter error
        // leaves the collection untouched.
        let mut kept = Vec::with_capacity(existing.len());
        let mut deleted = 0_u64;
        for document in existing.iter() {
            if matcher::matches(document, &filter)? {
                deleted += 1;
            } else {
                kept.push(document.clone());
            }
        }
        *existing = kept;
        Ok(deleted)
    }

    async fn find(&self, collection: &str, query: bson::Document) -> StoreResult<DocumentCursor> {
        let collections = self.collections.read().await;
        let mut matched = Vec::new();
        if let Some(existing) = collections.get(collection) {
            for document in existing {
                if matcher::matches(document, &query)? {
                    matched.push(document.clone());
                }
            }
        }
        Ok(DocumentCursor::new(
            stream::iter(matched.into_iter().map(Ok)).boxed(),
        ))
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        self.collections.write().await.remove(collection);
        Ok(())
    }

    async fn drop_database(&self) -> StoreResult<()> {
        self.collections.write().await.clear();
        Ok(())
    }
}

/// Builder for [`MemoryBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBackendBuilder;

#[async_trait]
impl BackendBuilder for MemoryBackendBuilder {
    type Backend = MemoryBackend;

    async fn build(self) -> StoreResult<Self::Backend> {
        Ok(MemoryBackend::new())
    }
}

#[cfg(test)]
mod tests {
    use bson::{Bson, doc};
    use futures::TryStreamExt;

    use super::*;

    #[tokio::test]
    async fn insert_many_reports_the_count() {
        let backend = MemoryBackend::new();
        let inserted = backend
            .insert_many("things", vec![doc! { "v": 1 }, doc! { "v": 2 }])
            .await
            .unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(backend.collection_len("things").await, 2);
    }

    #[tokio::test]
    async fn duplicate_id_against_existing_commits_nothing() {
        let backend = MemoryBackend::new();
        backend
            .insert_many("things", vec![doc! { "_id": 1, "v": "a" }])
            .await
            .unwrap();

        let err = backend
            .insert_many("things", vec![doc! { "_id": 2 }, doc! { "_id": 1 }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(backend.collection_len("things").await, 1);
    }

    #[tokio::test]
    async fn duplicate_id_within_a_batch_commits_nothing() {
        let backend = MemoryBackend::new();
        let err = backend
            .insert_many("things", vec![doc! { "_id": 3 }, doc! { "_id": 3 }])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Persistence(_)));
        assert_eq!(backend.collection_len("things").await, 0);
    }

    #[tokio::test]
    async fn upsert_inserts_then_replaces_in_place() {
        let backend = MemoryBackend::new();
        let filter = doc! { "email": "a@x.com" };

        let outcome = backend
            .upsert_one(
                "User",
                filter.clone(),
                doc! { "name": "alice", "email": "a@x.com" },
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome { upserted: 1, replaced: 0 });

        let outcome = backend
            .upsert_one(
                "User",
                filter,
                doc! { "name": "alice cooper", "email": "a@x.com" },
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome { upserted: 0, replaced: 1 });
        assert_eq!(backend.collection_len("User").await, 1);

        let documents: Vec<bson::Document> = backend
            .find("User", doc! { "email": "a@x.com" })
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(
            documents[0].get("name").and_then(Bson::as_str),
            Some("alice cooper")
        );
    }

    #[tokio::test]
    async fn delete_many_counts_removals() {
        let backend = MemoryBackend::new();
        backend
            .insert_many(
                "things",
                vec![doc! { "kind": "x" }, doc! { "kind": "x" }, doc! { "kind": "y" }],
            )
            .await
            .unwrap();

        let deleted = backend
            .delete_many("things", doc! { "kind": "x" })
            .await
            .unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(backend.collection_len("things").await, 1);

        let deleted = backend
            .delete_many("things", doc! { "kind": "z" })
            .await
            .unwrap();
        assert_eq!(deleted, 0);
    }

    #[tokio::test]
    async fn failed_delete_filter_removes_nothing() {
        let backend = MemoryBackend::new();
        backend
            .insert_many("things", vec![doc! { "v": 1 }, doc! { "v": 2 }])
            .await
            .unwrap();

        let err = backend
            .delete_many("things", doc! { "v": { "$gt": 0 } })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(_)));
        assert_eq!(backend.collection_len("things").await, 2);
    }

    #[tokio::test]
    async fn find_streams_matches_in_insertion_order() {
        let backend = MemoryBackend::new();
        backend
            .insert_many(
                "things",
                vec![
                    doc! { "kind": "x", "n": 1 },
                    doc! { "kind": "y", "n": 2 },
                    doc! { "kind": "x", "n": 3 },
                ],
            )
            .await
            .unwrap();

        let documents: Vec<bson::Document> = backend
            .find("things", doc! { "kind": "x" })
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        let ns: Vec<i32> = documents
            .iter()
            .filter_map(|d| d.get("n").and_then(Bson::as_i32))
            .collect();
        assert_eq!(ns, [1, 3]);
    }

    #[tokio::test]
    async fn find_on_an_absent_collection_is_empty() {
        let backend = MemoryBackend::new();
        let documents: Vec<bson::Document> = backend
            .find("nothing", doc! {})
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn drop_collection_succeeds_when_absent() {
        let backend = MemoryBackend::new();
        backend.drop_collection("ghost").await.unwrap();

        backend
            .insert_many("things", vec![doc! { "v": 1 }])
            .await
            .unwrap();
        backend.drop_collection("things").await.unwrap();
        assert_eq!(backend.collection_len("things").await, 0);
    }

    #[tokio::test]
    async fn drop_database_clears_every_collection() {
        let backend = MemoryBackend::new();
        backend
            .insert_many("a", vec![doc! { "v": 1 }])
            .await
            .unwrap();
        backend
            .insert_many("b", vec![doc! { "v": 2 }])
            .await
            .unwrap();

        backend.drop_database().await.unwrap();
        assert_eq!(backend.collection_len("a").await, 0);
        assert_eq!(backend.collection_len("b").await, 0);
    }

    #[tokio::test]
    async fn builder_builds_a_fresh_backend() {
        let backend = MemoryBackend::builder().build().await.unwrap();
        assert_eq!(backend.collection_len("anything").await, 0);
    }
}
