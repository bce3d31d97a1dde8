use std::{future::IntoFuture, time::Duration};

use async_trait::async_trait;
use bson::doc;
use docbus_core::{
    backend::{BackendBuilder, DocumentBackend, UpsertOutcome},
    cursor::DocumentCursor,
    error::{StoreError, StoreResult},
};
use futures::StreamExt;
use mongodb::{
    Client, Collection as MongoCollection,
    options::ClientOptions,
};
use tokio::time::timeout;
use tracing::{error, info};

use crate::config::MongoConfig;

/// Ceiling for a single data operation.
const OP_TIMEOUT: Duration = Duration::from_secs(5);

/// Ceiling for establishing and verifying a connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend storing documents in a MongoDB deployment.
///
/// The driver client is internally pooled and synchronized, so one backend
/// can be shared across tasks.
#[derive(Debug)]
pub struct MongoBackend {
    client: Client,
    database: String,
}

impl MongoBackend {
    /// Wraps an existing driver client bound to `database`.
    pub fn new(client: Client, database: String) -> Self {
        Self { client, database }
    }

    /// Creates a builder from explicit connection values.
    pub fn builder(url: &str, database: &str) -> MongoBackendBuilder {
        MongoBackendBuilder::new(url, database)
    }

    /// Connects using `MONGO_CONNECTION` and `MONGO_DB` from the environment.
    pub async fn connect_from_env() -> StoreResult<Self> {
        MongoBackendBuilder::from_env()?.build().await
    }

    fn get_collection(&self, collection_name: &str) -> MongoCollection<bson::Document> {
        self.client
            .database(&self.database)
            .collection(collection_name)
    }

    /// Runs a driver call inside the per-operation scope.
    async fn bounded<T, F>(&self, op: &'static str, call: F) -> StoreResult<T>
    where
        F: IntoFuture<Output = Result<T, mongodb::error::Error>> + Send,
        F::IntoFuture: Send,
    {
        match timeout(OP_TIMEOUT, call).await {
            Ok(result) => result.map_err(|e| {
                error!(op, error = %e, "mongodb operation failed");
                StoreError::Persistence(format!("{op}: {e}"))
            }),
            Err(_) => Err(StoreError::Persistence(format!(
                "{op} timed out after {}s",
                OP_TIMEOUT.as_secs()
            ))),
        }
    }
}

#[async_trait]
impl DocumentBackend for MongoBackend {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<bson::Document>,
    ) -> StoreResult<u64> {
        let result = self
            .bounded(
                "insert",
                self.get_collection(collection).insert_many(documents),
            )
            .await?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn upsert_one(
        &self,
        collection: &str,
        filter: bson::Document,
        document: bson::Document,
    ) -> StoreResult<UpsertOutcome> {
        let result = self
            .bounded(
                "upsert",
                self.get_collection(collection)
                    .replace_one(filter, document)
                    .upsert(true),
            )
            .await?;
        Ok(UpsertOutcome {
            upserted: u64::from(result.upserted_id.is_some()),
            replaced: result.matched_count,
        })
    }

    async fn delete_many(&self, collection: &str, filter: bson::Document) -> StoreResult<u64> {
        let result = self
            .bounded("delete", self.get_collection(collection).delete_many(filter))
            .await?;
        Ok(result.deleted_count)
    }

    async fn find(&self, collection: &str, query: bson::Document) -> StoreResult<DocumentCursor> {
        let cursor = self
            .bounded("find", self.get_collection(collection).find(query))
            .await?;
        Ok(DocumentCursor::new(
            cursor
                .map(|result| result.map_err(|e| StoreError::Persistence(e.to_string())))
                .boxed(),
        ))
    }

    async fn drop_collection(&self, collection: &str) -> StoreResult<()> {
        self.bounded("drop collection", self.get_collection(collection).drop())
            .await
    }

    async fn drop_database(&self) -> StoreResult<()> {
        self.bounded("drop database", self.client.database(&self.database).drop())
            .await
    }

    async fn close(self) -> StoreResult<()> {
        self.client.shutdown().await;

        Ok(())
    }
}

/// Builder that parses the connection URL, establishes the client, and
/// verifies reachability with a ping, all inside the connect scope.
pub struct MongoBackendBuilder {
    config: MongoConfig,
}

impl MongoBackendBuilder {
    pub fn new(url: &str, database: &str) -> Self {
        Self {
            config: MongoConfig::new(url, database),
        }
    }

    pub fn from_config(config: MongoConfig) -> Self {
        Self { config }
    }

    /// Resolves the connection values from the environment.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self {
            config: MongoConfig::from_env()?,
        })
    }
}

#[async_trait]
impl BackendBuilder for MongoBackendBuilder {
    type Backend = MongoBackend;

    async fn build(self) -> StoreResult<Self::Backend> {
        let MongoConfig { url, database } = self.config;
        let connect = async move {
            let options = ClientOptions::parse(&url)
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            let client = Client::with_options(options)
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            Ok::<_, StoreError>(MongoBackend::new(client, database))
        };

        match timeout(CONNECT_TIMEOUT, connect).await {
            Ok(result) => {
                let backend = result?;
                info!(database = %backend.database, "connected to mongodb");
                Ok(backend)
            }
            Err(_) => Err(StoreError::Connection(format!(
                "connect timed out after {}s",
                CONNECT_TIMEOUT.as_secs()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The URL is rejected while parsing the options, before any network
    // traffic, so the whole connect path runs without a server.
    #[tokio::test]
    async fn build_rejects_a_malformed_url() {
        let err = MongoBackend::builder("not-a-mongodb-url", "app")
            .build()
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Connection(_)));
    }
}
