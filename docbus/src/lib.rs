//! Main docbus crate providing document mapping for MongoDB and a thin MQTT
//! wrapper for internal services.
//!
//! This crate is the primary entry point for users of the docbus library. It
//! re-exports the core types and functionality from the sub-crates and
//! provides convenient access to the storage backends and the transport
//! wrapper.
//!
//! # Features
//!
//! - **Shape-driven document mapping** - Derive [`Document`] on a struct and
//!   save the struct itself, a reference to it, or any nesting of slices,
//!   vectors, arrays and boxes of it; the target collection is resolved from
//!   the innermost element type at compile time
//! - **Multiple backends** - In-memory storage for tests and MongoDB for
//!   production behind one backend trait
//! - **Field-filtered upserts** - Save against a named field to replace
//!   existing documents instead of inserting duplicates
//! - **Pub/sub transport** - QoS 0 publishes and channel-delivered
//!   subscriptions over MQTT (requires the `mqtt` feature)
//!
//! # Quick Start
//!
//! ```ignore
//! use docbus::prelude::*;
//! use docbus::memory::MemoryBackend;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Document)]
//! #[document(collection = "users")]
//! pub struct User {
//!     pub name: String,
//!     pub age: i32,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(MemoryBackend::new());
//!
//!     let alice = User {
//!         name: "Alice".to_string(),
//!         age: 30,
//!     };
//!
//!     // Insert unconditionally.
//!     store.save(&alice, None).await.unwrap();
//!
//!     // Upsert by name: replaces the stored Alice instead of adding another.
//!     store.save(&alice, Some("name")).await.unwrap();
//!
//!     // Stream back every user named Alice.
//!     let mut users = store
//!         .find::<User>(docbus::bson::doc! { "name": "Alice" })
//!         .await
//!         .unwrap();
//!     while let Some(user) = users.try_next().await.unwrap() {
//!         println!("found {}", user.name);
//!     }
//!
//!     store.close().await.unwrap();
//! }
//! ```
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires the `mongodb` feature)

#[allow(unused_extern_crates)]
extern crate self as docbus;

pub mod prelude;
pub mod telemetry;

pub use docbus_core::{backend, cursor, document, error, mapper, store, value};

pub use docbus_macros::Document;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docbus_memory::{MemoryBackend, MemoryBackendBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use docbus_mongodb::{
        CONNECTION_VAR, DATABASE_VAR, MongoBackend, MongoBackendBuilder, MongoConfig,
    };
}

/// MQTT client wrapper.
///
/// This module is only available when the `mqtt` feature is enabled.
#[cfg(feature = "mqtt")]
pub mod mqtt {
    pub use docbus_mqtt::{
        DEFAULT_PORT, MqttClient, MqttConfig, MqttError, MqttResult, SubscriptionMessage,
        topic_matches,
    };
}
