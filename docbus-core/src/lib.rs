//! Core document-mapping layer: capability traits, shape normalization, and the
//! store facade shared by every backend.
//!
//! This crate is the core of the docbus project and provides:
//!
//! - **Document traits** ([`document`]) - Core traits for defining and serializing documents
//! - **Shape mapper** ([`mapper`]) - Collection routing and value-to-document flattening
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing storage backends
//! - **Document store** ([`store`]) - Main interface: save, delete, find, drop
//! - **Cursors** ([`cursor`]) - Lazy, single-pass iteration over query results
//! - **Error handling** ([`error`]) - Error types and result types
//! - **Value helpers** ([`value`]) - Path lookup and loose equality over BSON values
//!
//! # Example
//!
//! ```ignore
//! use docbus_core::{document::Document, store::DocumentStore};
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! pub struct User {
//!     pub name: String,
//!     pub email: String,
//! }
//!
//! impl Document for User {
//!     fn collection_name() -> &'static str {
//!         "User"
//!     }
//! }
//!
//! let store = DocumentStore::new(backend);
//! store.save(&users, Some("email")).await?;
//! ```

pub mod backend;
pub mod cursor;
pub mod document;
pub mod error;
pub mod mapper;
pub mod store;
pub mod value;
