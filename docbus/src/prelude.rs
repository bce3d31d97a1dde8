//! Convenient re-exports of commonly used types from docbus.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docbus::prelude::*;
//! ```
//!
//! This provides access to:
//! - The [`Document`] trait, its derive macro and the mapping trait
//! - The document store and its backend contract
//! - Cursors for streaming query results
//! - Error types

pub use docbus_core::{
    backend::{BackendBuilder, DocumentBackend, UpsertOutcome},
    cursor::{DocumentCursor, TypedCursor},
    document::{Document, DocumentExt},
    error::{StoreError, StoreResult},
    mapper::{FilterSpec, ToDocuments},
    store::{DocumentStore, SaveReport},
};

pub use docbus_macros::Document;
