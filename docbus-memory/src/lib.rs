//! In-memory backend for docbus.
//!
//! Keeps collections in process memory behind an async lock. Intended for
//! tests and local development: it mirrors the equality-matching behavior of
//! the real store, so mapper-level code can be exercised without a server.

mod matcher;
mod store;

pub use store::{MemoryBackend, MemoryBackendBuilder};
