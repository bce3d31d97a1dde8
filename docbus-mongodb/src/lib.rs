//! MongoDB backend for docbus.
//!
//! Wraps the official `mongodb` driver behind the
//! [`DocumentBackend`](docbus_core::backend::DocumentBackend) contract. Every
//! remote call runs inside its own bounded scope (5 seconds for data
//! operations, 10 seconds for connect); on expiry the call is abandoned and an
//! error surfaces. No retries.

mod config;
mod store;

pub use config::{CONNECTION_VAR, DATABASE_VAR, MongoConfig};
pub use store::{MongoBackend, MongoBackendBuilder};
