//! Connection configuration for the MongoDB backend.

use docbus_core::error::{StoreError, StoreResult};

/// Environment variable holding the MongoDB connection URL.
pub const CONNECTION_VAR: &str = "MONGO_CONNECTION";

/// Environment variable holding the logical database name.
pub const DATABASE_VAR: &str = "MONGO_DB";

/// Connection settings for [`MongoBackend`](crate::MongoBackend).
///
/// The two values can be supplied directly or resolved from the environment;
/// nothing else is read from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    /// Connection URL, e.g. `mongodb://localhost:27017`.
    pub url: String,
    /// Logical database all collections live in.
    pub database: String,
}

impl MongoConfig {
    /// Creates a config from explicit values.
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
        }
    }

    /// Resolves the config from `MONGO_CONNECTION` and `MONGO_DB`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if either variable is unset or
    /// empty, so a misconfigured service fails at connect time rather than on
    /// first use.
    pub fn from_env() -> StoreResult<Self> {
        Ok(Self {
            url: require_env(CONNECTION_VAR)?,
            database: require_env(DATABASE_VAR)?,
        })
    }
}

fn require_env(name: &str) -> StoreResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(StoreError::Connection(format!(
            "environment variable {name} is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the process-wide variables are touched from one place.
    #[test]
    fn from_env_reads_both_variables_or_fails() {
        unsafe {
            std::env::set_var(CONNECTION_VAR, "mongodb://localhost:27017");
            std::env::set_var(DATABASE_VAR, "app");
        }
        assert_eq!(
            MongoConfig::from_env().unwrap(),
            MongoConfig::new("mongodb://localhost:27017", "app")
        );

        unsafe {
            std::env::remove_var(DATABASE_VAR);
        }
        let err = MongoConfig::from_env().unwrap_err();
        assert!(matches!(err, StoreError::Connection(message) if message.contains(DATABASE_VAR)));

        unsafe {
            std::env::remove_var(CONNECTION_VAR);
        }
        assert!(MongoConfig::from_env().is_err());
    }
}
