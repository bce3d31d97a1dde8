//! Process-wide logging setup.
//!
//! Services call [`init`] once at startup. The defaults match what the
//! internal services expect from their logs: debug level and the source file
//! and line number on every event.

use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

/// Settings for the global tracing subscriber.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Maximum level that will be emitted.
    pub level: Level,
    /// Whether events carry their source file and line number.
    pub include_location: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            level: Level::DEBUG,
            include_location: true,
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Fails when a subscriber is already installed, for example when called a
/// second time.
pub fn init(config: TelemetryConfig) -> Result<(), SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let config = TelemetryConfig::default();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.include_location);
    }

    // One test since the default subscriber is process-global.
    #[test]
    fn second_install_is_rejected() {
        assert!(init(TelemetryConfig::default()).is_ok());
        assert!(init(TelemetryConfig::default()).is_err());
    }
}
