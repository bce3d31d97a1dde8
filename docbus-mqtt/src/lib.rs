//! MQTT transport wrapper.
//!
//! Wraps `rumqttc` behind a small connect, publish and subscribe surface:
//! QoS 0 non-retained publishes, topic-filter subscriptions delivered to
//! caller-owned channels, and a graceful disconnect. A spawned task owns the
//! network event loop and routes incoming messages to subscribers.

mod client;
mod config;
mod error;
mod topic;

pub use client::{MqttClient, SubscriptionMessage};
pub use config::{DEFAULT_PORT, MqttConfig};
pub use error::{MqttError, MqttResult};
pub use topic::topic_matches;
