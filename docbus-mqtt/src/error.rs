use thiserror::Error;

/// Errors surfaced by the MQTT transport wrapper.
#[derive(Error, Debug)]
pub enum MqttError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid broker address: {0}")]
    InvalidBroker(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Subscribe error: {0}")]
    Subscribe(String),
}

pub type MqttResult<T> = Result<T, MqttError>;
