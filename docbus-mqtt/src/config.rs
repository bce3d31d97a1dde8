use crate::error::{MqttError, MqttResult};

/// Port used when the broker address does not name one.
pub const DEFAULT_PORT: u16 = 1883;

/// Connection settings for an MQTT broker.
#[derive(Clone, Debug)]
pub struct MqttConfig {
    pub broker: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub clean_session: bool,
}

impl MqttConfig {
    /// Creates a configuration for the given broker address and client
    /// identifier, with no credentials and a clean session.
    pub fn new(broker: impl Into<String>, client_id: impl Into<String>) -> Self {
        MqttConfig {
            broker: broker.into(),
            client_id: client_id.into(),
            username: None,
            password: None,
            clean_session: true,
        }
    }

    /// Authenticates against the broker with the given username and password.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Controls whether the broker discards session state on disconnect.
    pub fn clean_session(mut self, clean_session: bool) -> Self {
        self.clean_session = clean_session;
        self
    }

    /// Splits the broker address into host and port.
    ///
    /// An optional `tcp://` or `mqtt://` scheme is accepted and stripped; a
    /// missing port falls back to [`DEFAULT_PORT`].
    pub(crate) fn broker_parts(&self) -> MqttResult<(String, u16)> {
        let address = self
            .broker
            .strip_prefix("tcp://")
            .or_else(|| self.broker.strip_prefix("mqtt://"))
            .unwrap_or(&self.broker);
        match address.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse()
                    .map_err(|_| MqttError::InvalidBroker(self.broker.clone()))?;
                if host.is_empty() {
                    return Err(MqttError::InvalidBroker(self.broker.clone()));
                }
                Ok((host.to_owned(), port))
            }
            None if address.is_empty() => Err(MqttError::InvalidBroker(self.broker.clone())),
            None => Ok((address.to_owned(), DEFAULT_PORT)),
        }
    }
}
