use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, Incoming, MqttOptions, QoS};
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::config::MqttConfig;
use crate::error::{MqttError, MqttResult};
use crate::topic::topic_matches;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const EVENT_CAPACITY: usize = 64;

/// A message received on a subscribed topic.
#[derive(Clone, Debug)]
pub struct SubscriptionMessage {
    pub topic: String,
    pub payload: Bytes,
}

type Registry = Arc<Mutex<Vec<(String, flume::Sender<SubscriptionMessage>)>>>;

/// Handle to a connected MQTT broker.
///
/// Cloning is cheap; all clones share the connection and its subscriptions.
/// Incoming messages are routed to subscriber channels by a background task,
/// which stops once the connection is gone.
#[derive(Clone, Debug)]
pub struct MqttClient {
    client: AsyncClient,
    subscriptions: Registry,
    closing: Arc<AtomicBool>,
}

impl MqttClient {
    /// Connects to the broker named by `config` and starts the driver task.
    ///
    /// Returns a connection error when the broker refuses the session or the
    /// handshake does not complete within ten seconds.
    pub async fn connect(config: MqttConfig) -> MqttResult<Self> {
        let (host, port) = config.broker_parts()?;
        let mut options = MqttOptions::new(config.client_id.clone(), host, port);
        options.set_clean_session(config.clean_session);
        if let Some(username) = &config.username {
            let password = config.password.clone().unwrap_or_default();
            options.set_credentials(username.clone(), password);
        }

        let (client, mut event_loop) = AsyncClient::new(options, EVENT_CAPACITY);
        wait_for_connack(&mut event_loop).await?;

        let subscriptions: Registry = Arc::default();
        let closing = Arc::new(AtomicBool::new(false));
        tokio::spawn(drive(
            event_loop,
            Arc::clone(&subscriptions),
            Arc::clone(&closing),
        ));

        info!(broker = %config.broker, client_id = %config.client_id, "connected to mqtt broker");
        Ok(MqttClient {
            client,
            subscriptions,
            closing,
        })
    }

    /// Publishes a payload on the given topic, at most once and non-retained.
    pub async fn publish(&self, topic: &str, payload: impl Into<Vec<u8>>) -> MqttResult<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload.into())
            .await
            .map_err(|e| MqttError::Publish(e.to_string()))?;
        debug!(topic, "published message");
        Ok(())
    }

    /// Subscribes to a topic filter, delivering matched messages to `sender`.
    ///
    /// Several subscriptions may share one channel, and one filter may feed
    /// several channels. Delivery ends when the receiving side is dropped or
    /// the client disconnects.
    pub async fn subscribe(
        &self,
        filter: &str,
        sender: flume::Sender<SubscriptionMessage>,
    ) -> MqttResult<()> {
        // Register before asking the broker so messages arriving right after
        // the suback cannot slip past the routing table.
        lock_registry(&self.subscriptions).push((filter.to_owned(), sender));
        if let Err(e) = self.client.subscribe(filter, QoS::AtMostOnce).await {
            let mut entries = lock_registry(&self.subscriptions);
            if let Some(index) = entries.iter().rposition(|(f, _)| f == filter) {
                entries.remove(index);
            }
            return Err(MqttError::Subscribe(e.to_string()));
        }
        debug!(filter, "subscribed");
        Ok(())
    }

    /// Disconnects from the broker and stops delivery to all subscribers.
    pub async fn disconnect(&self) -> MqttResult<()> {
        self.closing.store(true, Ordering::SeqCst);
        self.client
            .disconnect()
            .await
            .map_err(|e| MqttError::Connection(e.to_string()))
    }
}

/// Runs the network event loop until the connection ends, routing publishes
/// to their subscriber channels.
async fn drive(mut event_loop: EventLoop, subscriptions: Registry, closing: Arc<AtomicBool>) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Incoming::Publish(publish))) => {
                deliver(&subscriptions, publish.topic, publish.payload).await;
            }
            Ok(_) => {}
            Err(e) => {
                if !closing.load(Ordering::SeqCst) {
                    error!(error = %e, "mqtt connection lost");
                }
                break;
            }
        }
    }
    lock_registry(&subscriptions).clear();
}

/// Sends one message to every channel whose filter matches its topic.
async fn deliver(subscriptions: &Registry, topic: String, payload: Bytes) {
    let targets: Vec<flume::Sender<SubscriptionMessage>> = lock_registry(subscriptions)
        .iter()
        .filter(|(filter, _)| topic_matches(filter, &topic))
        .map(|(_, sender)| sender.clone())
        .collect();
    if targets.is_empty() {
        return;
    }

    let message = SubscriptionMessage { topic, payload };
    let mut dropped = false;
    for sender in targets {
        if sender.send_async(message.clone()).await.is_err() {
            dropped = true;
        }
    }
    if dropped {
        lock_registry(subscriptions).retain(|(_, sender)| !sender.is_disconnected());
    }
}

/// Waits for the broker's connack, bounding the whole handshake.
async fn wait_for_connack(event_loop: &mut EventLoop) -> MqttResult<()> {
    let handshake = async {
        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                    return if ack.code == ConnectReturnCode::Success {
                        Ok(())
                    } else {
                        Err(MqttError::Connection(format!(
                            "broker refused connection: {:?}",
                            ack.code
                        )))
                    };
                }
                Ok(_) => {}
                Err(e) => return Err(MqttError::Connection(e.to_string())),
            }
        }
    };
    match timeout(CONNECT_TIMEOUT, handshake).await {
        Ok(result) => result,
        Err(_) => Err(MqttError::Connection(format!(
            "connect timed out after {}s",
            CONNECT_TIMEOUT.as_secs()
        ))),
    }
}

// The registry is only ever held for short, non-awaiting sections, so a
// poisoned lock can simply be taken over.
fn lock_registry(
    registry: &Mutex<Vec<(String, flume::Sender<SubscriptionMessage>)>>,
) -> MutexGuard<'_, Vec<(String, flume::Sender<SubscriptionMessage>)>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(entries: Vec<(String, flume::Sender<SubscriptionMessage>)>) -> Registry {
        Arc::new(Mutex::new(entries))
    }

    #[tokio::test]
    async fn delivers_to_matching_channels_only() {
        let (kitchen_tx, kitchen_rx) = flume::unbounded();
        let (valve_tx, valve_rx) = flume::unbounded();
        let registry = registry_with(vec![
            ("sensors/+".to_owned(), kitchen_tx),
            ("actuators/#".to_owned(), valve_tx),
        ]);

        deliver(
            &registry,
            "sensors/kitchen".to_owned(),
            Bytes::from_static(b"21.5"),
        )
        .await;

        let message = kitchen_rx.try_recv().unwrap();
        assert_eq!(message.topic, "sensors/kitchen");
        assert_eq!(&message.payload[..], b"21.5");
        assert!(valve_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn one_message_fans_out_to_all_subscribers() {
        let (first_tx, first_rx) = flume::unbounded();
        let (second_tx, second_rx) = flume::unbounded();
        let registry = registry_with(vec![
            ("events/#".to_owned(), first_tx),
            ("events/created".to_owned(), second_tx),
        ]);

        deliver(&registry, "events/created".to_owned(), Bytes::new()).await;

        assert_eq!(first_rx.try_recv().unwrap().topic, "events/created");
        assert_eq!(second_rx.try_recv().unwrap().topic, "events/created");
    }

    #[tokio::test]
    async fn prunes_channels_with_no_receiver() {
        let (live_tx, live_rx) = flume::unbounded();
        let (dead_tx, dead_rx) = flume::unbounded::<SubscriptionMessage>();
        drop(dead_rx);
        let registry = registry_with(vec![
            ("events/#".to_owned(), live_tx),
            ("events/#".to_owned(), dead_tx),
        ]);

        deliver(&registry, "events/created".to_owned(), Bytes::new()).await;

        assert_eq!(registry.lock().unwrap().len(), 1);
        assert!(live_rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn unmatched_messages_are_discarded() {
        let (tx, rx) = flume::unbounded();
        let registry = registry_with(vec![("sensors/+".to_owned(), tx)]);

        deliver(&registry, "actuators/valve".to_owned(), Bytes::new()).await;

        assert!(rx.try_recv().is_err());
    }
}
