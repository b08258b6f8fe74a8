//! MQTT message source backed by `rumqttc`
//!
//! The blocking `rumqttc` [`Connection`] is driven on its own thread, the
//! event loop thread, and every event it yields is forwarded over a
//! crossbeam channel. [`MqttSource::poll`] only ever times out on that
//! channel, so a slow CONNECT/CONNACK handshake is never cancelled halfway.
//!
//! After a connection error the event loop thread parks until the next
//! [`MqttSource::poll`] call, which lets the worker's backoff decide when the
//! reconnect attempt happens. Subscriptions are re-sent on every ConnAck
//! since clean sessions drop them.

use crate::backend::payload::SUBSCRIPTIONS;
use crate::backend::source::{MessageSource, TransportEvent};
use crate::config::BrokerConfig;
use crate::error::{Result, ResultExt};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rumqttc::{Client, Connection, ConnectionError, Event, MqttOptions, Packet, QoS};
use std::time::Duration;

/// Capacity of the request queue between [`Client`] and [`Connection`]
const REQUEST_CAPACITY: usize = 16;

/// Events buffered between the event loop thread and the worker
const EVENT_CAPACITY: usize = 64;

type LoopEvent = std::result::Result<Event, ConnectionError>;

/// Live MQTT connection
pub struct MqttSource {
    client: Client,
    events: Receiver<LoopEvent>,
    resume: Sender<()>,
    /// Event loop is parked after an error, waiting for a resume signal
    parked: bool,
    broker: String,
}

impl MqttSource {
    /// Set up the client and start the event loop thread
    ///
    /// The first connection attempt starts right away in the background.
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive());
        options.set_clean_session(true);

        let (client, connection) = Client::new(options, REQUEST_CAPACITY);
        let (event_tx, event_rx) = bounded(EVENT_CAPACITY);
        let (resume_tx, resume_rx) = bounded(1);

        std::thread::Builder::new()
            .name("mqtt-eventloop".to_string())
            .spawn(move || drive_event_loop(connection, event_tx, resume_rx))
            .context("Failed to start MQTT event loop thread")?;

        Ok(Self {
            client,
            events: event_rx,
            resume: resume_tx,
            parked: false,
            broker: format!("{}:{}", config.host, config.port),
        })
    }

    fn subscribe_all(&self) -> Result<()> {
        for topic in SUBSCRIPTIONS {
            self.client.try_subscribe(topic, QoS::AtMostOnce)?;
            tracing::debug!("Subscribed to {}", topic);
        }
        Ok(())
    }
}

/// Body of the event loop thread
///
/// Exits once the source is dropped (either channel disconnects) or the
/// client's request queue closes.
fn drive_event_loop(mut connection: Connection, events: Sender<LoopEvent>, resume: Receiver<()>) {
    while let Ok(event) = connection.recv() {
        let failed = event.is_err();
        if events.send(event).is_err() {
            break;
        }
        if failed && resume.recv().is_err() {
            break;
        }
    }
    tracing::debug!("MQTT event loop stopped");
}

impl MessageSource for MqttSource {
    fn poll(&mut self, timeout: Duration) -> TransportEvent {
        if self.parked {
            // Bounded(1); a full queue means a resume is already pending
            let _ = self.resume.try_send(());
            self.parked = false;
        }

        match self.events.recv_timeout(timeout) {
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                if let Err(e) = self.subscribe_all() {
                    tracing::error!("Failed to subscribe: {}", e);
                }
                TransportEvent::Connected
            }
            Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => TransportEvent::Message {
                topic: publish.topic,
                payload: publish.payload.to_vec(),
            },
            Ok(Ok(event)) => {
                tracing::trace!("MQTT event: {:?}", event);
                TransportEvent::Idle
            }
            Ok(Err(e)) => {
                self.parked = true;
                TransportEvent::Disconnected(e.to_string())
            }
            Err(RecvTimeoutError::Timeout) => TransportEvent::Idle,
            Err(RecvTimeoutError::Disconnected) => {
                TransportEvent::Disconnected("event loop stopped".to_string())
            }
        }
    }

    fn close(&mut self) {
        if let Err(e) = self.client.try_disconnect() {
            tracing::debug!("Disconnect request not sent: {}", e);
        }
    }

    fn describe(&self) -> String {
        format!("mqtt://{}", self.broker)
    }
}
