//! Backend module for MQTT ingress
//!
//! This module handles all broker communication in a separate thread to keep
//! the UI responsive. It uses crossbeam channels for thread-safe communication
//! with the frontend.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend
//! - [`BackendMessage`] - Messages sent from backend to UI (updates, status, errors)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`IngressBackend`] - Main backend entry point, run on its own thread
//!
//! # Components
//!
//! - [`MqttSource`] - Live broker connection via `rumqttc`
//! - [`MockSource`] - Synthetic readings (feature-gated)
//! - [`IngressWorker`] - Receive loop that decodes payloads and reconnects
//! - [`payload`] - Topic routing and JSON decoding
//!
//! # Example
//!
//! ```ignore
//! use co2_overlay::backend::IngressBackend;
//! use co2_overlay::config::OverlayConfig;
//!
//! let config = OverlayConfig::default();
//! let (backend, frontend) = IngressBackend::new(config.broker);
//!
//! std::thread::spawn(move || backend.run());
//!
//! for msg in frontend.drain() {
//!     if let BackendMessage::Update(update) = msg {
//!         state.apply(update);
//!     }
//! }
//! ```

#[cfg(feature = "mock-broker")]
pub mod mock_source;
pub mod mqtt;
pub mod payload;
pub mod source;
pub mod worker;

#[cfg(feature = "mock-broker")]
pub use mock_source::{MockPattern, MockSource};
pub use mqtt::MqttSource;
pub use source::{MessageSource, TransportEvent};
pub use worker::{IngressWorker, ReconnectBackoff};

use crate::config::BrokerConfig;
use crate::types::{ConnectionStatus, SensorUpdate};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Callback the worker invokes after queueing a message for the UI
pub type RepaintHandle = Arc<dyn Fn() + Send + Sync>;

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Stop the worker and close the connection
    Shutdown,
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum BackendMessage {
    /// Decoded sensor reading
    Update(SensorUpdate),
    /// Connection status changed
    ConnectionStatus(ConnectionStatus),
    /// A payload could not be decoded and was dropped
    PayloadError { topic: String, error: String },
    /// Backend is shutting down
    Shutdown,
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendReceiver {
    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        self.receiver.try_iter().collect()
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request shutdown; false if the backend is already gone
    pub fn shutdown(&self) -> bool {
        self.send_command(BackendCommand::Shutdown)
    }
}

/// The MQTT ingress that runs in a separate thread
pub struct IngressBackend {
    config: BrokerConfig,
    command_receiver: Receiver<BackendCommand>,
    message_sender: Sender<BackendMessage>,
    running: Arc<AtomicBool>,
    repaint: Option<RepaintHandle>,
}

impl IngressBackend {
    /// Create a new backend with communication channels
    pub fn new(config: BrokerConfig) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(16);
        // Bounded for backpressure; sensors publish every few seconds, so this
        // only fills if the UI stops draining entirely
        let (msg_tx, msg_rx) = bounded(1024);

        let backend = Self {
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
            repaint: None,
        };

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Invoke `repaint` whenever a message is queued for the UI
    pub fn with_repaint(mut self, repaint: impl Fn() + Send + Sync + 'static) -> Self {
        self.repaint = Some(Arc::new(repaint));
        self
    }

    /// Run the backend loop against the configured broker
    #[cfg(feature = "mock-broker")]
    pub fn run(self) {
        if self.config.use_mock {
            self.run_with_source(MockSource::new());
        } else {
            self.run_mqtt();
        }
    }

    /// Run the backend loop against the configured broker
    #[cfg(not(feature = "mock-broker"))]
    pub fn run(self) {
        if self.config.use_mock {
            tracing::warn!("broker.use_mock is set but the mock-broker feature is disabled");
        }
        self.run_mqtt();
    }

    fn run_mqtt(self) {
        match MqttSource::new(&self.config) {
            Ok(source) => self.run_with_source(source),
            Err(e) => {
                tracing::error!("MQTT ingress not started: {}", e);
                let _ = self.message_sender.send(BackendMessage::Shutdown);
            }
        }
    }

    /// Run the backend loop against any message source
    pub fn run_with_source<S: MessageSource>(self, source: S) {
        let mut worker = IngressWorker::new(
            source,
            &self.config,
            self.command_receiver,
            self.message_sender,
            self.running,
        )
        .with_repaint(self.repaint);
        worker.run();
    }

    /// Sender half of the UI channel, for feeding messages in tests
    #[cfg(test)]
    pub(crate) fn message_sender(&self) -> Sender<BackendMessage> {
        self.message_sender.clone()
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_backend_creation() {
        let (backend, frontend) = IngressBackend::new(BrokerConfig::default());

        assert!(backend.stop_handle().load(Ordering::SeqCst));
        assert!(frontend.send_command(BackendCommand::Shutdown));
        assert!(frontend.drain().is_empty());
    }

    #[test]
    fn test_send_fails_after_backend_dropped() {
        let (backend, frontend) = IngressBackend::new(BrokerConfig::default());
        drop(backend);
        assert!(!frontend.send_command(BackendCommand::Shutdown));
        assert!(!frontend.shutdown());
    }
}
