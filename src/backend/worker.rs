//! Ingress worker thread implementation
//!
//! This module contains the loop that runs on the ingress thread. It pulls
//! events from a [`MessageSource`], decodes payloads and forwards typed
//! updates to the UI thread through crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: responds to UI commands (shutdown)
//! - **Decoding**: turns raw publishes into [`SensorUpdate`]s
//! - **Error handling**: malformed payloads are logged and reported, never fatal
//! - **Reconnecting**: waits with capped exponential backoff after a lost
//!   connection, then polls again to reconnect
//!
//! The worker never touches display state; the UI thread owns it.
//!
//! [`SensorUpdate`]: crate::types::SensorUpdate

use crate::backend::payload;
use crate::backend::source::{MessageSource, TransportEvent};
use crate::backend::{BackendCommand, BackendMessage, RepaintHandle};
use crate::config::BrokerConfig;
use crate::types::ConnectionStatus;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Capped exponential reconnect delay
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    next: Duration,
}

impl ReconnectBackoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        let max = max.max(initial);
        Self {
            initial,
            max,
            next: initial,
        }
    }

    /// Delay to wait before the next attempt; doubles up to the cap
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = (self.next * 2).min(self.max);
        delay
    }

    /// Start over after a successful connection
    pub fn reset(&mut self) {
        self.next = self.initial;
    }
}

/// The ingress worker that runs the receive loop
pub struct IngressWorker<S: MessageSource> {
    source: S,
    command_rx: Receiver<BackendCommand>,
    message_tx: Sender<BackendMessage>,
    running: Arc<AtomicBool>,
    repaint: Option<RepaintHandle>,
    backoff: ReconnectBackoff,
    poll_interval: Duration,
    status: ConnectionStatus,
    /// Publishes received since startup
    messages_received: u64,
}

impl<S: MessageSource> IngressWorker<S> {
    pub fn new(
        source: S,
        config: &BrokerConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            command_rx,
            message_tx,
            running,
            repaint: None,
            backoff: ReconnectBackoff::new(config.reconnect_initial(), config.reconnect_max()),
            poll_interval: config.poll_interval(),
            status: ConnectionStatus::Disconnected,
            messages_received: 0,
        }
    }

    /// Ask the UI to redraw after each forwarded message
    pub fn with_repaint(mut self, repaint: Option<RepaintHandle>) -> Self {
        self.repaint = repaint;
        self
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }

    /// Run the main worker loop until shutdown
    pub fn run(&mut self) {
        tracing::info!("Ingress worker started ({})", self.source.describe());
        self.update_status(ConnectionStatus::Connecting);

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            match self.source.poll(self.poll_interval) {
                TransportEvent::Connected => {
                    tracing::info!("Connected to {}", self.source.describe());
                    self.backoff.reset();
                    self.update_status(ConnectionStatus::Connected);
                }
                TransportEvent::Message { topic, payload } => {
                    self.handle_message(&topic, &payload);
                }
                TransportEvent::Idle => {}
                TransportEvent::Disconnected(reason) => {
                    self.handle_disconnect(&reason);
                }
            }
        }

        self.source.close();
        self.update_status(ConnectionStatus::Disconnected);
        self.send(BackendMessage::Shutdown);
        tracing::info!(
            "Ingress worker stopped after {} messages",
            self.messages_received
        );
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn handle_message(&mut self, topic: &str, payload: &[u8]) {
        self.messages_received += 1;
        tracing::debug!("Received message #{} on {}", self.messages_received, topic);

        match payload::decode_with_topic(topic, payload) {
            Ok(Some(update)) => self.send(BackendMessage::Update(update)),
            Ok(None) => tracing::trace!("Ignoring message on {}", topic),
            Err(e) => {
                tracing::warn!("Dropping malformed payload: {}", e);
                self.send(BackendMessage::PayloadError {
                    topic: topic.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    fn handle_disconnect(&mut self, reason: &str) {
        let delay = self.backoff.next_delay();
        tracing::warn!(
            "Disconnected from broker: {} (retrying in {:?})",
            reason,
            delay
        );
        self.update_status(ConnectionStatus::Reconnecting);
        self.wait_before_retry(delay);
    }

    /// Sleep for `delay`, waking early for commands
    fn wait_before_retry(&mut self, delay: Duration) {
        match self.command_rx.recv_timeout(delay) {
            Ok(cmd) => self.handle_command(cmd),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    fn update_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            self.status = status;
            self.send(BackendMessage::ConnectionStatus(status));
        }
    }

    fn send(&self, msg: BackendMessage) {
        if self.message_tx.send(msg).is_err() {
            // UI is gone; nothing left to deliver to
            self.running.store(false, Ordering::SeqCst);
            return;
        }
        if let Some(repaint) = &self.repaint {
            repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::payload::{CO2_TOPIC, POWER_TOPIC};
    use crate::backend::source::MockMessageSource;
    use crate::types::SensorUpdate;
    use crossbeam_channel::unbounded;
    use mockall::Sequence;

    fn test_config() -> BrokerConfig {
        BrokerConfig {
            reconnect_initial_ms: 1,
            reconnect_max_ms: 4,
            poll_interval_ms: 1,
            ..BrokerConfig::default()
        }
    }

    fn message(topic: &str, payload: &str) -> TransportEvent {
        TransportEvent::Message {
            topic: topic.to_string(),
            payload: payload.as_bytes().to_vec(),
        }
    }

    /// Mock that plays `events` in order, then stops the worker
    fn scripted_mock(events: Vec<TransportEvent>, running: Arc<AtomicBool>) -> MockMessageSource {
        let mut mock = MockMessageSource::new();
        let mut seq = Sequence::new();
        let count = events.len();

        for (i, event) in events.into_iter().enumerate() {
            let running = running.clone();
            let mut event = Some(event);
            mock.expect_poll()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| {
                    if i + 1 == count {
                        running.store(false, Ordering::SeqCst);
                    }
                    event.take().unwrap_or(TransportEvent::Idle)
                });
        }
        mock.expect_describe().return_const("mock".to_string());
        mock.expect_close().times(1).return_const(());
        mock
    }

    fn run_script(events: Vec<TransportEvent>) -> (Vec<BackendMessage>, u64) {
        let running = Arc::new(AtomicBool::new(true));
        let source = scripted_mock(events, running.clone());
        let (_cmd_tx, cmd_rx) = unbounded();
        let (msg_tx, msg_rx) = unbounded();

        let mut worker = IngressWorker::new(source, &test_config(), cmd_rx, msg_tx, running);
        worker.run();
        let received = worker.messages_received();
        (msg_rx.try_iter().collect(), received)
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut backoff =
            ReconnectBackoff::new(Duration::from_millis(500), Duration::from_millis(3000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(3000));
        assert_eq!(backoff.next_delay(), Duration::from_millis(3000));

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_backoff_max_below_initial() {
        let mut backoff =
            ReconnectBackoff::new(Duration::from_millis(100), Duration::from_millis(10));
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_forwards_decoded_updates() {
        let (messages, received) = run_script(vec![
            TransportEvent::Connected,
            message(CO2_TOPIC, r#"{"eco2": 1200}"#),
            message(POWER_TOPIC, r#"{"GS303": {"Power_cur": -250}}"#),
        ]);

        let updates: Vec<_> = messages
            .iter()
            .filter_map(|m| match m {
                BackendMessage::Update(u) => Some(*u),
                _ => None,
            })
            .collect();
        assert_eq!(
            updates,
            vec![
                SensorUpdate::Co2 { ppm: 1200 },
                SensorUpdate::Power { watts: -250 },
            ]
        );
        assert_eq!(received, 2);
        assert!(matches!(messages.last(), Some(BackendMessage::Shutdown)));
    }

    #[test]
    fn test_malformed_payload_keeps_running() {
        let (messages, received) = run_script(vec![
            TransportEvent::Connected,
            message(CO2_TOPIC, "{broken"),
            message(CO2_TOPIC, r#"{"eco2": 700}"#),
        ]);

        assert!(messages.iter().any(|m| matches!(
            m,
            BackendMessage::PayloadError { topic, .. } if topic == CO2_TOPIC
        )));
        assert!(messages
            .iter()
            .any(|m| matches!(m, BackendMessage::Update(SensorUpdate::Co2 { ppm: 700 }))));
        assert_eq!(received, 2);
    }

    #[test]
    fn test_reconnect_after_disconnect() {
        let (messages, _) = run_script(vec![
            TransportEvent::Connected,
            TransportEvent::Disconnected("connection reset".to_string()),
            TransportEvent::Idle,
            TransportEvent::Connected,
            message(POWER_TOPIC, r#"{"GS303": {"Power_cur": 90}}"#),
        ]);

        let statuses: Vec<_> = messages
            .iter()
            .filter_map(|m| match m {
                BackendMessage::ConnectionStatus(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                ConnectionStatus::Connecting,
                ConnectionStatus::Connected,
                ConnectionStatus::Reconnecting,
                ConnectionStatus::Connected,
                ConnectionStatus::Disconnected,
            ]
        );
        assert!(messages
            .iter()
            .any(|m| matches!(m, BackendMessage::Update(SensorUpdate::Power { watts: 90 }))));
    }

    #[test]
    fn test_unknown_topic_is_counted_but_not_forwarded() {
        let (messages, received) = run_script(vec![message("sensor/other", "whatever")]);
        assert_eq!(received, 1);
        assert!(!messages
            .iter()
            .any(|m| matches!(m, BackendMessage::Update(_) | BackendMessage::PayloadError { .. })));
    }

    #[test]
    fn test_shutdown_command_stops_before_polling() {
        let running = Arc::new(AtomicBool::new(true));
        let mut source = MockMessageSource::new();
        source.expect_poll().never();
        source.expect_describe().return_const("mock".to_string());
        source.expect_close().times(1).return_const(());

        let (cmd_tx, cmd_rx) = unbounded();
        let (msg_tx, msg_rx) = unbounded();
        cmd_tx.send(BackendCommand::Shutdown).unwrap();

        let mut worker = IngressWorker::new(source, &test_config(), cmd_rx, msg_tx, running.clone());
        worker.run();

        assert!(!running.load(Ordering::SeqCst));
        let messages: Vec<_> = msg_rx.try_iter().collect();
        assert!(matches!(messages.last(), Some(BackendMessage::Shutdown)));
    }

    #[test]
    fn test_repaint_requested_per_message() {
        let running = Arc::new(AtomicBool::new(true));
        let source = scripted_mock(
            vec![
                TransportEvent::Connected,
                message(CO2_TOPIC, r#"{"eco2": 500}"#),
            ],
            running.clone(),
        );
        let (_cmd_tx, cmd_rx) = unbounded();
        let (msg_tx, _msg_rx) = unbounded();

        let repaints = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = repaints.clone();
        let handle: RepaintHandle = Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let mut worker = IngressWorker::new(source, &test_config(), cmd_rx, msg_tx, running)
            .with_repaint(Some(handle));
        worker.run();

        // Connecting, Connected, Update, Disconnected, Shutdown
        assert_eq!(repaints.load(Ordering::SeqCst), 5);
    }
}
