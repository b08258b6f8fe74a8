//! MessageSource trait for a unified ingress interface
//!
//! The ingress worker only talks to the transport through this trait, so the
//! real MQTT connection, the synthetic `mock-broker` source and scripted
//! test sources are interchangeable.

use std::time::Duration;

/// One step of transport activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection (re-)established and subscriptions requested
    Connected,
    /// A publish arrived on `topic`
    Message { topic: String, payload: Vec<u8> },
    /// Nothing relevant happened within the poll timeout
    Idle,
    /// The connection was lost; the next poll attempts to reconnect
    Disconnected(String),
}

/// Source of inbound messages for the ingress worker
#[cfg_attr(test, mockall::automock)]
pub trait MessageSource {
    /// Wait up to `timeout` for the next transport event
    ///
    /// Polling after [`TransportEvent::Disconnected`] starts a new
    /// connection attempt.
    fn poll(&mut self, timeout: Duration) -> TransportEvent;

    /// Close the connection; called once when the worker stops
    fn close(&mut self);

    /// Human-readable description for logs
    fn describe(&self) -> String;
}
