//! Error handling for the overlay
//!
//! This module defines the error type and Result alias shared by the
//! history buffer, payload decoding, configuration and the MQTT ingress.
//! [`ResultExt`] wraps foreign errors (file I/O, thread spawning) with a
//! short description of what was being attempted.

use thiserror::Error;

/// Main error type for overlay operations
#[derive(Error, Debug)]
pub enum OverlayError {
    /// A constructor or setter received a value it cannot work with
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Inbound payload was not valid JSON or had the wrong shape
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors reported by the MQTT client
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<OverlayError>,
    },
}

impl OverlayError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        OverlayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<OverlayError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
