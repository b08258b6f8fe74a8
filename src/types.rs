//! Core data types for the overlay
//!
//! # Main Types
//!
//! - [`Sample`] - A single power reading in watts
//! - [`Reading`] - Latest value of a sensor, or unknown before the first message
//! - [`Co2Level`] - Threshold classification driving the label color
//! - [`SensorUpdate`] - A decoded inbound measurement
//! - [`ConnectionStatus`] - State of the MQTT connection
//!
//! # Thresholds
//!
//! CO₂ is classified with fixed thresholds: below [`CO2_ELEVATED_PPM`] is
//! normal, from [`CO2_ELEVATED_PPM`] up to (excluding) [`CO2_HIGH_PPM`] is
//! elevated, and anything at or above [`CO2_HIGH_PPM`] is high.

use std::fmt;

/// A power sample in watts. Negative values are feed-in, positive consumption.
pub type Sample = i64;

/// Number of power samples kept for the sparkline (8 h at one sample per 10 min)
pub const HISTORY_CAPACITY: usize = 48;

/// CO₂ concentration (ppm) at which the label turns to the warning color
pub const CO2_ELEVATED_PPM: i64 = 800;

/// CO₂ concentration (ppm) at which the label turns to the alert color
pub const CO2_HIGH_PPM: i64 = 1100;

/// Latest value reported by a sensor
///
/// `Reading::default()` is the unknown sentinel shown before any message
/// for that sensor has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reading(Option<i64>);

impl Reading {
    /// The unknown sentinel
    pub const UNKNOWN: Reading = Reading(None);

    /// A known reading
    pub fn known(value: i64) -> Self {
        Self(Some(value))
    }

    /// The value, if one has been received
    pub fn value(&self) -> Option<i64> {
        self.0
    }

    /// Whether this is still the unknown sentinel
    pub fn is_unknown(&self) -> bool {
        self.0.is_none()
    }
}

impl From<i64> for Reading {
    fn from(value: i64) -> Self {
        Self::known(value)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "---"),
        }
    }
}

/// Air quality class of a CO₂ reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Co2Level {
    /// No reading received yet
    Unknown,
    /// Below [`CO2_ELEVATED_PPM`]
    Normal,
    /// Between [`CO2_ELEVATED_PPM`] and [`CO2_HIGH_PPM`] (exclusive)
    Elevated,
    /// At or above [`CO2_HIGH_PPM`]
    High,
}

impl Co2Level {
    /// Classify a CO₂ reading. Total over every integer and the unknown sentinel.
    pub fn classify(reading: Reading) -> Self {
        match reading.value() {
            None => Co2Level::Unknown,
            Some(ppm) if ppm >= CO2_HIGH_PPM => Co2Level::High,
            Some(ppm) if ppm >= CO2_ELEVATED_PPM => Co2Level::Elevated,
            Some(_) => Co2Level::Normal,
        }
    }

    /// Classify a raw ppm value
    pub fn from_ppm(ppm: i64) -> Self {
        Self::classify(Reading::known(ppm))
    }
}

impl fmt::Display for Co2Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Co2Level::Unknown => write!(f, "Unknown"),
            Co2Level::Normal => write!(f, "Normal"),
            Co2Level::Elevated => write!(f, "Elevated"),
            Co2Level::High => write!(f, "High"),
        }
    }
}

/// A decoded measurement from one of the subscribed topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorUpdate {
    /// Estimated CO₂ concentration
    Co2 { ppm: i64 },
    /// Instantaneous power from the smart meter
    Power { watts: Sample },
}

/// Represents the connection status to the MQTT broker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// Not connected, no attempt made yet
    #[default]
    Disconnected,
    /// Initial connection attempt in progress
    Connecting,
    /// Connected and subscribed
    Connected,
    /// Connection lost, waiting to retry
    Reconnecting,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Reconnecting => write!(f, "Reconnecting..."),
        }
    }
}
