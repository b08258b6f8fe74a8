//! Mock message source for running without a broker
//!
//! Generates CO₂ and power readings from configurable patterns and hands
//! them to the worker as JSON publishes on the real topics, so the decoding
//! path is exercised exactly as with live sensors.
//!
//! # Enabling
//!
//! The mock source is only available when the `mock-broker` feature is enabled
//! and `broker.use_mock = true` is set in the config:
//!
//! ```bash
//! cargo run --features mock-broker
//! ```

use crate::backend::payload::{CO2_TOPIC, POWER_TOPIC};
use crate::backend::source::{MessageSource, TransportEvent};
use std::time::{Duration, Instant};

/// Pattern for generating mock readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockPattern {
    /// Constant value
    Constant(f64),
    /// Sine wave
    Sine {
        period_secs: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Linear ramp from `min` to `max` that restarts every period
    Sawtooth {
        period_secs: f64,
        min: f64,
        max: f64,
    },
    /// Alternates between `low` and `high` every half period
    Square {
        period_secs: f64,
        low: f64,
        high: f64,
    },
}

impl MockPattern {
    /// Value of the pattern `elapsed_secs` after start
    pub fn value_at(&self, elapsed_secs: f64) -> f64 {
        match *self {
            MockPattern::Constant(v) => v,
            MockPattern::Sine {
                period_secs,
                amplitude,
                offset,
            } => offset + amplitude * (std::f64::consts::TAU * elapsed_secs / period_secs).sin(),
            MockPattern::Sawtooth {
                period_secs,
                min,
                max,
            } => {
                let phase = (elapsed_secs % period_secs) / period_secs;
                min + (max - min) * phase
            }
            MockPattern::Square {
                period_secs,
                low,
                high,
            } => {
                if (elapsed_secs % period_secs) < period_secs / 2.0 {
                    low
                } else {
                    high
                }
            }
        }
    }
}

/// Synthetic source alternating CO₂ and power publishes
pub struct MockSource {
    co2: MockPattern,
    power: MockPattern,
    interval: Duration,
    started: Instant,
    last_emit: Option<Instant>,
    connected: bool,
    next_is_power: bool,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// CO₂ drifting through all three color bands, power swinging between
    /// feed-in and consumption
    pub fn new() -> Self {
        Self {
            co2: MockPattern::Sawtooth {
                period_secs: 120.0,
                min: 450.0,
                max: 1300.0,
            },
            power: MockPattern::Sine {
                period_secs: 60.0,
                amplitude: 900.0,
                offset: 100.0,
            },
            interval: Duration::from_secs(1),
            started: Instant::now(),
            last_emit: None,
            connected: false,
            next_is_power: false,
        }
    }

    pub fn with_co2_pattern(mut self, pattern: MockPattern) -> Self {
        self.co2 = pattern;
        self
    }

    pub fn with_power_pattern(mut self, pattern: MockPattern) -> Self {
        self.power = pattern;
        self
    }

    /// Time between consecutive publishes
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn next_message(&mut self) -> TransportEvent {
        let elapsed = self.started.elapsed().as_secs_f64();
        let (topic, payload) = if self.next_is_power {
            let watts = self.power.value_at(elapsed) as i64;
            (
                POWER_TOPIC,
                serde_json::json!({ "GS303": { "Power_cur": watts } }),
            )
        } else {
            let ppm = self.co2.value_at(elapsed) as i64;
            (CO2_TOPIC, serde_json::json!({ "eco2": ppm }))
        };
        self.next_is_power = !self.next_is_power;

        TransportEvent::Message {
            topic: topic.to_string(),
            payload: payload.to_string().into_bytes(),
        }
    }
}

impl MessageSource for MockSource {
    fn poll(&mut self, timeout: Duration) -> TransportEvent {
        if !self.connected {
            self.connected = true;
            return TransportEvent::Connected;
        }

        let due_in = match self.last_emit {
            Some(at) => self.interval.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        };
        if due_in > timeout {
            std::thread::sleep(timeout);
            return TransportEvent::Idle;
        }

        std::thread::sleep(due_in);
        self.last_emit = Some(Instant::now());
        self.next_message()
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn describe(&self) -> String {
        "mock broker".to_string()
    }
}
