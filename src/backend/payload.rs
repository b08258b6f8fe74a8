//! Topic routing and JSON payload decoding
//!
//! Two topics are subscribed:
//!
//! - [`CO2_TOPIC`]: `{"eco2": 612, "temp": 21.4, "humidity": 48, "aqi": 2, "tvoc": 120}`
//!   from the air-quality node. Only `eco2` is shown; the other fields are
//!   logged at debug level.
//! - [`POWER_TOPIC`]: `{"GS303": {"Power_cur": -250}}` from the smart-meter
//!   reader (extra fields such as `Time` are ignored).
//!
//! Missing fields decode as 0. Numbers may arrive as integers, floats or
//! numeric strings; floats are truncated. Anything that is not a JSON object
//! of that shape is a [`OverlayError::Payload`] error for the caller to log.

use crate::error::{OverlayError, Result};
use crate::types::SensorUpdate;
use serde::{Deserialize, Deserializer};

/// Topic carrying air-quality readings
pub const CO2_TOPIC: &str = "sensor/co2";

/// Topic carrying smart-meter readings
pub const POWER_TOPIC: &str = "sensor/stromzaehler/SENSOR";

/// All topics the overlay subscribes to
pub const SUBSCRIPTIONS: [&str; 2] = [CO2_TOPIC, POWER_TOPIC];

/// Payload published by the air-quality node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AirQualityPayload {
    #[serde(default, deserialize_with = "lenient_int")]
    pub eco2: i64,
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub tvoc: Option<f64>,
}

/// Payload published by the smart-meter reader
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeterPayload {
    #[serde(rename = "GS303", default)]
    pub meter: MeterReading,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MeterReading {
    #[serde(rename = "Power_cur", default, deserialize_with = "lenient_int")]
    pub power_cur: i64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Int(v) => Ok(v),
        LenientNumber::Float(v) if v.is_finite() => Ok(v.trunc() as i64),
        LenientNumber::Float(v) => Err(serde::de::Error::custom(format!(
            "non-finite number {}",
            v
        ))),
        LenientNumber::Text(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .or_else(|_| trimmed.parse::<f64>().map(|f| f.trunc() as i64))
                .map_err(|_| serde::de::Error::custom(format!("not a number: {:?}", s)))
        }
    }
}

/// Decode a message received on `topic`
///
/// Returns `Ok(None)` for topics the overlay does not display.
pub fn decode(topic: &str, payload: &[u8]) -> Result<Option<SensorUpdate>> {
    match topic {
        CO2_TOPIC => {
            let data: AirQualityPayload = serde_json::from_slice(payload)?;
            tracing::debug!(
                eco2 = data.eco2,
                temp = ?data.temp,
                humidity = ?data.humidity,
                aqi = ?data.aqi,
                tvoc = ?data.tvoc,
                "Air quality reading"
            );
            Ok(Some(SensorUpdate::Co2 { ppm: data.eco2 }))
        }
        POWER_TOPIC => {
            let data: MeterPayload = serde_json::from_slice(payload)?;
            tracing::debug!(power_cur = data.meter.power_cur, "Meter reading");
            Ok(Some(SensorUpdate::Power {
                watts: data.meter.power_cur,
            }))
        }
        _ => Ok(None),
    }
}

/// Like [`decode`], but adds the topic to any error
pub fn decode_with_topic(topic: &str, payload: &[u8]) -> Result<Option<SensorUpdate>> {
    decode(topic, payload).map_err(|e: OverlayError| e.with_context(format!("topic {}", topic)))
}
