//! Test data builders for inbound MQTT payloads

use co2_overlay::backend::payload::{CO2_TOPIC, POWER_TOPIC};
use co2_overlay::backend::TransportEvent;

/// Builder for an air-quality publish on the CO₂ topic
pub struct AirQualityBuilder {
    eco2: i64,
    temp: Option<f64>,
    humidity: Option<f64>,
}

impl AirQualityBuilder {
    pub fn new(eco2: i64) -> Self {
        Self {
            eco2,
            temp: None,
            humidity: None,
        }
    }

    pub fn temp(mut self, temp: f64) -> Self {
        self.temp = Some(temp);
        self
    }

    pub fn humidity(mut self, humidity: f64) -> Self {
        self.humidity = Some(humidity);
        self
    }

    pub fn payload(&self) -> String {
        let mut value = serde_json::json!({ "eco2": self.eco2 });
        if let Some(temp) = self.temp {
            value["temp"] = serde_json::json!(temp);
        }
        if let Some(humidity) = self.humidity {
            value["humidity"] = serde_json::json!(humidity);
        }
        value.to_string()
    }

    pub fn build(self) -> TransportEvent {
        message(CO2_TOPIC, &self.payload())
    }
}

/// Smart-meter publish on the power topic
pub fn power_event(watts: i64) -> TransportEvent {
    let payload = serde_json::json!({ "GS303": { "Power_cur": watts } });
    message(POWER_TOPIC, &payload.to_string())
}

/// Raw publish with an arbitrary payload
pub fn message(topic: &str, payload: &str) -> TransportEvent {
    TransportEvent::Message {
        topic: topic.to_string(),
        payload: payload.as_bytes().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_quality_builder() {
        let payload = AirQualityBuilder::new(900).temp(21.5).payload();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

        assert_eq!(value["eco2"], 900);
        assert_eq!(value["temp"], 21.5);
        assert!(value.get("humidity").is_none());
    }
}
