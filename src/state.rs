//! Display state owned by the UI thread
//!
//! [`DisplayState`] holds everything the overlay draws: the latest CO₂ and
//! power readings and the power history. It is only mutated through
//! [`DisplayState::apply`], which the UI calls for every update drained from
//! the ingress channel, so no lock is needed around it.

use crate::error::Result;
use crate::history::RollingWindow;
use crate::types::{Co2Level, ConnectionStatus, Reading, Sample, SensorUpdate};
use chrono::{DateTime, Local};

/// Latest readings plus the power history
#[derive(Debug, Clone)]
pub struct DisplayState {
    co2: Reading,
    power: Reading,
    history: RollingWindow,
    /// Number of updates applied since startup
    updates_applied: u64,
    /// Wall-clock time of the last applied update
    last_update: Option<DateTime<Local>>,
    /// Broker connection state as last reported by the ingress
    pub connection: ConnectionStatus,
}

impl DisplayState {
    /// Fresh state with unknown readings and a zero-filled history
    pub fn new(capacity: usize) -> Result<Self> {
        Ok(Self {
            co2: Reading::UNKNOWN,
            power: Reading::UNKNOWN,
            history: RollingWindow::new(capacity, 0)?,
            updates_applied: 0,
            last_update: None,
            connection: ConnectionStatus::Disconnected,
        })
    }

    /// Apply one decoded sensor update
    pub fn apply(&mut self, update: SensorUpdate) {
        match update {
            SensorUpdate::Co2 { ppm } => {
                self.co2 = Reading::known(ppm);
            }
            SensorUpdate::Power { watts } => {
                self.power = Reading::known(watts);
                self.history.append(watts);
            }
        }
        self.updates_applied += 1;
        self.last_update = Some(Local::now());
    }

    pub fn co2(&self) -> Reading {
        self.co2
    }

    pub fn power(&self) -> Reading {
        self.power
    }

    pub fn co2_level(&self) -> Co2Level {
        Co2Level::classify(self.co2)
    }

    pub fn history(&self) -> &RollingWindow {
        &self.history
    }

    /// Copy of the power history for drawing
    pub fn history_snapshot(&self) -> Vec<Sample> {
        self.history.snapshot()
    }

    pub fn updates_applied(&self) -> u64 {
        self.updates_applied
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    /// Two-line label text, `---` for readings not yet received
    pub fn label_text(&self) -> String {
        format!("CO₂: {} ppm\nPower: {} W", self.co2, self.power)
    }

    /// Short status line used for the hover tooltip
    pub fn status_text(&self) -> String {
        match self.last_update {
            Some(at) => format!(
                "{} | {} updates | last at {}",
                self.connection,
                self.updates_applied,
                at.format("%H:%M:%S")
            ),
            None => format!("{} | no data yet", self.connection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HISTORY_CAPACITY;

    fn state() -> DisplayState {
        DisplayState::new(HISTORY_CAPACITY).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert!(state.co2().is_unknown());
        assert!(state.power().is_unknown());
        assert_eq!(state.co2_level(), Co2Level::Unknown);
        assert_eq!(state.history_snapshot(), vec![0; HISTORY_CAPACITY]);
        assert_eq!(state.label_text(), "CO₂: --- ppm\nPower: --- W");
        assert!(state.last_update().is_none());
    }

    #[test]
    fn test_co2_update_leaves_power_untouched() {
        let mut state = state();
        state.apply(SensorUpdate::Co2 { ppm: 1200 });

        assert_eq!(state.co2(), Reading::known(1200));
        assert_eq!(state.co2_level(), Co2Level::High);
        assert!(state.power().is_unknown());
        assert_eq!(state.history_snapshot(), vec![0; HISTORY_CAPACITY]);
    }

    #[test]
    fn test_power_update_appends_to_history() {
        let mut state = state();
        state.apply(SensorUpdate::Power { watts: -250 });

        assert_eq!(state.power(), Reading::known(-250));
        assert_eq!(state.history().latest(), Some(-250));
        assert_eq!(state.history().len(), HISTORY_CAPACITY);
        assert!(state.co2().is_unknown());
    }

    #[test]
    fn test_label_and_counters() {
        let mut state = state();
        state.apply(SensorUpdate::Co2 { ppm: 650 });
        state.apply(SensorUpdate::Power { watts: 1234 });

        assert_eq!(state.label_text(), "CO₂: 650 ppm\nPower: 1234 W");
        assert_eq!(state.updates_applied(), 2);
        assert!(state.last_update().is_some());
        assert!(state.status_text().contains("2 updates"));
    }
}
