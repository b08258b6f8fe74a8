//! # co2-overlay: CO₂ & power desktop overlay
//!
//! A small always-on-top window that shows the latest CO₂ concentration and
//! electrical power reading, plus an 8-hour power sparkline. Readings arrive
//! over MQTT from an air-quality sensor and a smart-meter reader.
//!
//! ## Architecture
//!
//! - **Backend**: MQTT ingress on its own thread, decoding payloads and
//!   reconnecting with backoff
//! - **Frontend**: eframe/egui overlay that owns the display state and redraws
//!   after every update
//! - **Communication**: Crossbeam channels carry decoded updates to the UI, so
//!   the display state never needs a lock
//! - **Core**: [`history::RollingWindow`] and [`scaling`] hold the only real
//!   logic, both free of GUI and network dependencies
//!
//! ## Configuration
//!
//! Broker and window settings are read from `config.toml` in the platform data
//! directory under `dev.co2-overlay`; see [`config`].
//!
//! ## Example
//!
//! ```ignore
//! use co2_overlay::{backend::IngressBackend, config::OverlayConfig, state::DisplayState};
//!
//! let config = OverlayConfig::load_or_default();
//! let (backend, frontend) = IngressBackend::new(config.broker.clone());
//! std::thread::spawn(move || backend.run());
//!
//! let mut state = DisplayState::new(co2_overlay::types::HISTORY_CAPACITY)?;
//! for msg in frontend.drain() {
//!     co2_overlay::frontend::apply_backend_message(&mut state, msg);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod frontend;
pub mod history;
pub mod scaling;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use backend::{BackendMessage, FrontendReceiver, IngressBackend};
pub use config::OverlayConfig;
pub use error::{OverlayError, Result};
pub use frontend::OverlayApp;
pub use history::RollingWindow;
pub use scaling::to_pixel_y;
pub use state::DisplayState;
pub use types::{Co2Level, Reading, Sample, SensorUpdate};
