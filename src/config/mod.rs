//! Configuration module for the overlay
//!
//! Startup parameters live in a `config.toml` inside the platform data
//! directory. A missing or unreadable file is not an error: the overlay runs
//! with the built-in defaults.
//!
//! # App Data Location
//!
//! - **Linux**: `~/.local/share/dev.co2-overlay/`
//! - **macOS**: `~/Library/Application Support/dev.co2-overlay/`
//! - **Windows**: `%APPDATA%\dev.co2-overlay\`
//!
//! # Files
//!
//! - `config.toml` - Broker and window settings
//! - `logs/` - Daily rotated log files
//!
//! Topics, CO₂ thresholds and the history length are fixed in code.

use crate::error::{OverlayError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.co2-overlay";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Log directory name inside the app data directory
pub const LOG_DIR: &str = "logs";

/// Default MQTT broker host
pub const DEFAULT_BROKER_HOST: &str = "192.168.178.151";

/// Default MQTT broker port
pub const DEFAULT_BROKER_PORT: u16 = 1883;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        OverlayError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            OverlayError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the config file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Overlay Config ====================

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// MQTT connection settings
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Overlay window settings
    #[serde(default)]
    pub window: WindowConfig,
}

impl OverlayConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            OverlayError::Config(format!("Failed to parse config {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            tracing::warn!("Could not determine config path, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }

        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                OverlayError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| OverlayError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {:?}", path))
    }

    /// Reject values the overlay cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.broker.host.trim().is_empty() {
            return Err(OverlayError::Config("broker.host must not be empty".to_string()));
        }
        if self.broker.reconnect_initial_ms == 0 {
            return Err(OverlayError::Config(
                "broker.reconnect_initial_ms must be greater than zero".to_string(),
            ));
        }
        if self.broker.reconnect_max_ms < self.broker.reconnect_initial_ms {
            return Err(OverlayError::Config(
                "broker.reconnect_max_ms must not be below reconnect_initial_ms".to_string(),
            ));
        }
        if self.window.canvas_width == 0 || self.window.canvas_height == 0 {
            return Err(OverlayError::Config(
                "window canvas size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== Broker Config ====================

/// MQTT broker connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker hostname or IP address
    pub host: String,

    /// Broker TCP port
    pub port: u16,

    /// MQTT client identifier
    pub client_id: String,

    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,

    /// First reconnect delay after losing the connection
    pub reconnect_initial_ms: u64,

    /// Upper bound for the reconnect delay
    pub reconnect_max_ms: u64,

    /// How long the ingress blocks waiting for an event before checking
    /// for commands
    pub poll_interval_ms: u64,

    /// Use the synthetic message source (requires the `mock-broker` feature)
    pub use_mock: bool,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BROKER_HOST.to_string(),
            port: DEFAULT_BROKER_PORT,
            client_id: "co2-overlay".to_string(),
            keep_alive_secs: 60,
            reconnect_initial_ms: 500,
            reconnect_max_ms: 30_000,
            poll_interval_ms: 100,
            use_mock: false,
        }
    }
}

impl BrokerConfig {
    pub fn keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reconnect_initial(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_ms)
    }

    pub fn reconnect_max(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_ms)
    }
}

// ==================== Window Config ====================

/// Overlay window placement and sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Distance from the left screen edge in logical pixels
    pub offset_x: f32,

    /// Distance of the window's top edge above the bottom screen edge
    pub offset_from_bottom: f32,

    /// How often the window re-asserts always-on-top
    pub raise_interval_ms: u64,

    /// Sparkline canvas width in logical pixels
    pub canvas_width: u32,

    /// Sparkline canvas height in logical pixels
    pub canvas_height: u32,

    /// Label font size in points
    pub font_size: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            offset_x: 5.0,
            offset_from_bottom: 50.0,
            raise_interval_ms: 2000,
            canvas_width: 300,
            canvas_height: 45,
            font_size: 12.0,
        }
    }
}

impl WindowConfig {
    pub fn raise_interval(&self) -> Duration {
        Duration::from_millis(self.raise_interval_ms)
    }

    /// Initial inner size of the viewport: label column plus canvas and padding
    pub fn inner_size(&self) -> [f32; 2] {
        [
            self.canvas_width as f32 + 160.0,
            (self.canvas_height as f32).max(self.font_size * 3.0) + 10.0,
        ]
    }
}

// ==================== Tests ====================
