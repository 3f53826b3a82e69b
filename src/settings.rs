//! Player settings and preferences
//!
//! Persisted separately from tuning as a small JSON file owned by the host.
//! Read once when a session starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steering scheme used on touch devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Drag a finger horizontally to steer
    #[default]
    SwipeDrag,
    /// Tilt the device to steer
    Tilt,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::SwipeDrag => "Swipe",
            ControlScheme::Tilt => "Tilt",
        }
    }

    /// Decode the persisted integer preference (0 = swipe-drag, 1 = tilt)
    pub fn from_pref(value: i32) -> Option<Self> {
        match value {
            0 => Some(ControlScheme::SwipeDrag),
            1 => Some(ControlScheme::Tilt),
            _ => None,
        }
    }

    pub fn to_pref(self) -> i32 {
        match self {
            ControlScheme::SwipeDrag => 0,
            ControlScheme::Tilt => 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON malformed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Raw control preference as stored on disk (0 = swipe-drag, 1 = tilt)
    #[serde(default)]
    pub use_tilt_controls: i32,
}

impl Settings {
    pub fn with_scheme(scheme: ControlScheme) -> Self {
        Self {
            use_tilt_controls: scheme.to_pref(),
        }
    }

    /// Effective control scheme; unknown values fall back to swipe-drag
    pub fn control_scheme(&self) -> ControlScheme {
        ControlScheme::from_pref(self.use_tilt_controls).unwrap_or_else(|| {
            log::warn!(
                "Unknown control preference {}, using swipe controls",
                self.use_tilt_controls
            );
            ControlScheme::SwipeDrag
        })
    }

    /// Switch scheme (settings menu toggle)
    pub fn set_control_scheme(&mut self, scheme: ControlScheme) {
        self.use_tilt_controls = scheme.to_pref();
        log::info!("Control scheme saved: {}", scheme.as_str());
    }

    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&json)?;
        log::info!("Loaded settings from file");
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
