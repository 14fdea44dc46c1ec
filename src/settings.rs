//! Game settings and preferences
//!
//! Persisted separately from the leaderboard through [`crate::Persistence`].

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Play sound effects
    pub sound_enabled: bool,
    /// Vibrate on game over (touch devices)
    pub vibration_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

impl Settings {
    pub fn toggle_sound(self) -> Self {
        Self {
            sound_enabled: !self.sound_enabled,
            ..self
        }
    }

    pub fn toggle_vibration(self) -> Self {
        Self {
            vibration_enabled: !self.vibration_enabled,
            ..self
        }
    }
}
