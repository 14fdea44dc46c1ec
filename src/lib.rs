//! Fire Fist Dodger - dodge the fists falling from the sky
//!
//! Core modules:
//! - `sim`: Simulation (geometry, level policy, entities, game loop, spawner)
//! - `session`: Screen flow around runs (menu, game over, settings, leaderboard)
//! - `persistence`: Key-value storage adapter with default-on-failure reads
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::{HighScore, Leaderboard, LeaderboardEntry};
pub use persistence::{KeyValueStore, MemoryStore, Persistence, StorageError};
pub use session::{Screen, Session};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    /// Pixels per frame
    pub const PLAYER_SPEED: f32 = 8.0;
    pub const PLAYER_START_X: f32 = 370.0;
    pub const PLAYER_START_Y: f32 = 510.0;

    /// Hazards are dropped once this far below the bottom edge
    pub const HAZARD_CULL_MARGIN: f32 = 100.0;

    /// Base spawn period, independent of frame rate
    pub const SPAWN_INTERVAL_MS: f64 = 1000.0;
    /// Per-level spawn period decrease. Zero keeps spawning at one per second.
    pub const LEVEL_SPAWN_DECREASE_MS: f64 = 0.0;
    /// Spawn period never drops below this
    pub const MIN_SPAWN_INTERVAL_MS: f64 = 300.0;

    pub const SCORE_PER_SECOND: u32 = 10;
    /// Nominal host refresh rate, used by the headless runner
    pub const FPS: u32 = 60;

    /// Survival time (seconds) at which each level starts
    pub const LEVEL_TIME_THRESHOLDS: [u32; 6] = [0, 10, 30, 60, 90, 120];
    /// Hazard speed gained per level (multiplicative, relative to level 1)
    pub const LEVEL_SPEED_MULTIPLIER: f32 = 0.2;

    /// Storage namespace prefix for persisted keys
    pub const STORAGE_NAMESPACE: &str = "fireFist";
}

/// Format survival seconds as `m:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(9), "0:09");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(600), "10:00");
    }
}
