//! Level policy
//!
//! Pure functions mapping survival time to a level, and a level to spawn
//! behavior. Levels are 1-based.

use rand::Rng;

use super::state::HazardSize;
use crate::consts::*;

/// Display metadata for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelMeta {
    pub name: &'static str,
    pub message: &'static str,
    /// Survival time (seconds) at which the level starts
    pub threshold: u32,
}

pub const LEVEL_INFO: [LevelMeta; 6] = [
    LevelMeta {
        name: "Rookie Pirate",
        message: "Try moving a little faster!",
        threshold: 0,
    },
    LevelMeta {
        name: "Seasoned Pirate",
        message: "Read the pattern of the fire fists!",
        threshold: 10,
    },
    LevelMeta {
        name: "Veteran Pirate",
        message: "Impressive! Stay focused!",
        threshold: 30,
    },
    LevelMeta {
        name: "Pirate Captain",
        message: "Almost there! Keep going!",
        threshold: 60,
    },
    LevelMeta {
        name: "Legendary Pirate",
        message: "Amazing skill!",
        threshold: 90,
    },
    LevelMeta {
        name: "Pirate King",
        message: "You are the true Pirate King!",
        threshold: 120,
    },
];

/// Highest level reachable
pub const MAX_LEVEL: u32 = LEVEL_INFO.len() as u32;

/// Level reached after `seconds` of survival
pub fn level_for_time(seconds: u32) -> u32 {
    LEVEL_TIME_THRESHOLDS
        .iter()
        .rposition(|&threshold| seconds >= threshold)
        .map(|i| i as u32 + 1)
        .unwrap_or(1)
}

/// Hazard speed factor for a level (1.0 at level 1)
pub fn speed_multiplier(level: u32) -> f32 {
    1.0 + level.saturating_sub(1) as f32 * LEVEL_SPEED_MULTIPLIER
}

/// Milliseconds between hazard spawns at a level
pub fn spawn_interval_ms(level: u32) -> f64 {
    let decrease = LEVEL_SPAWN_DECREASE_MS * level.saturating_sub(1) as f64;
    (SPAWN_INTERVAL_MS - decrease).max(MIN_SPAWN_INTERVAL_MS)
}

/// Map a uniform roll in `[0, 1)` to a hazard size for a level.
///
/// Weights shift toward large hazards in three bands: levels 1-2, 3-4, 5+.
pub fn hazard_size_for_roll(level: u32, roll: f32) -> HazardSize {
    let (small, medium) = match level {
        0..=2 => (0.7, 1.0),
        3..=4 => (0.4, 0.8),
        _ => (0.3, 0.6),
    };
    if roll < small {
        HazardSize::Small
    } else if roll < medium {
        HazardSize::Medium
    } else {
        HazardSize::Large
    }
}

/// Weighted random hazard size for a level
pub fn random_hazard_size<R: Rng + ?Sized>(level: u32, rng: &mut R) -> HazardSize {
    hazard_size_for_roll(level, rng.random::<f32>())
}

/// Metadata for a level; levels past the table reuse the last entry
pub fn level_meta(level: u32) -> &'static LevelMeta {
    let index = (level.saturating_sub(1) as usize).min(LEVEL_INFO.len() - 1);
    &LEVEL_INFO[index]
}

/// Metadata for the level after `level`, if there is one
pub fn next_level_meta(level: u32) -> Option<&'static LevelMeta> {
    if level >= MAX_LEVEL {
        return None;
    }
    LEVEL_INFO.get(level as usize)
}
