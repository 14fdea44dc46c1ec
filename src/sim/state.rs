//! Game state and entity types
//!
//! Everything the loop controller owns for the duration of a run.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Screen-level phase, derived from the [`GameState`] flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run in progress
    Menu,
    /// Active gameplay
    Playing,
    /// Run suspended; simulation frozen
    Paused,
    /// Run ended by a collision
    GameOver,
}

/// Run flags and counters shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub is_playing: bool,
    pub is_paused: bool,
    pub score: u32,
    /// Survival time in whole seconds
    pub time: u32,
    pub level: u32,
    pub game_over: bool,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_paused: false,
            score: 0,
            time: 0,
            level: 1,
            game_over: false,
        }
    }
}

impl GameState {
    /// Fresh state for a run that is starting
    pub fn started() -> Self {
        Self {
            is_playing: true,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if !self.is_playing {
            GamePhase::Menu
        } else if self.is_paused {
            GamePhase::Paused
        } else {
            GamePhase::Playing
        }
    }

    /// Simulation advances only in this state
    pub fn is_running(&self) -> bool {
        self.is_playing && !self.is_paused
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            score: self.score,
            time: self.time,
            level: self.level,
        }
    }
}

/// Final result of a run, reported on game over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u32,
    pub time: u32,
    pub level: u32,
}

/// The player's box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    /// Max horizontal displacement per frame (pixels)
    pub speed: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            rect: Rect::new(PLAYER_START_X, PLAYER_START_Y, PLAYER_WIDTH, PLAYER_HEIGHT),
            speed: PLAYER_SPEED,
        }
    }
}

impl Player {
    /// Largest x that keeps the player on the canvas
    pub fn max_x(&self) -> f32 {
        (CANVAS_WIDTH - self.rect.width).max(0.0)
    }

    /// Set x, clamped to the canvas
    pub fn set_x(&mut self, x: f32) {
        self.rect.x = x.clamp(0.0, self.max_x());
    }
}

/// Hazard size class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardSize {
    Small,
    Medium,
    Large,
}

impl HazardSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardSize::Small => "small",
            HazardSize::Medium => "medium",
            HazardSize::Large => "large",
        }
    }

    /// Square side length (pixels)
    pub fn side(&self) -> f32 {
        match self {
            HazardSize::Small => 40.0,
            HazardSize::Medium => 60.0,
            HazardSize::Large => 80.0,
        }
    }

    /// Fall speed at level 1 (pixels per frame)
    pub fn base_speed(&self) -> f32 {
        match self {
            HazardSize::Small => 3.0,
            HazardSize::Medium => 4.0,
            HazardSize::Large => 5.0,
        }
    }
}

/// A falling fire fist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub rect: Rect,
    /// Downward pixels per frame
    pub speed: f32,
    pub size: HazardSize,
}

impl Hazard {
    pub fn fall(&mut self) {
        self.rect.y += self.speed;
    }

    /// True once the hazard is far enough below the canvas to drop
    pub fn is_off_screen(&self) -> bool {
        self.rect.y >= CANVAS_HEIGHT + HAZARD_CULL_MARGIN
    }
}

/// Run seed and the RNG derived from it
#[derive(Debug, Clone)]
pub struct RunRng {
    pub seed: u64,
    rng: Pcg32,
}

impl RunRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }
}
