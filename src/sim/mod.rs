//! Simulation module
//!
//! All gameplay logic lives here. No rendering or platform dependencies:
//! - Host time is passed in, never read
//! - Seeded RNG only
//! - Hazards kept in spawn order

pub mod collision;
pub mod level;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Rect, intersects};
pub use level::{
    LEVEL_INFO, LevelMeta, MAX_LEVEL, level_for_time, level_meta, next_level_meta,
    random_hazard_size, spawn_interval_ms, speed_multiplier,
};
pub use spawner::{SpawnTimer, spawn_hazard};
pub use state::{GamePhase, GameState, Hazard, HazardSize, Player, RunSummary};
pub use tick::{GameLoop, GameOverCallback, TickInput, TickOutcome};
