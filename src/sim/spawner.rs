//! Hazard spawning
//!
//! Spawning runs on its own fixed-period clock, independent of the frame
//! rate. The browser host drives it with `setInterval`; native hosts and
//! tests use [`SpawnTimer`].

use rand::Rng;

use super::collision::Rect;
use super::level::{random_hazard_size, speed_multiplier};
use super::state::Hazard;
use crate::consts::CANVAS_WIDTH;

/// Create one hazard just above the canvas using the policy for `level`
pub fn spawn_hazard<R: Rng + ?Sized>(level: u32, rng: &mut R) -> Hazard {
    let size = random_hazard_size(level, rng);
    let side = size.side();
    let x = rng.random::<f32>() * (CANVAS_WIDTH - side);

    Hazard {
        rect: Rect::new(x, -side, side, side),
        speed: size.base_speed() * speed_multiplier(level),
        size,
    }
}

/// Deterministic fixed-period timer
///
/// Counts whole periods between polls and keeps its phase: a late poll
/// reports every period it missed.
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    period_ms: f64,
    next_fire_ms: Option<f64>,
}

impl SpawnTimer {
    pub fn new(period_ms: f64) -> Self {
        Self {
            period_ms,
            next_fire_ms: None,
        }
    }

    pub fn period_ms(&self) -> f64 {
        self.period_ms
    }

    /// Arm the timer; the first firing is one period after `now_ms`
    pub fn start(&mut self, now_ms: f64) {
        self.next_fire_ms = Some(now_ms + self.period_ms);
    }

    pub fn stop(&mut self) {
        self.next_fire_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_fire_ms.is_some()
    }

    /// Number of firings due at `now_ms`. Always 0 while stopped.
    pub fn poll(&mut self, now_ms: f64) -> u32 {
        let Some(mut next) = self.next_fire_ms else {
            return 0;
        };
        let mut fired = 0;
        while now_ms >= next {
            fired += 1;
            next += self.period_ms;
        }
        self.next_fire_ms = Some(next);
        fired
    }
}
