//! Keyboard and touch input
//!
//! Event handlers feed [`InputState`]; the frame callback turns it into a
//! [`TickInput`] once per frame.

use crate::consts::CANVAS_WIDTH;
use crate::sim::TickInput;

/// Horizontal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Movement key for a `KeyboardEvent.key` value
pub fn movement_key(key: &str) -> Option<Direction> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(Direction::Left),
        "ArrowRight" | "d" | "D" => Some(Direction::Right),
        _ => None,
    }
}

/// Keys that toggle pause during a run
pub fn is_pause_key(key: &str) -> bool {
    matches!(key, "Escape" | "p" | "P")
}

/// Map a touch `clientX` to canvas pixels, accounting for CSS scaling
pub fn client_to_canvas_x(client_x: f32, rect_left: f32, rect_width: f32) -> f32 {
    if rect_width <= 0.0 {
        return client_x - rect_left;
    }
    (client_x - rect_left) * (CANVAS_WIDTH / rect_width)
}

/// Held keys and the active touch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    left: bool,
    right: bool,
    touch_x: Option<f32>,
}

impl InputState {
    /// Returns true if the key controls movement (caller should
    /// `preventDefault` so arrows don't scroll the page)
    pub fn key_down(&mut self, key: &str) -> bool {
        match movement_key(key) {
            Some(Direction::Left) => self.left = true,
            Some(Direction::Right) => self.right = true,
            None => return false,
        }
        true
    }

    pub fn key_up(&mut self, key: &str) {
        match movement_key(key) {
            Some(Direction::Left) => self.left = false,
            Some(Direction::Right) => self.right = false,
            None => {}
        }
    }

    /// Touch began or moved, in canvas pixels
    pub fn touch_at(&mut self, canvas_x: f32) {
        self.touch_x = Some(canvas_x);
    }

    pub fn touch_end(&mut self) {
        self.touch_x = None;
    }

    /// Forget all held input (new run, lost focus)
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.left,
            right: self.right,
            touch_x: self.touch_x,
        }
    }
}
