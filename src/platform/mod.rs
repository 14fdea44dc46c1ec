//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key names, touch coordinates)
//! - Storage (LocalStorage on web)
//! - Frame and interval scheduling (web)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod timer;

pub use input::InputState;

/// Seed for a new run from the host clock
#[cfg(target_arch = "wasm32")]
pub fn time_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Seed for a new run from the host clock
#[cfg(not(target_arch = "wasm32"))]
pub fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
