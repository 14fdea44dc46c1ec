//! Save/load through a string-keyed store
//!
//! Features:
//! - Namespaced keys (`<namespace>_leaderboard`, `<namespace>_settings`)
//! - JSON values
//! - Reads never fail: absent or corrupt data yields defaults

pub mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::consts::STORAGE_NAMESPACE;
use crate::highscores::{HighScore, Leaderboard, LeaderboardEntry};
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("failed to read key {0}")]
    Read(String),
    #[error("failed to write key {0}")]
    Write(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value storage (LocalStorage on web)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

const LEADERBOARD_SUFFIX: &str = "leaderboard";
const SETTINGS_SUFFIX: &str = "settings";

/// Leaderboard and settings persistence
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    store: S,
    namespace: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self::with_namespace(store, STORAGE_NAMESPACE)
    }

    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn leaderboard_key(&self) -> String {
        format!("{}_{}", self.namespace, LEADERBOARD_SUFFIX)
    }

    pub fn settings_key(&self) -> String {
        format!("{}_{}", self.namespace, SETTINGS_SUFFIX)
    }

    /// Load settings, falling back to defaults
    pub fn load_settings(&self) -> Settings {
        match self.read_json(&self.settings_key()) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Settings::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) {
        match self.write_json(&self.settings_key(), settings) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Failed to save settings: {}", e),
        }
    }

    /// Load the leaderboard, falling back to an empty one. Entries are
    /// decoded one by one so a single bad row only drops that row.
    pub fn leaderboard(&self) -> Leaderboard {
        match self.read_json::<Vec<serde_json::Value>>(&self.leaderboard_key()) {
            Ok(Some(rows)) => {
                let entries = rows
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, row)| {
                        serde_json::from_value::<LeaderboardEntry>(row)
                            .map_err(|e| log::warn!("Skipping leaderboard entry {}: {}", i, e))
                            .ok()
                    })
                    .collect();
                Leaderboard::from_entries(entries)
            }
            Ok(None) => Leaderboard::new(),
            Err(e) => {
                log::warn!("Ignoring stored leaderboard: {}", e);
                Leaderboard::new()
            }
        }
    }

    /// Record a finished run stamped with the current time
    pub fn save_high_score(&self, score: u32, time: u32, level: u32) -> Leaderboard {
        self.save_high_score_at(score, time, level, Utc::now())
    }

    /// Record a finished run. Returns the leaderboard as persisted.
    pub fn save_high_score_at(
        &self,
        score: u32,
        time: u32,
        level: u32,
        date: DateTime<Utc>,
    ) -> Leaderboard {
        let mut board = self.leaderboard();
        let rank = board.insert(LeaderboardEntry {
            score,
            time,
            level,
            date,
        });

        match self.write_json(&self.leaderboard_key(), &board) {
            Ok(()) => log::info!(
                "High scores saved ({} entries, new rank {:?})",
                board.len(),
                rank
            ),
            Err(e) => log::error!("Failed to save high scores: {}", e),
        }
        board
    }

    /// Best score on record, or zeros
    pub fn high_score(&self) -> HighScore {
        self.leaderboard().high_score()
    }

    /// Forget every recorded run
    pub fn clear_leaderboard(&self) {
        match self.store.remove(&self.leaderboard_key()) {
            Ok(()) => log::info!("Leaderboard cleared"),
            Err(e) => log::error!("Failed to clear leaderboard: {}", e),
        }
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(json) = self.store.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json)
    }
}
