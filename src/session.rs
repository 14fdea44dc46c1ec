//! Screen flow around runs
//!
//! Menu, game, game over, settings and leaderboard screens, plus the
//! bookkeeping that happens between runs: recording results, tracking the
//! best score and applying settings changes.

use crate::highscores::{HighScore, Leaderboard};
use crate::persistence::{KeyValueStore, Persistence};
use crate::settings::Settings;
use crate::sim::{GameLoop, RunSummary};

/// Which screen the page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Game,
    GameOver,
    Settings,
    Leaderboard,
}

/// How a finished run compares with the previous best
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// No earlier scoring run existed
    First,
    /// Beat the previous best
    NewRecord,
    None,
}

/// Result of a run as presented on the game-over screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverReport {
    pub summary: RunSummary,
    pub record: RecordKind,
    /// Leaderboard position (1-indexed) if the run made the board
    pub rank: Option<usize>,
}

pub struct Session<S> {
    persistence: Persistence<S>,
    screen: Screen,
    settings: Settings,
    high_score: HighScore,
    leaderboard: Leaderboard,
    last_report: Option<GameOverReport>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load settings and records, and open on the menu
    pub fn new(persistence: Persistence<S>) -> Self {
        let settings = persistence.load_settings();
        let leaderboard = persistence.leaderboard();
        let high_score = leaderboard.high_score();
        log::info!(
            "Session ready: {} leaderboard entries, best {}",
            leaderboard.len(),
            high_score.score
        );
        Self {
            persistence,
            screen: Screen::Menu,
            settings,
            high_score,
            leaderboard,
            last_report: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn high_score(&self) -> HighScore {
        self.high_score
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn last_report(&self) -> Option<&GameOverReport> {
        self.last_report.as_ref()
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Start (or restart) a run and show the game screen
    pub fn start_game(&mut self, game: &mut GameLoop, now_ms: f64) {
        game.start_run(now_ms);
        self.screen = Screen::Game;
    }

    /// Record a finished run and show the game-over screen
    pub fn handle_game_over(&mut self, summary: RunSummary) -> GameOverReport {
        let previous = self.high_score.score;
        let record = if previous == 0 && summary.score > 0 {
            RecordKind::First
        } else if summary.score > previous {
            RecordKind::NewRecord
        } else {
            RecordKind::None
        };

        if summary.score > previous {
            self.high_score = HighScore {
                score: summary.score,
                time: summary.time,
            };
        }

        let rank = self.leaderboard.potential_rank(summary.score);
        self.leaderboard =
            self.persistence
                .save_high_score(summary.score, summary.time, summary.level);

        let report = GameOverReport {
            summary,
            record,
            rank,
        };
        self.last_report = Some(report);
        self.screen = Screen::GameOver;
        report
    }

    /// Abandon any run and return to the menu
    pub fn go_to_menu(&mut self, game: &mut GameLoop) {
        game.stop_run();
        self.screen = Screen::Menu;
    }

    pub fn open_settings(&mut self) {
        self.screen = Screen::Settings;
    }

    pub fn open_leaderboard(&mut self) {
        self.leaderboard = self.persistence.leaderboard();
        self.screen = Screen::Leaderboard;
    }

    pub fn toggle_sound(&mut self) -> Settings {
        self.replace_settings(self.settings.toggle_sound())
    }

    pub fn toggle_vibration(&mut self) -> Settings {
        self.replace_settings(self.settings.toggle_vibration())
    }

    /// Apply and persist a settings change
    fn replace_settings(&mut self, settings: Settings) -> Settings {
        self.settings = settings;
        self.persistence.save_settings(&self.settings);
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::{GamePhase, TickInput};

    fn summary(score: u32) -> RunSummary {
        RunSummary {
            score,
            time: score / 10,
            level: crate::sim::level_for_time(score / 10),
        }
    }

    #[test]
    fn test_opens_on_menu_with_defaults() {
        let session = Session::new(Persistence::new(MemoryStore::new()));
        assert_eq!(session.screen(), Screen::Menu);
        assert_eq!(session.settings(), Settings::default());
        assert_eq!(session.high_score(), HighScore::default());
        assert!(session.leaderboard().is_empty());
        assert!(session.last_report().is_none());
    }

    #[test]
    fn test_first_run_then_new_record() {
        let mut session = Session::new(Persistence::new(MemoryStore::new()));

        let report = session.handle_game_over(summary(120));
        assert_eq!(report.record, RecordKind::First);
        assert_eq!(report.rank, Some(1));
        assert_eq!(session.screen(), Screen::GameOver);
        assert_eq!(session.high_score().score, 120);

        let report = session.handle_game_over(summary(50));
        assert_eq!(report.record, RecordKind::None);
        assert_eq!(report.rank, Some(2));
        assert_eq!(session.high_score().score, 120);

        let report = session.handle_game_over(summary(300));
        assert_eq!(report.record, RecordKind::NewRecord);
        assert_eq!(session.high_score().time, 30);
        assert_eq!(session.leaderboard().len(), 3);
        assert_eq!(session.persistence().high_score().score, 300);
    }

    #[test]
    fn test_records_survive_a_new_session() {
        let store = MemoryStore::new();
        {
            let mut session = Session::new(Persistence::new(&store));
            session.handle_game_over(summary(90));
            session.toggle_sound();
        }
        let session = Session::new(Persistence::new(&store));
        assert_eq!(session.high_score().score, 90);
        assert!(!session.settings().sound_enabled);
        assert!(session.settings().vibration_enabled);
    }

    #[test]
    fn test_screen_flow_with_game_loop() {
        let mut session = Session::new(Persistence::new(MemoryStore::new()));
        let mut game = GameLoop::new(5);
        game.set_assets_ready(true);

        session.start_game(&mut game, 0.0);
        assert_eq!(session.screen(), Screen::Game);
        assert_eq!(game.phase(), GamePhase::Playing);
        game.tick(3000.0, &TickInput::default());

        session.go_to_menu(&mut game);
        assert_eq!(session.screen(), Screen::Menu);
        assert_eq!(game.phase(), GamePhase::Menu);

        session.open_settings();
        assert_eq!(session.screen(), Screen::Settings);
        let settings = session.toggle_vibration();
        assert!(!settings.vibration_enabled);
        assert_eq!(session.persistence().load_settings(), settings);

        session.open_leaderboard();
        assert_eq!(session.screen(), Screen::Leaderboard);
    }
}
