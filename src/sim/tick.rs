//! Game loop controller
//!
//! Owns the run state and advances it once per host repaint. The host calls
//! [`GameLoop::tick`] from its frame callback and [`GameLoop::on_spawn_timer`]
//! from the spawn timer; everything else only reads through accessors or
//! goes through the transition methods.

use super::level::{LevelMeta, level_for_time, level_meta, next_level_meta, spawn_interval_ms};
use super::spawner::spawn_hazard;
use super::state::{GamePhase, GameState, Hazard, Player, RunRng, RunSummary};
use crate::consts::SCORE_PER_SECOND;

/// Held input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Move-left key held
    pub left: bool,
    /// Move-right key held
    pub right: bool,
    /// Active touch x in canvas pixels. Replaces keyboard input when set.
    pub touch_x: Option<f32>,
}

impl TickInput {
    /// Keyboard direction: -1, 0 or 1
    pub fn horizontal(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running (menu, paused, game over or assets pending); nothing changed
    Idle,
    /// Simulation advanced; the host should render this frame
    Advanced {
        /// The level increased during this tick
        level_up: bool,
    },
    /// The player was hit; the run is over
    GameOver(RunSummary),
}

/// Called once per run with the final result
pub type GameOverCallback = Box<dyn FnMut(&RunSummary)>;

/// Per-frame state machine for a run
pub struct GameLoop {
    state: GameState,
    player: Player,
    hazards: Vec<Hazard>,
    rng: RunRng,
    /// Host timestamp of the last score credit
    last_score_update_ms: f64,
    /// Nothing advances until the host reports its render resources ready
    assets_ready: bool,
    on_game_over: Option<GameOverCallback>,
}

impl GameLoop {
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::default(),
            player: Player::default(),
            hazards: Vec::new(),
            rng: RunRng::new(seed),
            last_score_update_ms: 0.0,
            assets_ready: false,
            on_game_over: None,
        }
    }

    pub fn set_on_game_over(&mut self, callback: GameOverCallback) {
        self.on_game_over = Some(callback);
    }

    pub fn set_assets_ready(&mut self, ready: bool) {
        self.assets_ready = ready;
    }

    pub fn assets_ready(&self) -> bool {
        self.assets_ready
    }

    /// Repaint and spawn subscriptions must be active exactly while this holds
    pub fn timers_should_run(&self) -> bool {
        self.state.is_running() && self.assets_ready
    }

    // === Transitions ===

    /// Begin a new run. Any run in progress is discarded.
    pub fn start_run(&mut self, now_ms: f64) {
        self.state = GameState::started();
        self.player = Player::default();
        self.hazards.clear();
        self.last_score_update_ms = now_ms;
        log::info!("Run started (seed {})", self.rng.seed);
    }

    /// Playing -> paused. Returns false if not playing.
    pub fn pause_run(&mut self) -> bool {
        if self.state.phase() != GamePhase::Playing {
            return false;
        }
        self.state.is_paused = true;
        log::info!("Run paused at {}s", self.state.time);
        true
    }

    /// Paused -> playing. The score clock restarts at `now_ms`, so paused
    /// time is never credited.
    pub fn resume_run(&mut self, now_ms: f64) -> bool {
        if self.state.phase() != GamePhase::Paused {
            return false;
        }
        self.state.is_paused = false;
        self.last_score_update_ms = now_ms;
        log::info!("Run resumed");
        true
    }

    /// Leave the run and return to the menu
    pub fn stop_run(&mut self) {
        self.state = GameState::default();
        self.hazards.clear();
    }

    /// Reseed the hazard RNG for subsequent spawns
    pub fn reseed(&mut self, seed: u64) {
        self.rng = RunRng::new(seed);
    }

    // === Per-frame update ===

    /// Advance one frame at host time `now_ms`
    pub fn tick(&mut self, now_ms: f64, input: &TickInput) -> TickOutcome {
        if !self.timers_should_run() {
            return TickOutcome::Idle;
        }

        self.move_player(input);
        self.advance_hazards();
        let level_up = self.advance_clock(now_ms);

        if self
            .hazards
            .iter()
            .any(|hazard| hazard.rect.intersects(&self.player.rect))
        {
            return TickOutcome::GameOver(self.end_run());
        }

        TickOutcome::Advanced { level_up }
    }

    /// Spawn timer firing. Uses the level at the time of firing.
    /// Returns whether a hazard was created.
    pub fn on_spawn_timer(&mut self) -> bool {
        if !self.timers_should_run() {
            return false;
        }
        let hazard = spawn_hazard(self.state.level, self.rng.rng());
        log::debug!(
            "Spawned {} hazard at x={:.0} (level {})",
            hazard.size.as_str(),
            hazard.rect.x,
            self.state.level
        );
        self.hazards.push(hazard);
        true
    }

    fn move_player(&mut self, input: &TickInput) {
        let speed = self.player.speed;
        let x = self.player.rect.x;

        let new_x = match input.touch_x {
            Some(touch_x) => {
                // Ease the player's center toward the touch point
                let target = touch_x - self.player.rect.width / 2.0;
                let diff = target - x;
                if diff.abs() > speed {
                    x + diff.signum() * speed
                } else {
                    target
                }
            }
            None => x + input.horizontal() * speed,
        };

        self.player.set_x(new_x);
    }

    fn advance_hazards(&mut self) {
        for hazard in &mut self.hazards {
            hazard.fall();
        }
        self.hazards.retain(|hazard| !hazard.is_off_screen());
    }

    /// Credit whole seconds since the last update. Returns true on level up.
    fn advance_clock(&mut self, now_ms: f64) -> bool {
        if !now_ms.is_finite() {
            log::warn!("Ignoring non-finite frame time {}", now_ms);
            return false;
        }
        if !self.last_score_update_ms.is_finite() {
            self.last_score_update_ms = now_ms;
            return false;
        }
        let elapsed = ((now_ms - self.last_score_update_ms) / 1000.0).floor();
        if elapsed < 1.0 {
            return false;
        }
        // Float to int casts saturate
        let whole = elapsed as u32;

        let previous_level = self.state.level;
        self.state.time = self.state.time.saturating_add(whole);
        self.state.score = self
            .state
            .score
            .saturating_add(SCORE_PER_SECOND.saturating_mul(whole));
        self.state.level = level_for_time(self.state.time);
        // Sub-second remainder is dropped
        self.last_score_update_ms = now_ms;

        if self.state.level > previous_level {
            log::info!(
                "Level {} reached at {}s: {}",
                self.state.level,
                self.state.time,
                level_meta(self.state.level).name
            );
            return true;
        }
        false
    }

    fn end_run(&mut self) -> RunSummary {
        self.state.is_playing = false;
        self.state.game_over = true;
        let summary = self.state.summary();
        log::info!(
            "Game over: score {} in {}s at level {}",
            summary.score,
            summary.time,
            summary.level
        );
        if let Some(callback) = self.on_game_over.as_mut() {
            callback(&summary);
        }
        summary
    }

    // === Read-only accessors ===

    pub fn current_state(&self) -> GameState {
        self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    /// Spawn period for the current level
    pub fn spawn_interval_ms(&self) -> f64 {
        spawn_interval_ms(self.state.level)
    }

    pub fn level_meta(&self) -> &'static LevelMeta {
        level_meta(self.state.level)
    }

    pub fn next_level_meta(&self) -> Option<&'static LevelMeta> {
        next_level_meta(self.state.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::collision::Rect;
    use crate::sim::state::HazardSize;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ready_loop() -> GameLoop {
        let mut game = GameLoop::new(12345);
        game.set_assets_ready(true);
        game
    }

    fn hazard_at(x: f32, y: f32, speed: f32) -> Hazard {
        Hazard {
            rect: Rect::new(x, y, 40.0, 40.0),
            speed,
            size: HazardSize::Small,
        }
    }

    const LEFT: TickInput = TickInput {
        left: true,
        right: false,
        touch_x: None,
    };

    #[test]
    fn test_start_run_resets() {
        let mut game = ready_loop();
        game.start_run(0.0);
        game.tick(5000.0, &LEFT);
        game.on_spawn_timer();
        assert!(game.current_state().score > 0);

        game.start_run(6000.0);
        let state = game.current_state();
        assert_eq!(state, GameState::started());
        assert_eq!(state.level, 1);
        assert!(game.hazards().is_empty());
        assert_eq!(game.player().rect.x, PLAYER_START_X);
    }

    #[test]
    fn test_idle_until_started_and_ready() {
        let mut game = GameLoop::new(1);
        assert_eq!(game.tick(1000.0, &LEFT), TickOutcome::Idle);

        game.start_run(0.0);
        // Assets not ready yet
        assert_eq!(game.tick(1000.0, &LEFT), TickOutcome::Idle);
        assert!(!game.on_spawn_timer());
        assert!(!game.timers_should_run());

        game.set_assets_ready(true);
        assert!(game.timers_should_run());
        assert!(matches!(game.tick(1000.0, &LEFT), TickOutcome::Advanced { .. }));
    }

    #[test]
    fn test_left_input_clamps_at_zero() {
        let mut game = ready_loop();
        game.start_run(0.0);

        game.tick(1.0, &LEFT);
        assert_eq!(game.player().rect.x, PLAYER_START_X - PLAYER_SPEED);

        game.player.rect.x = 3.0;
        game.tick(2.0, &LEFT);
        assert_eq!(game.player().rect.x, 0.0);
        game.tick(3.0, &LEFT);
        assert_eq!(game.player().rect.x, 0.0);
    }

    #[test]
    fn test_right_input_clamps_at_edge() {
        let mut game = ready_loop();
        game.start_run(0.0);
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        game.player.rect.x = CANVAS_WIDTH - PLAYER_WIDTH - 2.0;
        game.tick(1.0, &right);
        assert_eq!(game.player().rect.x, CANVAS_WIDTH - PLAYER_WIDTH);
    }

    #[test]
    fn test_both_keys_cancel() {
        let mut game = ready_loop();
        game.start_run(0.0);
        let both = TickInput {
            left: true,
            right: true,
            touch_x: None,
        };
        game.tick(1.0, &both);
        assert_eq!(game.player().rect.x, PLAYER_START_X);
    }

    #[test]
    fn test_touch_eases_toward_target() {
        let mut game = ready_loop();
        game.start_run(0.0);
        // Player center at 400; touch far to the right
        let touch = TickInput {
            touch_x: Some(700.0),
            ..Default::default()
        };
        game.tick(1.0, &touch);
        assert_eq!(game.player().rect.x, PLAYER_START_X + PLAYER_SPEED);

        // Within one step: snap so the center lands on the touch point
        let near = TickInput {
            touch_x: Some(game.player().rect.center().x + 5.0),
            ..Default::default()
        };
        let expected = near.touch_x.unwrap() - PLAYER_WIDTH / 2.0;
        game.tick(2.0, &near);
        assert_eq!(game.player().rect.x, expected);
    }

    #[test]
    fn test_touch_overrides_keyboard() {
        let mut game = ready_loop();
        game.start_run(0.0);
        let conflicting = TickInput {
            left: true,
            right: false,
            touch_x: Some(800.0),
        };
        game.tick(1.0, &conflicting);
        assert_eq!(game.player().rect.x, PLAYER_START_X + PLAYER_SPEED);
    }

    #[test]
    fn test_hazards_fall_and_cull() {
        let mut game = ready_loop();
        game.start_run(0.0);
        // Lands exactly one pixel short of the cull line
        game.hazards
            .push(hazard_at(0.0, CANVAS_HEIGHT + HAZARD_CULL_MARGIN - 1.0 - 3.0, 3.0));

        game.tick(1.0, &TickInput::default());
        assert_eq!(game.hazards().len(), 1);
        assert_eq!(game.hazards()[0].rect.y, CANVAS_HEIGHT + 99.0);

        game.tick(2.0, &TickInput::default());
        assert!(game.hazards().is_empty());
    }

    #[test]
    fn test_score_credits_whole_seconds() {
        let mut game = ready_loop();
        game.start_run(0.0);

        game.tick(999.0, &TickInput::default());
        assert_eq!(game.current_state().score, 0);

        game.tick(2500.0, &TickInput::default());
        let state = game.current_state();
        assert_eq!(state.time, 2);
        assert_eq!(state.score, 20);

        // Remainder from the previous credit is dropped
        game.tick(3000.0, &TickInput::default());
        assert_eq!(game.current_state().time, 2);
        game.tick(3500.0, &TickInput::default());
        assert_eq!(game.current_state().time, 3);
    }

    #[test]
    fn test_huge_clock_jump_saturates() {
        let mut game = ready_loop();
        game.start_run(0.0);

        game.tick(1.0e12, &TickInput::default());
        let state = game.current_state();
        assert_eq!(state.time, 1_000_000_000);
        assert_eq!(state.score, u32::MAX);
        assert_eq!(state.level, level_for_time(u32::MAX));

        game.tick(1.0e15, &TickInput::default());
        assert_eq!(game.current_state().time, u32::MAX);
        assert_eq!(game.current_state().score, u32::MAX);
    }

    #[test]
    fn test_non_finite_time_is_ignored() {
        let mut game = ready_loop();
        game.start_run(0.0);

        game.tick(f64::NAN, &TickInput::default());
        game.tick(f64::INFINITY, &TickInput::default());
        assert_eq!(game.current_state().score, 0);

        game.tick(1500.0, &TickInput::default());
        assert_eq!(game.current_state().time, 1);
        assert_eq!(game.current_state().score, SCORE_PER_SECOND);

        // A run started from a bad timestamp picks up the next good one
        game.start_run(f64::NAN);
        game.tick(1000.0, &TickInput::default());
        game.tick(3000.0, &TickInput::default());
        assert_eq!(game.current_state().time, 2);
    }

    #[test]
    fn test_survive_31_seconds() {
        let mut game = ready_loop();
        game.start_run(0.0);
        let start = game.current_state();
        assert_eq!((start.score, start.time, start.level), (0, 0, 1));

        let mut level_ups = 0;
        for frame in 1..=3100u32 {
            match game.tick(frame as f64 * 10.0, &TickInput::default()) {
                TickOutcome::Advanced { level_up: true } => level_ups += 1,
                TickOutcome::Advanced { level_up: false } => {}
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        let state = game.current_state();
        assert_eq!(state.score, 310);
        assert_eq!(state.time, 31);
        assert_eq!(state.level, 3);
        assert_eq!(level_ups, 2);
        assert_eq!(game.level_meta().threshold, 30);
        assert_eq!(game.next_level_meta().map(|m| m.threshold), Some(60));
    }

    #[test]
    fn test_collision_reports_once() {
        let reports = Rc::new(RefCell::new(Vec::new()));
        let mut game = ready_loop();
        let sink = reports.clone();
        game.set_on_game_over(Box::new(move |summary: &RunSummary| {
            sink.borrow_mut().push(*summary)
        }));

        game.start_run(0.0);
        game.tick(4200.0, &TickInput::default());

        // Two hazards overlapping the player at once
        let px = game.player().rect.x;
        let py = game.player().rect.y;
        game.hazards.push(hazard_at(px, py, 0.0));
        game.hazards.push(hazard_at(px + 10.0, py + 10.0, 0.0));

        let outcome = game.tick(4300.0, &TickInput::default());
        let expected = RunSummary {
            score: 40,
            time: 4,
            level: 1,
        };
        assert_eq!(outcome, TickOutcome::GameOver(expected));

        let state = game.current_state();
        assert!(state.game_over);
        assert!(!state.is_playing);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(!game.timers_should_run());

        // Further ticks and spawns do nothing
        assert_eq!(game.tick(9000.0, &TickInput::default()), TickOutcome::Idle);
        assert!(!game.on_spawn_timer());
        assert_eq!(reports.borrow().as_slice(), &[expected]);
    }

    #[test]
    fn test_touching_hazard_is_not_a_hit() {
        let mut game = ready_loop();
        game.start_run(0.0);
        let player = game.player().rect;
        // Bottom edge rests exactly on the player's top edge after falling
        game.hazards
            .push(hazard_at(player.x, player.y - 40.0 - 3.0, 3.0));
        assert!(matches!(
            game.tick(1.0, &TickInput::default()),
            TickOutcome::Advanced { .. }
        ));
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut game = ready_loop();
        game.start_run(0.0);
        assert!(game.on_spawn_timer());
        game.tick(2000.0, &TickInput::default());

        assert!(game.pause_run());
        assert_eq!(game.phase(), GamePhase::Paused);
        assert!(!game.pause_run());
        let frozen_state = game.current_state();
        let frozen_hazards = game.hazards().to_vec();

        for now in [3000.0, 8000.0, 20_000.0] {
            assert_eq!(game.tick(now, &LEFT), TickOutcome::Idle);
            assert!(!game.on_spawn_timer());
        }
        assert_eq!(game.current_state(), frozen_state);
        assert_eq!(game.hazards(), frozen_hazards.as_slice());
        assert!(!game.timers_should_run());

        assert!(game.resume_run(20_000.0));
        assert!(!game.resume_run(20_000.0));
        // Paused time is not credited
        game.tick(20_500.0, &TickInput::default());
        assert_eq!(game.current_state().time, frozen_state.time);
        game.tick(21_000.0, &TickInput::default());
        assert_eq!(game.current_state().time, frozen_state.time + 1);
    }

    #[test]
    fn test_spawn_uses_current_level() {
        let mut game = ready_loop();
        game.start_run(0.0);
        game.tick(130_000.0, &TickInput::default());
        assert_eq!(game.current_state().level, 6);

        assert!(game.on_spawn_timer());
        let hazard = game.hazards()[0];
        assert!((hazard.speed - hazard.size.base_speed() * 2.0).abs() < 1e-5);
        assert_eq!(game.spawn_interval_ms(), SPAWN_INTERVAL_MS);
    }

    #[test]
    fn test_stop_run_returns_to_menu() {
        let mut game = ready_loop();
        game.start_run(0.0);
        game.on_spawn_timer();
        game.stop_run();
        assert_eq!(game.phase(), GamePhase::Menu);
        assert!(game.hazards().is_empty());
        assert!(!game.timers_should_run());
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = ready_loop();
        let mut b = ready_loop();
        a.start_run(0.0);
        b.start_run(0.0);
        for _ in 0..20 {
            a.on_spawn_timer();
            b.on_spawn_timer();
        }
        assert_eq!(a.hazards(), b.hazards());
    }
}
