//! Fire Fist Dodger entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, TouchEvent};

    use fire_fist_dodger::audio::{AudioManager, SoundEffect};
    use fire_fist_dodger::consts::*;
    use fire_fist_dodger::format_time;
    use fire_fist_dodger::highscores::rank_label;
    use fire_fist_dodger::persistence::Persistence;
    use fire_fist_dodger::platform::input::{client_to_canvas_x, is_pause_key};
    use fire_fist_dodger::platform::storage::LocalStorageStore;
    use fire_fist_dodger::platform::timer::{FrameLoop, Interval};
    use fire_fist_dodger::platform::{InputState, time_seed};
    use fire_fist_dodger::renderer::{RenderInitError, RenderState, build_scene};
    use fire_fist_dodger::session::{GameOverReport, RecordKind, Screen, Session};
    use fire_fist_dodger::sim::{GamePhase, GameLoop, RunSummary, TickOutcome};

    /// How long the level-up banner stays visible
    const LEVEL_BANNER_MS: f64 = 2000.0;
    const GAME_OVER_VIBRATION_MS: u32 = 200;

    const SCREENS: [(Screen, &str); 5] = [
        (Screen::Menu, "menu-screen"),
        (Screen::Game, "game-screen"),
        (Screen::GameOver, "game-over-screen"),
        (Screen::Settings, "settings-screen"),
        (Screen::Leaderboard, "leaderboard-screen"),
    ];

    type Shared = Rc<RefCell<App>>;

    /// Page state shared by every browser callback
    struct App {
        session: Session<LocalStorageStore>,
        game: GameLoop,
        render_state: Option<RenderState>,
        input: InputState,
        audio: AudioManager,
        /// Read by the game-over callback, which runs inside `GameLoop::tick`
        vibration_enabled: Rc<Cell<bool>>,
        frame: Option<FrameLoop>,
        spawn: Option<Interval>,
        spawn_period_ms: f64,
        level_banner_until: f64,
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.set_attribute("class", class);
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        set_class(id, if visible { "" } else { "hidden" });
    }

    impl App {
        fn new(seed: u64) -> Self {
            let session = Session::new(Persistence::new(LocalStorageStore::new()));
            let settings = session.settings();

            let vibration_enabled = Rc::new(Cell::new(settings.vibration_enabled));
            let mut game = GameLoop::new(seed);
            let vibrate = vibration_enabled.clone();
            game.set_on_game_over(Box::new(move |summary: &RunSummary| {
                log::info!(
                    "Hit! score {} after {}s at level {}",
                    summary.score,
                    summary.time,
                    summary.level
                );
                if vibrate.get() {
                    if let Some(window) = web_sys::window() {
                        window
                            .navigator()
                            .vibrate_with_duration(GAME_OVER_VIBRATION_MS);
                    }
                }
            }));

            let mut audio = AudioManager::new();
            audio.set_muted(!settings.sound_enabled);

            Self {
                session,
                game,
                render_state: None,
                input: InputState::default(),
                audio,
                vibration_enabled,
                frame: None,
                spawn: None,
                spawn_period_ms: 0.0,
                level_banner_until: 0.0,
            }
        }

        /// Keep the spawn interval registered exactly while the run is live.
        /// Must not be called from the interval's own callback.
        fn sync_spawn_timer(&mut self, weak: &Weak<RefCell<App>>) {
            if !self.game.timers_should_run() {
                if self.spawn.take().is_some() {
                    log::debug!("Spawn timer stopped");
                }
                return;
            }

            let period = self.game.spawn_interval_ms();
            if self.spawn.is_some() && self.spawn_period_ms == period {
                return;
            }

            let weak = weak.clone();
            self.spawn = Interval::start(period, move || {
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().game.on_spawn_timer();
                }
            });
            self.spawn_period_ms = period;
            log::debug!("Spawn timer running every {}ms", period);
        }

        /// Start the repaint loop if a run is live and no frame is pending.
        /// Must not be called from the frame callback.
        fn ensure_frame_loop(&mut self, weak: &Weak<RefCell<App>>) {
            if !self.game.current_state().is_playing {
                return;
            }
            if self.frame.as_ref().is_some_and(FrameLoop::is_active) {
                return;
            }
            let weak = weak.clone();
            self.frame = Some(FrameLoop::start(move |time| match weak.upgrade() {
                Some(app) => on_frame(&app, time),
                None => false,
            }));
        }

        fn sync_timers(&mut self, weak: &Weak<RefCell<App>>) {
            self.sync_spawn_timer(weak);
            self.ensure_frame_loop(weak);
        }

        fn start_game(&mut self, weak: &Weak<RefCell<App>>) {
            self.game.reseed(time_seed());
            self.input.clear();
            self.level_banner_until = 0.0;
            self.session.start_game(&mut self.game, now_ms());
            self.audio.resume();
            self.audio.play(SoundEffect::Start);
            self.sync_timers(weak);
            self.update_screens();
            self.update_hud(now_ms());
        }

        fn toggle_pause(&mut self, weak: &Weak<RefCell<App>>) {
            match self.game.phase() {
                GamePhase::Playing => {
                    self.game.pause_run();
                    self.input.clear();
                }
                GamePhase::Paused => {
                    self.game.resume_run(now_ms());
                }
                _ => return,
            }
            self.sync_timers(weak);
            self.update_hud(now_ms());
        }

        fn auto_pause(&mut self, weak: &Weak<RefCell<App>>, reason: &str) {
            if self.game.pause_run() {
                self.input.clear();
                self.sync_spawn_timer(weak);
                self.update_hud(now_ms());
                log::info!("Auto-paused ({})", reason);
            }
        }

        fn go_to_menu(&mut self, weak: &Weak<RefCell<App>>) {
            self.session.go_to_menu(&mut self.game);
            self.input.clear();
            self.sync_timers(weak);
            if let Some(frame) = &self.frame {
                frame.cancel();
            }
            self.render();
            self.update_screens();
        }

        fn finish_run(&mut self, summary: RunSummary) {
            self.spawn = None;
            let report = self.session.handle_game_over(summary);
            let effect = match report.record {
                RecordKind::First | RecordKind::NewRecord => SoundEffect::NewRecord,
                RecordKind::None => SoundEffect::GameOver,
            };
            self.audio.play(effect);
            self.show_game_over(&report);
            self.update_screens();
        }

        fn apply_settings(&mut self) {
            let settings = self.session.settings();
            self.audio.set_muted(!settings.sound_enabled);
            self.vibration_enabled.set(settings.vibration_enabled);
            set_text("sound-toggle", if settings.sound_enabled { "ON" } else { "OFF" });
            set_text(
                "vibration-toggle",
                if settings.vibration_enabled { "ON" } else { "OFF" },
            );
        }

        /// Render the current frame
        fn render(&mut self) {
            let Some(render_state) = self.render_state.as_mut() else {
                return;
            };
            let vertices = build_scene(self.game.player(), self.game.hazards());
            match render_state.render(&vertices) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    render_state.reconfigure();
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, now: f64) {
            let state = self.game.current_state();
            set_text("hud-score", &state.score.to_string());
            set_text("hud-time", &format_time(state.time));
            set_text("hud-level", &state.level.to_string());
            set_text("hud-level-name", self.game.level_meta().name);

            match self.game.next_level_meta() {
                Some(next) => set_text(
                    "hud-next-level",
                    &format!("Next: {} at {}", next.name, format_time(next.threshold)),
                ),
                None => set_text("hud-next-level", "Max level"),
            }

            set_visible("pause-overlay", self.game.phase() == GamePhase::Paused);
            set_text(
                "pause-btn",
                if state.is_paused { "Resume" } else { "Pause" },
            );

            let banner = now < self.level_banner_until && state.is_running();
            set_visible("level-banner", banner);
        }

        fn show_level_banner(&mut self, now: f64) {
            let meta = self.game.level_meta();
            let level = self.game.current_state().level;
            set_text("level-banner-title", &format!("Level {}: {}", level, meta.name));
            set_text("level-banner-message", meta.message);
            self.level_banner_until = now + LEVEL_BANNER_MS;
        }

        fn show_game_over(&self, report: &GameOverReport) {
            set_text("final-score", &report.summary.score.to_string());
            set_text("final-time", &format_time(report.summary.time));
            set_text("final-level", &report.summary.level.to_string());
            set_text(
                "final-rank",
                &report
                    .rank
                    .map(|rank| format!("Rank #{}", rank))
                    .unwrap_or_default(),
            );

            let banner = match report.record {
                RecordKind::First => Some("First record set!"),
                RecordKind::NewRecord => Some("New record!"),
                RecordKind::None => None,
            };
            set_text("record-banner", banner.unwrap_or(""));
            set_visible("record-banner", banner.is_some());
        }

        fn update_screens(&self) {
            let screen = self.session.screen();
            for (s, id) in SCREENS {
                set_class(id, if s == screen { "screen" } else { "screen hidden" });
            }

            let best = self.session.high_score();
            set_text("menu-high-score", &best.score.to_string());
            set_text("menu-best-time", &format_time(best.time));

            if screen == Screen::Leaderboard {
                self.render_leaderboard();
            }
        }

        fn render_leaderboard(&self) {
            let Some(list) = web_sys::window()
                .and_then(|w| w.document())
                .and_then(|d| d.get_element_by_id("leaderboard-list"))
            else {
                return;
            };

            let entries = self.session.leaderboard().entries();
            if entries.is_empty() {
                list.set_inner_html("<li class=\"empty\">No records yet</li>");
                return;
            }

            let now = chrono::Utc::now();
            let html: String = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    format!(
                        "<li><span class=\"rank\">{}</span><span class=\"score\">{}</span>\
                         <span class=\"time\">{}</span><span class=\"level\">Lv {}</span>\
                         <span class=\"date\" title=\"{}\">{}</span></li>",
                        rank_label(i),
                        entry.score,
                        format_time(entry.time),
                        entry.level,
                        entry.display_date(),
                        entry.relative_date(now),
                    )
                })
                .collect();
            list.set_inner_html(&html);
        }
    }

    /// One repaint. Returns whether another frame should be requested.
    fn on_frame(app: &Shared, time: f64) -> bool {
        let weak = Rc::downgrade(app);
        let mut a = app.borrow_mut();

        // Paused or waiting on the GPU: keep polling, draw nothing
        let input = a.input.tick_input();
        match a.game.tick(time, &input) {
            TickOutcome::Advanced { level_up } => {
                if level_up {
                    a.audio.play(SoundEffect::LevelUp);
                    a.show_level_banner(time);
                }
                a.render();
            }
            TickOutcome::GameOver(summary) => {
                a.render();
                a.finish_run(summary);
                return false;
            }
            TickOutcome::Idle => {}
        }

        a.sync_spawn_timer(&weak);
        a.update_hud(time);
        a.game.current_state().is_playing
    }

    async fn init_gpu(canvas: &HtmlCanvasElement) -> Result<RenderState, RenderInitError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, canvas.width(), canvas.height()).await
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Failed to init logger: {}", e).into());
        }

        log::info!("Fire Fist Dodger starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Backing store follows device pixels; drawing stays in canvas units
        let dpr = window.device_pixel_ratio();
        canvas.set_width((CANVAS_WIDTH as f64 * dpr) as u32);
        canvas.set_height((CANVAS_HEIGHT as f64 * dpr) as u32);

        let seed = time_seed();
        let app = Rc::new(RefCell::new(App::new(seed)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, &app);
        setup_buttons(&app);
        setup_auto_pause(&app);
        {
            let mut a = app.borrow_mut();
            a.apply_settings();
            a.update_screens();
        }

        match init_gpu(&canvas).await {
            Ok(render_state) => {
                app.borrow_mut().render_state = Some(render_state);
            }
            Err(e) => {
                log::error!("WebGPU unavailable, continuing without canvas: {}", e);
            }
        }

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        {
            let weak = Rc::downgrade(&app);
            let mut a = app.borrow_mut();
            a.game.set_assets_ready(true);
            a.sync_timers(&weak);
            a.render();
        }

        log::info!("Fire Fist Dodger running!");
    }

    fn on_click(id: &str, app: &Shared, handler: fn(&mut App, &Weak<RefCell<App>>)) {
        let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        else {
            log::warn!("Missing button #{}", id);
            return;
        };
        let weak = Rc::downgrade(app);
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            if let Some(app) = weak.upgrade() {
                handler(&mut app.borrow_mut(), &weak);
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(app: &Shared) {
        on_click("start-btn", app, |a, weak| a.start_game(weak));
        on_click("restart-btn", app, |a, weak| a.start_game(weak));
        on_click("pause-btn", app, |a, weak| a.toggle_pause(weak));
        on_click("resume-btn", app, |a, weak| a.toggle_pause(weak));
        on_click("pause-menu-btn", app, |a, weak| a.go_to_menu(weak));
        on_click("game-over-menu-btn", app, |a, weak| a.go_to_menu(weak));
        on_click("settings-btn", app, |a, _| {
            a.session.open_settings();
            a.update_screens();
        });
        on_click("leaderboard-btn", app, |a, _| {
            a.session.open_leaderboard();
            a.update_screens();
        });
        on_click("settings-back-btn", app, |a, weak| a.go_to_menu(weak));
        on_click("leaderboard-back-btn", app, |a, weak| a.go_to_menu(weak));
        on_click("sound-toggle", app, |a, _| {
            a.session.toggle_sound();
            a.apply_settings();
        });
        on_click("vibration-toggle", app, |a, _| {
            a.session.toggle_vibration();
            a.apply_settings();
        });
    }

    fn touch_canvas_x(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<f32> {
        let touch = event.touches().get(0)?;
        let rect = canvas.get_bounding_client_rect();
        Some(client_to_canvas_x(
            touch.client_x() as f32,
            rect.left() as f32,
            rect.width() as f32,
        ))
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, app: &Shared) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let Some(app) = weak.upgrade() else { return };
                let mut a = app.borrow_mut();
                if a.session.screen() != Screen::Game {
                    return;
                }
                let key = event.key();
                if is_pause_key(&key) {
                    event.prevent_default();
                    a.toggle_pause(&weak);
                } else if a.input.key_down(&key) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().input.key_up(&event.key());
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start / move
        for name in ["touchstart", "touchmove"] {
            let weak = Rc::downgrade(app);
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let Some(app) = weak.upgrade() else { return };
                if let Some(x) = touch_canvas_x(&canvas_clone, &event) {
                    app.borrow_mut().input.touch_at(x);
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end / cancel
        for name in ["touchend", "touchcancel"] {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().input.touch_end();
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(app: &Shared) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let weak = Rc::downgrade(app);
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                    return;
                }
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().auto_pause(&weak, "tab hidden");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let weak = Rc::downgrade(app);
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                if let Some(app) = weak.upgrade() {
                    app.borrow_mut().auto_pause(&weak, "window blur");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use fire_fist_dodger::consts::FPS;
    use fire_fist_dodger::format_time;
    use fire_fist_dodger::persistence::{MemoryStore, Persistence};
    use fire_fist_dodger::session::Session;
    use fire_fist_dodger::sim::{
        GameLoop, Hazard, Player, RunSummary, SpawnTimer, TickInput, TickOutcome,
    };

    /// Give up after this much simulated time
    const MAX_RUN_MS: f64 = 180_000.0;
    const DODGE_MARGIN: f32 = 20.0;

    /// Steer away from the lowest hazard falling into the player's column
    fn autopilot(player: &Player, hazards: &[Hazard]) -> TickInput {
        let p = &player.rect;
        let threat = hazards
            .iter()
            .filter(|h| h.rect.bottom() <= p.bottom())
            .filter(|h| h.rect.right() > p.x - DODGE_MARGIN && h.rect.x < p.right() + DODGE_MARGIN)
            .max_by(|a, b| a.rect.y.total_cmp(&b.rect.y));

        let Some(threat) = threat else {
            return TickInput::default();
        };

        let mut go_left = threat.rect.center().x > p.center().x;
        // Pinned against a wall: run under the hazard toward open space
        if go_left && p.x <= 0.0 {
            go_left = false;
        } else if !go_left && p.x >= player.max_x() {
            go_left = true;
        }

        TickInput {
            left: go_left,
            right: !go_left,
            touch_x: None,
        }
    }

    pub fn run(seed: u64) {
        let mut game = GameLoop::new(seed);
        game.set_assets_ready(true);
        game.set_on_game_over(Box::new(|summary: &RunSummary| {
            log::info!("Hit after {}s", summary.time);
        }));

        let mut session = Session::new(Persistence::new(MemoryStore::new()));
        let mut spawner = SpawnTimer::new(game.spawn_interval_ms());
        let frame_ms = 1000.0 / FPS as f64;

        let mut now = 0.0;
        session.start_game(&mut game, now);
        spawner.start(now);

        let summary = loop {
            now += frame_ms;
            for _ in 0..spawner.poll(now) {
                game.on_spawn_timer();
            }

            let input = autopilot(game.player(), game.hazards());
            match game.tick(now, &input) {
                TickOutcome::GameOver(summary) => break summary,
                TickOutcome::Advanced { level_up: true } => {
                    log::info!("Now: {}", game.level_meta().name);
                }
                _ => {}
            }

            if now >= MAX_RUN_MS {
                let summary = game.current_state().summary();
                game.stop_run();
                break summary;
            }
        };
        spawner.stop();

        let report = session.handle_game_over(summary);
        log::info!(
            "Run over: score {} in {} (level {}), record: {:?}, rank: {:?}",
            report.summary.score,
            format_time(report.summary.time),
            report.summary.level,
            report.record,
            report.rank
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Fire Fist Dodger (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    let seed = fire_fist_dodger::platform::time_seed();
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
