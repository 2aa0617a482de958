//! Smile Jump entry point
//!
//! Browser: binds the core to the page's DOM, keyboard and audio. The face
//! detector lives in JS and reports through the exported `on_happy_level`.
//! Native: runs a scripted headless round and logs what happens.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Keyboard shortcuts the page listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
enum Hotkey {
    Jump,
    Submit,
    ToggleMute,
}

/// Map a `KeyboardEvent.key` to a shortcut
///
/// While a text field has focus only Enter is a shortcut, so typing a name
/// never jumps or mutes.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn hotkey(key: &str, typing: bool) -> Option<Hotkey> {
    match key {
        "Enter" => Some(Hotkey::Submit),
        _ if typing => None,
        " " => Some(Hotkey::Jump),
        "m" | "M" => Some(Hotkey::ToggleMute),
        _ => None,
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlElement, HtmlInputElement};

    use smile_jump::audio::AudioManager;
    use smile_jump::persistence::LocalStorage;
    use smile_jump::sim::{Aabb, Entity, GameEvent, GamePhase, GameState, Scene, advance};
    use smile_jump::{HighScores, Settings};

    use super::{Hotkey, hotkey};

    // Hooks into the page's face-expression sampler
    #[wasm_bindgen(inline_js = "
        export function start_sampling() {
            const hooks = window.smileJump;
            if (hooks && hooks.startSampling) hooks.startSampling();
        }

        export function stop_sampling() {
            const hooks = window.smileJump;
            if (hooks && hooks.stopSampling) hooks.stopSampling();
        }
    ")]
    extern "C" {
        fn start_sampling();
        fn stop_sampling();
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    /// Player, obstacle and berry elements, measured live
    struct DomScene {
        player: Option<Element>,
        obstacle: Option<Element>,
        berry: Option<Element>,
    }

    impl Scene for DomScene {
        fn bounds(&self, entity: Entity) -> Option<Aabb> {
            let el = match entity {
                Entity::Player => self.player.as_ref(),
                Entity::Obstacle => self.obstacle.as_ref(),
                Entity::Collectible => self.berry.as_ref(),
            }?;
            let rect = el.get_bounding_client_rect();
            Some(Aabb::new(
                rect.left() as f32,
                rect.top() as f32,
                rect.right() as f32,
                rect.bottom() as f32,
            ))
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        scene: DomScene,
        settings: Settings,
        audio: AudioManager,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load(&LocalStorage);
            let high_scores = HighScores::load(&LocalStorage);
            let document = web_sys::window().unwrap().document().unwrap();
            Self {
                state: GameState::new(seed, settings.tuning(), high_scores),
                scene: DomScene {
                    player: document.get_element_by_id("player"),
                    obstacle: document.get_element_by_id("obstacle"),
                    berry: document.get_element_by_id("berry"),
                },
                audio: AudioManager::new(&settings),
                settings,
                last_time: 0.0,
            }
        }

        /// Run timers and collision ticks for this frame
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time).min(250.0)
            } else {
                0.0
            };
            self.last_time = time;
            advance(&mut self.state, dt, &self.scene);
            self.apply_events();
        }

        fn start(&mut self) {
            if let Err(e) = self.state.start() {
                log::warn!("Start ignored: {}", e);
            }
            if self.settings.show_help {
                self.settings.show_help = false;
                self.settings.save(&LocalStorage);
                set_hidden("help-modal", true);
            }
            self.apply_events();
        }

        fn restart(&mut self) {
            let name = player_name_input().map(|input| input.value());
            match self.state.restart(name.as_deref(), &LocalStorage) {
                Ok(()) => {
                    if let Some(input) = player_name_input() {
                        input.set_value("");
                    }
                }
                Err(e) => log::warn!("Restart refused: {}", e),
            }
            self.apply_events();
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.settings.save(&LocalStorage);
            self.audio.apply_settings(&self.settings);
            log::info!("Muted: {}", self.settings.muted);
        }

        fn jump(&mut self) {
            self.state.request_jump();
            self.apply_events();
        }

        /// Turn queued core events into DOM/audio changes
        fn apply_events(&mut self) {
            for event in self.state.drain_events() {
                match event {
                    GameEvent::PhaseEntered(phase) => self.show_phase(phase),
                    GameEvent::SamplingStarted => after_borrow(start_sampling),
                    GameEvent::SamplingStopped => after_borrow(stop_sampling),
                    GameEvent::JumpStarted => toggle_class(&self.scene.player, "jump", true),
                    GameEvent::JumpEnded => toggle_class(&self.scene.player, "jump", false),
                    GameEvent::ObstacleCollision => log::info!("Ouch!"),
                    GameEvent::ScoreChanged(score) => set_text("score", &score.to_string()),
                    GameEvent::CollectibleHidden => toggle_class(&self.scene.berry, "collected", true),
                    GameEvent::CollectibleShown { delay_ms } => {
                        toggle_class(&self.scene.berry, "collected", false);
                        restart_animation(&self.scene.berry, "move 3s linear infinite", delay_ms);
                    }
                    GameEvent::ObstacleReset => {
                        restart_animation(&self.scene.obstacle, "obstacle-move 7s linear infinite", 0.0)
                    }
                    GameEvent::HighScoreCommitted { rank } => {
                        log::info!("Leaderboard rank: {:?}", rank);
                        self.update_trophy();
                    }
                    GameEvent::Sound(sound) => self.audio.play(sound),
                }
            }
        }

        fn show_phase(&self, phase: GamePhase) {
            set_hidden("start-mask", phase != GamePhase::Idle);
            set_hidden("game-over", phase != GamePhase::GameOver);
            set_hidden("high-score-form", !self.state.is_new_high_score());
            toggle_class(&self.scene.player, "stop", phase == GamePhase::GameOver);

            let document = web_sys::window().unwrap().document().unwrap();
            if let Some(el) = document.get_element_by_id("game") {
                let _ = el.set_attribute("data-phase", &format!("{:?}", phase).to_lowercase());
            }
            if phase == GamePhase::GameOver && self.state.is_new_high_score() {
                if let Some(input) = player_name_input() {
                    let _ = input.focus();
                }
            }
        }

        fn update_trophy(&self) {
            match self.state.high_scores().top_entry() {
                Some(top) => {
                    set_text("trophy-score", &format!("{} ( {} )", top.score(), top.name()));
                    set_hidden("trophy", false);
                }
                None => set_hidden("trophy", true),
            }
        }
    }

    fn set_text(id: &str, text: &str) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn toggle_class(el: &Option<Element>, class: &str, on: bool) {
        if let Some(el) = el {
            let _ = el.class_list().toggle_with_force(class, on);
        }
    }

    /// Restart a CSS animation from its first frame
    fn restart_animation(el: &Option<Element>, animation: &str, delay_ms: f64) {
        let Some(el) = el.as_ref().and_then(|e| e.dyn_ref::<HtmlElement>()) else {
            return;
        };
        let style = el.style();
        let _ = style.set_property("animation", "none");
        let _ = el.offset_width(); // Force reflow
        let _ = style.set_property("animation", animation);
        let _ = style.set_property("animation-delay", &format!("{}ms", delay_ms.round()));
    }

    fn player_name_input() -> Option<HtmlInputElement> {
        let document = web_sys::window()?.document()?;
        document.get_element_by_id("player-name")?.dyn_into().ok()
    }

    /// Run page JS once the current Rust call returns
    ///
    /// The sampler may call back into `on_happy_level` synchronously, which
    /// needs the `Game` borrow that is still held while events are applied.
    fn after_borrow(f: fn()) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let callback = Closure::once_into_js(f);
        window.queue_microtask(callback.unchecked_ref());
    }

    fn with_game(f: impl FnOnce(&mut Game)) {
        GAME.with(|slot| {
            if let Some(game) = slot.borrow().as_ref() {
                match game.try_borrow_mut() {
                    Ok(mut g) => f(&mut g),
                    Err(_) => log::warn!("Game busy, dropping sampler callback"),
                }
            }
        });
    }

    /// Webcam sample from the JS face detector
    pub fn on_happy_level(level: f32) {
        with_game(|g| {
            g.state.on_happy_level(level);
            g.apply_events();
        });
    }

    /// Camera denied or detector failed: smile input is off, keyboard still works
    pub fn signal_lost() {
        with_game(|g| {
            log::warn!("Smile signal lost, keyboard only");
            g.state.signal_lost();
        });
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Smile Jump starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        {
            let g = game.borrow();
            g.update_trophy();
            g.show_phase(GamePhase::Idle);
            set_hidden("help-modal", !g.settings.show_help);
        }
        GAME.with(|slot| *slot.borrow_mut() = Some(game.clone()));

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        request_animation_frame(game);
        log::info!("Smile Jump running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let typing = event
                .target()
                .is_some_and(|target| target.dyn_ref::<HtmlInputElement>().is_some());
            let Some(key) = hotkey(&event.key(), typing) else {
                return;
            };
            let mut g = game.borrow_mut();
            match key {
                Hotkey::Jump => g.jump(),
                Hotkey::Submit if g.state.phase() == GamePhase::GameOver => g.restart(),
                Hotkey::Submit => {}
                Hotkey::ToggleMute => g.toggle_mute(),
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("reset-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Help bubble toggle
        if let Some(btn) = document.get_element_by_id("help") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.settings.show_help = !g.settings.show_help;
                g.settings.save(&LocalStorage);
                set_hidden("help-modal", !g.settings.show_help);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Called by the page's face detector (~every 200 ms while sampling)
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn on_happy_level(level: f32) {
    wasm_game::on_happy_level(level);
}

/// Called by the page when the webcam or detector is unavailable
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn signal_lost() {
    wasm_game::signal_lost();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Smile Jump (native) starting...");
    log::info!("Native mode is a headless demo - build for wasm32 to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2024);
    demo::run(seed, 3);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted rounds: a fake sampler smiles when the cactus gets close
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use smile_jump::consts::SIGNAL_SAMPLE_MS;
    use smile_jump::persistence::MemoryStorage;
    use smile_jump::sim::{Aabb, Entity, GameEvent, GamePhase, GameState, Scene, advance};
    use smile_jump::{HighScores, Settings};

    const FRAME_MS: f64 = 16.0;
    const MAX_ROUND_MS: f64 = 60_000.0;

    const GROUND: f32 = 300.0;
    const STAGE_WIDTH: f32 = 800.0;
    const JUMP_HEIGHT: f32 = 160.0;
    const OBSTACLE_LOOP_MS: f64 = 3000.0;
    const BERRY_LOOP_MS: f64 = 2300.0;

    /// Positions derived from the round clock, like the CSS animations
    struct DemoScene {
        round_ms: f64,
        jump_started_ms: Option<f64>,
        jump_duration_ms: f64,
        berry_delay_ms: f64,
    }

    impl DemoScene {
        fn sweep_x(&self, loop_ms: f64, width: f32, offset_ms: f64) -> f32 {
            let t = (self.round_ms - offset_ms).max(0.0) % loop_ms;
            let p = (t / loop_ms) as f32;
            STAGE_WIDTH - p * (STAGE_WIDTH + width)
        }

        fn player_lift(&self) -> f32 {
            let Some(start) = self.jump_started_ms else {
                return 0.0;
            };
            let p = (((self.round_ms - start) / self.jump_duration_ms) as f32).clamp(0.0, 1.0);
            4.0 * JUMP_HEIGHT * p * (1.0 - p)
        }
    }

    impl Scene for DemoScene {
        fn bounds(&self, entity: Entity) -> Option<Aabb> {
            match entity {
                Entity::Player => {
                    let lift = self.player_lift();
                    Some(Aabb::from_origin_size(50.0, GROUND - 80.0 - lift, 80.0, 80.0))
                }
                Entity::Obstacle => {
                    let x = self.sweep_x(OBSTACLE_LOOP_MS, 100.0, 0.0);
                    Some(Aabb::from_origin_size(x, GROUND - 60.0, 100.0, 60.0))
                }
                Entity::Collectible => {
                    let x = self.sweep_x(BERRY_LOOP_MS, 30.0, self.berry_delay_ms);
                    Some(Aabb::from_origin_size(x, GROUND - 170.0, 30.0, 30.0))
                }
            }
        }
    }

    pub fn run(seed: u64, rounds: u32) {
        let storage = MemoryStorage::new();
        let settings = Settings::load(&storage);
        let mut state = GameState::new(seed, settings.tuning(), HighScores::load(&storage));
        let mut scene = DemoScene {
            round_ms: 0.0,
            jump_started_ms: None,
            jump_duration_ms: state.tuning.jump_duration_ms,
            berry_delay_ms: 0.0,
        };

        if let Err(e) = state.start() {
            log::error!("Could not start: {}", e);
            return;
        }

        for round in 1..=rounds {
            let mut next_sample = SIGNAL_SAMPLE_MS;
            while state.phase() == GamePhase::Playing && scene.round_ms < MAX_ROUND_MS {
                scene.round_ms += FRAME_MS;
                advance(&mut state, FRAME_MS, &scene);

                if scene.round_ms >= next_sample {
                    next_sample += SIGNAL_SAMPLE_MS;
                    state.on_happy_level(fake_happiness(&scene));
                }

                for event in state.drain_events() {
                    log::debug!("{:>7.0} ms  {:?}", scene.round_ms, event);
                    match event {
                        GameEvent::JumpStarted => scene.jump_started_ms = Some(scene.round_ms),
                        GameEvent::JumpEnded => scene.jump_started_ms = None,
                        GameEvent::CollectibleShown { delay_ms } => {
                            scene.berry_delay_ms = scene.round_ms + delay_ms
                        }
                        _ => {}
                    }
                }
            }

            log::info!(
                "Round {} over after {:.1}s with {} points",
                round,
                scene.round_ms / 1000.0,
                state.score()
            );
            println!("Round {}: {} points", round, state.score());

            if state.phase() != GamePhase::GameOver || round == rounds {
                break;
            }
            let name = format!("Demo {}", round);
            if let Err(e) = state.restart(Some(&name), &storage) {
                log::error!("Could not restart: {}", e);
                break;
            }
            state.drain_events();
            scene.round_ms = 0.0;
            scene.jump_started_ms = None;
            scene.berry_delay_ms = 0.0;
        }

        println!("\nLeaderboard:");
        for (i, entry) in state.high_scores().entries().iter().enumerate() {
            println!("{}. {:<12} {}", i + 1, entry.name(), entry.score());
        }
    }

    /// Grin when the obstacle is about to reach the player
    fn fake_happiness(scene: &DemoScene) -> f32 {
        let player = scene.bounds(Entity::Player);
        let obstacle = scene.bounds(Entity::Obstacle);
        match (player, obstacle) {
            (Some(p), Some(o)) if o.left > p.right - 40.0 && o.left < p.right + 120.0 => 0.95,
            _ => 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hotkeys_while_playing() {
        assert_eq!(hotkey(" ", false), Some(Hotkey::Jump));
        assert_eq!(hotkey("m", false), Some(Hotkey::ToggleMute));
        assert_eq!(hotkey("M", false), Some(Hotkey::ToggleMute));
        assert_eq!(hotkey("Enter", false), Some(Hotkey::Submit));
        assert_eq!(hotkey("x", false), None);
    }

    #[test]
    fn test_typing_a_name_only_submits() {
        for key in ["T", "o", "m", "M", " "] {
            assert_eq!(hotkey(key, true), None, "key {key:?}");
        }
        assert_eq!(hotkey("Enter", true), Some(Hotkey::Submit));
    }
}
