//! Motion Breakout entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlVideoElement};

    use motion_breakout::consts::*;
    use motion_breakout::motion::{InputSlot, MotionSensor};
    use motion_breakout::render::CanvasRenderer;
    use motion_breakout::session::{Directive, SessionController, SessionStatus};
    use motion_breakout::sim::{GameState, tick};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        session: SessionController,
        input: InputSlot,
        sensor: MotionSensor,
        renderer: CanvasRenderer,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        /// Run one display frame: wall-clock advance, fixed-step simulation,
        /// then draw. Returns the directives the shell must execute.
        fn frame(&mut self, time: f64) -> Vec<Directive> {
            let dt = if self.last_time > 0.0 {
                (((time - self.last_time) / 1000.0) as f32).min(0.1)
            } else {
                SIM_DT
            };
            self.last_time = time;

            let mut directives = Vec::new();
            // A countdown transition must reset the round before this
            // frame's substeps run, or the stale terminal state (ball below
            // the field, or grid cleared) would re-emit its outcome and
            // bounce the session straight back to the end screen
            match self.session.advance(dt) {
                Some(Directive::StartRound) => self.state.start_round(),
                Some(other) => directives.push(other),
                None => {}
            }

            if self.session.status() == SessionStatus::Playing {
                self.accumulator += dt;
                let mut substeps = 0;
                while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                    let sample = self.input.latest();
                    if let Some(outcome) = tick(&mut self.state, &sample) {
                        self.session.round_over(outcome);
                        self.accumulator = 0.0;
                        break;
                    }
                    self.accumulator -= SIM_DT;
                    substeps += 1;
                }
                if substeps == MAX_SUBSTEPS {
                    // Too far behind; drop the remainder instead of spiraling
                    self.accumulator = 0.0;
                }
            } else {
                self.accumulator = 0.0;
            }

            self.renderer.render(&self.state, &self.session);
            self.update_hud();
            directives
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let window = web_sys::window().unwrap();
            let document = window.document().unwrap();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.score.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-lives .hud-value").ok().flatten() {
                el.set_text_content(Some(&self.state.lives.to_string()));
            }
            if let Some(el) = document.query_selector("#hud-time .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{}s", self.session.elapsed_secs())));
            }
            if let Some(el) = document.query_selector("#hud-speed .hud-value").ok().flatten() {
                el.set_text_content(Some(SPEED_LABELS[self.state.speed_tier]));
            }

            let status = self.session.status();

            if let Some(el) = document.get_element_by_id("menu-screen") {
                let _ = el.set_attribute(
                    "class",
                    if status == SessionStatus::Menu { "" } else { "hidden" },
                );
            }
            if let Some(el) = document.get_element_by_id("loading-screen") {
                let _ = el.set_attribute(
                    "class",
                    if status == SessionStatus::Loading { "" } else { "hidden" },
                );
            }

            // Terminal screen: title plus the auto-retry countdown
            if let Some(el) = document.get_element_by_id("end-screen") {
                let terminal =
                    status == SessionStatus::GameOver || status == SessionStatus::Victory;
                let _ = el.set_attribute("class", if terminal { "" } else { "hidden" });
                if terminal {
                    if let Some(title) = document.get_element_by_id("end-title") {
                        title.set_text_content(Some(if status == SessionStatus::Victory {
                            "YOU WIN!"
                        } else {
                            "GAME OVER"
                        }));
                    }
                    if let Some(score) = document.get_element_by_id("final-score") {
                        score.set_text_content(Some(&self.state.score.to_string()));
                    }
                    if let Some(countdown) = document.get_element_by_id("retry-countdown") {
                        if let Some(secs) = self.session.retry_countdown() {
                            countdown.set_text_content(Some(&format!("Retrying in {secs}...")));
                        }
                    }
                }
            }
        }
    }

    /// Execute a controller directive. Camera directives spawn an async
    /// acquisition whose completion is reported back to the controller; a
    /// stale completion is dropped there, not here.
    fn apply_directive(game: &Rc<RefCell<Game>>, directive: Directive) {
        match directive {
            Directive::StartRound => game.borrow_mut().state.start_round(),
            Directive::ResumeRound => {}
            Directive::AcquireCamera { facing } | Directive::RestartSensor { facing } => {
                let game = game.clone();
                let sensor = game.borrow().sensor.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match sensor.initialize(facing).await {
                        Ok(()) => {
                            let next = game.borrow_mut().session.camera_ready();
                            if let Some(next) = next {
                                apply_directive(&game, next);
                            }
                        }
                        Err(err) => {
                            game.borrow_mut().session.camera_failed(&err);
                            show_camera_error(&err.to_string());
                        }
                    }
                });
            }
        }
    }

    fn show_camera_error(message: &str) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id("camera-error") {
            el.set_text_content(Some(message));
            let _ = el.set_attribute("class", "error");
        }
    }

    fn hide_camera_error() {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(el) = document.get_element_by_id("camera-error") {
            let _ = el.set_attribute("class", "hidden");
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Motion Breakout starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        let video: HtmlVideoElement = document
            .get_element_by_id("camera")
            .expect("no camera video element")
            .dyn_into()
            .expect("not a video");

        // Field units map 1:1 onto canvas pixels
        let width = canvas.client_width().max(1) as u32;
        let height = canvas.client_height().max(1) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let input = InputSlot::new();
        let sensor =
            MotionSensor::new(video, input.clone()).expect("failed to create motion sensor");
        let renderer = CanvasRenderer::new(&canvas).expect("failed to create renderer");

        let game = Rc::new(RefCell::new(Game {
            state: GameState::new(width as f32, height as f32, seed),
            session: SessionController::new(),
            input,
            sensor,
            renderer,
            accumulator: 0.0,
            last_time: 0.0,
        }));

        log::info!("Game initialized with seed: {} ({}x{})", seed, width, height);

        setup_start_button(game.clone());
        setup_camera_button(game.clone());
        setup_speed_button(game.clone());

        request_animation_frame(game);

        log::info!("Motion Breakout running!");
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
        let directives = game.borrow_mut().frame(time);
        for directive in directives {
            apply_directive(&game, directive);
        }
        request_animation_frame(game);
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                hide_camera_error();
                let directive = game.borrow_mut().session.request_start();
                if let Some(directive) = directive {
                    apply_directive(&game, directive);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_camera_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(btn) = document.get_element_by_id("camera-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                hide_camera_error();
                let directive = game.borrow_mut().session.toggle_camera();
                if let Some(directive) = directive {
                    apply_directive(&game, directive);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_speed_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(btn) = document.get_element_by_id("speed-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                g.state.cycle_speed_tier();
                log::info!("speed tier: {}", SPEED_LABELS[g.state.speed_tier]);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
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
fn main() {
    env_logger::init();
    log::info!("Motion Breakout (native) starting...");
    log::info!("The camera pipeline is web-only - run with `trunk serve` for the playable version");

    // Headless smoke run of the simulation
    println!("\nRunning simulation smoke test...");
    smoke_test();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn smoke_test() {
    use motion_breakout::motion::MotionSample;
    use motion_breakout::sim::{GameState, tick};

    let mut state = GameState::new(800.0, 600.0, 42);
    state.start_round();
    let input = MotionSample::default();
    for _ in 0..600 {
        if tick(&mut state, &input).is_some() {
            break;
        }
        assert!(state.paddle.x >= 0.0 && state.paddle.x + state.paddle.width <= state.width);
    }
    println!("✓ Simulation smoke test passed (score {})", state.score);
}
