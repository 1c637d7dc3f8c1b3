//! Endless Road entry point
//!
//! On the web this wires the canvas, keyboard and HUD to the run controller
//! and drives it from `requestAnimationFrame`. Natively it runs a short
//! headless demo drive and logs what happened.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use endless_road::audio::{AudioManager, SoundEffect};
    use endless_road::projection::Viewport;
    use endless_road::renderer::{Frame, RenderState, Renderer};
    use endless_road::sim::{RunController, Steer, TickInput};
    use endless_road::{BodyStyle, CarColor, Profile, QualityPreset, Settings, Tuning, WheelStyle};
    use endless_road::profile::Purchase;

    /// Game instance holding all state
    struct Game {
        run: RunController,
        renderer: Renderer,
        render_state: Option<RenderState>,
        profile: Profile,
        settings: Settings,
        audio: AudioManager,
        last_time: f64,
        held_left: bool,
        held_right: bool,
        /// Canvas pixels per CSS pixel
        dpr: f32,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut run = RunController::new(Tuning::default());
            run.set_night_mode(settings.night_mode);
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);
            Self {
                run,
                renderer: Renderer::new(seed),
                render_state: None,
                profile: Profile::load(),
                settings,
                audio,
                last_time: 0.0,
                held_left: false,
                held_right: false,
                dpr: 1.0,
            }
        }

        fn input(&self) -> TickInput {
            TickInput {
                steer: Steer::from_held(self.held_left, self.held_right),
            }
        }

        /// Advance one display frame
        fn update(&mut self, dt: f32) {
            let input = self.input();
            self.run.tick(dt, &input, &mut self.profile);
            for event in self.run.take_events() {
                if let Some(effect) = SoundEffect::from_event(&event) {
                    self.audio.play(effect);
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) -> Option<Frame> {
            let render_state = self.render_state.as_mut()?;
            let (w, h) = render_state.size;
            let frame = self.renderer.frame(
                self.run.simulation(),
                &self.profile.cosmetics,
                &self.settings,
                Viewport::from_size(w as f32, h as f32),
            );
            match render_state.render(&frame) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
            Some(frame)
        }

        fn start(&mut self) {
            self.audio.resume();
            self.run.start();
            set_hidden("menu", true);
        }

        fn stop(&mut self) {
            let banked = self.run.stop(&mut self.profile);
            log::info!("Run stopped, {banked} coins banked");
            set_hidden("menu", false);
        }

        fn toggle_night(&mut self) {
            self.settings.night_mode = self.run.toggle_night();
            self.settings.save();
            self.audio.play(SoundEffect::Click);
        }

        fn cycle_quality(&mut self) {
            let next = match self.settings.quality {
                QualityPreset::Low => QualityPreset::Medium,
                QualityPreset::Medium => QualityPreset::High,
                QualityPreset::High => QualityPreset::Low,
            };
            self.settings.apply_preset(next);
            self.settings.save();
            log::info!("Quality: {}", next.as_str());
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.audio.apply_settings(&self.settings);
            self.settings.save();
        }

        // Garage: only while idle

        fn next_color(&mut self) {
            let all = CarColor::ALL;
            let i = all.iter().position(|c| *c == self.profile.cosmetics.color).unwrap_or(0);
            self.profile.select_color(all[(i + 1) % all.len()]);
            self.audio.play(SoundEffect::Click);
        }

        fn next_wheels(&mut self) {
            let all = WheelStyle::ALL;
            let i = all.iter().position(|w| *w == self.profile.cosmetics.wheels).unwrap_or(0);
            self.profile.select_wheels(all[(i + 1) % all.len()]);
            self.audio.play(SoundEffect::Click);
        }

        fn next_body(&mut self) {
            let all = BodyStyle::ALL;
            let i = all.iter().position(|b| *b == self.profile.cosmetics.body).unwrap_or(0);
            let body = all[(i + 1) % all.len()];
            let message = match self.profile.try_unlock(body) {
                Purchase::AlreadyOwned => format!("{}: {}", body.name(), body.blurb()),
                Purchase::Unlocked => format!("Unlocked {}!", body.name()),
                Purchase::NotEnoughCoins { missing } => {
                    format!("{} needs {missing} more coins", body.name())
                }
            };
            set_text("#garage-status", &message);
            self.audio.play(SoundEffect::Click);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, frame: Option<&Frame>) {
            let sim = self.run.simulation();
            set_text("#hud-score .hud-value", &sim.display_score().to_string());
            set_text("#hud-coins .hud-value", &sim.run.coins.to_string());
            set_text("#hud-speed .hud-value", &sim.display_speed().to_string());
            set_text("#bank .hud-value", &self.profile.coins_total.to_string());

            let document = web_sys::window().and_then(|w| w.document());
            let Some(document) = document else { return };

            if let Some(el) = document.get_element_by_id("speed-fill") {
                if let Some(el) = el.dyn_ref::<web_sys::HtmlElement>() {
                    let pct = format!("{:.1}%", sim.speed_gauge() * 100.0);
                    let _ = el.style().set_property("width", &pct);
                }
            }

            // Popups are plain DOM text over the canvas
            if let (Some(layer), Some(frame)) = (document.get_element_by_id("popups"), frame) {
                let html: String = frame
                    .labels
                    .iter()
                    .map(|label| {
                        let [r, g, b, a] = label.color;
                        format!(
                            "<span class=\"popup\" style=\"left:{:.0}px;top:{:.0}px;font-size:{:.0}px;color:rgba({:.0},{:.0},{:.0},{:.2})\">{}</span>",
                            label.position.x / self.dpr,
                            label.position.y / self.dpr,
                            label.size,
                            r * 255.0,
                            g * 255.0,
                            b * 255.0,
                            a,
                            label.text
                        )
                    })
                    .collect();
                layer.set_inner_html(&html);
            }
        }
    }

    fn set_text(selector: &str, text: &str) {
        let el = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector(selector).ok().flatten());
        if let Some(el) = el {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        let el = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id));
        if let Some(el) = el {
            let _ = el.set_attribute("class", if hidden { "hidden" } else { "" });
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Endless Road starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));
        game.borrow_mut().dpr = dpr as f32;

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("No WebGPU device, running without graphics: {e}"),
        }

        setup_input_handlers(game.clone());
        setup_resize(canvas, game.clone());
        setup_auto_stop(game.clone());

        set_hidden("hud", false);
        set_hidden("menu", false);

        request_animation_frame(game);

        log::info!("Endless Road running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let running = g.run.is_running();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.held_left = true,
                    "ArrowRight" | "d" | "D" => g.held_right = true,
                    " " | "Enter" if !running => g.start(),
                    "Escape" if running => g.stop(),
                    "n" | "N" => g.toggle_night(),
                    "q" | "Q" => g.cycle_quality(),
                    "m" | "M" => g.toggle_mute(),
                    "c" | "C" if !running => g.next_color(),
                    "w" | "W" if !running => g.next_wheels(),
                    "b" | "B" if !running => g.next_body(),
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.held_left = false,
                    "ArrowRight" | "d" | "D" => g.held_right = false,
                    _ => {}
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else { return };
            let dpr = window.device_pixel_ratio();
            let width = (canvas.client_width() as f64 * dpr) as u32;
            let height = (canvas.client_height() as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);
            let mut g = game.borrow_mut();
            g.dpr = dpr as f32;
            if let Some(render_state) = g.render_state.as_mut() {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Losing focus ends the run so held keys can't drive it off the road
    fn setup_auto_stop(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            g.held_left = false;
            g.held_right = false;
            if g.run.is_running() {
                log::info!("Run stopped (window blur)");
                g.stop();
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // The update step clamps long frames itself
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt);
            let frame = g.render();
            g.update_hud(frame.as_ref());
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Endless Road (native) starting...");
    log::info!("Native mode runs a headless demo drive - run with `trunk serve` for the game");

    let tuning = match std::env::args().nth(1) {
        Some(path) => load_tuning(&path),
        None => endless_road::Tuning::default(),
    };
    demo::drive(tuning, 60 * 45);
}

/// Read a tuning override file, falling back to defaults on any failure
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> endless_road::Tuning {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Could not read tuning file {path}: {e}; using defaults");
            return endless_road::Tuning::default();
        }
    };
    match endless_road::Tuning::from_json(&json) {
        Ok(tuning) => {
            log::info!("Loaded tuning from {path}");
            tuning
        }
        Err(e) => {
            log::warn!("Bad tuning file {path}: {e}; using defaults");
            endless_road::Tuning::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use endless_road::audio::SoundEffect;
    use endless_road::projection::Viewport;
    use endless_road::renderer::Renderer;
    use endless_road::sim::{GameEvent, RunController, Steer, TickInput};
    use endless_road::{Profile, Settings, Tuning};

    const FRAME_DT: f32 = 1.0 / 60.0;

    /// Drive a scripted weave for `frames` frames, rendering every second
    pub fn drive(tuning: Tuning, frames: u32) {
        let mut run = RunController::default();
        run.set_tuning(tuning);
        let mut profile = Profile::load();
        let settings = Settings::default();
        let mut renderer = Renderer::new(7);
        let viewport = Viewport::from_size(1280.0, 720.0);

        run.start();
        let (mut coins, mut hits, mut resets) = (0u32, 0u32, 0u32);
        let mut triangles = 0usize;

        for i in 0..frames {
            // Weave across the road, holding each side for a couple of seconds
            let phase = (i / 150) % 4;
            let steer = match phase {
                0 => Steer::Left,
                2 => Steer::Right,
                _ => Steer::Straight,
            };
            run.tick(FRAME_DT, &TickInput { steer }, &mut profile);

            for event in run.take_events() {
                match event {
                    GameEvent::CoinPickup => coins += 1,
                    GameEvent::ObstacleHit => hits += 1,
                    GameEvent::RunReset { .. } => resets += 1,
                    _ => {}
                }
                if let Some(effect) = SoundEffect::from_event(&event) {
                    log::trace!("frame {i}: {event:?} -> {effect:?}");
                }
            }

            if i % 60 == 0 {
                let frame = renderer.frame(run.simulation(), &profile.cosmetics, &settings, viewport);
                triangles = triangles.max(frame.triangle_count());
                let sim = run.simulation();
                log::debug!(
                    "t={:>4.1}s score {:>5} speed {:>3} km/h lateral {:+.2}",
                    i as f32 * FRAME_DT,
                    sim.display_score(),
                    sim.display_speed(),
                    sim.player.lateral
                );
            }
        }

        let sim = run.simulation();
        log::info!(
            "Demo finished: score {}, distance {:.0}, {} coins picked, {} hits, {} resets",
            sim.display_score(),
            sim.run.distance,
            coins,
            hits,
            resets
        );
        log::info!("Busiest frame: {triangles} triangles");

        let banked = run.stop(&mut profile);
        log::info!("Banked {banked} coins on stop; profile holds {}", profile.coins_total);
    }
}
