//! Blocks Sandbox entry point
//!
//! Handles platform-specific initialization and runs the editor loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::DVec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement,
        HtmlInputElement, MouseEvent,
    };

    use blocks_sandbox::consts::*;
    use blocks_sandbox::persistence::{LevelData, LevelError};
    use blocks_sandbox::renderer::canvas::paint;
    use blocks_sandbox::renderer::{demo_draw_list, level_draw_list};
    use blocks_sandbox::sim::{
        BounceDemo, Command, Direction, EditError, PlaceKind, SimEvent, SimulationState, apply,
    };
    use blocks_sandbox::{GridPreset, Settings, Ticker};

    const CANVAS_ID: &str = "blocksCanvas";
    const GRID_BUTTONS: [(&str, GridPreset); 3] = [
        ("extraSmallGrid", GridPreset::ExtraSmall),
        ("smallGrid", GridPreset::Small),
        ("mediumGrid", GridPreset::Medium),
    ];

    /// Editor instance holding all state
    struct Game {
        state: SimulationState,
        settings: Settings,
        ticker: Ticker,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        /// Brush picked in the toolbox
        selected: Option<PlaceKind>,
        dragging: bool,
        /// Set when the page runs the bouncing-squares demo instead
        demo: Option<BounceDemo>,
    }

    impl Game {
        fn new(seed: u64, settings: Settings, canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
            let mut state = SimulationState::new(settings.grid, DVec2::ZERO, seed);
            state.brush = settings.brush;
            state.players = vec![None; settings.player_count];
            Self {
                state,
                settings,
                ticker: Ticker::new(),
                canvas,
                ctx,
                selected: None,
                dragging: false,
                demo: None,
            }
        }

        /// Largest canvas for `preset` that fits the page layout
        fn fitted_canvas(&self, preset: GridPreset) -> DVec2 {
            let parent = self.canvas.parent_element();
            let height = parent.as_ref().map(|p| p.client_height()).unwrap_or(0);
            let width = parent
                .and_then(|p| p.parent_element())
                .map(|p| p.client_width())
                .unwrap_or(0);
            preset.fit_canvas(DVec2::new(width as f64, height as f64))
        }

        /// Size the canvas element to the state's board
        fn apply_canvas_size(&self) {
            let size = self.state.canvas;
            self.canvas.set_width(size.x as u32);
            self.canvas.set_height(size.y as u32);
            let style = self.canvas.style();
            let _ = style.set_property("width", &format!("{}px", size.x));
            let _ = style.set_property("height", &format!("{}px", size.y));
        }

        /// Apply a command, keeping the ticker and controls in step with the phase
        fn run(&mut self, command: Command) -> Result<(), EditError> {
            let result = apply(&mut self.state, command);
            if self.state.is_running() {
                self.ticker.start();
            } else {
                self.ticker.stop();
            }
            self.update_controls();
            result
        }

        fn remember_preferences(&mut self) {
            self.settings.grid = self.state.grid;
            self.settings.player_count = self.state.players.len();
            self.settings.brush = self.state.brush;
            self.settings.save();
        }

        fn place_at(&mut self, event: &MouseEvent) {
            let Some(kind) = self.selected else {
                return;
            };

            // The element may be scaled by CSS; map client pixels to canvas pixels
            let rect = self.canvas.get_bounding_client_rect();
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                return;
            }
            let scale = DVec2::new(
                self.canvas.width() as f64 / rect.width(),
                self.canvas.height() as f64 / rect.height(),
            );
            let point = DVec2::new(
                event.client_x() as f64 - rect.left(),
                event.client_y() as f64 - rect.top(),
            ) * scale;
            let cell = self.state.cell_of(point);

            if self.run(Command::PlaceObject { kind, cell }).is_ok() {
                if let PlaceKind::Player(_) = kind {
                    self.selected = None;
                }
            }
        }

        fn update_controls(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(btn) = document.get_element_by_id("simulationButton") {
                let label = if self.state.is_running() {
                    "Pause Simulation"
                } else {
                    "Start Simulation"
                };
                btn.set_text_content(Some(label));
            }
            if let Ok(blocks) = document.query_selector_all(".player-block") {
                for i in 0..blocks.length() {
                    let Some(block) = blocks.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                        continue;
                    };
                    let used = matches!(self.state.players.get(i as usize), Some(Some(_)));
                    let _ = block.class_list().toggle_with_force("used", used);
                }
            }
        }

        fn frame(&mut self, time: f64) {
            if let Some(demo) = &mut self.demo {
                demo.tick(1.0);
                paint(&self.ctx, &demo_draw_list(demo));
                return;
            }

            let ticks = self.ticker.advance(time, &mut self.state);
            if ticks > 0 {
                for event in self.state.drain_events() {
                    match event {
                        SimEvent::Shrunk { slot } => log::debug!("Player {} shrank", slot + 1),
                        SimEvent::Solved { slot } => {
                            log::info!("You Win! Player {} reached the finish", slot + 1);
                            self.update_controls();
                        }
                    }
                }
            }
            paint(&self.ctx, &level_draw_list(&self.state));
        }
    }

    fn alert(message: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Blocks Sandbox starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let game = Rc::new(RefCell::new(Game::new(seed, settings, canvas, ctx)));
        log::info!("Sandbox initialized with seed: {}", seed);

        let bounce = window.location().hash().map(|h| h == "#bounce").unwrap_or(false);
        {
            let mut g = game.borrow_mut();
            if bounce {
                let demo = BounceDemo::new(seed);
                g.state.canvas = demo.canvas;
                g.demo = Some(demo);
                log::info!("Running bouncing-squares demo");
            } else {
                let grid = g.state.grid;
                g.state.canvas = g.fitted_canvas(grid);
            }
            g.apply_canvas_size();
        }

        if !bounce {
            setup_canvas_input(&game)?;
            setup_toolbox(&document, &game);
            setup_pusher_controls(&document, &game);
            setup_player_controls(&document, &game);
            setup_buttons(&document, &game);
            setup_resize(&game);
            setup_auto_pause(&document, &game);
            game.borrow().update_controls();
        }

        request_animation_frame(game);
        log::info!("Blocks Sandbox running!");
        Ok(())
    }

    fn on_click(document: &Document, id: &str, game: &Rc<RefCell<Game>>, mut handler: impl FnMut(&mut Game) + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing element #{}", id);
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            handler(&mut game.borrow_mut());
        });
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn elements(document: &Document, selector: &str) -> Vec<Element> {
        let Ok(list) = document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn input_value(document: &Document, id: &str) -> Option<String> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
    }

    fn setup_canvas_input(game: &Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let canvas = game.borrow().canvas.clone();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.selected.is_some() {
                    g.dragging = true;
                    g.place_at(&event);
                }
            });
            canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if g.dragging {
                    g.place_at(&event);
                }
            });
            canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Releasing or leaving ends a drag; a player brush is single-use
        for name in ["mouseup", "mouseleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.dragging = false;
                if let Some(PlaceKind::Player(_)) = g.selected {
                    g.selected = None;
                }
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn setup_toolbox(document: &Document, game: &Rc<RefCell<Game>>) {
        for item in elements(document, ".item") {
            let kind = match item.get_attribute("data-type").as_deref() {
                Some("wall") => PlaceKind::Wall,
                Some("finish") => PlaceKind::Finish,
                Some("shrinker") => PlaceKind::Shrinker,
                Some("pusher") => PlaceKind::Pusher,
                other => {
                    log::warn!("Unknown toolbox item: {:?}", other);
                    continue;
                }
            };
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().selected = Some(kind);
                for other in elements(&document, ".item") {
                    let selected = other.get_attribute("data-type").as_deref() == item_type(kind);
                    let _ = other.class_list().toggle_with_force("selected", selected);
                }
                if let Some(selector) = document.get_element_by_id("directionSelector") {
                    if let Ok(selector) = selector.dyn_into::<HtmlElement>() {
                        let display = if kind == PlaceKind::Pusher { "block" } else { "none" };
                        let _ = selector.style().set_property("display", display);
                    }
                }
            });
            let _ = item.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn item_type(kind: PlaceKind) -> Option<&'static str> {
        match kind {
            PlaceKind::Wall => Some("wall"),
            PlaceKind::Finish => Some("finish"),
            PlaceKind::Shrinker => Some("shrinker"),
            PlaceKind::Pusher => Some("pusher"),
            PlaceKind::Player(_) => None,
        }
    }

    fn setup_pusher_controls(document: &Document, game: &Rc<RefCell<Game>>) {
        for button in elements(document, ".direction-btn") {
            let Some(direction) = button
                .get_attribute("data-direction")
                .and_then(|d| Direction::from_str(&d))
            else {
                continue;
            };
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                let _ = g.run(Command::SetDirection(direction));
                g.remember_preferences();
                for other in elements(&document, ".direction-btn") {
                    let selected = other.get_attribute("data-direction").as_deref() == Some(direction.as_str());
                    let _ = other.class_list().toggle_with_force("selected", selected);
                }
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(input) = document.get_element_by_id("pusherLength") {
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(value) = input_value(&document, "pusherLength") else {
                    return;
                };
                let Ok(length) = value.trim().parse::<i64>() else {
                    return;
                };
                let mut g = game.borrow_mut();
                let _ = g.run(Command::SetPusherLength(length.clamp(0, u32::MAX as i64) as u32));
                g.remember_preferences();
                // Show the clamped value
                if let Some(input) = document
                    .get_element_by_id("pusherLength")
                    .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                {
                    input.set_value(&g.state.brush.length.to_string());
                }
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(slider) = document.get_element_by_id("pusherSpeed") {
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(speed) = input_value(&document, "pusherSpeed").and_then(|v| v.parse::<f64>().ok()) else {
                    return;
                };
                let mut g = game.borrow_mut();
                let _ = g.run(Command::SetPusherSpeed(speed));
                g.remember_preferences();
                if let Some(label) = document.get_element_by_id("pusherSpeedValue") {
                    label.set_text_content(Some(&format!("{:.1}", g.state.brush.speed)));
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_player_controls(document: &Document, game: &Rc<RefCell<Game>>) {
        let count = game.borrow().state.players.len();
        build_player_blocks(document, game, count);

        if let Some(slider) = document.get_element_by_id("playerCount") {
            let game = game.clone();
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let Some(count) = input_value(&document, "playerCount").and_then(|v| v.parse::<usize>().ok()) else {
                    return;
                };
                let count = {
                    let mut g = game.borrow_mut();
                    let _ = g.run(Command::SetPlayerCount(count));
                    g.remember_preferences();
                    g.state.players.len()
                };
                if let Some(label) = document.get_element_by_id("playerCountValue") {
                    label.set_text_content(Some(&count.to_string()));
                }
                build_player_blocks(&document, &game, count);
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// One clickable swatch per player slot
    fn build_player_blocks(document: &Document, game: &Rc<RefCell<Game>>, count: usize) {
        let Some(container) = document.get_element_by_id("playerBlocks") else {
            return;
        };
        container.set_inner_html("");

        for slot in 0..count {
            let Ok(block) = document.create_element("div") else {
                continue;
            };
            block.set_class_name("player-block");
            block.set_text_content(Some(&(slot + 1).to_string()));
            let _ = block.set_attribute("data-player-index", &slot.to_string());
            if let Ok(block) = block.clone().dyn_into::<HtmlElement>() {
                let _ = block
                    .style()
                    .set_property("background-color", PLAYER_COLORS[slot % MAX_PLAYERS]);
            }

            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().selected = Some(PlaceKind::Player(slot));
            });
            let _ = block.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();

            let _ = container.append_child(&block);
        }
        game.borrow().update_controls();
    }

    fn setup_buttons(document: &Document, game: &Rc<RefCell<Game>>) {
        on_click(document, "simulationButton", game, |g| {
            match g.run(Command::ToggleSimulation) {
                Err(EditError::NoPlayers) => {
                    alert("Please place at least one player before starting the simulation!")
                }
                Err(EditError::AlreadySolved) => alert("Level solved! Clear the canvas to play again."),
                _ => {}
            }
        });

        on_click(document, "clearButton", game, |g| {
            if g.run(Command::Clear).is_err() {
                alert("Please pause the simulation before clearing the canvas!");
            }
        });

        on_click(document, "saveButton", game, |g| {
            match LevelData::capture(&g.state).save() {
                Ok(()) => alert("Level saved!"),
                Err(e) => {
                    log::warn!("Save failed: {}", e);
                    alert(&format!("Could not save level: {}", e));
                }
            }
        });

        on_click(document, "loadButton", game, |g| match LevelData::load() {
            Ok(level) => {
                if g.run(Command::LoadLevel(level)).is_ok() {
                    alert("Level loaded!");
                } else {
                    alert("Please pause the simulation before loading a level!");
                }
            }
            Err(LevelError::NotFound) => log::info!("No saved level"),
            Err(e) => log::warn!("Load failed: {}", e),
        });

        on_click(document, "premadeButton", game, |g| {
            let canvas = g.fitted_canvas(GridPreset::Small);
            if g.run(Command::LoadPremade { canvas }).is_err() {
                alert("Please pause the simulation before loading the premade level!");
                return;
            }
            g.apply_canvas_size();
            g.remember_preferences();
        });

        for (id, preset) in GRID_BUTTONS {
            let document_for_handler = document.clone();
            on_click(document, id, game, move |g| {
                let canvas = g.fitted_canvas(preset);
                if g.run(Command::SetGridSize { preset, canvas }).is_err() {
                    alert("Please pause the simulation before changing grid size!");
                    return;
                }
                g.apply_canvas_size();
                g.remember_preferences();
                for (other, p) in GRID_BUTTONS {
                    if let Some(btn) = document_for_handler.get_element_by_id(other) {
                        let _ = btn.class_list().toggle_with_force("selected", p == preset);
                    }
                }
            });
        }
    }

    fn setup_resize(game: &Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            let grid = g.state.grid;
            let canvas = g.fitted_canvas(grid);
            let _ = g.run(Command::Resize { canvas });
            g.apply_canvas_size();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Pause when the tab is hidden so a backgrounded run does not jump ahead
    fn setup_auto_pause(document: &Document, game: &Rc<RefCell<Game>>) {
        let game = game.clone();
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if doc.hidden() {
                let mut g = game.borrow_mut();
                if g.state.is_running() {
                    let _ = g.run(Command::PauseSimulation);
                    log::info!("Auto-paused (tab hidden)");
                }
            }
        });
        let _ = document.add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Blocks Sandbox (native) starting...");
    log::info!("The editor needs a browser - build for wasm32 to use it");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2024);

    run_bounce_demo(seed);
    run_premade_level(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless run of the bouncing-squares demo
#[cfg(not(target_arch = "wasm32"))]
fn run_bounce_demo(seed: u64) {
    use blocks_sandbox::consts::DEMO_SPEED;
    use blocks_sandbox::sim::BounceDemo;

    let mut demo = BounceDemo::new(seed);
    for _ in 0..3600 {
        demo.tick(1.0);
    }

    let worst = demo
        .squares
        .iter()
        .map(|s| (s.vel.length() - DEMO_SPEED).abs())
        .fold(0.0, f64::max);
    println!("Bounce demo: 3600 ticks, worst speed drift {:.3e}", worst);
    for square in &demo.squares {
        println!("  {:>6} at ({:7.1}, {:7.1})", square.color, square.pos.x, square.pos.y);
    }
}

/// Headless run of the premade maze, driven by the fixed-step ticker
#[cfg(not(target_arch = "wasm32"))]
fn run_premade_level(seed: u64) {
    use blocks_sandbox::consts::TICK_MS;
    use blocks_sandbox::sim::{Command, SimEvent, SimulationState, apply};
    use blocks_sandbox::{GridPreset, Ticker};
    use glam::DVec2;

    const MAX_TICKS: u64 = 60 * 60 * 5;

    let canvas = GridPreset::Small.fit_canvas(DVec2::new(1920.0, 1080.0));
    let mut state = SimulationState::new(GridPreset::Medium, canvas, seed);
    let started = apply(&mut state, Command::LoadPremade { canvas })
        .and_then(|()| apply(&mut state, Command::StartSimulation));
    if let Err(e) = started {
        log::error!("Could not start premade level: {}", e);
        return;
    }

    let mut ticker = Ticker::new();
    ticker.start();
    let mut now = 0.0;
    while ticker.is_running() && state.time_ticks < MAX_TICKS {
        ticker.advance(now, &mut state);
        now += TICK_MS;
    }

    match state.drain_events().into_iter().find(|e| matches!(e, SimEvent::Solved { .. })) {
        Some(SimEvent::Solved { slot }) => {
            println!("Premade level solved by player {} after {} ticks", slot + 1, state.time_ticks)
        }
        _ => println!("Premade level unsolved after {} ticks", state.time_ticks),
    }
}
