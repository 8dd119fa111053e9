pub mod gl;
pub mod runner;

pub use gl::WebGl;
pub use runner::GameRunner;

use std::cell::RefCell;

use settlers_engine::{GameConfig, InputEvent};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

thread_local! {
    static RUNNER: RefCell<Option<GameRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. `None` before `game_init` has succeeded.
fn with_runner<R>(f: impl FnOnce(&mut GameRunner) -> R) -> Option<R> {
    RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Refuse to replace a live runner: a second init would orphan its canvas.
fn check_vacant<T>(slot: &Option<T>) -> Result<(), &'static str> {
    match slot {
        Some(_) => Err("game_init: already initialized"),
        None => Ok(()),
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Create the drawing canvas and append it to `<body>`. The system cursor is
/// hidden; the simulation draws its own.
fn create_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    canvas.set_width(width);
    canvas.set_height(height);
    canvas.style().set_property("cursor", "none")?;
    body.append_child(&canvas)?;
    Ok(canvas)
}

/// Build the simulation. `config_json` is an optional partial [`GameConfig`];
/// without a seed the map is different on every load. Fails if a simulation
/// is already running.
#[wasm_bindgen]
pub fn game_init(config_json: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    RUNNER.with(|cell| check_vacant(&*cell.borrow())).map_err(to_js)?;

    let mut config = match config_json {
        Some(json) => GameConfig::from_json(&json).map_err(to_js)?,
        None => GameConfig::default(),
    };
    if config.seed.is_none() {
        config.seed = Some((js_sys::Math::random() * u32::MAX as f64) as u64);
    }

    let canvas = create_canvas(config.width, config.height)?;
    let gl = WebGl::from_canvas(&canvas).map_err(to_js)?;
    let runner = GameRunner::new(gl, config).map_err(to_js)?;

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(runner);
    });

    log::info!("settlers: initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn game_tick(timestamp_ms: f64) {
    if with_runner(|r| r.tick(timestamp_ms)).is_none() {
        log::warn!("settlers: game_tick before game_init");
    }
}

/// Pointer position in canvas-local pixels.
#[wasm_bindgen]
pub fn game_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_active_sprite_count() -> u32 {
    with_runner(|r| r.active_sprite_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_drawn_sprite_count() -> u32 {
    with_runner(|r| r.drawn_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_settler_count() -> u32 {
    with_runner(|r| r.settler_count()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_surface_width() -> u32 {
    with_runner(|r| r.width()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_surface_height() -> u32 {
    with_runner(|r| r.height()).unwrap_or(0)
}
