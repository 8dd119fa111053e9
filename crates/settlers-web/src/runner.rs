use settlers_engine::{GameConfig, InputEvent, InputQueue, RenderError, Simulation};

use crate::gl::WebGl;

/// Owns the simulation and its input queue on the browser side.
///
/// wasm-bindgen cannot export a generic struct, so the crate keeps one runner
/// in a `thread_local!` and exposes free functions that forward to it.
pub struct GameRunner {
    simulation: Simulation<WebGl>,
    input: InputQueue,
    last_drawn: usize,
}

impl GameRunner {
    pub fn new(gl: WebGl, config: GameConfig) -> Result<Self, RenderError> {
        Ok(Self {
            simulation: Simulation::new(gl, config)?,
            input: InputQueue::new(),
            last_drawn: 0,
        })
    }

    /// Queue an input event for the next tick.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame at the host's `requestAnimationFrame` timestamp.
    pub fn tick(&mut self, timestamp_ms: f64) {
        self.last_drawn = self.simulation.tick(timestamp_ms, &mut self.input);
    }

    pub fn active_sprite_count(&self) -> u32 {
        self.simulation.active_sprite_count() as u32
    }

    /// Sprites drawn by the most recent tick.
    pub fn drawn_count(&self) -> u32 {
        self.last_drawn as u32
    }

    pub fn settler_count(&self) -> u32 {
        self.simulation.settlers().len() as u32
    }

    pub fn width(&self) -> u32 {
        self.simulation.config().width
    }

    pub fn height(&self) -> u32 {
        self.simulation.config().height
    }
}
