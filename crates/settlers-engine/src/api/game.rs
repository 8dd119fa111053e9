use serde::{Deserialize, Serialize};

use crate::api::types::TileCoord;
use crate::assets::atlas::AtlasManifest;
use crate::components::cursor::Cursor;
use crate::components::settler::Settler;
use crate::components::tilemap::TileGraph;
use crate::core::rng::Rng;
use crate::core::time::FrameClock;
use crate::error::RenderError;
use crate::input::queue::InputQueue;
use crate::renderer::backend::GlBackend;
use crate::renderer::surface::GpuSurface;
use crate::systems::batch::SpriteBatch;

/// Map seed used when the host does not supply one.
pub const DEFAULT_SEED: u64 = 42;

/// Simulation setup. Every field has a default, so a partial JSON document
/// only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Map width in tiles.
    pub map_width: u32,
    /// Map height in tiles.
    pub map_height: u32,
    /// Probability that a tile is ground rather than water.
    pub ground_chance: f32,
    /// Terrain seed; `None` falls back to [`DEFAULT_SEED`].
    pub seed: Option<u64>,
    /// Tile every settler walks to.
    pub destination: TileCoord,
    /// Top-left spawn positions of the settlers, in pixels.
    pub settlers: Vec<[f32; 2]>,
    /// Upper bound on the per-tick elapsed time, in milliseconds.
    pub max_frame_ms: f32,
    pub atlas: AtlasManifest,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            map_width: 10,
            map_height: 10,
            ground_chance: 0.7,
            seed: None,
            destination: TileCoord::new(7, 4),
            settlers: vec![[35.0, 35.0], [100.0, 10.0], [53.0, 210.0], [220.0, 150.0]],
            max_frame_ms: 250.0,
            atlas: AtlasManifest::default(),
        }
    }
}

impl GameConfig {
    /// Parse a config from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Everything one running simulation owns: GPU state, map, agents and the
/// frame clock. Driven by calling [`tick`](Self::tick) once per host frame.
pub struct Simulation<B: GlBackend> {
    config: GameConfig,
    surface: GpuSurface<B>,
    batch: SpriteBatch<B>,
    graph: TileGraph,
    settlers: Vec<Settler>,
    cursor: Cursor,
    clock: FrameClock,
    frame: u64,
}

impl<B: GlBackend> Simulation<B> {
    /// Build the surface, start loading the atlas, generate the map and
    /// place the settlers and the cursor.
    ///
    /// Sprites are claimed tiles first (row-major), then settlers, then the
    /// cursor, which is also the order they are drawn in.
    pub fn new(gl: B, config: GameConfig) -> Result<Self, RenderError> {
        let surface = GpuSurface::new(gl, config.width, config.height)?;
        let mut batch = SpriteBatch::new(&surface, &config.atlas)?;

        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        let mut rng = Rng::new(seed);
        let graph = TileGraph::generate(
            config.map_width,
            config.map_height,
            config.ground_chance,
            &mut rng,
            batch.pool_mut(),
            &config.atlas,
        );

        let settlers: Vec<Settler> = config
            .settlers
            .iter()
            .map(|&[x, y]| Settler::spawn(x, y, batch.pool_mut(), &config.atlas))
            .collect();

        let cursor = Cursor::spawn(batch.pool_mut(), &config.atlas);

        log::info!(
            "simulation: {}x{} map (seed {}, {} passable), {} settlers heading for {:?}",
            graph.width,
            graph.height,
            seed,
            graph.passable_count(),
            settlers.len(),
            config.destination
        );

        Ok(Self {
            clock: FrameClock::new(config.max_frame_ms),
            config,
            surface,
            batch,
            graph,
            settlers,
            cursor,
            frame: 0,
        })
    }

    /// Run one frame: move settlers, apply pointer input, redraw.
    /// Returns the number of sprites drawn.
    pub fn tick(&mut self, timestamp_ms: f64, input: &mut InputQueue) -> usize {
        let dt = self.clock.delta(timestamp_ms);

        let destination = self.config.destination;
        for settler in &mut self.settlers {
            settler.update(&mut self.graph, self.batch.pool_mut(), destination, dt);
        }

        for event in input.drain() {
            self.cursor.handle(&event);
        }
        self.cursor.update(self.batch.pool_mut());

        self.surface.clear();
        let drawn = self.batch.draw(&mut self.surface);

        self.frame += 1;
        log::trace!("frame {}: dt {:.2}ms, {} sprites", self.frame, dt, drawn);
        drawn
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn surface(&self) -> &GpuSurface<B> {
        &self.surface
    }

    pub fn batch(&self) -> &SpriteBatch<B> {
        &self.batch
    }

    pub fn graph(&self) -> &TileGraph {
        &self.graph
    }

    pub fn settlers(&self) -> &[Settler] {
        &self.settlers
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn active_sprite_count(&self) -> usize {
        self.batch.pool().active_count()
    }

    /// Frames ticked so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}
