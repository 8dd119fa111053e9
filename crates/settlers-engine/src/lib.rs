pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod input;
pub mod assets;
pub mod error;

// Re-export key types at crate root for convenience
pub use api::game::{GameConfig, Simulation, DEFAULT_SEED};
pub use api::types::{SpriteHandle, TileCoord};
pub use assets::atlas::AtlasManifest;
pub use components::cursor::Cursor;
pub use components::settler::{Settler, SettlerState};
pub use components::sprite::{AtlasRect, Sprite};
pub use components::tilemap::{TerrainKind, Tile, TileGraph, TILE_SIZE};
pub use crate::core::pool::{SpriteSlotPool, MAX_SPRITES};
pub use crate::core::rng::Rng;
pub use crate::core::time::FrameClock;
pub use error::RenderError;
pub use input::queue::{InputEvent, InputQueue};
pub use renderer::backend::{GlBackend, ShaderStage, TextureParams};
pub use renderer::camera::Camera2D;
pub use renderer::headless::HeadlessGl;
pub use renderer::instance::SpriteVertex;
pub use renderer::shader::{ShaderProgram, UniformValue};
pub use renderer::surface::GpuSurface;
pub use systems::batch::SpriteBatch;
