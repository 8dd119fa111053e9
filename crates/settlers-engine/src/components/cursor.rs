use glam::Vec2;

use crate::api::types::SpriteHandle;
use crate::assets::atlas::{AtlasManifest, GLYPH_CURSOR};
use crate::core::pool::SpriteSlotPool;
use crate::input::queue::InputEvent;

pub const CURSOR_WIDTH: f32 = 12.0;
pub const CURSOR_HEIGHT: f32 = 25.0;

/// Glyph drawn at the last known pointer position, in place of the system
/// cursor.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub position: Vec2,
    pub sprite: Option<SpriteHandle>,
}

impl Cursor {
    /// Spawn the cursor glyph at the surface origin.
    pub fn spawn(pool: &mut SpriteSlotPool, atlas: &AtlasManifest) -> Self {
        let sprite = pool.spawn(0.0, 0.0, CURSOR_WIDTH, CURSOR_HEIGHT, atlas.glyph(GLYPH_CURSOR));
        if sprite.is_none() {
            log::warn!("cursor: sprite pool full, pointer glyph disabled");
        }
        Self { position: Vec2::ZERO, sprite }
    }

    /// Track pointer movement.
    pub fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMove { x, y } => self.position = Vec2::new(x, y),
        }
    }

    /// Write the tracked position into the glyph.
    pub fn update(&self, pool: &mut SpriteSlotPool) {
        if let Some(sprite) = self.sprite {
            pool.set_position(sprite, self.position.x, self.position.y);
        }
    }
}
