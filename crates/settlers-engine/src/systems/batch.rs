use glam::Vec2;

use crate::api::types::SpriteHandle;
use crate::assets::atlas::AtlasManifest;
use crate::components::sprite::AtlasRect;
use crate::core::pool::{SpriteSlotPool, MAX_SPRITES};
use crate::error::RenderError;
use crate::renderer::backend::GlBackend;
use crate::renderer::instance::SpriteVertex;
use crate::renderer::surface::GpuSurface;

/// Every sprite in the scene drawn from one vertex buffer and one atlas.
///
/// The vertex array is sized for the whole pool and re-uploaded in full each
/// frame; only the leading `active × floats_per_vertex` floats are drawn.
pub struct SpriteBatch<B: GlBackend> {
    pool: SpriteSlotPool,
    vertices: Vec<f32>,
    buffer: B::Buffer,
    texture: B::Texture,
    bounds: Vec2,
}

impl<B: GlBackend> SpriteBatch<B> {
    pub fn new(surface: &GpuSurface<B>, atlas: &AtlasManifest) -> Result<Self, RenderError> {
        Self::with_capacity(surface, atlas, MAX_SPRITES)
    }

    /// Build a batch over `capacity` sprite slots and start loading the atlas.
    pub fn with_capacity(
        surface: &GpuSurface<B>,
        atlas: &AtlasManifest,
        capacity: usize,
    ) -> Result<Self, RenderError> {
        let floats_per_vertex = surface.shader().floats_per_vertex();
        if floats_per_vertex != SpriteVertex::FLOATS {
            return Err(RenderError::VertexLayout {
                expected: SpriteVertex::FLOATS,
                found: floats_per_vertex,
            });
        }

        let vertices = vec![0.0; capacity * floats_per_vertex];
        let buffer = surface.create_vertex_buffer(&vertices)?;
        let texture = surface.load_texture(&atlas.path)?;

        log::debug!(
            "batch: {} slots, {} floats per frame, atlas '{}'",
            capacity,
            vertices.len(),
            atlas.path
        );

        Ok(Self {
            pool: SpriteSlotPool::with_capacity(capacity),
            vertices,
            buffer,
            texture,
            bounds: Vec2::from(atlas.bounds()),
        })
    }

    pub fn pool(&self) -> &SpriteSlotPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut SpriteSlotPool {
        &mut self.pool
    }

    /// Claim a sprite slot. `None` when the pool is exhausted.
    pub fn spawn(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rect: AtlasRect,
    ) -> Option<SpriteHandle> {
        let handle = self.pool.spawn(x, y, width, height, rect);
        if handle.is_none() {
            log::warn!("batch: all {} sprite slots in use", self.pool.capacity());
        }
        handle
    }

    pub fn despawn(&mut self, handle: SpriteHandle) {
        self.pool.despawn(handle);
    }

    /// Pack every active sprite, upload, and draw. Returns the vertex count.
    pub fn draw(&mut self, surface: &mut GpuSurface<B>) -> usize {
        let floats_per_vertex = surface.shader().floats_per_vertex();

        let mut written = 0;
        for sprite in self.pool.iter_active() {
            let vertex = SpriteVertex::from_sprite(sprite);
            self.vertices[written..written + SpriteVertex::FLOATS]
                .copy_from_slice(vertex.as_floats());
            written += SpriteVertex::FLOATS;
        }

        surface.update_vertex_buffer(&self.buffer, &self.vertices);
        surface.apply_texture(&self.texture);
        surface.set_texture_bounds(self.bounds);

        let count = written / floats_per_vertex;
        surface.draw(&self.buffer, count);
        log::trace!("batch: drew {} sprites", count);
        count
    }
}
