use bytemuck::{Pod, Zeroable};
use crate::components::sprite::Sprite;

/// One point-sprite vertex as the sprite shader reads it.
/// Field order matches the name-sorted attribute layout:
/// `vertex0Position` (3), `vertex1Size` (2), `vertex2TexCoord` (4).
/// 9 floats = 36 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// Centre X in surface pixels.
    pub x: f32,
    /// Centre Y in surface pixels.
    pub y: f32,
    /// Always 0; everything sits on one plane and draws in pool order.
    pub z: f32,
    pub width: f32,
    pub height: f32,
    /// Atlas texel rect.
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,
}

impl SpriteVertex {
    pub const FLOATS: usize = 9;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn from_sprite(sprite: &Sprite) -> Self {
        let (x, y) = sprite.center();
        Self {
            x,
            y,
            z: 0.0,
            width: sprite.width,
            height: sprite.height,
            u1: sprite.rect.u1,
            v1: sprite.rect.v1,
            u2: sprite.rect.u2,
            v2: sprite.rect.v2,
        }
    }

    /// The vertex as a flat float record.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(std::slice::from_ref(self))
    }
}
