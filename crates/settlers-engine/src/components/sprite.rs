use serde::{Deserialize, Serialize};

/// Texel rectangle inside the atlas: (u1, v1) top-left, (u2, v2) bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AtlasRect {
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,
}

impl AtlasRect {
    pub const fn new(u1: f32, v1: f32, u2: f32, v2: f32) -> Self {
        Self { u1, v1, u2, v2 }
    }
}

/// One reusable sprite slot.
///
/// `x`/`y` is the top-left corner in surface pixels. Slots are mutated in
/// place by whoever holds the handle and are only ever deactivated, never
/// destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sprite {
    pub active: bool,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rect: AtlasRect,
}

impl Sprite {
    /// Activate the slot with a fresh position, size and atlas rect.
    pub fn init(&mut self, x: f32, y: f32, width: f32, height: f32, rect: AtlasRect) {
        self.active = true;
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self.rect = rect;
    }

    /// Centre of the sprite, which is what the point-sprite vertex carries.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_activates_slot() {
        let mut sprite = Sprite::default();
        assert!(!sprite.active);
        sprite.init(10.0, 20.0, 12.0, 25.0, AtlasRect::new(25.0, 0.0, 49.0, 24.0));
        assert!(sprite.active);
        assert_eq!(sprite.rect.u2, 49.0);
    }

    #[test]
    fn center_offsets_by_half_size() {
        let mut sprite = Sprite::default();
        sprite.init(10.0, 20.0, 12.0, 25.0, AtlasRect::default());
        assert_eq!(sprite.center(), (16.0, 32.5));
    }
}
