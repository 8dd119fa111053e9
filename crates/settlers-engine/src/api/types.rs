use serde::{Deserialize, Serialize};

/// Stable handle to a slot in the sprite pool.
/// Slots are never relocated, so a handle stays valid for the pool's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub usize);

/// Integer grid coordinates of a tile (column `x`, row `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// True when `other` is one of the 8 cells surrounding `self`.
    pub fn is_adjacent(&self, other: &TileCoord) -> bool {
        let dx = (self.x as i64 - other.x as i64).abs();
        let dy = (self.y as i64 - other.y as i64).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }
}
