use crate::api::types::SpriteHandle;
use crate::components::sprite::{AtlasRect, Sprite};

/// Maximum number of live sprites (tiles, settlers and the cursor together).
pub const MAX_SPRITES: usize = 1000;

/// Fixed-capacity storage of reusable sprite slots.
///
/// All slots are allocated up front. Spawning scans for the first inactive
/// slot; despawning only clears the `active` flag, so handles never dangle.
pub struct SpriteSlotPool {
    slots: Vec<Sprite>,
}

impl SpriteSlotPool {
    pub fn new() -> Self {
        Self::with_capacity(MAX_SPRITES)
    }

    /// Create a pool with a specific slot count.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Sprite::default(); capacity],
        }
    }

    /// Activate the first free slot. Returns `None` when every slot is in use.
    pub fn spawn(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rect: AtlasRect,
    ) -> Option<SpriteHandle> {
        let idx = self.slots.iter().position(|s| !s.active)?;
        self.slots[idx].init(x, y, width, height, rect);
        Some(SpriteHandle(idx))
    }

    /// Deactivate a slot so a later spawn can reuse it.
    pub fn despawn(&mut self, handle: SpriteHandle) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            slot.active = false;
        }
    }

    pub fn get(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.slots.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: SpriteHandle) -> Option<&mut Sprite> {
        self.slots.get_mut(handle.0)
    }

    /// Move a sprite's top-left corner. Missing handles are ignored.
    pub fn set_position(&mut self, handle: SpriteHandle, x: f32, y: f32) {
        if let Some(slot) = self.slots.get_mut(handle.0) {
            slot.x = x;
            slot.y = y;
        }
    }

    /// Iterate over all slots in pool order, active or not.
    pub fn iter(&self) -> impl Iterator<Item = &Sprite> {
        self.slots.iter()
    }

    /// Iterate over active slots in pool order.
    pub fn iter_active(&self) -> impl Iterator<Item = &Sprite> {
        self.slots.iter().filter(|s| s.active)
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for SpriteSlotPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> AtlasRect {
        AtlasRect::new(0.0, 0.0, 24.0, 24.0)
    }

    #[test]
    fn spawn_uses_first_free_slot() {
        let mut pool = SpriteSlotPool::with_capacity(4);
        let a = pool.spawn(0.0, 0.0, 25.0, 25.0, rect()).unwrap();
        let b = pool.spawn(25.0, 0.0, 25.0, 25.0, rect()).unwrap();
        assert_eq!(a, SpriteHandle(0));
        assert_eq!(b, SpriteHandle(1));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn spawn_beyond_capacity_fails() {
        let mut pool = SpriteSlotPool::new();
        for _ in 0..MAX_SPRITES {
            assert!(pool.spawn(0.0, 0.0, 1.0, 1.0, rect()).is_some());
        }
        assert!(pool.spawn(0.0, 0.0, 1.0, 1.0, rect()).is_none());
        assert_eq!(pool.active_count(), MAX_SPRITES);
    }

    #[test]
    fn despawned_slot_is_reused() {
        let mut pool = SpriteSlotPool::new();
        for _ in 0..MAX_SPRITES {
            pool.spawn(0.0, 0.0, 1.0, 1.0, rect());
        }
        pool.despawn(SpriteHandle(417));
        let reused = pool.spawn(5.0, 6.0, 10.0, 10.0, rect()).unwrap();
        assert_eq!(reused, SpriteHandle(417));
        let sprite = pool.get(reused).unwrap();
        assert!(sprite.active);
        assert_eq!((sprite.x, sprite.y), (5.0, 6.0));
    }

    #[test]
    fn set_position_moves_sprite() {
        let mut pool = SpriteSlotPool::with_capacity(1);
        let h = pool.spawn(0.0, 0.0, 10.0, 10.0, rect()).unwrap();
        pool.set_position(h, 42.0, 17.0);
        let s = pool.get(h).unwrap();
        assert_eq!((s.x, s.y), (42.0, 17.0));
        // Unknown handles are ignored
        pool.set_position(SpriteHandle(99), 1.0, 1.0);
    }
}
