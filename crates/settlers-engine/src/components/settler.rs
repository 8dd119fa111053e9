use glam::Vec2;

use crate::api::types::{SpriteHandle, TileCoord};
use crate::assets::atlas::{AtlasManifest, GLYPH_SETTLER};
use crate::core::pool::SpriteSlotPool;

/// Settler glyph edge length in pixels.
pub const SETTLER_SIZE: f32 = 10.0;
/// Offset from the top-left corner to the point used for tile lookup.
pub const CENTER_OFFSET: f32 = 5.0;
/// Movement speed in pixels per millisecond.
pub const SETTLER_SPEED: f32 = 0.05;

/// Where a settler is in its routing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlerState {
    /// No target; a route is requested on the next tick.
    Idle,
    /// Following a route towards its target.
    Routing,
}

/// A walking agent. Steering lives in [`crate::systems::steering`].
#[derive(Debug, Clone)]
pub struct Settler {
    /// Top-left corner in surface pixels.
    pub position: Vec2,
    pub sprite: Option<SpriteHandle>,
    pub(crate) tile: Option<TileCoord>,
    pub(crate) target: Option<TileCoord>,
    pub(crate) waypoints: Option<Vec<TileCoord>>,
    /// Index into `waypoints` of the tile most recently reached.
    pub(crate) waypoint_cursor: Option<usize>,
    /// Last (start, goal) pair that had no route.
    pub(crate) failed_search: Option<(TileCoord, TileCoord)>,
}

impl Settler {
    pub fn new(position: Vec2, sprite: Option<SpriteHandle>) -> Self {
        Self {
            position,
            sprite,
            tile: None,
            target: None,
            waypoints: None,
            waypoint_cursor: None,
            failed_search: None,
        }
    }

    /// Create a settler with its glyph at `(x, y)`. The settler still exists
    /// when the pool is full, it just has nothing to draw.
    pub fn spawn(x: f32, y: f32, pool: &mut SpriteSlotPool, atlas: &AtlasManifest) -> Self {
        let sprite = pool.spawn(x, y, SETTLER_SIZE, SETTLER_SIZE, atlas.glyph(GLYPH_SETTLER));
        if sprite.is_none() {
            log::warn!("settler: sprite pool full, settler at ({}, {}) is invisible", x, y);
        }
        Self::new(Vec2::new(x, y), sprite)
    }

    pub fn state(&self) -> SettlerState {
        if self.target.is_some() {
            SettlerState::Routing
        } else {
            SettlerState::Idle
        }
    }

    /// Point used to decide which tile the settler stands on.
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(CENTER_OFFSET)
    }

    /// Tile under the settler as of the last update.
    pub fn tile(&self) -> Option<TileCoord> {
        self.tile
    }

    pub fn target(&self) -> Option<TileCoord> {
        self.target
    }

    /// The current route, start tile first.
    pub fn waypoints(&self) -> Option<&[TileCoord]> {
        self.waypoints.as_deref()
    }

    pub fn waypoint_cursor(&self) -> Option<usize> {
        self.waypoint_cursor
    }

    pub(crate) fn clear_route(&mut self) {
        self.target = None;
        self.waypoints = None;
        self.waypoint_cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_claims_a_settler_glyph() {
        let mut pool = SpriteSlotPool::with_capacity(2);
        let settler = Settler::spawn(35.0, 35.0, &mut pool, &AtlasManifest::default());
        let sprite = pool.get(settler.sprite.unwrap()).unwrap();
        assert_eq!((sprite.x, sprite.y, sprite.width, sprite.height), (35.0, 35.0, 10.0, 10.0));
        assert_eq!(sprite.rect.u1, 25.0);
        assert_eq!(settler.state(), SettlerState::Idle);
        assert_eq!(settler.center(), Vec2::new(40.0, 40.0));
    }

    #[test]
    fn spawn_without_slots_still_yields_a_settler() {
        let mut pool = SpriteSlotPool::with_capacity(0);
        let settler = Settler::spawn(1.0, 2.0, &mut pool, &AtlasManifest::default());
        assert!(settler.sprite.is_none());
        assert_eq!(settler.position, Vec2::new(1.0, 2.0));
    }
}
