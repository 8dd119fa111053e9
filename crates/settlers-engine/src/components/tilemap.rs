//! Tile graph: the walkable map the settlers path across.
//!
//! Tiles are stored in row-major order (index = y * width + x). Terrain is
//! decided once at construction and never changes; each tile owns one glyph
//! sprite in the shared pool. The `parent`/`g_score` fields are scratch space
//! for [`TileGraph::search`](crate::systems::pathfind) and are reset on every
//! search.

use crate::api::types::{SpriteHandle, TileCoord};
use crate::assets::atlas::{AtlasManifest, GLYPH_GROUND, GLYPH_WATER};
use crate::core::pool::SpriteSlotPool;
use crate::core::rng::Rng;
use glam::Vec2;

/// Edge length of a tile in surface pixels.
pub const TILE_SIZE: f32 = 25.0;

/// Terrain variants. Behaviour differs only by the data in [`TerrainInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainKind {
    Ground,
    Water,
}

/// Per-kind data: passability and the atlas glyph to draw.
#[derive(Debug, Clone, Copy)]
pub struct TerrainInfo {
    pub passable: bool,
    pub glyph: &'static str,
}

impl TerrainKind {
    pub const fn info(self) -> TerrainInfo {
        match self {
            TerrainKind::Ground => TerrainInfo { passable: true, glyph: GLYPH_GROUND },
            TerrainKind::Water => TerrainInfo { passable: false, glyph: GLYPH_WATER },
        }
    }

    pub const fn passable(self) -> bool {
        self.info().passable
    }
}

/// A single grid cell.
#[derive(Debug, Clone)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub kind: TerrainKind,
    pub passable: bool,
    /// Glyph slot; `None` if the pool was full at construction.
    pub sprite: Option<SpriteHandle>,
    /// Search scratch: grid index of the predecessor on the best known path.
    pub(crate) parent: Option<usize>,
    /// Search scratch: cost of the best known path from the start.
    pub(crate) g_score: f32,
}

impl Tile {
    fn new(x: u32, y: u32, kind: TerrainKind, sprite: Option<SpriteHandle>) -> Self {
        Self {
            x,
            y,
            kind,
            passable: kind.passable(),
            sprite,
            parent: None,
            g_score: f32::INFINITY,
        }
    }

    pub fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    pub(crate) fn reset(&mut self) {
        self.parent = None;
        self.g_score = f32::INFINITY;
    }

    /// Manhattan distance to `goal` in tiles.
    pub fn h_score(&self, goal: &Tile) -> f32 {
        (self.x.abs_diff(goal.x) + self.y.abs_diff(goal.y)) as f32
    }

    /// `g + h` under the current search state.
    pub fn f_score(&self, goal: &Tile) -> f32 {
        self.g_score + self.h_score(goal)
    }

    /// Euclidean distance to `other` in tiles.
    pub fn distance(&self, other: &Tile) -> f32 {
        let dx = self.x as f32 - other.x as f32;
        let dy = self.y as f32 - other.y as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width × height grid of tiles.
pub struct TileGraph {
    pub width: u32,
    pub height: u32,
    pub(crate) tiles: Vec<Tile>,
}

impl TileGraph {
    /// Build a map with terrain chosen independently per cell: ground with
    /// probability `ground_chance`, water otherwise.
    pub fn generate(
        width: u32,
        height: u32,
        ground_chance: f32,
        rng: &mut Rng,
        pool: &mut SpriteSlotPool,
        atlas: &AtlasManifest,
    ) -> Self {
        let kinds: Vec<TerrainKind> = (0..width * height)
            .map(|_| {
                if rng.chance(ground_chance) {
                    TerrainKind::Ground
                } else {
                    TerrainKind::Water
                }
            })
            .collect();
        Self::from_kinds(width, height, &kinds, pool, atlas)
    }

    /// Build a map from an explicit row-major terrain layout.
    ///
    /// # Panics
    /// If `kinds.len() != width * height`.
    pub fn from_kinds(
        width: u32,
        height: u32,
        kinds: &[TerrainKind],
        pool: &mut SpriteSlotPool,
        atlas: &AtlasManifest,
    ) -> Self {
        assert_eq!(
            kinds.len(),
            (width * height) as usize,
            "terrain layout does not match a {}x{} grid",
            width,
            height
        );

        let mut tiles = Vec::with_capacity(kinds.len());
        for y in 0..height {
            for x in 0..width {
                let kind = kinds[(y * width + x) as usize];
                let sprite = pool.spawn(
                    x as f32 * TILE_SIZE,
                    y as f32 * TILE_SIZE,
                    TILE_SIZE,
                    TILE_SIZE,
                    atlas.glyph(kind.info().glyph),
                );
                if sprite.is_none() {
                    log::warn!("tilemap: sprite pool full, tile ({}, {}) has no glyph", x, y);
                }
                tiles.push(Tile::new(x, y, kind, sprite));
            }
        }

        Self { width, height, tiles }
    }

    /// Build a map where every cell is the same terrain.
    pub fn filled(
        width: u32,
        height: u32,
        kind: TerrainKind,
        pool: &mut SpriteSlotPool,
        atlas: &AtlasManifest,
    ) -> Self {
        let kinds = vec![kind; (width * height) as usize];
        Self::from_kinds(width, height, &kinds, pool, atlas)
    }

    /// Grid index of a coordinate, or `None` outside the grid.
    pub fn index(&self, coord: TileCoord) -> Option<usize> {
        if coord.x >= self.width || coord.y >= self.height {
            return None;
        }
        Some((coord.y * self.width + coord.x) as usize)
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    /// The tile covering a point in surface pixels.
    pub fn tile_at(&self, px: f32, py: f32) -> Option<TileCoord> {
        let tx = (px / TILE_SIZE).floor();
        let ty = (py / TILE_SIZE).floor();
        if tx < 0.0 || ty < 0.0 || tx >= self.width as f32 || ty >= self.height as f32 {
            return None;
        }
        Some(TileCoord::new(tx as u32, ty as u32))
    }

    /// Top-left pixel position of a tile; this is where its glyph is drawn.
    pub fn tile_origin(&self, coord: TileCoord) -> Vec2 {
        Vec2::new(coord.x as f32 * TILE_SIZE, coord.y as f32 * TILE_SIZE)
    }

    pub fn is_passable(&self, coord: TileCoord) -> bool {
        self.tile(coord).is_some_and(|t| t.passable)
    }

    /// Iterate over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn passable_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.passable).count()
    }

    /// Clear search scratch on every tile.
    pub(crate) fn reset_search_state(&mut self) {
        for tile in &mut self.tiles {
            tile.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(width: u32, height: u32, kinds: &[TerrainKind]) -> (TileGraph, SpriteSlotPool) {
        let mut pool = SpriteSlotPool::new();
        let atlas = AtlasManifest::default();
        let graph = TileGraph::from_kinds(width, height, kinds, &mut pool, &atlas);
        (graph, pool)
    }

    #[test]
    fn terrain_table_drives_passability() {
        assert!(TerrainKind::Ground.passable());
        assert!(!TerrainKind::Water.passable());
    }

    #[test]
    fn tiles_spawn_glyphs_at_grid_positions() {
        use TerrainKind::*;
        let (graph, pool) = build(2, 2, &[Ground, Water, Water, Ground]);
        assert_eq!(pool.active_count(), 4);

        let water = graph.tile(TileCoord::new(1, 0)).unwrap();
        assert!(!water.passable);
        let sprite = pool.get(water.sprite.unwrap()).unwrap();
        assert_eq!((sprite.x, sprite.y), (25.0, 0.0));
        assert_eq!((sprite.width, sprite.height), (25.0, 25.0));
        assert_eq!(sprite.rect.u1, 50.0);
    }

    #[test]
    fn tile_at_floor_divides_by_tile_size() {
        let (graph, _pool) = build(10, 10, &[TerrainKind::Ground; 100]);
        assert_eq!(graph.tile_at(0.0, 0.0), Some(TileCoord::new(0, 0)));
        assert_eq!(graph.tile_at(24.9, 24.9), Some(TileCoord::new(0, 0)));
        assert_eq!(graph.tile_at(25.0, 49.0), Some(TileCoord::new(1, 1)));
        assert_eq!(graph.tile_at(180.0, 105.0), Some(TileCoord::new(7, 4)));
    }

    #[test]
    fn tile_at_outside_grid_is_none() {
        let (graph, _pool) = build(10, 10, &[TerrainKind::Ground; 100]);
        assert_eq!(graph.tile_at(-1.0, 10.0), None);
        assert_eq!(graph.tile_at(10.0, 250.0), None);
        assert_eq!(graph.tile_at(250.0, 10.0), None);
    }

    #[test]
    fn generate_is_deterministic_per_seed() {
        let atlas = AtlasManifest::default();
        let mut pool_a = SpriteSlotPool::new();
        let mut pool_b = SpriteSlotPool::new();
        let a = TileGraph::generate(10, 10, 0.7, &mut Rng::new(9), &mut pool_a, &atlas);
        let b = TileGraph::generate(10, 10, 0.7, &mut Rng::new(9), &mut pool_b, &atlas);
        let kinds_a: Vec<_> = a.iter().map(|t| t.kind).collect();
        let kinds_b: Vec<_> = b.iter().map(|t| t.kind).collect();
        assert_eq!(kinds_a, kinds_b);
    }

    #[test]
    fn generate_extremes() {
        let atlas = AtlasManifest::default();
        let mut pool = SpriteSlotPool::new();
        let all_ground = TileGraph::generate(5, 5, 1.0, &mut Rng::new(3), &mut pool, &atlas);
        assert_eq!(all_ground.passable_count(), 25);

        let mut pool = SpriteSlotPool::new();
        let all_water = TileGraph::generate(5, 5, 0.0, &mut Rng::new(3), &mut pool, &atlas);
        assert_eq!(all_water.passable_count(), 0);
    }

    #[test]
    fn tiles_without_pool_space_have_no_sprite() {
        let mut pool = SpriteSlotPool::with_capacity(3);
        let atlas = AtlasManifest::default();
        let graph = TileGraph::filled(2, 2, TerrainKind::Ground, &mut pool, &atlas);
        assert_eq!(graph.iter().filter(|t| t.sprite.is_some()).count(), 3);
        assert!(graph.tile(TileCoord::new(1, 1)).unwrap().sprite.is_none());
    }

    #[test]
    fn scores_use_manhattan_and_euclid() {
        let (graph, _pool) = build(4, 4, &[TerrainKind::Ground; 16]);
        let a = graph.tile(TileCoord::new(0, 0)).unwrap();
        let b = graph.tile(TileCoord::new(3, 2)).unwrap();
        assert_eq!(a.h_score(b), 5.0);
        assert!((a.distance(b) - 13f32.sqrt()).abs() < 1e-6);
        // Fresh tiles have an infinite g score
        assert!(a.f_score(b).is_infinite());
    }
}
