//! Per-tick settler behaviour: request a route, follow it tile by tile,
//! stop on arrival.
//!
//! Movement heads for the top-left corner of the next waypoint's glyph. While
//! the settler stands on impassable ground it only keeps moving along an axis
//! until its centre has cleared the waypoint's edge on that axis, so it slides
//! off water instead of cutting across it.

use glam::Vec2;

use crate::api::types::TileCoord;
use crate::components::settler::{Settler, CENTER_OFFSET, SETTLER_SPEED};
use crate::components::tilemap::{TileGraph, TILE_SIZE};
use crate::core::pool::SpriteSlotPool;

/// Centre must be this far past a waypoint's near edge before the settler
/// stops closing in on it from an impassable tile.
const EDGE_NEAR: f32 = 2.0;
const EDGE_FAR: f32 = TILE_SIZE - EDGE_NEAR;

impl Settler {
    /// Advance one tick of `dt_ms` milliseconds towards `destination`, then
    /// write the position into the settler's sprite.
    pub fn update(
        &mut self,
        graph: &mut TileGraph,
        pool: &mut SpriteSlotPool,
        destination: TileCoord,
        dt_ms: f32,
    ) {
        let center = self.center();
        self.tile = graph.tile_at(center.x, center.y);

        if let Some(tile) = self.tile {
            if self.target.is_none() {
                self.request_route(graph, tile, destination);
            }
            if self.target.is_some() {
                self.follow_route(graph, tile, dt_ms);
            }
        }

        if let Some(sprite) = self.sprite {
            pool.set_position(sprite, self.position.x, self.position.y);
        }
    }

    fn request_route(&mut self, graph: &mut TileGraph, tile: TileCoord, destination: TileCoord) {
        if self.failed_search == Some((tile, destination)) {
            return;
        }

        match graph.search(tile, destination) {
            Some(route) => {
                self.target = Some(destination);
                self.waypoints = Some(route);
                self.waypoint_cursor = Some(0);
                self.failed_search = None;
            }
            None => {
                log::debug!("settler: no route from {:?} to {:?}", tile, destination);
                self.clear_route();
                self.failed_search = Some((tile, destination));
            }
        }
    }

    fn follow_route(&mut self, graph: &TileGraph, tile: TileCoord, dt_ms: f32) {
        if self.target == Some(tile) {
            self.clear_route();
            return;
        }

        let (Some(route), Some(mut cursor)) = (self.waypoints.as_ref(), self.waypoint_cursor) else {
            self.clear_route();
            return;
        };

        if route.get(cursor + 1) == Some(&tile) {
            cursor += 1;
        }
        let Some(next) = route.get(cursor + 1).copied() else {
            self.clear_route();
            return;
        };
        self.waypoint_cursor = Some(cursor);

        let passable = graph.is_passable(tile);
        let direction = heading(self.position, graph.tile_origin(next), passable);
        if direction == Vec2::ZERO {
            log::trace!("settler: no heading towards {:?} this tick", next);
            return;
        }
        self.position += direction * dt_ms * SETTLER_SPEED;
    }
}

/// Unit direction from `position` (top-left) towards a waypoint whose glyph
/// sits at `waypoint`, or zero if no axis may move.
pub fn heading(position: Vec2, waypoint: Vec2, passable: bool) -> Vec2 {
    let step = Vec2::new(
        axis_step(position.x, waypoint.x, passable),
        axis_step(position.y, waypoint.y, passable),
    );
    step.normalize_or_zero()
}

fn axis_step(pos: f32, target: f32, passable: bool) -> f32 {
    let center = pos + CENTER_OFFSET;
    if target < pos {
        if passable || center > target + EDGE_FAR {
            return -1.0;
        }
    } else if target > pos && (passable || center < target + EDGE_NEAR) {
        return 1.0;
    }
    0.0
}
