//! A* search over the 8-connected tile grid.
//!
//! Cost so far is the Euclidean length of the path; the heuristic is the
//! Manhattan distance to the goal. Manhattan overestimates diagonal moves, so
//! routes are not guaranteed shortest; they are straight-line greedy, which is
//! what the settlers want.
//!
//! Neighbour expansion never enters the last row or the last column of the
//! grid: a goal there is only reachable when it is also the start.

use crate::api::types::TileCoord;
use crate::components::tilemap::TileGraph;

impl TileGraph {
    /// Find a route from `start` to `goal`, both inclusive, in travel order.
    ///
    /// Returns `None` when the goal cannot be reached (or either end lies
    /// outside the grid). Takes `&mut self` because per-tile scratch state is
    /// rewritten on every call.
    pub fn search(&mut self, start: TileCoord, goal: TileCoord) -> Option<Vec<TileCoord>> {
        self.reset_search_state();

        let start_idx = self.index(start)?;
        let goal_idx = self.index(goal)?;

        let count = self.tiles.len();
        // Open set keeps insertion order so ties go to the earliest entry.
        let mut open: Vec<usize> = Vec::with_capacity(count);
        let mut in_open = vec![false; count];
        let mut closed = vec![false; count];

        self.tiles[start_idx].g_score = 0.0;
        open.push(start_idx);
        in_open[start_idx] = true;

        let width = self.width as i64;
        let height = self.height as i64;

        while !open.is_empty() {
            let goal_tile = &self.tiles[goal_idx];
            let mut best = 0;
            for pos in 1..open.len() {
                let candidate = self.tiles[open[pos]].f_score(goal_tile);
                if candidate < self.tiles[open[best]].f_score(goal_tile) {
                    best = pos;
                }
            }
            let current = open[best];

            if current == goal_idx {
                return Some(self.reconstruct(goal_idx));
            }

            open.remove(best);
            in_open[current] = false;
            closed[current] = true;

            let cx = self.tiles[current].x as i64;
            let cy = self.tiles[current].y as i64;

            for ny in (cy - 1)..=(cy + 1) {
                for nx in (cx - 1)..=(cx + 1) {
                    if nx == cx && ny == cy {
                        continue;
                    }
                    if nx < 0 || ny < 0 || ny >= height - 1 || nx >= width - 1 {
                        continue;
                    }

                    let n = (ny * width + nx) as usize;
                    if closed[n] || !self.tiles[n].passable {
                        continue;
                    }

                    let score = self.tiles[current].g_score
                        + self.tiles[current].distance(&self.tiles[n]);
                    if score < self.tiles[n].g_score {
                        self.tiles[n].parent = Some(current);
                        self.tiles[n].g_score = score;
                        if !in_open[n] {
                            open.push(n);
                            in_open[n] = true;
                        }
                    }
                }
            }
        }

        log::trace!("pathfind: frontier exhausted, {:?} unreachable from {:?}", goal, start);
        None
    }

    /// Walk parent links back from `goal_idx` and return the route start-first.
    fn reconstruct(&self, goal_idx: usize) -> Vec<TileCoord> {
        let mut route = Vec::new();
        let mut node = Some(goal_idx);
        while let Some(idx) = node {
            let tile = &self.tiles[idx];
            route.push(tile.coord());
            node = tile.parent;
        }
        route.reverse();
        route
    }
}

#[cfg(test)]
mod tests {
    use crate::api::types::TileCoord;
    use crate::assets::atlas::AtlasManifest;
    use crate::components::tilemap::{TerrainKind, TileGraph};
    use crate::core::pool::SpriteSlotPool;
    use crate::core::rng::Rng;

    fn open_grid(width: u32, height: u32) -> TileGraph {
        let mut pool = SpriteSlotPool::new();
        TileGraph::filled(width, height, TerrainKind::Ground, &mut pool, &AtlasManifest::default())
    }

    /// Parse a layout where '.' is ground and '#' is water.
    fn grid_from(rows: &[&str]) -> TileGraph {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let kinds: Vec<TerrainKind> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| if c == '#' { TerrainKind::Water } else { TerrainKind::Ground })
            .collect();
        let mut pool = SpriteSlotPool::new();
        TileGraph::from_kinds(width, height, &kinds, &mut pool, &AtlasManifest::default())
    }

    fn assert_contiguous(route: &[TileCoord], start: TileCoord, goal: TileCoord) {
        assert_eq!(route.first(), Some(&start));
        assert_eq!(route.last(), Some(&goal));
        for pair in route.windows(2) {
            assert!(pair[0].is_adjacent(&pair[1]), "{:?} -> {:?} is not a step", pair[0], pair[1]);
        }
    }

    #[test]
    fn start_equals_goal_is_single_tile() {
        let mut graph = open_grid(10, 10);
        let t = TileCoord::new(4, 4);
        assert_eq!(graph.search(t, t), Some(vec![t]));
    }

    #[test]
    fn start_equals_goal_on_boundary_row() {
        let mut graph = open_grid(10, 10);
        let t = TileCoord::new(9, 9);
        assert_eq!(graph.search(t, t), Some(vec![t]));
    }

    #[test]
    fn open_grid_route_is_diagonal_greedy() {
        let mut graph = open_grid(10, 10);
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(8, 7);
        let route = graph.search(start, goal).expect("goal should be reachable");
        assert_contiguous(&route, start, goal);
        assert_eq!(route.len(), 9); // max(|dx|, |dy|) + 1

        // f = g + h never rises along the route and drops on every diagonal step.
        let h = |c: &TileCoord| (c.x.abs_diff(goal.x) + c.y.abs_diff(goal.y)) as f32;
        let mut g = 0.0f32;
        let mut prev_f = h(&route[0]);
        for pair in route.windows(2) {
            let dx = pair[1].x as f32 - pair[0].x as f32;
            let dy = pair[1].y as f32 - pair[0].y as f32;
            g += (dx * dx + dy * dy).sqrt();
            let f = g + h(&pair[1]);
            if dx != 0.0 && dy != 0.0 {
                assert!(f < prev_f - 1e-4, "diagonal step should lower f: {} -> {}", prev_f, f);
            } else {
                assert!(f <= prev_f + 1e-4, "f rose: {} -> {}", prev_f, f);
            }
            prev_f = f;
        }
    }

    #[test]
    fn last_row_and_column_are_never_expanded() {
        let mut graph = open_grid(10, 10);
        let start = TileCoord::new(0, 0);
        assert_eq!(graph.search(start, TileCoord::new(9, 8)), None);
        assert_eq!(graph.search(start, TileCoord::new(3, 9)), None);
        assert!(graph.search(start, TileCoord::new(8, 8)).is_some());
    }

    #[test]
    fn start_on_edge_can_still_leave() {
        let mut graph = open_grid(10, 10);
        let start = TileCoord::new(9, 9);
        let goal = TileCoord::new(5, 5);
        let route = graph.search(start, goal).expect("interior goal should be reachable");
        assert_contiguous(&route, start, goal);
    }

    #[test]
    fn enclosed_goal_is_unreachable() {
        let mut graph = grid_from(&[
            "........",
            "....###.",
            "....#.#.",
            "....###.",
            "........",
            "........",
        ]);
        assert_eq!(graph.search(TileCoord::new(0, 0), TileCoord::new(5, 2)), None);
    }

    #[test]
    fn route_detours_around_water() {
        let mut graph = grid_from(&[
            "........",
            "...#....",
            "...#....",
            "...#....",
            "........",
            "........",
        ]);
        let start = TileCoord::new(1, 2);
        let goal = TileCoord::new(5, 2);
        let route = graph.search(start, goal).expect("gap below the wall");
        assert_contiguous(&route, start, goal);
        assert!(route.iter().all(|c| graph.is_passable(*c)));
        assert!(
            route.iter().any(|c| c.y == 0 || c.y == 4),
            "route must go around the wall: {:?}",
            route
        );
    }

    #[test]
    fn diagonal_squeeze_between_water_corners_is_allowed() {
        let mut graph = grid_from(&[
            ".....",
            ".#...",
            "..#..",
            ".....",
        ]);
        let start = TileCoord::new(2, 1);
        let goal = TileCoord::new(1, 2);
        let route = graph.search(start, goal).unwrap();
        assert_eq!(route, vec![start, goal]);
    }

    #[test]
    fn impassable_goal_is_unreachable() {
        let mut graph = grid_from(&[
            ".....",
            "..#..",
            ".....",
            ".....",
        ]);
        assert_eq!(graph.search(TileCoord::new(0, 0), TileCoord::new(2, 1)), None);
    }

    #[test]
    fn coordinates_outside_grid_are_unreachable() {
        let mut graph = open_grid(5, 5);
        assert_eq!(graph.search(TileCoord::new(0, 0), TileCoord::new(7, 1)), None);
        assert_eq!(graph.search(TileCoord::new(9, 9), TileCoord::new(1, 1)), None);
    }

    #[test]
    fn repeated_searches_start_from_clean_state() {
        let mut graph = open_grid(10, 10);
        let first = graph.search(TileCoord::new(0, 0), TileCoord::new(8, 8)).unwrap();
        let second = graph.search(TileCoord::new(8, 0), TileCoord::new(0, 8)).unwrap();
        assert_contiguous(&first, TileCoord::new(0, 0), TileCoord::new(8, 8));
        assert_contiguous(&second, TileCoord::new(8, 0), TileCoord::new(0, 8));
        assert_eq!(second.len(), 9);
    }

    #[test]
    fn random_maps_yield_contiguous_passable_routes() {
        let atlas = AtlasManifest::default();
        for seed in 1..40u64 {
            let mut pool = SpriteSlotPool::new();
            let mut rng = Rng::new(seed);
            let mut graph = TileGraph::generate(10, 10, 0.7, &mut rng, &mut pool, &atlas);
            let start = TileCoord::new(1, 1);
            let goal = TileCoord::new(7, 4);
            if let Some(route) = graph.search(start, goal) {
                assert_contiguous(&route, start, goal);
                assert!(route[1..].iter().all(|c| graph.is_passable(*c)));
                assert!(route.iter().all(|c| (c.x < 9 && c.y < 9) || *c == start));
            }
        }
    }
}
