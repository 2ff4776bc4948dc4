//! # Target Map
//!
//! Flood-filled step distances toward a single target, used to steer
//! chasing monsters downhill toward the player.

use super::grid::Grid;
use crate::game::Point;

/// Distance recorded for cells no path reaches.
pub const UNREACHABLE: i32 = 9999;

/// Computes cardinal step distances from every open cell to `target`.
///
/// Every cell starts at [`UNREACHABLE`] and the target at 0. Full sweeps
/// relax each reached cell into its in-bounds, non-wall cardinal neighbours
/// until a sweep changes nothing. Walls and cut-off regions keep
/// [`UNREACHABLE`].
///
/// # Examples
///
/// ```
/// use caverns::{generate_target_map, Grid, Point, UNREACHABLE};
///
/// let mut walls = Grid::new(3, 1, false);
/// walls[Point::new(1, 0)] = true;
/// let map = generate_target_map(Point::new(0, 0), &walls);
/// assert_eq!(map[Point::new(0, 0)], 0);
/// assert_eq!(map[Point::new(2, 0)], UNREACHABLE);
/// ```
pub fn generate_target_map(target: Point, walls: &Grid<bool>) -> Grid<i32> {
    let mut distances = Grid::new(walls.width(), walls.height(), UNREACHABLE);
    if !distances.set(target, 0) {
        log::warn!("Target map origin ({}, {}) is off the map", target.x, target.y);
        return distances;
    }

    let mut sweeps = 0;
    let mut changed = true;
    while changed {
        changed = false;
        sweeps += 1;

        for x in 0..walls.width() {
            for y in 0..walls.height() {
                let here = distances[Point::new(x, y)];
                if here == UNREACHABLE {
                    continue;
                }
                for next in Point::new(x, y).cardinal_neighbors() {
                    if walls.get(next).copied().unwrap_or(true) {
                        continue;
                    }
                    if distances[next] > here + 1 {
                        distances[next] = here + 1;
                        changed = true;
                    }
                }
            }
        }
    }

    log::trace!("Target map converged after {} sweeps", sweeps);
    distances
}
