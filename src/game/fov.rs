//! # Field of View
//!
//! Octant shadow-casting from a single viewer.
//!
//! Each of the eight octants is scanned row by row outward from the viewer.
//! Within an octant a cell is addressed by `(col, row)` with
//! `0 <= col <= row`; a fixed transform maps it onto the map. Sight-blocking
//! cells cast shadows, stored as inverse-slope ranges, over everything
//! behind them in the same octant.

use super::Point;
use crate::ecs::{EntityStore, Physical, Visibility};
use crate::utils::{edge_slope, inverse_slope, octant_distance, Grid};

/// Anything FOV can be cast over.
pub trait SightMap {
    /// Map size as `(width, height)`.
    fn dimensions(&self) -> (i32, i32);

    /// Whether the cell stops sight. Only called for in-bounds cells.
    fn blocks_sight(&self, point: Point) -> bool;
}

/// A wall grid blocks sight wherever it holds `true`.
impl SightMap for Grid<bool> {
    fn dimensions(&self) -> (i32, i32) {
        (self.width(), self.height())
    }

    fn blocks_sight(&self, point: Point) -> bool {
        self.get(point).copied().unwrap_or(true)
    }
}

/// Sight over live entities: a cell blocks when any entity in it has
/// `Physical::blocks_sight`.
#[derive(Debug, Clone, Copy)]
pub struct EntitySight<'a> {
    pub store: &'a EntityStore,
    pub width: i32,
    pub height: i32,
}

impl SightMap for EntitySight<'_> {
    fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn blocks_sight(&self, point: Point) -> bool {
        self.store.entities_at(point).iter().any(|&id| {
            self.store
                .get::<Physical>(id)
                .map(|physical| physical.blocks_sight)
                .unwrap_or(false)
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Shadow {
    start: f64,
    end: f64,
}

impl Shadow {
    fn covers(&self, slope: f64) -> bool {
        self.start <= slope && slope <= self.end
    }
}

/// Maps octant-local `(col, row)` to a map cell around `origin`.
fn octant_to_map(octant: u8, origin: Point, col: i32, row: i32) -> Point {
    match octant {
        0 => Point::new(origin.x + col, origin.y - row),
        1 => Point::new(origin.x + row, origin.y - col),
        2 => Point::new(origin.x + row, origin.y + col),
        3 => Point::new(origin.x + col, origin.y + row),
        4 => Point::new(origin.x - col, origin.y + row),
        5 => Point::new(origin.x - row, origin.y + col),
        6 => Point::new(origin.x - row, origin.y - col),
        _ => Point::new(origin.x - col, origin.y - row),
    }
}

/// Computes which cells are visible from `origin`.
///
/// Rows `1..radius` are scanned in every octant; a cell is visible when it is
/// on the map, within `radius` of the origin and not inside a recorded
/// shadow. The origin is always visible.
///
/// # Examples
///
/// ```
/// use caverns::{calculate_fov, Grid, Point};
///
/// let walls = Grid::new(9, 9, false);
/// let fov = calculate_fov(Point::new(4, 4), 10, &walls);
/// assert!(fov[Point::new(4, 4)]);
/// assert!(fov[Point::new(0, 0)]);
/// ```
pub fn calculate_fov(origin: Point, radius: i32, map: &impl SightMap) -> Grid<bool> {
    let (width, height) = map.dimensions();
    let mut visible = Grid::new(width, height, false);
    if !visible.set(origin, true) {
        log::warn!("FOV origin ({}, {}) is off the map", origin.x, origin.y);
        return visible;
    }

    for octant in 0..8u8 {
        let mut shadows: Vec<Shadow> = Vec::new();

        for row in 1..radius {
            let mut prev_blocking = false;
            let mut shadow_start = 0.0;

            for col in 0..=row {
                let cell = octant_to_map(octant, origin, col, row);
                if !visible.in_bounds(cell) || octant_distance(col, row) > radius as f64 {
                    continue;
                }

                let slope = inverse_slope(col, row);
                if shadows.iter().any(|shadow| shadow.covers(slope)) {
                    continue;
                }

                visible[cell] = true;
                if map.blocks_sight(cell) {
                    if !prev_blocking {
                        shadow_start = slope;
                        prev_blocking = true;
                    }
                } else if prev_blocking {
                    shadows.push(Shadow {
                        start: shadow_start,
                        end: edge_slope(col, row),
                    });
                    prev_blocking = false;
                }
            }

            if prev_blocking {
                shadows.push(Shadow {
                    start: shadow_start,
                    end: edge_slope(row, row),
                });
            }
        }
    }

    visible
}

/// Sets the sticky `has_been_seen` flag on everything in a visible cell.
pub fn mark_seen(store: &mut EntityStore, fov: &Grid<bool>) {
    let seen: Vec<_> = store
        .iter::<Visibility>()
        .filter(|(id, vis)| {
            !vis.has_been_seen
                && store
                    .position(*id)
                    .and_then(|pos| fov.get(pos.point()).copied())
                    .unwrap_or(false)
        })
        .map(|(id, _)| id)
        .collect();

    for id in seen {
        if let Some(vis) = store.get_mut::<Visibility>(id) {
            vis.has_been_seen = true;
        }
    }
}
