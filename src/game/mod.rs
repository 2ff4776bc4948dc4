//! # Game Module
//!
//! Core game state, grid coordinates and the visibility engine.
//!
//! This module contains the fundamental building blocks of the simulation:
//! - [`World`], the single context every turn system works on
//! - Shadow-casting field of view
//! - The capped message log shown to the player

pub mod fov;
pub mod messages;
pub mod state;

pub use fov::*;
pub use messages::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the map.
///
/// # Examples
///
/// ```
/// use caverns::Point;
///
/// let p = Point::new(10, 5);
/// assert_eq!(p.x, 10);
/// assert_eq!(p.y, 5);
/// assert_eq!(p.cardinal_neighbors().len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point.
    ///
    /// ```
    /// use caverns::Point;
    ///
    /// assert_eq!(Point::new(0, 0).manhattan_distance(Point::new(3, 4)), 7);
    /// ```
    pub fn manhattan_distance(self, other: Point) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    pub fn euclidean_distance(self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// The 4 cardinal neighbours in west, north, east, south order.
    pub fn cardinal_neighbors(self) -> [Point; 4] {
        Direction::ALL.map(|direction| self + direction.to_delta())
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Cardinal step directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    West,
    North,
    East,
    South,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::West,
        Direction::North,
        Direction::East,
        Direction::South,
    ];

    /// Converts a direction to a coordinate delta. North is `-y`.
    ///
    /// ```
    /// use caverns::{Direction, Point};
    ///
    /// assert_eq!(Direction::North.to_delta(), Point::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Point {
        match self {
            Direction::West => Point::new(-1, 0),
            Direction::North => Point::new(0, -1),
            Direction::East => Point::new(1, 0),
            Direction::South => Point::new(0, 1),
        }
    }

    /// Converts a unit delta back to a direction.
    pub fn from_delta(delta: Point) -> Option<Direction> {
        match (delta.x, delta.y) {
            (-1, 0) => Some(Direction::West),
            (0, -1) => Some(Direction::North),
            (1, 0) => Some(Direction::East),
            (0, 1) => Some(Direction::South),
            _ => None,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distances() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(a.euclidean_distance(b), 5.0);
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(5, 10);
        let b = Point::new(2, 3);
        assert_eq!(a + b, Point::new(7, 13));
        assert_eq!(a - b, Point::new(3, 7));
    }

    #[test]
    fn test_cardinal_neighbors() {
        let neighbors = Point::new(5, 5).cardinal_neighbors();
        assert!(neighbors.contains(&Point::new(5, 4)));
        assert!(neighbors.contains(&Point::new(4, 5)));
        assert!(neighbors.contains(&Point::new(6, 5)));
        assert!(neighbors.contains(&Point::new(5, 6)));
        assert!(!neighbors.contains(&Point::new(4, 4)));
    }

    #[test]
    fn test_direction_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(Direction::from_delta(direction.to_delta()), Some(direction));
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(
                direction.to_delta() + direction.opposite().to_delta(),
                Point::new(0, 0)
            );
        }
        assert_eq!(Direction::from_delta(Point::new(1, 1)), None);
    }
}
