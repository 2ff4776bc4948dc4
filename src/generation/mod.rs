//! # Generation Module
//!
//! Procedural level generation: the room-and-corridor wall layout and the
//! population of a level with walls, floors, monsters, items, gems, stairs
//! and the player.

pub mod dungeon;
pub mod encounters;
pub mod items;

pub use dungeon::*;
pub use encounters::*;
pub use items::*;

use crate::config::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH};
use crate::game::Point;
use crate::{CavernsError, CavernsResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Configuration for dungeon layout generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in cells
    pub width: i32,
    /// Map height in cells
    pub height: i32,
    /// Minimum room side length
    pub min_room_size: i32,
    /// Maximum room side length
    pub max_room_size: i32,
    /// Room placement stops once the carved fraction exceeds this
    pub target_fill: f64,
    /// Room proposals tried before generation gives up
    pub max_placement_attempts: u32,
}

impl GenerationConfig {
    /// Creates the standard configuration for a full-size level.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!((config.width, config.height), (80, 40));
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            min_room_size: 5,
            max_room_size: 21,
            target_fill: 0.45,
            max_placement_attempts: 500_000,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            width: 48,
            height: 24,
            min_room_size: 5,
            max_room_size: 9,
            target_fill: 0.3,
            max_placement_attempts: 200_000,
        }
    }

    /// Standard configuration for maps at least the default size. Smaller
    /// maps get rooms scaled to their shorter side and a fill target that a
    /// few rooms can meet.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::GenerationConfig;
    ///
    /// let config = GenerationConfig::for_size(1, 12, 10);
    /// assert_eq!(config.max_room_size, 4);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn for_size(seed: u64, width: i32, height: i32) -> Self {
        let standard = Self::new(seed);
        if width >= standard.width && height >= standard.height {
            return standard.with_size(width, height);
        }

        let max_room_size = ((width.min(height) - 2) / 2).clamp(2, standard.max_room_size);
        let min_room_size = (max_room_size / 2).clamp(2, standard.min_room_size);
        let area = (width * height).max(1) as f64;
        let target_fill = ((max_room_size * max_room_size) as f64 / (2.0 * area))
            .min(standard.target_fill);

        Self {
            min_room_size,
            max_room_size,
            target_fill,
            ..standard.with_size(width, height)
        }
    }

    /// Same configuration with different map dimensions.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Checks that a room of every allowed size fits inside the map border.
    pub fn validate(&self) -> CavernsResult<()> {
        if self.min_room_size < 2 || self.max_room_size < self.min_room_size {
            return Err(CavernsError::GenerationFailed(format!(
                "invalid room size range {}..={}",
                self.min_room_size, self.max_room_size
            )));
        }
        if self.width - self.max_room_size - 1 <= 0 || self.height - self.max_room_size - 1 <= 0 {
            return Err(CavernsError::GenerationFailed(format!(
                "rooms up to {} cells do not fit a {}x{} map",
                self.max_room_size, self.width, self.height
            )));
        }
        if !(0.0..1.0).contains(&self.target_fill) {
            return Err(CavernsError::GenerationFailed(format!(
                "target fill {} must be in [0, 1)",
                self.target_fill
            )));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// A carved rectangular room. `id` is its index in the layout's room list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    /// Creates a room from its top-left corner and size.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::{Point, Room};
    ///
    /// let room = Room::new(1, 5, 5, 10, 8);
    /// assert!(room.contains(Point::new(14, 12)));
    /// assert!(!room.contains(Point::new(15, 12)));
    /// ```
    pub fn new(id: usize, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            id,
            x,
            y,
            width,
            height,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width - 1, self.y + self.height - 1)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> i32 {
        self.width * self.height
    }

    /// Whether a point lies inside the room. Uses the height for y.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }

    /// Whether this room, grown by one cell on every side, overlaps another.
    pub fn touches(&self, other: &Room) -> bool {
        !(self.x - 1 >= other.x + other.width
            || other.x >= self.x + self.width + 1
            || self.y - 1 >= other.y + other.height
            || other.y >= self.y + self.height + 1)
    }

    /// A random cell of the room, excluding the last column and row.
    pub fn random_point<R: Rng>(&self, rng: &mut R) -> Point {
        Point::new(
            self.x + rng.gen_range(0..(self.width - 1).max(1)),
            self.y + rng.gen_range(0..(self.height - 1).max(1)),
        )
    }

    /// Every cell of the room.
    pub fn floor_positions(&self) -> Vec<Point> {
        (self.y..self.y + self.height)
            .flat_map(|y| (self.x..self.x + self.width).map(move |x| Point::new(x, y)))
            .collect()
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> CavernsResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> CavernsResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::utils::Grid;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Checks that a wall grid has floor and that every floor cell is
    /// reachable from every other through cardinal steps.
    pub fn validate_walls(walls: &Grid<bool>) -> CavernsResult<()> {
        let floors: Vec<Point> = walls
            .iter()
            .filter(|(_, &wall)| !wall)
            .map(|(point, _)| point)
            .collect();

        let Some(&start) = floors.first() else {
            return Err(CavernsError::GenerationFailed(
                "Level has no floor cells".to_string(),
            ));
        };

        let reached = ::pathfinding::prelude::bfs_reach(start, |p| {
            p.cardinal_neighbors()
                .into_iter()
                .filter(|n| matches!(walls.get(*n), Some(false)))
                .collect::<Vec<_>>()
        })
        .count();

        if reached != floors.len() {
            return Err(CavernsError::GenerationFailed(format!(
                "Only {} of {} floor cells are connected",
                reached,
                floors.len()
            )));
        }
        Ok(())
    }
}
