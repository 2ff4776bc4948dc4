//! # Configuration
//!
//! Simulation constants plus the data-file layer that feeds monster, item and
//! level tables into the generator.
//!
//! Data files use a small sectioned key/value format:
//!
//! ```text
//! [Monster]
//! id=1
//! name=Rat
//! ```

pub mod parser;
pub mod tables;

pub use parser::*;
pub use tables::*;

/// Default dungeon width in cells
pub const DEFAULT_MAP_WIDTH: i32 = 80;

/// Default dungeon height in cells
pub const DEFAULT_MAP_HEIGHT: i32 = 40;

/// Maximum number of live entities in one store
pub const MAX_ENTITIES: usize = 10_000;

/// Sight radius of the player, in cells
pub const FOV_DISTANCE: i32 = 10;

/// Deepest level; descending from it wins the game
pub const MAX_DUNGEON_LEVEL: u32 = 20;

/// Gems scattered on every level
pub const GEMS_PER_LEVEL: u32 = 5;

/// Number of messages kept in the log
pub const MESSAGE_LOG_CAPACITY: usize = 20;

/// Turns a carried item lasts before crumbling
pub const EQUIPMENT_LIFETIME: i32 = 500;

/// Default carrying capacity of the player
pub const DEFAULT_MAX_WEIGHT: i32 = 20;

/// Turns a corpse stays on the map before removal
pub const CORPSE_TICKS: i32 = 5;

/// Turns a monster keeps chasing after losing sight of the player
pub const CHASE_MEMORY_TURNS: i32 = 5;
