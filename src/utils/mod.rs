//! # Utilities Module
//!
//! Grid storage, slope math and the flood-fill target map used by monster AI.

pub mod grid;
pub mod math;
pub mod pathfinding;

pub use self::grid::*;
pub use self::math::*;
pub use self::pathfinding::*;
