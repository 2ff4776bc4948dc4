//! # Turn Systems
//!
//! Free functions that each advance one concern of the [`World`](crate::World)
//! by a turn. [`World::update`](crate::World::update) calls them in a fixed
//! order; player commands call the player-facing ones directly.

pub mod animation;
pub mod combat;
pub mod environment;
pub mod health;
pub mod inventory;
pub mod movement;

pub use animation::*;
pub use combat::*;
pub use environment::*;
pub use health::*;
pub use inventory::*;
pub use movement::*;
