//! # Caverns
//!
//! The turn-based simulation core of a roguelike dungeon crawler.
//!
//! ## Architecture Overview
//!
//! Everything revolves around a single [`World`] value that is passed
//! explicitly to every system:
//!
//! - **Entity Store**: generational entity handles, typed component tables and
//!   a position index that always mirrors the live `Position` components
//! - **Generation System**: room-and-corridor levels with a duplicate-free,
//!   fully connected corridor graph, populated from data tables
//! - **Field of View**: octant shadow-casting from the player's cell
//! - **Target Map**: a flood-filled distance field that steers monster AI
//! - **Turn Systems**: movement, combat, health, items, environment and
//!   animation, run in a fixed order once per player action
//!
//! Rendering, window input and persistence are left to the caller; the core
//! exposes read-only queries ([`World::glyph_at`], [`World::fov`],
//! [`EntityStore::iter`]) and a message log.

pub mod config;
pub mod ecs;
pub mod game;
pub mod generation;
pub mod input;
pub mod systems;
pub mod utils;

// Core module re-exports
pub use config::*;
pub use ecs::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use systems::*;
pub use utils::*;

/// Core error type for the Caverns simulation.
#[derive(thiserror::Error, Debug)]
pub enum CavernsError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Every slot in the entity pool is taken
    #[error("Entity pool exhausted (capacity {capacity})")]
    EntityPoolExhausted { capacity: usize },

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Data table is malformed or incomplete
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type used throughout the Caverns codebase.
pub type CavernsResult<T> = Result<T, CavernsError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
