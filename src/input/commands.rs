//! # Command Definitions
//!
//! The player actions the simulation accepts and what applying one did.

use crate::game::Direction;
use serde::{Deserialize, Serialize};

/// One player action, applied through [`World::apply`](crate::World::apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    /// Step one cell, or attack whatever blocks the step
    Move(Direction),
    /// Skip a turn and recover hit points
    Rest,
    /// Take the gem or item on the player's cell
    PickUp,
    /// Put down the carried item at this index
    Drop(usize),
    /// Equip or unequip the carried item at this index
    ToggleEquip(usize),
    /// Take the stairs on the player's cell
    Descend,
}

impl PlayerCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerCommand::Move(_) => "move",
            PlayerCommand::Rest => "rest",
            PlayerCommand::PickUp => "pick up",
            PlayerCommand::Drop(_) => "drop",
            PlayerCommand::ToggleEquip(_) => "toggle equip",
            PlayerCommand::Descend => "descend",
        }
    }
}

/// What applying a command did to the turn counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOutcome {
    /// A turn passed and the world advanced
    TurnTaken,
    /// The command did something, or logged why it could not, without
    /// using a turn
    Free,
    /// A move into a cell that nothing could be done about. Nothing changed.
    Blocked,
}

impl TurnOutcome {
    pub fn took_turn(self) -> bool {
        self == TurnOutcome::TurnTaken
    }
}
