//! # Input Module
//!
//! Key scripts and their translation into player commands.

pub mod commands;

pub use commands::*;

use crate::game::Direction;
use crate::{CavernsError, CavernsResult};

/// Maps keys to player commands.
///
/// Arrow-style movement is available as WASD and, when enabled, as the
/// Vi keys `hjkl`. Inventory commands take the digit that follows them
/// (`x0` drops item 0, `e1` toggles item 1).
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjkl)
    pub vi_keys_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::{Direction, InputHandler, PlayerCommand};
    ///
    /// let input_handler = InputHandler::new();
    /// assert_eq!(input_handler.command_for_key('k'), Some(PlayerCommand::Move(Direction::North)));
    /// ```
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
        }
    }

    /// The command bound to a single key, if any. Inventory commands need an
    /// index and are only produced by [`InputHandler::parse_script`].
    pub fn command_for_key(&self, key: char) -> Option<PlayerCommand> {
        let command = match key {
            'w' => PlayerCommand::Move(Direction::North),
            'a' => PlayerCommand::Move(Direction::West),
            's' => PlayerCommand::Move(Direction::South),
            'd' => PlayerCommand::Move(Direction::East),
            'k' if self.vi_keys_enabled => PlayerCommand::Move(Direction::North),
            'h' if self.vi_keys_enabled => PlayerCommand::Move(Direction::West),
            'j' if self.vi_keys_enabled => PlayerCommand::Move(Direction::South),
            'l' if self.vi_keys_enabled => PlayerCommand::Move(Direction::East),
            'z' | '.' => PlayerCommand::Rest,
            'g' | ',' => PlayerCommand::PickUp,
            '>' => PlayerCommand::Descend,
            _ => return None,
        };
        Some(command)
    }

    /// Parses a key script into commands. Whitespace is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use caverns::{Direction, InputHandler, PlayerCommand};
    ///
    /// let commands = InputHandler::new().parse_script("dd g e0 >").unwrap();
    /// assert_eq!(commands.len(), 5);
    /// assert_eq!(commands[3], PlayerCommand::ToggleEquip(0));
    /// ```
    pub fn parse_script(&self, script: &str) -> CavernsResult<Vec<PlayerCommand>> {
        let mut commands = Vec::new();
        let mut keys = script.chars().filter(|c| !c.is_whitespace());

        while let Some(key) = keys.next() {
            let command = match key {
                'x' | 'e' => {
                    let index = keys
                        .next()
                        .and_then(|digit| digit.to_digit(10))
                        .ok_or_else(|| {
                            CavernsError::InvalidAction(format!(
                                "'{}' must be followed by an inventory digit",
                                key
                            ))
                        })? as usize;
                    if key == 'x' {
                        PlayerCommand::Drop(index)
                    } else {
                        PlayerCommand::ToggleEquip(index)
                    }
                }
                other => self.command_for_key(other).ok_or_else(|| {
                    CavernsError::InvalidAction(format!("unknown key '{}'", other))
                })?,
            };
            commands.push(command);
        }

        Ok(commands)
    }
}
