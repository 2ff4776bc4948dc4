//! Notes about what lies on the player's cell.

use crate::config::MAX_DUNGEON_LEVEL;
use crate::ecs::{Color, ComponentKind, Stairs, Visibility};
use crate::game::World;

const STAIRS_MESSAGE_COLOR: Color = Color(0xffd7_00ff);
const ITEM_MESSAGE_COLOR: Color = Color(0x0099_00ff);

/// Tells the player about stairs and loot underfoot.
///
/// Every staircase gets its own line. Loot gets one line naming the last
/// item or gem in the cell.
pub fn environment_update(world: &mut World) {
    let Some(here) = world.player_position() else {
        return;
    };
    let occupants = world.store.entities_at(here).to_vec();

    let stairs = occupants
        .iter()
        .filter(|&&id| world.store.get::<Stairs>(id).is_some())
        .count();
    for _ in 0..stairs {
        let text = if world.depth < MAX_DUNGEON_LEVEL {
            "There are stairs down here. [D]escend?"
        } else {
            "There is a glowing portal here. [E]nter?"
        };
        world.add_message(text, STAIRS_MESSAGE_COLOR);
    }

    let loot = occupants.iter().rev().find_map(|&id| {
        let is_loot = world.store.has(id, ComponentKind::Equipment)
            || world.store.has(id, ComponentKind::Treasure);
        if is_loot {
            world.store.get::<Visibility>(id).map(|vis| vis.name.clone())
        } else {
            None
        }
    });
    if let Some(name) = loot {
        world.add_message(format!("There is a {} here. [G]et it?", name), ITEM_MESSAGE_COLOR);
    }
}
