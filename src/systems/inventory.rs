//! Carried items: picking up, dropping, equipping and wear.

use crate::config::GEMS_PER_LEVEL;
use crate::ecs::{Color, Combat, ComponentKind, EntityId, Equipment, Layer, Position, Treasure, Visibility};
use crate::game::World;
use crate::input::TurnOutcome;
use crate::{CavernsError, CavernsResult};

const GEM_MESSAGE_COLOR: Color = Color(0x753a_abff);
const PICKUP_COLOR: Color = Color(0x0099_00ff);
const WARNING_COLOR: Color = Color(0x9900_00ff);

/// Total weight of everything the player carries.
pub fn carried_weight(world: &World) -> i32 {
    world
        .carried
        .iter()
        .filter_map(|&id| world.store.get::<Equipment>(id))
        .map(|eq| eq.weight)
        .sum()
}

/// Picks up the first gem or item on the player's cell.
///
/// Gems are tallied and destroyed without using a turn. Equipment moves to
/// the front of the carried list if the weight limit allows, which uses a
/// turn.
pub fn pick_up(world: &mut World) -> CavernsResult<TurnOutcome> {
    let here = world.player_point()?;
    let found = world.store.entities_at(here).iter().copied().find(|&id| {
        world.store.has(id, ComponentKind::Equipment) || world.store.has(id, ComponentKind::Treasure)
    });
    let Some(id) = found else {
        return Ok(TurnOutcome::Free);
    };
    let name = item_name(world, id);

    if world.store.get::<Treasure>(id).is_some() {
        world.gems_found_this_level += 1;
        world.statistics.gems_collected += 1;
        let left = GEMS_PER_LEVEL.saturating_sub(world.gems_found_this_level);
        world.add_message(
            format!("You picked up the {}. Gems left on level:{}", name, left),
            GEM_MESSAGE_COLOR,
        );
        world.store.destroy(id);
        return Ok(TurnOutcome::Free);
    }

    let weight = world
        .store
        .get::<Equipment>(id)
        .map(|eq| eq.weight)
        .unwrap_or(0);
    if carried_weight(world) + weight > world.max_weight {
        world.add_message("You are carrying too much already.", WARNING_COLOR);
        return Ok(TurnOutcome::Free);
    }

    world.carried.insert(0, id);
    world.store.set_position(id, None);
    world.statistics.items_picked_up += 1;
    world.add_message(format!("You picked up the {}.", name), PICKUP_COLOR);
    Ok(TurnOutcome::TurnTaken)
}

/// Puts carried item `index` down on the player's cell, unequipping it
/// first. Refused when equipment already lies there.
pub fn drop_item(world: &mut World, index: usize) -> CavernsResult<TurnOutcome> {
    let id = carried_at(world, index)?;
    let here = world.player_point()?;

    let occupied = world
        .store
        .entities_at(here)
        .iter()
        .any(|&other| world.store.has(other, ComponentKind::Equipment));
    if occupied {
        world.add_message("Can't drop here.", WARNING_COLOR);
        return Ok(TurnOutcome::Free);
    }

    world.store.set_position(id, Some(Position::at(here, Layer::Mid)));
    if is_equipped(world, id) {
        toggle_equip(world, id);
    }
    world.carried.retain(|&other| other != id);

    let name = item_name(world, id);
    world.add_message(format!("You dropped the {}.", name), WARNING_COLOR);
    Ok(TurnOutcome::Free)
}

/// Equips or unequips carried item `index`.
pub fn toggle_equip_at(world: &mut World, index: usize) -> CavernsResult<TurnOutcome> {
    let id = carried_at(world, index)?;
    toggle_equip(world, id);
    Ok(TurnOutcome::Free)
}

/// Flips an item's equipped flag and moves its modifiers onto or off the
/// player. Equipping unequips whatever else is equipped in the same slot.
pub fn toggle_equip(world: &mut World, item: EntityId) {
    let Some(eq) = world.store.get_mut::<Equipment>(item) else {
        return;
    };
    eq.is_equipped = !eq.is_equipped;
    let equipped = eq.is_equipped;
    let slot = eq.slot.clone();

    if !equipped {
        apply_modifiers(world, item, -1);
        return;
    }

    apply_modifiers(world, item, 1);
    let others: Vec<EntityId> = world
        .carried
        .iter()
        .copied()
        .filter(|&other| other != item)
        .collect();
    for other in others {
        let displaced = match world.store.get_mut::<Equipment>(other) {
            Some(eq) if eq.is_equipped && eq.slot == slot => {
                eq.is_equipped = false;
                true
            }
            _ => false,
        };
        if displaced {
            apply_modifiers(world, other, -1);
        }
    }
}

/// Ages every carried item by a turn. Items that wear out are unequipped,
/// dropped from the carried list and destroyed.
pub fn item_lifetime_update(world: &mut World) {
    for id in world.carried.clone() {
        let expired = match world.store.get_mut::<Equipment>(id) {
            Some(eq) => {
                eq.lifetime -= 1;
                eq.lifetime <= 0
            }
            None => false,
        };
        if !expired {
            continue;
        }

        let was_equipped = is_equipped(world, id);
        if was_equipped {
            toggle_equip(world, id);
        }
        world.carried.retain(|&other| other != id);

        let name = item_name(world, id);
        let text = if was_equipped {
            format!("The {} crumbles in your hands.", name)
        } else {
            format!("The {} you are carrying crumbles to dust.", name)
        };
        world.add_message(text, WARNING_COLOR);
        world.store.destroy(id);
    }
}

fn carried_at(world: &World, index: usize) -> CavernsResult<EntityId> {
    world.carried.get(index).copied().ok_or_else(|| {
        CavernsError::InvalidAction(format!(
            "no carried item at index {} (carrying {})",
            index,
            world.carried.len()
        ))
    })
}

fn is_equipped(world: &World, id: EntityId) -> bool {
    world
        .store
        .get::<Equipment>(id)
        .map(|eq| eq.is_equipped)
        .unwrap_or(false)
}

fn apply_modifiers(world: &mut World, item: EntityId, sign: i32) {
    let mods = world.store.get::<Combat>(item).copied().unwrap_or_default();
    if let Some(player) = world.store.get_mut::<Combat>(world.player) {
        player.to_hit_modifier += sign * mods.to_hit_modifier;
        player.attack_modifier += sign * mods.attack_modifier;
        player.defense_modifier += sign * mods.defense_modifier;
    }
}

fn item_name(world: &World, id: EntityId) -> String {
    world
        .store
        .get::<Visibility>(id)
        .map(|vis| vis.name.clone())
        .unwrap_or_else(|| "item".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ItemTemplate;
    use crate::game::Point;
    use crate::generation::{spawn_gem, spawn_item};
    use crate::systems::test_support::scenario_world;

    fn template(world: &World, name: &str, slot: &str, attack: i32, defense: i32) -> ItemTemplate {
        let mut template = world.data.items[0].clone();
        template.name = name.to_string();
        template.slot = slot.to_string();
        template.to_hit_modifier = 0;
        template.attack_modifier = attack;
        template.defense_modifier = defense;
        template.weight = 5;
        template
    }

    fn carry(world: &mut World, name: &str, slot: &str, attack: i32, defense: i32) -> EntityId {
        let template = template(world, name, slot, attack, defense);
        let here = world.player_position().unwrap();
        let id = spawn_item(&mut world.store, &template, here).unwrap();
        assert_eq!(pick_up(world).unwrap(), TurnOutcome::TurnTaken);
        id
    }

    fn player_combat(world: &World) -> Combat {
        *world.store.get::<Combat>(world.player).unwrap()
    }

    #[test]
    fn test_pick_up_gem() {
        let mut world = scenario_world(Point::new(4, 4));
        let gem = spawn_gem(&mut world.store, Point::new(4, 4)).unwrap();

        assert_eq!(pick_up(&mut world).unwrap(), TurnOutcome::Free);
        assert!(!world.store.is_alive(gem));
        assert_eq!(world.gems_found_this_level, 1);
        assert_eq!(world.statistics.gems_collected, 1);
        assert_eq!(
            world.messages().last().unwrap().text,
            "You picked up the Gem. Gems left on level:4"
        );
    }

    #[test]
    fn test_pick_up_nothing() {
        let mut world = scenario_world(Point::new(4, 4));
        assert_eq!(pick_up(&mut world).unwrap(), TurnOutcome::Free);
        assert!(world.messages().is_empty());
    }

    #[test]
    fn test_pick_up_equipment_and_weight_limit() {
        let mut world = scenario_world(Point::new(4, 4));
        let sword = carry(&mut world, "Sword", "hand", 3, 0);

        assert_eq!(world.carried, vec![sword]);
        assert!(world.store.position(sword).is_none());
        assert_eq!(carried_weight(&world), 5);
        assert_eq!(world.messages().last().unwrap().text, "You picked up the Sword.");

        let mut heavy = template(&world, "Anvil", "hand", 0, 0);
        heavy.weight = 16;
        let anvil = spawn_item(&mut world.store, &heavy, Point::new(4, 4)).unwrap();
        assert_eq!(pick_up(&mut world).unwrap(), TurnOutcome::Free);
        assert!(world.store.position(anvil).is_some());
        assert_eq!(
            world.messages().last().unwrap().text,
            "You are carrying too much already."
        );

        world.store.get_mut::<Equipment>(anvil).unwrap().weight = 15;
        assert_eq!(pick_up(&mut world).unwrap(), TurnOutcome::TurnTaken);
        assert_eq!(world.carried, vec![anvil, sword]);
    }

    #[test]
    fn test_equip_moves_modifiers_and_swaps_slot() {
        let mut world = scenario_world(Point::new(4, 4));
        let dagger = carry(&mut world, "Dagger", "hand", 2, 0);
        let axe = carry(&mut world, "Axe", "hand", 4, 1);
        assert_eq!(world.carried, vec![axe, dagger]);

        toggle_equip_at(&mut world, 1).unwrap();
        assert_eq!(player_combat(&world).attack_modifier, 2);

        toggle_equip_at(&mut world, 0).unwrap();
        let combat = player_combat(&world);
        assert_eq!((combat.attack_modifier, combat.defense_modifier), (4, 1));
        assert!(!world.store.get::<Equipment>(dagger).unwrap().is_equipped);
        assert!(world.store.get::<Equipment>(axe).unwrap().is_equipped);

        toggle_equip_at(&mut world, 0).unwrap();
        assert_eq!(player_combat(&world), Combat::new(80, 5, 2));
    }

    #[test]
    fn test_different_slots_stack() {
        let mut world = scenario_world(Point::new(4, 4));
        carry(&mut world, "Dagger", "hand", 2, 0);
        carry(&mut world, "Helm", "head", 0, 2);
        toggle_equip_at(&mut world, 0).unwrap();
        toggle_equip_at(&mut world, 1).unwrap();
        let combat = player_combat(&world);
        assert_eq!((combat.attack_modifier, combat.defense_modifier), (2, 2));
    }

    #[test]
    fn test_drop_item() {
        let mut world = scenario_world(Point::new(4, 4));
        let sword = carry(&mut world, "Sword", "hand", 3, 0);
        toggle_equip_at(&mut world, 0).unwrap();

        let shield = template(&world, "Shield", "arm", 0, 1);
        let blocker = spawn_item(&mut world.store, &shield, Point::new(4, 4)).unwrap();
        assert_eq!(drop_item(&mut world, 0).unwrap(), TurnOutcome::Free);
        assert_eq!(world.messages().last().unwrap().text, "Can't drop here.");
        assert_eq!(world.carried, vec![sword]);

        world.store.destroy(blocker);
        drop_item(&mut world, 0).unwrap();
        assert!(world.carried.is_empty());
        assert_eq!(
            world.store.position(sword),
            Some(Position::new(4, 4, Layer::Mid))
        );
        assert!(!world.store.get::<Equipment>(sword).unwrap().is_equipped);
        assert_eq!(player_combat(&world).attack_modifier, 0);
        assert_eq!(world.messages().last().unwrap().text, "You dropped the Sword.");
    }

    #[test]
    fn test_bad_inventory_index() {
        let mut world = scenario_world(Point::new(4, 4));
        assert!(matches!(
            drop_item(&mut world, 0),
            Err(CavernsError::InvalidAction(_))
        ));
        assert!(toggle_equip_at(&mut world, 3).is_err());
    }

    #[test]
    fn test_items_crumble() {
        let mut world = scenario_world(Point::new(4, 4));
        let sword = carry(&mut world, "Sword", "hand", 3, 0);
        let rope = carry(&mut world, "Rope", "belt", 0, 0);
        toggle_equip_at(&mut world, 1).unwrap();
        world.store.get_mut::<Equipment>(sword).unwrap().lifetime = 1;
        world.store.get_mut::<Equipment>(rope).unwrap().lifetime = 2;

        item_lifetime_update(&mut world);
        assert!(!world.store.is_alive(sword));
        assert_eq!(world.carried, vec![rope]);
        assert_eq!(player_combat(&world).attack_modifier, 0);
        assert_eq!(
            world.messages().last().unwrap().text,
            "The Sword crumbles in your hands."
        );

        item_lifetime_update(&mut world);
        assert!(world.carried.is_empty());
        assert_eq!(
            world.messages().last().unwrap().text,
            "The Rope you are carrying crumbles to dust."
        );
    }
}
