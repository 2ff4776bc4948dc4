//! Melee resolution and death handling.

use crate::config::CORPSE_TICKS;
use crate::ecs::{Color, Combat, EntityId, Health, Layer, Movement, Physical, Visibility};
use crate::game::{GameCompletionState, World};
use rand::Rng;

const COMBAT_COLOR: Color = Color(0xcccc_ccff);
const PLAYER_DEATH_COLOR: Color = Color(0xcc00_00ff);
const KILL_COLOR: Color = Color(0xff99_00ff);
const CORPSE_GLYPH: char = '%';
const CORPSE_COLOR: Color = Color(0x9900_00ff);

/// How a single attack went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackResult {
    Miss,
    /// Hit, but defense soaked all of it
    NoDamage,
    Hit { damage: i32, killed: bool },
}

/// Rolls `1..=100` and resolves an attack with it.
///
/// Returns `None` when either side lacks `Combat` or the defender lacks
/// `Health`.
pub fn attack(world: &mut World, attacker: EntityId, defender: EntityId) -> Option<AttackResult> {
    let roll = world.rng.gen_range(1..=100);
    resolve_attack(world, attacker, defender, roll)
}

/// Resolves an attack with a given roll.
///
/// The attack lands when `roll` is below the attacker's hit window or is a
/// natural 100. Damage is total attack minus total defense, with the depth
/// bonus `1 + depth / 3` going to monsters on both sides of the exchange.
pub fn resolve_attack(
    world: &mut World,
    attacker: EntityId,
    defender: EntityId,
    roll: i32,
) -> Option<AttackResult> {
    let att = *world.store.get::<Combat>(attacker)?;
    let def = *world.store.get::<Combat>(defender)?;
    world.store.get::<Health>(defender)?;

    let player_attacking = attacker == world.player;
    let attacker_name = creature_name(world, attacker);

    if !(roll < att.hit_window() || roll == 100) {
        if player_attacking {
            world.add_message("Your attack misses.", COMBAT_COLOR);
        } else {
            world.add_message(format!("The {} misses you.", attacker_name), COMBAT_COLOR);
        }
        return Some(AttackResult::Miss);
    }

    let level_bonus = 1 + (world.depth / 3) as i32;
    let mut total_attack = att.total_attack();
    let mut total_defense = def.total_defense();
    if player_attacking {
        total_defense += level_bonus;
    } else {
        total_attack += level_bonus;
    }

    let damage = total_attack - total_defense;
    if damage <= 0 {
        if player_attacking {
            world.add_message("Your attack didn't do any damage.", COMBAT_COLOR);
        } else {
            world.add_message(
                "The creature's pathetic attack didn't do any damage.",
                COMBAT_COLOR,
            );
        }
        return Some(AttackResult::NoDamage);
    }

    if player_attacking {
        let defender_name = creature_name(world, defender);
        world.add_message(
            format!("You hit the {} for {} damage.", defender_name, damage),
            COMBAT_COLOR,
        );
        world.statistics.damage_dealt += damage as u64;
    } else {
        world.add_message(
            format!("The {} hits you for {} damage.", attacker_name, damage),
            COMBAT_COLOR,
        );
        if defender == world.player {
            world.statistics.damage_taken += damage as u64;
        }
    }

    let killed = match world.store.get_mut::<Health>(defender) {
        Some(health) => {
            let was_alive = !health.is_dead();
            health.current_hp -= damage;
            was_alive && health.is_dead()
        }
        None => false,
    };
    if killed {
        handle_death(world, defender);
    }

    Some(AttackResult::Hit { damage, killed })
}

/// Applies the consequences of an entity's HP crossing zero.
///
/// The player's death ends the game. A monster becomes a corpse: drawn as
/// `%` on the ground layer, no longer blocking, unable to move, and queued
/// for removal.
pub fn handle_death(world: &mut World, id: EntityId) {
    if id == world.player {
        world.add_message("You have died.", PLAYER_DEATH_COLOR);
        world.completion_state = GameCompletionState::PlayerDied;
        log::info!(
            "Player died on level {} after {} turns",
            world.depth,
            world.statistics.turns_taken
        );
        return;
    }

    let name = creature_name(world, id);
    if let Some(vis) = world.store.get_mut::<Visibility>(id) {
        vis.glyph = CORPSE_GLYPH;
        vis.fg_color = CORPSE_COLOR;
    }
    world.store.set_layer(id, Layer::Ground);
    if let Some(physical) = world.store.get_mut::<Physical>(id) {
        *physical = Physical::OPEN;
    }
    world.store.remove::<Movement>(id);
    if let Some(health) = world.store.get_mut::<Health>(id) {
        health.ticks_until_removal = CORPSE_TICKS;
    }

    world.statistics.monsters_killed += 1;
    world.add_message(format!("You killed the {}.", name), KILL_COLOR);
    log::debug!("{} ({}) died", name, id);
}

fn creature_name(world: &World, id: EntityId) -> String {
    world
        .store
        .get::<Visibility>(id)
        .map(|vis| vis.name.clone())
        .unwrap_or_else(|| "creature".to_string())
}
