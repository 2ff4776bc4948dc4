//! # Encounter Generation
//!
//! Creature spawning: the player and the monsters picked from the data
//! tables for the current depth.

use super::items::open_point;
use crate::config::{GameData, MonsterTemplate};
use crate::ecs::{Color, Combat, EntityId, EntityStore, Health, Layer, Movement, Physical, Position, Visibility};
use crate::game::Point;
use crate::utils::Grid;
use crate::CavernsResult;
use rand::Rng;

pub const PLAYER_GLYPH: char = '@';
pub const PLAYER_COLOR: Color = Color(0x00ff_00ff);
pub const PLAYER_MAX_HP: i32 = 20;
pub const PLAYER_RECOVERY_RATE: i32 = 1;
pub const PLAYER_TO_HIT: i32 = 80;
pub const PLAYER_ATTACK: i32 = 5;
pub const PLAYER_DEFENSE: i32 = 2;

/// Creates the player entity. It gets a position when a level is populated.
pub fn spawn_player(store: &mut EntityStore) -> CavernsResult<EntityId> {
    let player = store.create()?;
    let mut vis = Visibility::new(PLAYER_GLYPH, PLAYER_COLOR, "Player");
    vis.has_been_seen = true;
    store.insert(player, vis);
    store.insert(player, Physical::SOLID);
    store.insert(player, Health::new(PLAYER_MAX_HP, PLAYER_RECOVERY_RATE));
    store.insert(
        player,
        Combat::new(PLAYER_TO_HIT, PLAYER_ATTACK, PLAYER_DEFENSE),
    );
    Ok(player)
}

/// Places one monster built from a template.
pub fn spawn_monster(
    store: &mut EntityStore,
    template: &MonsterTemplate,
    point: Point,
) -> CavernsResult<EntityId> {
    let monster = store.create()?;
    store.set_position(monster, Some(Position::at(point, Layer::Top)));
    store.insert(
        monster,
        Visibility::new(template.glyph, template.color, template.name.clone()),
    );
    store.insert(monster, Physical::OBSTACLE);
    store.insert(monster, Movement::new(template.speed, template.frequency));
    store.insert(monster, Health::new(template.max_hp, template.recovery_rate));
    store.insert(
        monster,
        Combat::new(template.to_hit, template.attack, template.defense),
    );
    Ok(monster)
}

/// Spawns the level's monster allotment at random open points.
pub fn populate_monsters<R: Rng>(
    store: &mut EntityStore,
    data: &GameData,
    depth: u32,
    walls: &Grid<bool>,
    rng: &mut R,
) -> CavernsResult<Vec<EntityId>> {
    let count = data.max_monsters.at(depth).max(0);
    let mut spawned = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let template = data.monster_for_level(depth, rng);
        let point = open_point(store, walls, rng)?;
        spawned.push(spawn_monster(store, template, point)?);
    }
    log::debug!("Spawned {} monsters on level {}", spawned.len(), depth);
    Ok(spawned)
}
