//! Player steps and monster movement over the target map.

use crate::config::CHASE_MEMORY_TURNS;
use crate::ecs::{ComponentKind, EntityId, Movement};
use crate::game::{Direction, Point, World};
use crate::input::TurnOutcome;
use crate::systems::attack;
use crate::CavernsResult;
use rand::seq::SliceRandom;
use rand::Rng;

/// Moves the player one cell, or attacks whatever stands in the way.
///
/// A blocked cell holding something with `Combat` and `Health` is a bump
/// attack. Anything else that blocks leaves the turn unused.
pub fn move_player(world: &mut World, direction: Direction) -> CavernsResult<TurnOutcome> {
    let player = world.player;
    let destination = world.player_point()? + direction.to_delta();

    if world.can_move(destination) {
        world.store.move_to(player, destination);
        world.recalculate_fov = true;
        world.statistics.steps_taken += 1;
        return Ok(TurnOutcome::TurnTaken);
    }

    let target = world.store.entities_at(destination).iter().copied().find(|&id| {
        id != player
            && world.store.has(id, ComponentKind::Combat)
            && world.store.has(id, ComponentKind::Health)
    });
    match target {
        Some(defender) => {
            attack(world, player, defender);
            Ok(TurnOutcome::TurnTaken)
        }
        None => Ok(TurnOutcome::Blocked),
    }
}

/// Runs every mover's countdown and lets the ready ones act.
///
/// A mover whose cell is in the player's FOV starts chasing and keeps
/// chasing for [`CHASE_MEMORY_TURNS`] turns after losing sight. Each of its
/// `speed` actions is a melee attack when it stands next to the player in
/// view, otherwise a step: downhill on the target map while chasing, in a
/// random direction when not. A successful step resets the countdown to
/// `frequency`; a blocked one retries a turn later. Attacks leave the
/// countdown alone, so a mover next to the player strikes every turn.
pub fn movement_update(world: &mut World) {
    let player = world.player;

    for id in world.store.ids_with::<Movement>() {
        if world.is_over() {
            break;
        }
        let Some(here) = world.store.position(id).map(|pos| pos.point()) else {
            continue;
        };
        let sees_player = world.in_fov(here);

        let Some(movement) = world.store.get_mut::<Movement>(id) else {
            continue;
        };
        movement.ticks_until_next_move -= 1;
        if movement.ticks_until_next_move > 0 {
            continue;
        }

        if sees_player {
            movement.chasing_player = true;
            movement.turns_since_player_seen = 0;
        } else {
            movement.turns_since_player_seen += 1;
            if movement.turns_since_player_seen > CHASE_MEMORY_TURNS {
                movement.chasing_player = false;
            }
        }
        let Movement {
            speed,
            frequency,
            chasing_player,
            ..
        } = *movement;

        for _ in 0..speed {
            if world.is_over() {
                break;
            }
            let Some(current) = world.store.position(id).map(|pos| pos.point()) else {
                break;
            };

            let adjacent = world.target_map().get(current).copied() == Some(1);
            if adjacent && world.in_fov(current) {
                attack(world, id, player);
                continue;
            }

            let step = if chasing_player {
                chase_step(world, current)
            } else {
                let direction = Direction::ALL[world.rng.gen_range(0..Direction::ALL.len())];
                Some(current + direction.to_delta())
            };

            match step {
                Some(next) if world.can_move(next) => {
                    world.store.move_to(id, next);
                    set_countdown(world, id, frequency);
                }
                _ => {
                    if let Some(movement) = world.store.get_mut::<Movement>(id) {
                        movement.ticks_until_next_move += 1;
                    }
                }
            }
        }
    }
}

/// Picks uniformly among the neighbours strictly closer to the player.
fn chase_step(world: &mut World, from: Point) -> Option<Point> {
    let here = world.target_map().get(from).copied()?;
    let candidates: Vec<Point> = from
        .cardinal_neighbors()
        .into_iter()
        .filter(|&next| {
            world
                .target_map()
                .get(next)
                .map(|&distance| distance < here)
                .unwrap_or(false)
        })
        .collect();
    candidates.choose(&mut world.rng).copied()
}

fn set_countdown(world: &mut World, id: EntityId, ticks: i32) {
    if let Some(movement) = world.store.get_mut::<Movement>(id) {
        movement.ticks_until_next_move = ticks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::test_support::{add_rat, scenario_world};

    fn point_of(world: &World, id: EntityId) -> Point {
        world.store.position(id).unwrap().point()
    }

    fn movement(world: &World, id: EntityId) -> Movement {
        *world.store.get::<Movement>(id).unwrap()
    }

    #[test]
    fn test_player_step() {
        let mut world = scenario_world(Point::new(5, 5));
        let outcome = move_player(&mut world, Direction::North).unwrap();
        assert_eq!(outcome, TurnOutcome::TurnTaken);
        assert_eq!(world.player_position(), Some(Point::new(5, 4)));
        assert!(world.recalculate_fov);
        assert_eq!(world.statistics.steps_taken, 1);
    }

    #[test]
    fn test_player_blocked_by_wall_and_edge() {
        let mut world = scenario_world(Point::new(0, 5));
        world.add_wall(Point::new(1, 5)).unwrap();

        assert_eq!(
            move_player(&mut world, Direction::East).unwrap(),
            TurnOutcome::Blocked
        );
        assert_eq!(
            move_player(&mut world, Direction::West).unwrap(),
            TurnOutcome::Blocked
        );
        assert_eq!(world.player_position(), Some(Point::new(0, 5)));
        assert!(world.messages().is_empty());
    }

    #[test]
    fn test_bump_attack() {
        let mut world = scenario_world(Point::new(5, 5));
        let rat = add_rat(&mut world, Point::new(6, 5), 10, 50, 1, 1);

        let outcome = move_player(&mut world, Direction::East).unwrap();
        assert_eq!(outcome, TurnOutcome::TurnTaken);
        assert_eq!(world.player_position(), Some(Point::new(5, 5)));
        assert_eq!(point_of(&world, rat), Point::new(6, 5));
        assert_eq!(world.messages().len(), 1);
        assert_eq!(world.statistics.steps_taken, 0);
    }

    #[test]
    fn test_adjacent_monster_attacks() {
        let mut world = scenario_world(Point::new(5, 5));
        let rat = add_rat(&mut world, Point::new(6, 5), 10, 101, 4, 1);

        movement_update(&mut world);
        assert_eq!(point_of(&world, rat), Point::new(6, 5));
        assert_eq!(world.player_health().unwrap().current_hp, 17);
        assert_eq!(
            world.messages().last().unwrap().text,
            "The Rat hits you for 3 damage."
        );
    }

    #[test]
    fn test_slow_monster_attacks_every_turn_once_adjacent() {
        let mut world = scenario_world(Point::new(5, 5));
        let rat = add_rat(&mut world, Point::new(6, 5), 10, 101, 3, 1);
        {
            let state = world.store.get_mut::<Movement>(rat).unwrap();
            *state = Movement::new(1, 3);
            state.ticks_until_next_move = 0;
        }

        for turn in 1..=6 {
            movement_update(&mut world);
            let hits = world
                .messages()
                .iter()
                .filter(|m| m.text == "The Rat hits you for 2 damage.")
                .count();
            assert_eq!(hits, turn, "no attack on turn {}", turn);
        }
        assert_eq!(point_of(&world, rat), Point::new(6, 5));
        assert_eq!(world.player_health().unwrap().current_hp, 8);
    }

    #[test]
    fn test_monster_chases_downhill() {
        let mut world = scenario_world(Point::new(2, 5));
        let rat = add_rat(&mut world, Point::new(7, 5), 10, 50, 1, 1);

        movement_update(&mut world);
        assert_eq!(point_of(&world, rat), Point::new(6, 5));
        let state = movement(&world, rat);
        assert!(state.chasing_player);
        assert_eq!(state.turns_since_player_seen, 0);
        assert_eq!(state.ticks_until_next_move, 1);
    }

    #[test]
    fn test_unseen_monster_wanders() {
        let mut world = scenario_world(Point::new(0, 0));
        let rat = add_rat(&mut world, Point::new(11, 11), 10, 50, 1, 1);

        movement_update(&mut world);
        let state = movement(&world, rat);
        assert!(!state.chasing_player);
        assert_eq!(state.turns_since_player_seen, 1);
        assert_eq!(world.player_health().unwrap().current_hp, 20);
    }

    #[test]
    fn test_chase_memory_lapses() {
        let mut world = scenario_world(Point::new(0, 0));
        let rat = add_rat(&mut world, Point::new(11, 11), 10, 50, 1, 1);
        {
            let state = world.store.get_mut::<Movement>(rat).unwrap();
            state.chasing_player = true;
            state.speed = 0;
        }

        for _ in 0..CHASE_MEMORY_TURNS {
            movement_update(&mut world);
            assert!(movement(&world, rat).chasing_player);
        }
        movement_update(&mut world);
        assert!(!movement(&world, rat).chasing_player);
    }

    #[test]
    fn test_frequency_countdown() {
        let mut world = scenario_world(Point::new(0, 0));
        let rat = add_rat(&mut world, Point::new(8, 8), 10, 50, 1, 1);
        *world.store.get_mut::<Movement>(rat).unwrap() = Movement::new(1, 3);

        movement_update(&mut world);
        movement_update(&mut world);
        assert_eq!(point_of(&world, rat), Point::new(8, 8));
        assert_eq!(movement(&world, rat).ticks_until_next_move, 1);

        movement_update(&mut world);
        assert_eq!(point_of(&world, rat).manhattan_distance(Point::new(8, 8)), 1);
        assert_eq!(movement(&world, rat).ticks_until_next_move, 3);
    }

    #[test]
    fn test_boxed_in_monster_retries_sooner() {
        let mut world = scenario_world(Point::new(0, 0));
        let rat = add_rat(&mut world, Point::new(8, 8), 10, 50, 1, 1);
        for wall in Point::new(8, 8).cardinal_neighbors() {
            world.add_wall(wall).unwrap();
        }

        movement_update(&mut world);
        assert_eq!(point_of(&world, rat), Point::new(8, 8));
        assert_eq!(movement(&world, rat).ticks_until_next_move, 1);
    }

    #[test]
    fn test_dead_player_stops_monsters() {
        let mut world = scenario_world(Point::new(5, 5));
        let rat = add_rat(&mut world, Point::new(6, 5), 10, 101, 40, 1);
        let other = add_rat(&mut world, Point::new(5, 6), 10, 101, 40, 1);

        movement_update(&mut world);
        assert!(world.is_over());
        let attacks = world
            .messages()
            .iter()
            .filter(|m| m.text.starts_with("The Rat hits you"))
            .count();
        assert_eq!(attacks, 1);
        assert!(world.store.is_alive(rat) && world.store.is_alive(other));
    }
}
