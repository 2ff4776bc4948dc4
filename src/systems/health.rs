//! Hit point recovery and corpse cleanup.

use crate::ecs::Health;
use crate::game::World;

/// Restores the player's recovery rate in HP, capped at max. The dead stay
/// dead.
pub fn recover_player(world: &mut World) {
    if let Some(health) = world.store.get_mut::<Health>(world.player) {
        if health.current_hp > 0 {
            health.current_hp = (health.current_hp + health.recovery_rate).min(health.max_hp);
        }
    }
}

/// Counts down dead entities and destroys those whose countdown has run
/// out. The player is never removed.
pub fn removal_update(world: &mut World) {
    for id in world.store.ids_with::<Health>() {
        if id == world.player {
            continue;
        }
        let Some(health) = world.store.get_mut::<Health>(id) else {
            continue;
        };
        if !health.is_dead() {
            continue;
        }
        if health.ticks_until_removal <= 0 {
            world.store.destroy(id);
            log::trace!("Removed corpse {}", id);
        } else {
            health.ticks_until_removal -= 1;
        }
    }
}
