//! Keyframed colour animations.

use crate::ecs::{Animation, AnimationKind, AnimationPhase, Color, EntityId, Visibility};
use crate::game::World;

/// Channel change per shimmer keyframe.
const SHIMMER_STEP: i32 = 10;

/// Advances every animation by one tick.
///
/// Finished animations are dropped first. The rest count down and, on
/// reaching a keyframe, restart their countdown and apply their effect.
pub fn animation_update(world: &mut World) {
    for id in world.store.ids_with::<Animation>() {
        let Some(animation) = world.store.get_mut::<Animation>(id) else {
            continue;
        };
        if animation.finished {
            world.store.remove::<Animation>(id);
            continue;
        }

        animation.ticks_until_keyframe -= 1;
        if animation.ticks_until_keyframe > 0 {
            continue;
        }
        animation.ticks_until_keyframe = animation.keyframe_interval;
        let kind = animation.kind;

        match kind {
            AnimationKind::GemShimmer { base } => shimmer(world, id, base),
        }
    }
}

/// Steps the colour 10 per channel toward white or back toward `base`.
///
/// The step is worked out first. If it would reach 255 or drop below the
/// base, the phase flips and the colour stays as it is.
fn shimmer(world: &mut World, id: EntityId, base: Color) {
    let Some(phase) = world.store.get::<Animation>(id).map(|a| a.phase) else {
        return;
    };
    let Some(current) = world.store.get::<Visibility>(id).map(|vis| vis.fg_color) else {
        return;
    };

    let delta = match phase {
        AnimationPhase::Brightening => SHIMMER_STEP,
        AnimationPhase::Fading => -SHIMMER_STEP,
    };
    let next = [current.red(), current.green(), current.blue()].map(|c| c as i32 + delta);
    let floor = [base.red(), base.green(), base.blue()];

    let turned = match phase {
        AnimationPhase::Brightening if next.iter().any(|&c| c >= u8::MAX as i32) => {
            Some(AnimationPhase::Fading)
        }
        AnimationPhase::Fading if next.iter().zip(floor).any(|(&c, f)| c < f as i32) => {
            Some(AnimationPhase::Brightening)
        }
        _ => None,
    };

    match turned {
        Some(phase) => {
            if let Some(animation) = world.store.get_mut::<Animation>(id) {
                animation.phase = phase;
            }
        }
        None => {
            if let Some(vis) = world.store.get_mut::<Visibility>(id) {
                vis.fg_color =
                    Color::from_rgba(next[0] as u8, next[1] as u8, next[2] as u8, current.alpha());
            }
        }
    }
}
