//! Constant-velocity lane movement, steered toward a target when one is set.

use bevy::prelude::*;

use crate::gameplay::{Allegiance, Movement};

/// Below this center distance a unit stops closing in on its steering target.
const ARRIVAL_DISTANCE: f32 = 0.01;

/// Translates units toward their steering target, or along their lane when the
/// target is unset or gone. Halted units stay put.
///
/// Velocities are computed from a read-only pass first so that every unit
/// steers toward where its target stood at the start of the step.
/// Runs in `GameSet::Movement`.
pub(super) fn unit_movement(
    time: Res<Time>,
    mut movers: Query<(Entity, &Allegiance, &Movement, &mut Transform)>,
    fixed: Query<&Transform, Without<Movement>>,
) {
    let dt = time.delta_secs();
    let position_of = |entity: Entity| {
        movers
            .get(entity)
            .map(|(.., transform)| transform.translation.xy())
            .or_else(|_| fixed.get(entity).map(|transform| transform.translation.xy()))
            .ok()
    };

    let steps: Vec<(Entity, Vec2)> = movers
        .iter()
        .filter(|(_, _, movement, _)| !movement.halted && movement.speed > 0.0)
        .filter_map(|(entity, allegiance, movement, transform)| {
            let here = transform.translation.xy();
            let lane = Vec2::X * allegiance.lane_direction();
            let direction = match movement.steering_target.and_then(position_of) {
                Some(goal) if here.distance(goal) < ARRIVAL_DISTANCE => return None,
                Some(goal) => (goal - here).normalize_or(lane),
                None => lane,
            };
            Some((entity, direction * movement.speed * dt))
        })
        .collect();

    for (entity, step) in steps {
        if let Ok((.., mut transform)) = movers.get_mut(entity) {
            transform.translation.x += step.x;
            transform.translation.y += step.y;
        }
    }
}
