//! Death detection: announces and despawns entities at zero health.

use bevy::prelude::*;

use super::attack::CombatState;
use super::health::Health;
use crate::gameplay::battlefield::Base;
use crate::gameplay::{Allegiance, Movement};
use crate::{GameSet, gameplay_running};

/// `SystemSet` for death detection. Other systems can order against this
/// (e.g., `.after(DeathCheck)`) instead of referencing the function directly.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeathCheck;

/// Emitted once per entity when its health reaches zero, just before it is despawned.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitDied {
    pub entity: Entity,
    pub allegiance: Allegiance,
    pub was_base: bool,
}

/// Moves dead units to `CombatState::Dead`, announces them and despawns them.
pub(super) fn check_death(
    mut commands: Commands,
    mut query: Query<(
        Entity,
        &Health,
        &Allegiance,
        Option<&mut CombatState>,
        Option<&mut Movement>,
        Has<Base>,
    )>,
    mut died: MessageWriter<UnitDied>,
) {
    for (entity, health, allegiance, state, movement, is_base) in &mut query {
        if health.is_alive() {
            continue;
        }
        if let Some(mut state) = state {
            if state.is_dead() {
                continue;
            }
            state.die();
        }
        if let Some(mut movement) = movement {
            movement.halt();
        }

        if is_base {
            info!("{allegiance:?} base destroyed");
        } else {
            debug!("{allegiance:?} unit {entity} died");
        }
        died.write(UnitDied {
            entity,
            allegiance: *allegiance,
            was_base: is_base,
        });
        commands.entity(entity).despawn();
    }
}

pub(super) fn plugin(app: &mut App) {
    app.add_message::<UnitDied>();
    app.add_systems(
        Update,
        check_death
            .in_set(DeathCheck)
            .in_set(GameSet::Death)
            .run_if(gameplay_running),
    );
}
