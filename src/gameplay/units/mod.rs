//! Unit archetype, stat templates and the lane movement controller.

mod movement;
pub mod spawn;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::gameplay::combat::{CombatState, Health, scale_for_difficulty};
use crate::gameplay::{Allegiance, CombatStats, Movement, Targetable};
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

pub use spawn::{ENEMY_SPAWN_INTERVAL_SECS, EnemySpawner, SPAWN_JITTER, SpawnRequest};

// === Constants ===

/// Collision radius of a unit (world units).
pub const UNIT_RADIUS: f32 = 0.25;

/// Stats of the enemy grunt at difficulty 1.
pub const ENEMY_GRUNT: UnitStats = UnitStats {
    health: 100,
    damage: 10,
    attack_interval: 1.5,
    attack_range: 0.5,
    detection_range: 4.0,
    move_speed: 3.0,
};

// === Components ===

/// Marker for unit entities.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Unit;

// === Unit Stats ===

/// Template a unit is spawned from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitStats {
    pub health: i32,
    pub damage: i32,
    pub attack_interval: f32,
    pub attack_range: f32,
    pub detection_range: f32,
    pub move_speed: f32,
}

impl UnitStats {
    /// Health and damage scaled for the stage difficulty.
    #[must_use]
    pub fn scaled_for_stage(self, stage_difficulty: u32) -> Self {
        Self {
            health: scale_for_difficulty(self.health, stage_difficulty),
            damage: scale_for_difficulty(self.damage, stage_difficulty),
            ..self
        }
    }

    #[must_use]
    pub const fn combat_stats(&self) -> CombatStats {
        CombatStats {
            damage: self.damage,
            attack_interval: self.attack_interval,
            range: self.attack_range,
            detection_range: self.detection_range,
        }
    }
}

/// Spawn a unit entity with all required components.
/// Single source of truth for the unit archetype.
pub fn spawn_unit(
    commands: &mut Commands,
    name: &str,
    stats: UnitStats,
    allegiance: Allegiance,
    position: Vec2,
) -> Entity {
    commands
        .spawn((
            Name::new(format!("{allegiance:?} {name}")),
            Unit,
            allegiance,
            Targetable,
            Health::new(stats.health),
            stats.combat_stats(),
            CombatState::Idle,
            Movement::new(stats.move_speed),
            Collider::circle(UNIT_RADIUS),
            Transform::from_xyz(position.x, position.y, 0.0),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Unit>();

    spawn::plugin(app);

    app.add_systems(
        Update,
        movement::unit_movement
            .in_set(GameSet::Movement)
            .run_if(gameplay_running),
    );
}
