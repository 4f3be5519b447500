//! Lane layout, bases and spawn points.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::gameplay::combat::{Health, TowerShooter};
use crate::gameplay::{Allegiance, Targetable};
use crate::progress::stages::StageSelection;
use crate::screens::GameState;

// === Layout Constants ===

/// Distance between the two base centers (world units).
pub const LANE_LENGTH: f32 = 20.0;

/// Player base center x. The enemy base sits at `PLAYER_BASE_X + LANE_LENGTH`.
pub const PLAYER_BASE_X: f32 = 0.0;

pub const ENEMY_BASE_X: f32 = PLAYER_BASE_X + LANE_LENGTH;

/// Lane centerline y.
pub const LANE_Y: f32 = 0.0;

pub const BASE_WIDTH: f32 = 1.0;
pub const BASE_HEIGHT: f32 = 3.0;

/// Base health at difficulty 1.
pub const BASE_HEALTH: i32 = 500;

/// How far in front of its base a side's units appear.
pub const SPAWN_OFFSET: f32 = 1.5;

// === Components ===

/// Headquarters of one side. Its destruction ends the match.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Base;

/// Where a side's units enter the lane.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint(pub Allegiance);

// === Spawning ===

/// Center x of a side's base.
#[must_use]
pub const fn base_x(allegiance: Allegiance) -> f32 {
    match allegiance {
        Allegiance::Player => PLAYER_BASE_X,
        Allegiance::Enemy => ENEMY_BASE_X,
    }
}

/// Spawns a base and its spawn point. The player base carries a tower.
pub fn spawn_base(commands: &mut Commands, allegiance: Allegiance, health: Health) -> Entity {
    let x = base_x(allegiance);
    let mut base = commands.spawn((
        Name::new(format!("{allegiance:?} Base")),
        Base,
        allegiance,
        Targetable,
        health,
        Collider::rectangle(BASE_WIDTH, BASE_HEIGHT),
        Transform::from_xyz(x, LANE_Y, 0.0),
        DespawnOnExit(GameState::InGame),
    ));
    if allegiance == Allegiance::Player {
        base.insert(TowerShooter::default());
    }
    let base = base.id();

    commands.spawn((
        Name::new(format!("{allegiance:?} Spawn Point")),
        SpawnPoint(allegiance),
        Transform::from_xyz(
            allegiance.lane_direction().mul_add(SPAWN_OFFSET, x),
            LANE_Y,
            0.0,
        ),
        DespawnOnExit(GameState::InGame),
    ));
    base
}

fn spawn_battlefield(mut commands: Commands, selection: Res<StageSelection>) {
    let health = Health::for_stage(BASE_HEALTH, selection.difficulty);
    info!(
        "Starting {} stage {} (difficulty {}), bases at {} hp",
        selection.map,
        selection.stage + 1,
        selection.difficulty,
        health.max
    );
    spawn_base(&mut commands, Allegiance::Player, health);
    spawn_base(&mut commands, Allegiance::Enemy, health);
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Base>().register_type::<SpawnPoint>();
    app.add_systems(OnEnter(GameState::InGame), spawn_battlefield);
}
