//! Two units meeting mid-lane inside a running match.

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use lane_battle::gameplay::units::{EnemySpawner, UnitStats, spawn_unit};
use lane_battle::gameplay::{Allegiance, CombatState, Health, HealthChanged, Unit};
use lane_battle::progress::stages::EnterStageRequest;
use lane_battle::screens::GameState;
use pretty_assertions::assert_eq;

use super::{create_game_app, update_until};

const DUELIST: UnitStats = UnitStats {
    health: 100,
    damage: 10,
    attack_interval: 1.5,
    attack_range: 1.5,
    detection_range: 4.0,
    move_speed: 0.0,
};

fn create_duel_app(dir: &tempfile::TempDir) -> (App, Entity, Entity) {
    let mut app = create_game_app(dir);
    update_until(&mut app, GameState::StageSelect, 5);
    app.world_mut()
        .write_message(EnterStageRequest::new("ForestMap", 0));
    update_until(&mut app, GameState::InGame, 5);

    // Keep reinforcements out of the fight.
    app.world_mut().resource_mut::<EnemySpawner>().timer =
        Timer::from_seconds(3600.0, TimerMode::Repeating);

    let player = spawn(&mut app, Allegiance::Player, 10.0);
    let enemy = spawn(&mut app, Allegiance::Enemy, 11.0);
    (app, player, enemy)
}

fn spawn(app: &mut App, allegiance: Allegiance, x: f32) -> Entity {
    app.world_mut()
        .run_system_once(move |mut commands: Commands| {
            spawn_unit(&mut commands, "Duelist", DUELIST, allegiance, Vec2::new(x, 0.0))
        })
        .unwrap()
}

fn state_of(app: &App, entity: Entity) -> CombatState {
    app.world().get::<CombatState>(entity).unwrap().clone()
}

fn health_of(app: &App, entity: Entity) -> i32 {
    app.world().get::<Health>(entity).unwrap().current
}

#[test]
fn both_engage_on_the_same_step() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, player, enemy) = create_duel_app(&dir);
    app.update();

    assert_eq!(state_of(&app, player).target(), Some(enemy));
    assert_eq!(state_of(&app, enemy).target(), Some(player));
    assert!(state_of(&app, player).is_engaged());
    assert!(state_of(&app, enemy).is_engaged());
}

#[test]
fn blows_land_every_interval() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, player, enemy) = create_duel_app(&dir);
    for _ in 0..20 {
        app.update();
    }

    assert_eq!(health_of(&app, player), 90);
    assert_eq!(health_of(&app, enemy), 90);
}

#[test]
fn duel_ends_with_one_idle_survivor() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, player, enemy) = create_duel_app(&dir);
    for _ in 0..200 {
        app.update();
    }

    let survivor = player.min(enemy);
    let fallen = player.max(enemy);
    assert!(app.world().get_entity(fallen).is_err());
    assert_eq!(health_of(&app, survivor), 10);
    assert_eq!(state_of(&app, survivor), CombatState::Idle);

    let mut units = app.world_mut().query_filtered::<Entity, With<Unit>>();
    assert_eq!(units.iter(app.world()).count(), 1);
}

#[test]
fn health_changes_are_announced() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, player, _enemy) = create_duel_app(&dir);
    for _ in 0..16 {
        app.update();
    }

    let messages = app.world().resource::<Messages<HealthChanged>>();
    let mut cursor = messages.get_cursor();
    let hits: Vec<_> = cursor
        .read(messages)
        .filter(|changed| changed.entity == player && changed.current < changed.max)
        .collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].current, 90);
}
