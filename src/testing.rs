//! Testing utilities for Bevy systems.

#![cfg(test)]

use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use crate::gameplay::combat::{CombatState, Health};
use crate::gameplay::units::UNIT_RADIUS;
use crate::gameplay::{Allegiance, CombatStats, Movement, Targetable, Unit};
use crate::menus::Menu;
use crate::screens::GameState;

/// Fixed simulation step used by deterministic tests.
pub const TEST_STEP: Duration = Duration::from_millis(100);

/// Creates a minimal app whose clock advances by [`TEST_STEP`] per update.
/// The first update (delta 0) has already run when this returns.
pub fn create_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TEST_STEP));
    app.update();
    app
}

/// Creates a test app with `GameState` and `Menu` registered. Starts in `Loading`.
pub fn create_base_test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TEST_STEP));
    app.init_state::<GameState>();
    app.init_state::<Menu>();
    app
}

/// Requests `GameState::InGame` and runs one update so `OnEnter` systems fire.
pub fn transition_to_ingame(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
}

/// Runs `count` updates of [`TEST_STEP`] each.
pub fn tick_multiple(app: &mut App, count: usize) {
    for _ in 0..count {
        app.update();
    }
}

/// Asserts the number of entities matching filter `F`.
pub fn assert_entity_count<F: QueryFilter>(app: &mut App, expected: usize) {
    let world = app.world_mut();
    let mut query = world.query_filtered::<(), F>();
    let actual = query.iter(world).count();
    assert_eq!(actual, expected, "unexpected entity count");
}

/// Leaves 1 ms on `timer` so the next tick finishes it.
pub fn nearly_expire_timer(timer: &mut Timer) {
    let duration = timer.duration();
    timer.set_elapsed(duration.saturating_sub(Duration::from_millis(1)));
}

/// Stats shared by the duel fixtures: damage 10 every 1.5 s, reach 1.5.
pub const fn test_combat_stats() -> CombatStats {
    CombatStats {
        damage: 10,
        attack_interval: 1.5,
        range: 1.5,
        detection_range: 4.0,
    }
}

/// Spawns an idle, stationary 100 hp unit at `(x, y)`.
pub fn spawn_test_unit(world: &mut World, allegiance: Allegiance, x: f32, y: f32) -> Entity {
    world
        .spawn((
            Unit,
            allegiance,
            Targetable,
            Health::new(100),
            test_combat_stats(),
            CombatState::Idle,
            Movement::new(0.0),
            Transform::from_xyz(x, y, 0.0),
            Collider::circle(UNIT_RADIUS),
        ))
        .id()
}

/// Spawns a passive targetable entity with no combat behaviour.
pub fn spawn_test_target(
    world: &mut World,
    allegiance: Allegiance,
    x: f32,
    y: f32,
    hp: i32,
) -> Entity {
    world
        .spawn((
            allegiance,
            Targetable,
            Health::new(hp),
            Transform::from_xyz(x, y, 0.0),
            Collider::circle(UNIT_RADIUS),
        ))
        .id()
}

/// Messages of type `M` gathered by [`collect_messages`].
#[derive(Resource, Debug)]
pub struct Collected<M: Message>(pub Vec<M>);

impl<M: Message> Default for Collected<M> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

/// Registers `M` and records every written instance into [`Collected<M>`].
pub fn collect_messages<M: Message + Clone>(app: &mut App) {
    app.add_message::<M>();
    app.init_resource::<Collected<M>>();
    app.add_systems(PostUpdate, record_messages::<M>);
}

fn record_messages<M: Message + Clone>(
    mut reader: MessageReader<M>,
    mut collected: ResMut<Collected<M>>,
) {
    collected.0.extend(reader.read().cloned());
}
