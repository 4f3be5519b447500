//! Tests for game state transitions.

use bevy::prelude::*;
use lane_battle::gameplay::battlefield::Base;
use lane_battle::gameplay::economy::Mana;
use lane_battle::gameplay::{Allegiance, Health, Unit};
use lane_battle::menus::Menu;
use lane_battle::progress::energy::EnergyAccount;
use lane_battle::progress::stages::EnterStageRequest;
use lane_battle::progress::store::SaveStore;
use lane_battle::progress::{PlayerProgress, STAGE_CLEAR_GOLD};
use lane_battle::screens::GameState;
use pretty_assertions::assert_eq;

use super::{create_game_app, game_state, update_until};

fn start_match(app: &mut App) {
    update_until(app, GameState::StageSelect, 5);
    app.world_mut()
        .write_message(EnterStageRequest::new("ForestMap", 0));
    update_until(app, GameState::InGame, 5);
}

fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
    app.world_mut()
        .query_filtered::<Entity, F>()
        .iter(app.world())
        .count()
}

fn damage_base(app: &mut App, side: Allegiance, amount: i32) {
    let mut query = app
        .world_mut()
        .query_filtered::<(&Allegiance, &mut Health), With<Base>>();
    for (allegiance, mut health) in query.iter_mut(app.world_mut()) {
        if *allegiance == side {
            health.apply_damage(amount);
        }
    }
}

#[test]
fn game_initializes_in_loading_state() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_game_app(&dir);
    assert_eq!(game_state(&app), GameState::Loading);
}

#[test]
fn loading_finishes_once_progress_is_read() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_game_app(&dir);
    update_until(&mut app, GameState::StageSelect, 5);

    assert_eq!(game_state(&app), GameState::StageSelect);
    assert!(app.world().contains_resource::<PlayerProgress>());
    assert!(app.world().resource::<EnergyAccount>().is_full());
}

#[test]
fn entering_stage_sets_up_battlefield() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_game_app(&dir);
    start_match(&mut app);

    assert_eq!(game_state(&app), GameState::InGame);
    assert_eq!(count::<With<Base>>(&mut app), 2);
    assert_eq!(app.world().resource::<EnergyAccount>().current(), 15);
    assert!(app.world().resource::<Mana>().current > 0.0);
}

#[test]
fn destroying_enemy_base_wins_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_game_app(&dir);
    start_match(&mut app);

    damage_base(&mut app, Allegiance::Enemy, 10_000);
    app.update();
    app.update();

    assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::Victory);
    assert!(app.world().resource::<Time<Virtual>>().is_paused());
    assert_eq!(count::<With<Base>>(&mut app), 1);

    let progress = app.world().resource::<PlayerProgress>();
    assert_eq!(progress.highest_cleared("ForestMap"), 1);
    let record = app.world().resource::<SaveStore>().load().unwrap();
    assert_eq!(record.highest_stage_cleared["ForestMap"], 1);
    assert_eq!(record.gold, progress.gold());
    assert_eq!(record.gold, 100 + STAGE_CLEAR_GOLD);
}

#[test]
fn losing_player_base_is_defeat() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_game_app(&dir);
    start_match(&mut app);

    damage_base(&mut app, Allegiance::Player, 10_000);
    app.update();
    app.update();

    assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::Defeat);
    assert_eq!(
        app.world()
            .resource::<PlayerProgress>()
            .highest_cleared("ForestMap"),
        0
    );
}

#[test]
fn leaving_match_clears_battlefield() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = create_game_app(&dir);
    start_match(&mut app);
    damage_base(&mut app, Allegiance::Enemy, 10_000);
    app.update();
    app.update();

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::StageSelect);
    app.update();
    app.update();

    assert_eq!(game_state(&app), GameState::StageSelect);
    assert_eq!(count::<With<Base>>(&mut app), 0);
    assert_eq!(count::<With<Unit>>(&mut app), 0);
    assert_eq!(*app.world().resource::<State<Menu>>().get(), Menu::None);
}
