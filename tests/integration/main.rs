//! End-to-end tests driving the full plugin stack.

mod duel;
mod state_transitions;

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use lane_battle::progress::store::SaveStore;
use lane_battle::screens::GameState;

pub const STEP: Duration = Duration::from_millis(100);

/// Full game app with its save file inside `dir`. Nothing has run yet.
pub fn create_game_app(dir: &tempfile::TempDir) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP));
    app.insert_resource(SaveStore::new(dir.path().join("progress.json")));
    app.add_plugins(lane_battle::plugin);
    app
}

pub fn game_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

/// Runs updates until `state` is reached or `max_updates` is exhausted.
pub fn update_until(app: &mut App, state: GameState, max_updates: usize) {
    for _ in 0..max_updates {
        if game_state(app) == state {
            return;
        }
        app.update();
    }
}
