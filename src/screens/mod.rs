//! Top-level game states and the transitions between them.

use bevy::prelude::*;

use crate::progress::PlayerProgress;

/// Primary game states.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum GameState {
    /// Save data is being read.
    #[default]
    Loading,
    /// Between matches: stage selection, upgrades.
    StageSelect,
    /// A match is running (or its result overlay is shown).
    InGame,
}

pub fn plugin(app: &mut App) {
    app.init_state::<GameState>();
    app.register_type::<GameState>();

    app.add_systems(
        Update,
        finish_loading
            .run_if(in_state(GameState::Loading).and(resource_exists::<PlayerProgress>)),
    );
}

fn finish_loading(mut next_state: ResMut<NextState<GameState>>) {
    info!("Save data ready");
    next_state.set(GameState::StageSelect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use pretty_assertions::assert_eq;

    fn create_screens_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        plugin(&mut app);
        app
    }

    fn current(app: &App) -> GameState {
        *app.world().resource::<State<GameState>>().get()
    }

    #[test]
    fn stays_loading_until_progress_is_available() {
        let mut app = create_screens_test_app();
        app.update();
        app.update();
        assert_eq!(current(&app), GameState::Loading);
    }

    #[test]
    fn moves_to_stage_select_once_loaded() {
        let mut app = create_screens_test_app();
        app.init_resource::<PlayerProgress>();
        app.update();
        app.update();
        assert_eq!(current(&app), GameState::StageSelect);
    }
}
