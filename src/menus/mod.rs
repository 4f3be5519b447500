//! Menu overlays that can appear on top of a match.
//!
//! The `Menu` state is orthogonal to `GameState`. Any overlay other than
//! `Menu::None` pauses `Time<Virtual>`, which freezes every gameplay timer.

use bevy::prelude::*;

use crate::screens::GameState;

/// Menu overlay states. Orthogonal to `GameState`.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum Menu {
    /// No menu overlay is active.
    #[default]
    None,
    /// Pause menu (shown in-game).
    Pause,
    /// Victory overlay (enemy base destroyed).
    Victory,
    /// Defeat overlay (player base destroyed).
    Defeat,
}

pub fn plugin(app: &mut App) {
    app.init_state::<Menu>();
    app.register_type::<Menu>();

    app.add_systems(OnExit(Menu::None), pause_virtual_time);
    app.add_systems(OnEnter(Menu::None), unpause_virtual_time);
    app.add_systems(OnExit(GameState::InGame), close_menu);
}

fn pause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

fn unpause_virtual_time(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}

/// Overlays belong to a match; leaving it closes them.
fn close_menu(mut next_menu: ResMut<NextState<Menu>>) {
    next_menu.set(Menu::None);
}
