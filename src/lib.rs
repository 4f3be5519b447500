//! Lane battle game library.
//!
//! Two bases face each other across a single lane. Units spawn from both sides,
//! walk toward each other, lock onto the first opposing entity they detect and
//! trade blows on a timer until one side's base falls. Between matches a
//! persisted meta layer tracks gold, character levels, stage progress and a
//! wall-clock energy counter that gates stage entry.

pub mod gameplay;
pub mod menus;
pub mod progress;
pub mod screens;
#[cfg(test)]
pub mod testing;
pub mod third_party;

use bevy::prelude::*;

use crate::menus::Menu;
use crate::screens::GameState;

/// Ordering of the per-frame simulation step. Configured as a chain in [`plugin`].
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    /// Host requests (spawn, upgrade, stage entry).
    Input,
    /// Resource regeneration and spawners.
    Production,
    /// Target acquisition and combat state transitions.
    Ai,
    /// Unit translation.
    Movement,
    /// Attack timers, projectiles and damage.
    Combat,
    /// Death detection and match outcome.
    Death,
    /// Notifications consumed by presentation layers.
    Ui,
}

/// Run condition: a match is in progress and no menu overlay is open.
#[must_use]
pub fn gameplay_running(
    game_state: Option<Res<State<GameState>>>,
    menu: Option<Res<State<Menu>>>,
) -> bool {
    game_state.is_some_and(|state| *state.get() == GameState::InGame)
        && menu.is_some_and(|menu| *menu.get() == Menu::None)
}

/// Root plugin. Expects `StatesPlugin` (part of `DefaultPlugins`) to be present.
pub fn plugin(app: &mut App) {
    app.configure_sets(
        Update,
        (
            GameSet::Input,
            GameSet::Production,
            GameSet::Ai,
            GameSet::Movement,
            GameSet::Combat,
            GameSet::Death,
            GameSet::Ui,
        )
            .chain(),
    );

    app.add_plugins((
        screens::plugin,
        menus::plugin,
        progress::plugin,
        gameplay::plugin,
    ));
}
