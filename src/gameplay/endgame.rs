//! Match outcome: the first base to fall decides the match.

use bevy::prelude::*;

use crate::gameplay::Allegiance;
use crate::gameplay::combat::{DeathCheck, UnitDied};
use crate::menus::Menu;
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

// === Resources ===

/// Outcome of the current match. Set at most once per match.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct MatchResult {
    player_won: Option<bool>,
}

impl MatchResult {
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        self.player_won.is_some()
    }

    /// `None` while the match is running.
    #[must_use]
    pub const fn player_won(&self) -> Option<bool> {
        self.player_won
    }

    /// Records the outcome. Returns `false` if the match was already decided.
    pub const fn decide(&mut self, player_won: bool) -> bool {
        if self.player_won.is_some() {
            return false;
        }
        self.player_won = Some(player_won);
        true
    }
}

// === Messages ===

/// Emitted once per match when a base falls.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub player_won: bool,
}

// === Systems ===

fn reset_match_result(mut result: ResMut<MatchResult>) {
    *result = MatchResult::default();
}

/// Turns the first base death into a `MatchOutcome` and opens the result overlay.
fn arbitrate_match(
    mut died: MessageReader<UnitDied>,
    mut result: ResMut<MatchResult>,
    mut outcome: MessageWriter<MatchOutcome>,
    mut next_menu: ResMut<NextState<Menu>>,
) {
    for death in died.read().filter(|death| death.was_base) {
        let player_won = death.allegiance == Allegiance::Enemy;
        if !result.decide(player_won) {
            debug!("Ignoring {:?} base death: match already decided", death.allegiance);
            continue;
        }
        info!("Match over: {}", if player_won { "victory" } else { "defeat" });
        outcome.write(MatchOutcome { player_won });
        next_menu.set(if player_won { Menu::Victory } else { Menu::Defeat });
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<MatchResult>()
        .init_resource::<MatchResult>()
        .add_message::<MatchOutcome>();

    app.add_systems(OnEnter(GameState::InGame), reset_match_result);
    app.add_systems(
        Update,
        arbitrate_match
            .in_set(GameSet::Death)
            .after(DeathCheck)
            .run_if(gameplay_running),
    );
}
