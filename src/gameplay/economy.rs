//! In-match economy: mana pays for deployments and regenerates over time.

use bevy::prelude::*;

use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

// === Constants ===

/// Mana cap at the start of a match.
pub const STARTING_MAX_MANA: f32 = 100.0;

/// Mana regenerated per second at the start of a match.
pub const STARTING_MANA_REGEN: f32 = 2.0;

/// Cost of the first mana upgrade.
pub const STARTING_UPGRADE_COST: f32 = 50.0;

/// Cap increase per upgrade.
pub const UPGRADE_MAX_GAIN: f32 = 20.0;

/// Regen increase per upgrade.
pub const UPGRADE_REGEN_GAIN: f32 = 0.5;

/// Each upgrade costs this much more than the last.
pub const UPGRADE_COST_GROWTH: f32 = 1.5;

// === Resources ===

/// The player's mana pool for the current match.
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct Mana {
    pub current: f32,
    pub max: f32,
    pub regen_per_sec: f32,
    pub upgrade_cost: f32,
}

impl Default for Mana {
    fn default() -> Self {
        Self {
            current: STARTING_MAX_MANA / 2.0,
            max: STARTING_MAX_MANA,
            regen_per_sec: STARTING_MANA_REGEN,
            upgrade_cost: STARTING_UPGRADE_COST,
        }
    }
}

impl Mana {
    /// Adds `regen_per_sec * dt`, clamped to `max`.
    pub fn regenerate(&mut self, dt: f32) {
        self.current = self.regen_per_sec.mul_add(dt, self.current).min(self.max);
    }

    /// Pays `cost` if affordable. Non-positive costs always succeed.
    pub fn spend(&mut self, cost: f32) -> bool {
        if cost <= 0.0 {
            return true;
        }
        if self.current < cost {
            return false;
        }
        self.current -= cost;
        true
    }

    /// Pays `upgrade_cost` to raise the cap and regen rate. The next upgrade
    /// costs 1.5x as much, rounded half to even.
    pub fn upgrade(&mut self) -> bool {
        if !self.spend(self.upgrade_cost) {
            return false;
        }
        self.max += UPGRADE_MAX_GAIN;
        self.regen_per_sec += UPGRADE_REGEN_GAIN;
        self.upgrade_cost = (self.upgrade_cost * UPGRADE_COST_GROWTH).round_ties_even();
        true
    }
}

// === Messages ===

/// Host request to buy a mana upgrade.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManaUpgradeRequest;

// === Systems ===

fn reset_mana(mut commands: Commands) {
    commands.insert_resource(Mana::default());
}

fn regenerate_mana(time: Res<Time>, mut mana: ResMut<Mana>) {
    mana.regenerate(time.delta_secs());
}

fn handle_upgrade_requests(mut requests: MessageReader<ManaUpgradeRequest>, mut mana: ResMut<Mana>) {
    for _ in requests.read() {
        if mana.upgrade() {
            info!(
                "Mana upgraded: max {:.0}, regen {:.1}/s",
                mana.max, mana.regen_per_sec
            );
        } else {
            info!(
                "Mana upgrade needs {:.0}, have {:.1}",
                mana.upgrade_cost, mana.current
            );
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Mana>()
        .init_resource::<Mana>()
        .add_message::<ManaUpgradeRequest>();

    app.add_systems(OnEnter(GameState::InGame), reset_mana);
    app.add_systems(
        Update,
        (
            handle_upgrade_requests.in_set(GameSet::Input),
            regenerate_mana.in_set(GameSet::Production),
        )
            .run_if(gameplay_running),
    );
}
