//! Gameplay domain plugins: battlefield, units, combat, economy, endgame.

pub mod battlefield;
pub mod combat;
pub mod economy;
pub mod endgame;
pub mod units;

use bevy::prelude::*;

pub use combat::{CombatState, Health, HealthChanged, UnitDied};
pub use units::Unit;

// === Shared Components ===

/// Which side an entity fights for.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
#[reflect(Component)]
pub enum Allegiance {
    Player,
    Enemy,
}

impl Allegiance {
    /// Unit x-direction when marching along the lane with nothing to steer toward.
    #[must_use]
    pub const fn lane_direction(self) -> f32 {
        match self {
            Self::Player => 1.0,
            Self::Enemy => -1.0,
        }
    }
}

/// Marker: this entity can be acquired as a target by the opposing side.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Targetable;

/// Offensive stats of a unit. Ranges are measured surface to surface.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CombatStats {
    pub damage: i32,
    /// Seconds between blows.
    pub attack_interval: f32,
    /// Reach at which the unit engages and keeps attacking.
    pub range: f32,
    /// Reach at which the unit notices opponents and steers toward them.
    pub detection_range: f32,
}

/// Movement controller. Combat drives it through [`Movement::steer_toward`],
/// [`Movement::halt`] and [`Movement::resume`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Movement {
    /// World units per second.
    pub speed: f32,
    pub halted: bool,
    pub steering_target: Option<Entity>,
}

impl Movement {
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self {
            speed,
            halted: false,
            steering_target: None,
        }
    }

    pub const fn steer_toward(&mut self, target: Entity) {
        self.steering_target = Some(target);
    }

    pub const fn clear_target(&mut self) {
        self.steering_target = None;
    }

    pub const fn halt(&mut self) {
        self.halted = true;
    }

    pub const fn resume(&mut self) {
        self.halted = false;
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Allegiance>()
        .register_type::<Targetable>()
        .register_type::<CombatStats>()
        .register_type::<Movement>();

    app.add_plugins((
        battlefield::plugin,
        units::plugin,
        combat::plugin,
        economy::plugin,
        endgame::plugin,
    ));
}
