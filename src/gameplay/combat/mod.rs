//! Combat systems: health, targeting, attack timers, tower arrows, and death.

mod attack;
mod death;
mod health;
mod tower;

use bevy::prelude::*;

pub use attack::{CombatState, MIN_ATTACK_INTERVAL};
pub use death::{DeathCheck, UnitDied};
pub use health::{
    DamageOutcome, HEALTH_GROWTH_PER_DIFFICULTY, Health, HealthChanged, difficulty_multiplier,
    scale_for_difficulty,
};
pub use tower::{
    ARROW_HIT_RADIUS, ARROW_LIFETIME_SECS, ARROW_SPEED, Arrow, ArrowLifetime, TOWER_DAMAGE,
    TOWER_FIRE_INTERVAL_SECS, TOWER_RANGE, TowerShooter,
};

pub(super) fn plugin(app: &mut App) {
    health::plugin(app);
    attack::plugin(app);
    tower::plugin(app);
    death::plugin(app);
}
