//! Health pool, stage scaling and change notifications.

use bevy::prelude::*;

use crate::{GameSet, gameplay_running};

// === Constants ===

/// Fractional growth of health and damage per difficulty step above 1.
pub const HEALTH_GROWTH_PER_DIFFICULTY: f32 = 0.2;

// === Scaling ===

/// `1 + 0.2 * (difficulty - 1)`. Difficulty below 1 counts as 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn difficulty_multiplier(stage_difficulty: u32) -> f32 {
    let steps = stage_difficulty.max(1) - 1;
    HEALTH_GROWTH_PER_DIFFICULTY.mul_add(steps as f32, 1.0)
}

/// Scales a base stat by [`difficulty_multiplier`], rounding half to even.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn scale_for_difficulty(base: i32, stage_difficulty: u32) -> i32 {
    (base as f32 * difficulty_multiplier(stage_difficulty)).round_ties_even() as i32
}

// === Components ===

/// Hit points. `current` stays within `[0, max]`; an entity at 0 is dead.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

/// Result of [`Health::apply_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Nothing changed: non-positive amount or already dead.
    Ignored,
    /// Health dropped but stays above zero.
    Damaged,
    /// This hit brought health to zero.
    Killed,
}

impl Health {
    /// Full health pool. `max` is raised to at least 1.
    #[must_use]
    pub const fn new(max: i32) -> Self {
        let max = if max < 1 { 1 } else { max };
        Self { current: max, max }
    }

    /// Full health pool scaled for the stage difficulty.
    #[must_use]
    pub fn for_stage(base_max: i32, stage_difficulty: u32) -> Self {
        Self::new(scale_for_difficulty(base_max, stage_difficulty))
    }

    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Subtracts `amount`, clamping at zero. Reports [`DamageOutcome::Killed`]
    /// only on the hit that crosses to zero.
    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if amount <= 0 || !self.is_alive() {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0);
        if self.is_alive() {
            DamageOutcome::Damaged
        } else {
            DamageOutcome::Killed
        }
    }
}

// === Messages ===

/// Emitted whenever an entity's health changes, and once when it first appears.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: i32,
    pub max: i32,
}

impl HealthChanged {
    #[must_use]
    pub const fn of(entity: Entity, health: &Health) -> Self {
        Self {
            entity,
            current: health.current,
            max: health.max,
        }
    }
}

// === Systems ===

/// Announces the starting health of newly spawned entities.
fn announce_spawned_health(
    spawned: Query<(Entity, &Health), Added<Health>>,
    mut health_changed: MessageWriter<HealthChanged>,
) {
    for (entity, health) in &spawned {
        health_changed.write(HealthChanged::of(entity, health));
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Health>();
    app.add_message::<HealthChanged>();
    app.add_systems(
        Update,
        announce_spawned_health
            .in_set(GameSet::Ui)
            .run_if(gameplay_running),
    );
}
