//! Targeting and melee resolution.
//!
//! Each unit carries a [`CombatState`]. In `GameSet::Ai` idle units look for the
//! first opposing entity within detection range and steer toward it, engaging once
//! it is within attack range. In `GameSet::Combat` engaged units tick their attack
//! timer and deliver damage, re-validating the target when the wait elapses.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::health::{DamageOutcome, Health, HealthChanged};
use crate::gameplay::units::Unit;
use crate::gameplay::{Allegiance, CombatStats, Movement, Targetable};
use crate::third_party::surface_distance;
use crate::{GameSet, gameplay_running};

// === Constants ===

/// Shortest allowed attack interval (seconds).
pub const MIN_ATTACK_INTERVAL: f32 = 0.05;

// === Components ===

/// Per-unit targeting state. The attack timer lives inside `Engaged`, so leaving
/// that state or despawning the unit drops the timer with it.
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub enum CombatState {
    /// No candidate.
    #[default]
    Idle,
    /// Candidate recorded; movement steers toward it.
    Approaching(Entity),
    /// Locked on and attacking every `timer` period.
    Engaged { target: Entity, timer: Timer },
    /// Terminal.
    Dead,
}

impl CombatState {
    /// The entity being approached or attacked.
    #[must_use]
    pub const fn target(&self) -> Option<Entity> {
        match self {
            Self::Approaching(target) | Self::Engaged { target, .. } => Some(*target),
            Self::Idle | Self::Dead => None,
        }
    }

    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        matches!(self, Self::Engaged { .. })
    }

    #[must_use]
    pub const fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Locks on to `target` with a fresh repeating timer.
    pub fn engage(&mut self, target: Entity, attack_interval: f32) {
        *self = Self::Engaged {
            target,
            timer: Timer::from_seconds(
                attack_interval.max(MIN_ATTACK_INTERVAL),
                TimerMode::Repeating,
            ),
        };
    }

    /// Back to `Idle`. A dead unit stays dead.
    pub fn disengage(&mut self) {
        if !self.is_dead() {
            *self = Self::Idle;
        }
    }

    pub fn die(&mut self) {
        *self = Self::Dead;
    }
}

/// Releases the target and lets the unit walk again.
fn release(state: &mut CombatState, movement: &mut Movement) {
    state.disengage();
    movement.clear_target();
    movement.resume();
}

// === Systems ===

/// Drives Idle → Approaching → Engaged and drops targets that died, vanished or
/// moved out of attack range.
/// Runs in `GameSet::Ai`.
pub(super) fn update_targeting(
    mut units: Query<
        (
            Entity,
            &Allegiance,
            &Transform,
            &Collider,
            &CombatStats,
            &mut CombatState,
            &mut Movement,
        ),
        With<Unit>,
    >,
    targets: Query<(Entity, &Allegiance, &Health, &Transform, &Collider), With<Targetable>>,
) {
    for (entity, allegiance, transform, collider, stats, mut state, mut movement) in &mut units {
        if state.is_dead() {
            continue;
        }
        let here = transform.translation.xy();

        // Surface distance to a valid opponent, `None` if it is not one.
        let distance_to = |(candidate, other, health, other_transform, other_collider): (
            Entity,
            &Allegiance,
            &Health,
            &Transform,
            &Collider,
        )| {
            (candidate != entity && other != allegiance && health.is_alive()).then(|| {
                surface_distance(
                    collider,
                    here,
                    other_collider,
                    other_transform.translation.xy(),
                )
            })
        };

        if let Some(target) = state.target() {
            let distance = targets.get(target).ok().and_then(distance_to);
            let in_range = distance.is_some_and(|d| d <= stats.range);
            if state.is_engaged() {
                if !in_range {
                    debug!("{entity} lost target {target}");
                    release(&mut state, &mut movement);
                }
                continue;
            }
            if in_range {
                debug!("{entity} engages {target}");
                state.engage(target, stats.attack_interval);
                movement.halt();
                continue;
            }
            if distance.is_some() {
                continue;
            }
            release(&mut state, &mut movement);
        }

        // Idle: first opponent in detection range, in ascending entity order.
        let Some((target, distance)) = targets
            .iter()
            .filter_map(|candidate| {
                let id = candidate.0;
                distance_to(candidate).map(|d| (id, d))
            })
            .filter(|(_, d)| *d <= stats.detection_range)
            .min_by_key(|(id, _)| *id)
        else {
            continue;
        };

        movement.steer_toward(target);
        if distance <= stats.range {
            debug!("{entity} engages {target}");
            state.engage(target, stats.attack_interval);
            movement.halt();
        } else {
            *state = CombatState::Approaching(target);
        }
    }
}

/// Whether `attacker` still reaches `target`. Entities without a body are
/// left to the presence checks in [`resolve_attacks`].
fn within_reach(
    bodies: &Query<(&Transform, &Collider)>,
    attacker: Entity,
    target: Entity,
    range: f32,
) -> bool {
    let (Ok((from, from_collider)), Ok((to, to_collider))) =
        (bodies.get(attacker), bodies.get(target))
    else {
        return true;
    };
    surface_distance(
        from_collider,
        from.translation.xy(),
        to_collider,
        to.translation.xy(),
    ) <= range
}

/// Ticks attack timers and applies damage. Blows are resolved one attacker at a
/// time in ascending entity order; an attacker killed earlier in the same step
/// delivers nothing, and a target that left attack range takes no blow.
/// Runs in `GameSet::Combat`.
pub(super) fn resolve_attacks(
    time: Res<Time>,
    mut attackers: Query<(Entity, &CombatStats, &mut CombatState, &mut Movement)>,
    mut healths: Query<&mut Health>,
    bodies: Query<(&Transform, &Collider)>,
    mut health_changed: MessageWriter<HealthChanged>,
) {
    let mut blows: Vec<(Entity, Entity, i32, f32, u32)> = Vec::new();
    for (entity, stats, mut state, _) in &mut attackers {
        if let CombatState::Engaged { target, timer } = &mut *state {
            timer.tick(time.delta());
            let fired = timer.times_finished_this_tick();
            if fired > 0 {
                blows.push((entity, *target, stats.damage, stats.range, fired));
            }
        }
    }
    blows.sort_by_key(|(attacker, ..)| *attacker);

    for (attacker, target, damage, range, fired) in blows {
        if !within_reach(&bodies, attacker, target, range) {
            debug!("{attacker} lost target {target} before striking");
            if let Ok((_, _, mut state, mut movement)) = attackers.get_mut(attacker) {
                release(&mut state, &mut movement);
            }
            continue;
        }

        for _ in 0..fired {
            let attacker_alive = healths
                .get(attacker)
                .ok()
                .is_none_or(|health| health.is_alive());
            if !attacker_alive {
                break;
            }

            let Ok(mut health) = healths.get_mut(target) else {
                if let Ok((_, _, mut state, mut movement)) = attackers.get_mut(attacker) {
                    release(&mut state, &mut movement);
                }
                break;
            };
            match health.apply_damage(damage) {
                DamageOutcome::Ignored => {
                    if !health.is_alive() {
                        if let Ok((_, _, mut state, mut movement)) = attackers.get_mut(attacker) {
                            release(&mut state, &mut movement);
                        }
                    }
                    break;
                }
                DamageOutcome::Damaged | DamageOutcome::Killed => {
                    health_changed.write(HealthChanged::of(target, &health));
                }
            }
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<CombatState>();

    app.add_systems(
        Update,
        (
            update_targeting.in_set(GameSet::Ai),
            resolve_attacks.in_set(GameSet::Combat),
        )
            .run_if(gameplay_running),
    );
}
