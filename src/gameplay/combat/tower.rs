//! Base tower: periodically launches arrows at the nearest-indexed enemy in range.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::health::{DamageOutcome, Health, HealthChanged};
use crate::gameplay::{Allegiance, Targetable};
use crate::screens::GameState;
use crate::third_party::surface_distance;
use crate::{GameSet, gameplay_running};

// === Constants ===

/// Seconds between tower shots.
pub const TOWER_FIRE_INTERVAL_SECS: f32 = 3.0;

/// Center-to-center reach of the tower (world units).
pub const TOWER_RANGE: f32 = 8.0;

pub const TOWER_DAMAGE: i32 = 10;

/// Arrow travel speed (world units per second).
pub const ARROW_SPEED: f32 = 10.0;

/// Arrows still in flight after this long are removed.
pub const ARROW_LIFETIME_SECS: f32 = 5.0;

/// Collision radius of an arrow tip.
pub const ARROW_HIT_RADIUS: f32 = 0.1;

// === Components ===

/// Shooter mounted on a base.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct TowerShooter {
    pub timer: Timer,
    pub range: f32,
    pub damage: i32,
}

impl Default for TowerShooter {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(TOWER_FIRE_INTERVAL_SECS, TimerMode::Repeating),
            range: TOWER_RANGE,
            damage: TOWER_DAMAGE,
        }
    }
}

/// An arrow flying in a straight line. Hits the first opposing entity it touches.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Arrow {
    pub allegiance: Allegiance,
    pub damage: i32,
    pub velocity: Vec2,
}

/// Remaining flight time of an arrow.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct ArrowLifetime(pub Timer);

impl Default for ArrowLifetime {
    fn default() -> Self {
        Self(Timer::from_seconds(ARROW_LIFETIME_SECS, TimerMode::Once))
    }
}

// === Systems ===

/// Ticks tower timers and launches an arrow per shot at the first opponent in range.
fn fire_towers(
    time: Res<Time>,
    mut commands: Commands,
    mut towers: Query<(&Transform, &Allegiance, &mut TowerShooter)>,
    targets: Query<(Entity, &Allegiance, &Health, &Transform), With<Targetable>>,
) {
    for (tower_transform, tower_allegiance, mut tower) in &mut towers {
        tower.timer.tick(time.delta());
        if !tower.timer.just_finished() {
            continue;
        }

        let origin = tower_transform.translation.xy();
        let Some(aim) = targets
            .iter()
            .filter(|(_, allegiance, health, transform)| {
                *allegiance != tower_allegiance
                    && health.is_alive()
                    && origin.distance(transform.translation.xy()) <= tower.range
            })
            .min_by_key(|(entity, ..)| *entity)
            .map(|(_, _, _, transform)| transform.translation.xy())
        else {
            continue;
        };

        let direction = (aim - origin).normalize_or(Vec2::X * tower_allegiance.lane_direction());
        commands.spawn((
            Name::new("Arrow"),
            Arrow {
                allegiance: *tower_allegiance,
                damage: tower.damage,
                velocity: direction * ARROW_SPEED,
            },
            ArrowLifetime::default(),
            Collider::circle(ARROW_HIT_RADIUS),
            Transform::from_xyz(origin.x, origin.y, 0.0),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn move_arrows(time: Res<Time>, mut arrows: Query<(&Arrow, &mut Transform)>) {
    for (arrow, mut transform) in &mut arrows {
        let step = arrow.velocity * time.delta_secs();
        transform.translation.x += step.x;
        transform.translation.y += step.y;
    }
}

/// Points `ARROW_HIT_RADIUS` apart along the segment an arrow covered this step,
/// so a long frame cannot carry it past a target.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn sweep_points(from: Vec2, to: Vec2) -> impl Iterator<Item = Vec2> {
    let samples = ((from.distance(to) / ARROW_HIT_RADIUS).ceil() as usize).max(1);
    (0..=samples).map(move |i| from.lerp(to, i as f32 / samples as f32))
}

/// Damages the first opposing entity each arrow touched along this step's path
/// (lowest index on ties) and despawns the arrow.
fn handle_arrow_hits(
    time: Res<Time>,
    mut commands: Commands,
    arrows: Query<(Entity, &Arrow, &Transform, &Collider)>,
    mut targets: Query<
        (Entity, &Allegiance, &mut Health, &Transform, &Collider),
        (With<Targetable>, Without<Arrow>),
    >,
    mut health_changed: MessageWriter<HealthChanged>,
) {
    for (arrow_entity, arrow, arrow_transform, arrow_collider) in &arrows {
        let tip = arrow_transform.translation.xy();
        let tail = tip - arrow.velocity * time.delta_secs();
        let hit = sweep_points(tail, tip).find_map(|point| {
            targets
                .iter()
                .filter(|(_, allegiance, health, transform, collider)| {
                    **allegiance != arrow.allegiance
                        && health.is_alive()
                        && surface_distance(
                            arrow_collider,
                            point,
                            collider,
                            transform.translation.xy(),
                        ) <= 0.0
                })
                .map(|(entity, ..)| entity)
                .min()
        });
        let Some(hit) = hit else {
            continue;
        };

        if let Ok((_, _, mut health, _, _)) = targets.get_mut(hit) {
            if health.apply_damage(arrow.damage) != DamageOutcome::Ignored {
                health_changed.write(HealthChanged::of(hit, &health));
            }
        }
        commands.entity(arrow_entity).despawn();
    }
}

fn expire_arrows(
    time: Res<Time>,
    mut commands: Commands,
    mut arrows: Query<(Entity, &mut ArrowLifetime)>,
) {
    for (entity, mut lifetime) in &mut arrows {
        if lifetime.0.tick(time.delta()).just_finished() {
            commands.entity(entity).despawn();
        }
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<TowerShooter>()
        .register_type::<Arrow>()
        .register_type::<ArrowLifetime>();

    // fire → move → hit → expire. Arrows spawned this frame start moving next frame.
    app.add_systems(
        Update,
        (fire_towers, move_arrows, handle_arrow_hits, expire_arrows)
            .chain_ignore_deferred()
            .in_set(GameSet::Combat)
            .run_if(gameplay_running),
    );
}
