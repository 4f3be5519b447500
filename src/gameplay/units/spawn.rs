//! Unit spawning: player requests paid in mana, and a periodic enemy spawner.

use bevy::prelude::*;
use rand::Rng;

use super::{ENEMY_GRUNT, spawn_unit};
use crate::gameplay::Allegiance;
use crate::gameplay::battlefield::SpawnPoint;
use crate::gameplay::economy::Mana;
use crate::gameplay::endgame::MatchResult;
use crate::progress::PlayerProgress;
use crate::progress::characters::character;
use crate::progress::stages::StageSelection;
use crate::screens::GameState;
use crate::{GameSet, gameplay_running};

// === Constants ===

/// Seconds between enemy spawns.
pub const ENEMY_SPAWN_INTERVAL_SECS: f32 = 5.0;

/// Maximum vertical offset applied to enemy spawns.
pub const SPAWN_JITTER: f32 = 0.5;

// === Messages ===

/// Host request to deploy a player character.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    pub character: String,
}

impl SpawnRequest {
    #[must_use]
    pub fn new(character: impl Into<String>) -> Self {
        Self {
            character: character.into(),
        }
    }
}

// === Resource ===

/// Enemy spawn cadence. Reset each time `InGame` is entered.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct EnemySpawner {
    pub timer: Timer,
}

impl Default for EnemySpawner {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(ENEMY_SPAWN_INTERVAL_SECS, TimerMode::Repeating),
        }
    }
}

// === Systems ===

fn reset_enemy_spawner(mut commands: Commands) {
    commands.insert_resource(EnemySpawner::default());
}

fn spawn_position(spawn_points: &Query<(&SpawnPoint, &Transform)>, side: Allegiance) -> Option<Vec2> {
    spawn_points
        .iter()
        .find(|(point, _)| point.0 == side)
        .map(|(_, transform)| transform.translation.xy())
}

/// Deploys requested player characters, paying their mana cost.
fn handle_spawn_requests(
    mut commands: Commands,
    mut requests: MessageReader<SpawnRequest>,
    progress: Res<PlayerProgress>,
    result: Res<MatchResult>,
    mut mana: ResMut<Mana>,
    spawn_points: Query<(&SpawnPoint, &Transform)>,
) {
    for request in requests.read() {
        if result.is_decided() {
            debug!("Ignoring spawn of {}: match is over", request.character);
            continue;
        }
        let Some(data) = character(&request.character) else {
            warn!("Unknown character {}", request.character);
            continue;
        };
        if !progress.is_unlocked(data.id) {
            warn!("Character {} is locked", data.id);
            continue;
        }
        let Some(position) = spawn_position(&spawn_points, Allegiance::Player) else {
            warn!("No player spawn point; cannot deploy {}", data.id);
            continue;
        };
        if !mana.spend(data.mana_cost) {
            info!(
                "Not enough mana for {} ({:.1}/{:.1})",
                data.id, mana.current, data.mana_cost
            );
            continue;
        }

        let level = progress.level_of(data.id);
        spawn_unit(
            &mut commands,
            data.display_name,
            data.unit_stats(level),
            Allegiance::Player,
            position,
        );
    }
}

/// Spawns one enemy grunt per elapsed interval, scaled by stage difficulty.
fn tick_enemy_spawner(
    time: Res<Time>,
    mut spawner: ResMut<EnemySpawner>,
    result: Res<MatchResult>,
    selection: Res<StageSelection>,
    spawn_points: Query<(&SpawnPoint, &Transform)>,
    mut commands: Commands,
) {
    spawner.timer.tick(time.delta());
    let due = spawner.timer.times_finished_this_tick();
    if due == 0 || result.is_decided() {
        return;
    }
    let Some(origin) = spawn_position(&spawn_points, Allegiance::Enemy) else {
        warn!("No enemy spawn point; skipping {due} spawn(s)");
        return;
    };

    let stats = ENEMY_GRUNT.scaled_for_stage(selection.difficulty);
    let mut rng = rand::rng();
    for _ in 0..due {
        let jitter = rng.random_range(-SPAWN_JITTER..=SPAWN_JITTER);
        spawn_unit(
            &mut commands,
            "Grunt",
            stats,
            Allegiance::Enemy,
            origin + Vec2::Y * jitter,
        );
    }
}

// === Plugin ===

pub(super) fn plugin(app: &mut App) {
    app.register_type::<EnemySpawner>()
        .init_resource::<EnemySpawner>()
        .add_message::<SpawnRequest>();

    app.add_systems(OnEnter(GameState::InGame), reset_enemy_spawner);

    app.add_systems(
        Update,
        (
            handle_spawn_requests.in_set(GameSet::Input),
            tick_enemy_spawner.in_set(GameSet::Production),
        )
            .run_if(gameplay_running),
    );
}
