//! Maps, stages and stage entry.

use bevy::prelude::*;
use chrono::{DateTime, Utc};

use super::energy::{EnergyAccount, EnergySettings};
use super::{PersistRequested, PlayerProgress, ProgressError};
use crate::screens::GameState;

/// Maps in unlock order.
pub const MAPS: [&str; 3] = ["ForestMap", "OceanMap", "VolcanoMap"];

pub const STAGES_PER_MAP: u32 = 10;

/// Position of `map` in unlock order.
#[must_use]
pub fn map_tier(map: &str) -> Option<u32> {
    MAPS.iter()
        .position(|known| *known == map)
        .and_then(|tier| u32::try_from(tier).ok())
}

/// Difficulty of a stage: ten steps per map tier plus the 1-based stage number.
#[must_use]
pub fn stage_difficulty(map: &str, stage: u32) -> Option<u32> {
    map_tier(map).map(|tier| {
        (tier * STAGES_PER_MAP)
            .saturating_add(stage)
            .saturating_add(1)
    })
}

/// The stage the current (or next) match is played on.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct StageSelection {
    pub map: String,
    /// 0-based.
    pub stage: u32,
    pub difficulty: u32,
}

impl Default for StageSelection {
    fn default() -> Self {
        Self {
            map: MAPS[0].to_string(),
            stage: 0,
            difficulty: 1,
        }
    }
}

/// Validates a stage choice and pays its energy cost.
///
/// # Errors
///
/// Unknown or locked stages and insufficient energy are rejected before any
/// energy is spent.
pub fn enter_stage(
    progress: &PlayerProgress,
    energy: &mut EnergyAccount,
    settings: &EnergySettings,
    map: &str,
    stage: u32,
    now: DateTime<Utc>,
) -> Result<StageSelection, ProgressError> {
    let tier = map_tier(map).ok_or_else(|| ProgressError::UnknownMap(map.to_string()))?;
    if stage >= STAGES_PER_MAP {
        return Err(ProgressError::StageOutOfRange { stage });
    }
    let difficulty = tier * STAGES_PER_MAP + stage + 1;
    if !progress.is_stage_unlocked(map, stage) {
        return Err(ProgressError::StageLocked {
            map: map.to_string(),
            stage,
        });
    }
    if !energy.consume(settings.stage_cost, now) {
        return Err(ProgressError::NotEnoughEnergy {
            needed: settings.stage_cost,
            available: energy.current(),
        });
    }
    Ok(StageSelection {
        map: map.to_string(),
        stage,
        difficulty,
    })
}

/// Host request to start a match on a stage.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct EnterStageRequest {
    pub map: String,
    pub stage: u32,
}

impl EnterStageRequest {
    #[must_use]
    pub fn new(map: impl Into<String>, stage: u32) -> Self {
        Self {
            map: map.into(),
            stage,
        }
    }
}

pub(super) fn handle_enter_stage_requests(
    mut requests: MessageReader<EnterStageRequest>,
    mut commands: Commands,
    progress: Res<PlayerProgress>,
    mut energy: ResMut<EnergyAccount>,
    settings: Res<EnergySettings>,
    mut next_state: ResMut<NextState<GameState>>,
    mut persist: MessageWriter<PersistRequested>,
) {
    // One match per frame; later requests in the same frame are dropped.
    let Some(request) = requests.read().next() else {
        return;
    };
    match enter_stage(
        &progress,
        &mut energy,
        &settings,
        &request.map,
        request.stage,
        Utc::now(),
    ) {
        Ok(selection) => {
            info!(
                "Entering {} stage {} ({} energy left)",
                selection.map,
                selection.stage + 1,
                energy.current()
            );
            commands.insert_resource(selection);
            next_state.set(GameState::InGame);
            persist.write(PersistRequested);
        }
        Err(err) => warn!(
            "Cannot enter {} stage {}: {err}",
            request.map,
            request.stage.saturating_add(1)
        ),
    }
    requests.clear();
}
