//! Persistent meta progression: gold, characters, cleared stages and energy.
//!
//! Save data is read once at startup into [`PlayerProgress`] and
//! [`EnergyAccount`]. Any change worth keeping is followed by a
//! [`PersistRequested`] message; saving itself happens in `Last` so that a
//! frame with several changes writes the file once.

pub mod characters;
pub mod energy;
pub mod record;
pub mod stages;
pub mod store;

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::*;
use chrono::Utc;
use thiserror::Error;

use crate::GameSet;
use crate::gameplay::endgame::MatchOutcome;
use crate::screens::GameState;

use characters::{STARTING_CHARACTER, character};
use energy::{EnergyAccount, EnergyRefreshTimer, EnergySettings};
use record::{PlayerProgressRecord, RECORD_VERSION, STARTING_GOLD};
use stages::{EnterStageRequest, MAPS, STAGES_PER_MAP, StageSelection, map_tier};
use store::SaveStore;

// === Constants ===

/// Gold granted for winning a match.
pub const STAGE_CLEAR_GOLD: u32 = 50;

// === Errors ===

/// Rejected progression requests. Nothing is mutated when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressError {
    #[error("unknown character {0}")]
    UnknownCharacter(String),

    #[error("character {0} is locked")]
    LockedCharacter(String),

    #[error("character {0} is already at the highest level")]
    MaxLevel(String),

    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },

    #[error("unknown map {0}")]
    UnknownMap(String),

    #[error("stage {stage} does not exist")]
    StageOutOfRange { stage: u32 },

    #[error("stage {} of {map} is locked", .stage.saturating_add(1))]
    StageLocked { map: String, stage: u32 },

    #[error("not enough energy: need {needed}, have {available}")]
    NotEnoughEnergy { needed: u32, available: u32 },
}

// === Resources ===

/// Long-lived player state between matches.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct PlayerProgress {
    gold: u32,
    unlocked: BTreeSet<String>,
    levels: BTreeMap<String, u32>,
    highest_cleared: BTreeMap<String, u32>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            gold: STARTING_GOLD,
            unlocked: BTreeSet::from([STARTING_CHARACTER.to_string()]),
            levels: BTreeMap::from([(STARTING_CHARACTER.to_string(), 1)]),
            highest_cleared: BTreeMap::new(),
        }
    }
}

impl PlayerProgress {
    #[must_use]
    pub fn from_record(record: &PlayerProgressRecord) -> Self {
        Self {
            gold: record.gold,
            unlocked: record.unlocked_characters.clone(),
            levels: record.character_levels.clone(),
            highest_cleared: record.highest_stage_cleared.clone(),
        }
    }

    #[must_use]
    pub fn to_record(&self, energy: &EnergyAccount) -> PlayerProgressRecord {
        PlayerProgressRecord {
            version: RECORD_VERSION,
            gold: self.gold,
            unlocked_characters: self.unlocked.clone(),
            character_levels: self.levels.clone(),
            highest_stage_cleared: self.highest_cleared.clone(),
            energy: energy.to_record(),
        }
    }

    #[must_use]
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    pub const fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// All-or-nothing gold payment.
    ///
    /// # Errors
    ///
    /// `InsufficientGold` when `amount` exceeds the balance.
    pub fn spend_gold(&mut self, amount: u32) -> Result<(), ProgressError> {
        if amount > self.gold {
            return Err(ProgressError::InsufficientGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    #[must_use]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlocked characters in id order.
    pub fn unlocked_characters(&self) -> impl Iterator<Item = &str> {
        self.unlocked.iter().map(String::as_str)
    }

    /// Level of `id`; 1 when no level is stored.
    #[must_use]
    pub fn level_of(&self, id: &str) -> u32 {
        self.levels.get(id).copied().unwrap_or(1).max(1)
    }

    /// Unlocks `id` at level 1. Returns `false` if it was already unlocked.
    ///
    /// # Errors
    ///
    /// `UnknownCharacter` for ids outside the catalog.
    pub fn unlock_character(&mut self, id: &str) -> Result<bool, ProgressError> {
        let data = character(id).ok_or_else(|| ProgressError::UnknownCharacter(id.to_string()))?;
        if !self.unlocked.insert(data.id.to_string()) {
            return Ok(false);
        }
        self.levels.entry(data.id.to_string()).or_insert(1);
        Ok(true)
    }

    /// Pays the upgrade cost of `id` and raises its level. Returns the new level.
    ///
    /// # Errors
    ///
    /// Unknown, locked or unaffordable characters are rejected.
    pub fn upgrade_character(&mut self, id: &str) -> Result<u32, ProgressError> {
        let data = character(id).ok_or_else(|| ProgressError::UnknownCharacter(id.to_string()))?;
        if !self.is_unlocked(data.id) {
            return Err(ProgressError::LockedCharacter(data.id.to_string()));
        }
        let level = self.level_of(data.id);
        let next = level
            .checked_add(1)
            .ok_or_else(|| ProgressError::MaxLevel(data.id.to_string()))?;
        self.spend_gold(data.upgrade_cost(level))?;
        self.levels.insert(data.id.to_string(), next);
        Ok(next)
    }

    /// Number of cleared stages on `map`.
    #[must_use]
    pub fn highest_cleared(&self, map: &str) -> u32 {
        self.highest_cleared.get(map).copied().unwrap_or(0)
    }

    pub fn record_stage_cleared(&mut self, map: &str, stage: u32) {
        let highest = self.highest_cleared.entry(map.to_string()).or_insert(0);
        *highest = (*highest).max(stage.saturating_add(1));
    }

    /// The first map is always open; each later map opens once the previous
    /// one is fully cleared.
    #[must_use]
    pub fn is_map_unlocked(&self, map: &str) -> bool {
        match map_tier(map) {
            Some(0) => true,
            Some(tier) => MAPS
                .get(tier as usize - 1)
                .is_some_and(|previous| self.highest_cleared(previous) >= STAGES_PER_MAP),
            None => false,
        }
    }

    #[must_use]
    pub fn is_stage_unlocked(&self, map: &str, stage: u32) -> bool {
        stage < STAGES_PER_MAP && self.is_map_unlocked(map) && stage <= self.highest_cleared(map)
    }
}

// === Messages ===

/// Ask for progress to be written to disk at the end of the frame.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistRequested;

/// Host request to spend gold on a character level.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct UpgradeCharacterRequest {
    pub character: String,
}

/// Host request to add a character to the roster.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct UnlockCharacterRequest {
    pub character: String,
}

// === Systems ===

fn load_progress(mut commands: Commands, store: Res<SaveStore>, settings: Res<EnergySettings>) {
    let now = Utc::now();
    let record = store.load_or_new(now);
    let mut energy = EnergyAccount::from_record(&record.energy, &settings, now);
    energy.reconcile(now);
    let progress = PlayerProgress::from_record(&record);
    info!(
        "Loaded progress: {} gold, {} characters, energy {}/{}",
        progress.gold(),
        progress.unlocked.len(),
        energy.current(),
        energy.max()
    );
    commands.insert_resource(progress);
    commands.insert_resource(energy);
}

fn handle_character_requests(
    mut upgrades: MessageReader<UpgradeCharacterRequest>,
    mut unlocks: MessageReader<UnlockCharacterRequest>,
    mut progress: ResMut<PlayerProgress>,
    mut persist: MessageWriter<PersistRequested>,
) {
    for request in unlocks.read() {
        match progress.unlock_character(&request.character) {
            Ok(true) => {
                info!("Unlocked {}", request.character);
                persist.write(PersistRequested);
            }
            Ok(false) => debug!("{} is already unlocked", request.character),
            Err(err) => warn!("Cannot unlock {}: {err}", request.character),
        }
    }
    for request in upgrades.read() {
        match progress.upgrade_character(&request.character) {
            Ok(level) => {
                info!(
                    "{} upgraded to level {level}, {} gold left",
                    request.character,
                    progress.gold()
                );
                persist.write(PersistRequested);
            }
            Err(err) => warn!("Cannot upgrade {}: {err}", request.character),
        }
    }
}

/// Records a won stage and pays the clear reward.
fn record_victory(
    mut outcomes: MessageReader<MatchOutcome>,
    selection: Res<StageSelection>,
    mut progress: ResMut<PlayerProgress>,
    mut persist: MessageWriter<PersistRequested>,
) {
    for outcome in outcomes.read() {
        if outcome.player_won {
            progress.record_stage_cleared(&selection.map, selection.stage);
            progress.add_gold(STAGE_CLEAR_GOLD);
            info!(
                "Cleared {} stage {}; {} gold",
                selection.map,
                selection.stage + 1,
                progress.gold()
            );
        }
        persist.write(PersistRequested);
    }
}

fn save_progress(store: &SaveStore, progress: &PlayerProgress, energy: &mut EnergyAccount) {
    energy.reconcile(Utc::now());
    match store.save(&progress.to_record(energy)) {
        Ok(()) => debug!("Progress saved to {}", store.path().display()),
        Err(err) => error!("Failed to save progress to {}: {err}", store.path().display()),
    }
}

fn persist_on_request(
    mut requests: MessageReader<PersistRequested>,
    store: Res<SaveStore>,
    progress: Option<Res<PlayerProgress>>,
    energy: Option<ResMut<EnergyAccount>>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if let (Some(progress), Some(mut energy)) = (progress, energy) {
        save_progress(&store, &progress, &mut energy);
    }
}

fn save_on_exit(
    mut exits: MessageReader<AppExit>,
    store: Res<SaveStore>,
    progress: Option<Res<PlayerProgress>>,
    energy: Option<ResMut<EnergyAccount>>,
) {
    if exits.read().count() == 0 {
        return;
    }
    if let (Some(progress), Some(mut energy)) = (progress, energy) {
        info!("Saving progress before exit");
        save_progress(&store, &progress, &mut energy);
    }
}

// === Plugin ===

pub fn plugin(app: &mut App) {
    app.register_type::<StageSelection>()
        .init_resource::<SaveStore>()
        .init_resource::<EnergySettings>()
        .init_resource::<EnergyRefreshTimer>()
        .init_resource::<StageSelection>()
        .add_message::<PersistRequested>()
        .add_message::<EnterStageRequest>()
        .add_message::<UpgradeCharacterRequest>()
        .add_message::<UnlockCharacterRequest>();

    app.add_systems(Startup, load_progress);
    app.add_systems(
        Update,
        (
            energy::refresh_energy.run_if(resource_exists::<EnergyAccount>),
            (stages::handle_enter_stage_requests, handle_character_requests)
                .run_if(in_state(GameState::StageSelect)),
            record_victory
                .after(GameSet::Death)
                .run_if(resource_exists::<PlayerProgress>),
        ),
    );
    app.add_systems(Last, (persist_on_request, save_on_exit));
}
