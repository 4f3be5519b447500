//! On-disk form of player progress.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::characters::STARTING_CHARACTER;
use super::energy::EnergySettings;

/// Bumped whenever the record layout changes incompatibly.
pub const RECORD_VERSION: u32 = 1;

/// Gold granted to a fresh save.
pub const STARTING_GOLD: u32 = 100;

/// Serialized energy state. The timestamp is RFC 3339 text so that a damaged
/// value can be recovered from instead of failing the whole record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnergyRecord {
    pub current: u32,
    pub max: u32,
    pub last_update: String,
}

/// Everything persisted between sessions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerProgressRecord {
    pub version: u32,
    pub gold: u32,
    pub unlocked_characters: BTreeSet<String>,
    pub character_levels: BTreeMap<String, u32>,
    pub highest_stage_cleared: BTreeMap<String, u32>,
    pub energy: EnergyRecord,
}

impl PlayerProgressRecord {
    /// A fresh save: starting gold, the starter unit, full energy as of `now`.
    #[must_use]
    pub fn new_game(now: DateTime<Utc>) -> Self {
        let settings = EnergySettings::default();
        Self {
            version: RECORD_VERSION,
            gold: STARTING_GOLD,
            unlocked_characters: BTreeSet::from([STARTING_CHARACTER.to_string()]),
            character_levels: BTreeMap::from([(STARTING_CHARACTER.to_string(), 1)]),
            highest_stage_cleared: BTreeMap::new(),
            energy: EnergyRecord {
                current: settings.max_energy,
                max: settings.max_energy,
                last_update: now.to_rfc3339(),
            },
        }
    }
}

impl Default for PlayerProgressRecord {
    fn default() -> Self {
        Self::new_game(Utc::now())
    }
}
