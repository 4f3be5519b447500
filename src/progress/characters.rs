//! Built-in character roster and level-based stat curves.

use crate::gameplay::units::UnitStats;

/// Unlocked in every new save.
pub const STARTING_CHARACTER: &str = "BasicSoldier";

/// Static description of a deployable character.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterData {
    pub id: &'static str,
    pub display_name: &'static str,

    pub base_health: i32,
    pub base_attack: i32,
    pub health_per_level: f32,
    pub attack_per_level: f32,

    /// Gold to go from level 1 to level 2.
    pub base_upgrade_cost: u32,
    /// Each further upgrade multiplies the cost by this.
    pub cost_factor: f32,

    /// Mana paid per deployment.
    pub mana_cost: f32,
    pub attack_interval: f32,
    pub attack_range: f32,
    pub detection_range: f32,
    pub move_speed: f32,
}

pub static CATALOG: [CharacterData; 3] = [
    CharacterData {
        id: "BasicSoldier",
        display_name: "Soldier",
        base_health: 100,
        base_attack: 10,
        health_per_level: 20.0,
        attack_per_level: 3.0,
        base_upgrade_cost: 50,
        cost_factor: 1.3,
        mana_cost: 10.0,
        attack_interval: 1.5,
        attack_range: 0.5,
        detection_range: 4.0,
        move_speed: 2.0,
    },
    CharacterData {
        id: "ArcherCat",
        display_name: "Archer Cat",
        base_health: 70,
        base_attack: 12,
        health_per_level: 12.0,
        attack_per_level: 4.0,
        base_upgrade_cost: 75,
        cost_factor: 1.3,
        mana_cost: 15.0,
        attack_interval: 2.0,
        attack_range: 4.0,
        detection_range: 5.0,
        move_speed: 2.0,
    },
    CharacterData {
        id: "TankGolem",
        display_name: "Tank Golem",
        base_health: 250,
        base_attack: 8,
        health_per_level: 45.0,
        attack_per_level: 2.0,
        base_upgrade_cost: 100,
        cost_factor: 1.4,
        mana_cost: 25.0,
        attack_interval: 2.5,
        attack_range: 0.5,
        detection_range: 3.5,
        move_speed: 1.2,
    },
];

/// Looks up a character by id.
#[must_use]
pub fn character(id: &str) -> Option<&'static CharacterData> {
    CATALOG.iter().find(|data| data.id == id)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn grow(base: i32, per_level: f32, level: u32) -> i32 {
    let steps = level.max(1) - 1;
    base + (per_level * steps as f32).round_ties_even() as i32
}

impl CharacterData {
    #[must_use]
    pub fn health(&self, level: u32) -> i32 {
        grow(self.base_health, self.health_per_level, level)
    }

    #[must_use]
    pub fn attack(&self, level: u32) -> i32 {
        grow(self.base_attack, self.attack_per_level, level)
    }

    /// Gold needed to upgrade from `level` to `level + 1`. Level 0 counts as 1.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn upgrade_cost(&self, level: u32) -> u32 {
        let steps = (level.max(1) - 1) as i32;
        (self.base_upgrade_cost as f32 * self.cost_factor.powi(steps)).round_ties_even() as u32
    }

    /// Combat template for a deployment at `level`.
    #[must_use]
    pub fn unit_stats(&self, level: u32) -> UnitStats {
        UnitStats {
            health: self.health(level),
            damage: self.attack(level),
            attack_interval: self.attack_interval,
            attack_range: self.attack_range,
            detection_range: self.detection_range,
            move_speed: self.move_speed,
        }
    }
}
