//! Skill levels and equipment bonuses
//!
//! Players derive bonuses from gear; mobs carry fixed values from their profile.

use serde::{Deserialize, Serialize};

use crate::combat::stance::AttackStyle;

/// Per-skill levels
///
/// Used both for base/maximum values and for the depleted current values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    pub attack: i32,
    pub strength: i32,
    pub defence: i32,
    pub range: i32,
    pub magic: i32,
    pub hitpoint: i32,
    pub prayer: i32,
    pub run: i32,
    pub special_attack: i32,
}

impl UnitStats {
    /// A fully trained player
    pub fn maxed() -> Self {
        Self {
            attack: 99,
            strength: 99,
            defence: 99,
            range: 99,
            magic: 99,
            hitpoint: 99,
            prayer: 99,
            run: 10_000,
            special_attack: 100,
        }
    }
}

/// Bonus values keyed by attack style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleBonuses {
    pub stab: i32,
    pub slash: i32,
    pub crush: i32,
    pub magic: i32,
    pub range: i32,
}

impl StyleBonuses {
    pub fn get(&self, style: AttackStyle) -> i32 {
        match style {
            AttackStyle::Stab => self.stab,
            AttackStyle::Slash => self.slash,
            AttackStyle::Crush => self.crush,
            AttackStyle::Magic => self.magic,
            AttackStyle::Range => self.range,
        }
    }

    fn merged(&self, other: &Self) -> Self {
        Self {
            stab: self.stab + other.stab,
            slash: self.slash + other.slash,
            crush: self.crush + other.crush,
            magic: self.magic + other.magic,
            range: self.range + other.range,
        }
    }
}

/// Strength-type bonuses and the prayer bonus
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtherBonuses {
    pub melee_strength: i32,
    pub ranged_strength: i32,
    /// Multiplier applied to a spell's base damage (1.0 = no bonus)
    pub magic_damage: f64,
    pub prayer: i32,
}

impl Default for OtherBonuses {
    fn default() -> Self {
        Self {
            melee_strength: 0,
            ranged_strength: 0,
            magic_damage: 1.0,
            prayer: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitBonuses {
    pub attack: StyleBonuses,
    pub defence: StyleBonuses,
    pub other: OtherBonuses,
}

impl UnitBonuses {
    /// Sum two bonus sets (e.g. gear pieces); magic damage multipliers stack additively
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            attack: self.attack.merged(&other.attack),
            defence: self.defence.merged(&other.defence),
            other: OtherBonuses {
                melee_strength: self.other.melee_strength + other.other.melee_strength,
                ranged_strength: self.other.ranged_strength + other.other.ranged_strength,
                magic_damage: self.other.magic_damage + other.other.magic_damage - 1.0,
                prayer: self.other.prayer + other.other.prayer,
            },
        }
    }
}
