//! Player loadouts loaded from TOML
//!
//! A loadout is the numeric summary of a player's gear: levels, the weapon
//! profile, summed equipment bonuses and carried weight. Item catalogs are
//! expected to flatten into this shape before the simulation sees them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::{
    AttackModifiers, AttackStyle, CombatStance, UnitBonuses, UnitStats, Weapon,
};
use crate::core::error::Result;

/// Equipment slots a player can click on the equipment panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Cape,
    Neck,
    Weapon,
    Chest,
    Shield,
    Legs,
    Gloves,
    Feet,
    Ring,
    Ammo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub name: String,
    pub stats: UnitStats,
    pub weapon: Option<Weapon>,
    pub bonuses: UnitBonuses,
    pub stance: CombatStance,
    pub modifiers: AttackModifiers,
    pub weight_kg: i32,
    pub agility: i32,
    /// Fight back automatically when hit while idle
    pub auto_retaliate: bool,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            name: "Unarmed".to_string(),
            stats: UnitStats::maxed(),
            weapon: None,
            bonuses: UnitBonuses::default(),
            stance: CombatStance::Accurate,
            modifiers: AttackModifiers::default(),
            weight_kg: 0,
            agility: 99,
            auto_retaliate: false,
        }
    }
}

impl Loadout {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let loadout = Self::from_toml_str(&content)?;
        tracing::info!(name = %loadout.name, "loaded loadout");
        Ok(loadout)
    }

    /// Weapon used for regular attacks; bare fists when nothing is wielded
    pub fn attack_weapon(&self) -> Weapon {
        self.weapon
            .clone()
            .unwrap_or_else(|| Weapon::melee("Unarmed", AttackStyle::Crush, 4))
    }

    /// Typical melee setup for the colosseum
    pub fn melee() -> Self {
        let mut bonuses = UnitBonuses::default();
        bonuses.attack.stab = 129;
        bonuses.attack.slash = 82;
        bonuses.attack.crush = 65;
        bonuses.defence.stab = 220;
        bonuses.defence.slash = 205;
        bonuses.defence.crush = 210;
        bonuses.defence.magic = 30;
        bonuses.defence.range = 215;
        bonuses.other.melee_strength = 118;
        bonuses.other.prayer = 6;
        Self {
            name: "Melee".to_string(),
            weapon: Some(Weapon::melee("Ghrazi rapier", AttackStyle::Stab, 4)),
            bonuses,
            stance: CombatStance::Aggressive,
            weight_kg: 30,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::WeaponKind;

    #[test]
    fn test_loadout_from_toml() {
        let loadout = Loadout::from_toml_str(
            r#"
            name = "Bowfa"
            stance = "rapid"
            weight_kg = 12

            [weapon]
            name = "Bow of faerdhinen"
            kind = "ranged"
            style = "range"
            attack_speed = 4
            attack_range = 10

            [bonuses.attack]
            range = 190

            [bonuses.other]
            ranged_strength = 106
            "#,
        )
        .unwrap();
        assert_eq!(loadout.stance, CombatStance::Rapid);
        assert_eq!(loadout.attack_weapon().kind, WeaponKind::Ranged);
        assert_eq!(loadout.bonuses.attack.range, 190);
        assert_eq!(loadout.bonuses.other.magic_damage, 1.0);
        assert_eq!(loadout.stats.hitpoint, 99);
    }

    #[test]
    fn test_unarmed_fallback() {
        let loadout = Loadout::default();
        assert_eq!(loadout.attack_weapon().name, "Unarmed");
    }
}
