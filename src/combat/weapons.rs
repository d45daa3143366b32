//! Weapon profiles
//!
//! A weapon is data: which formula family it uses, its style, speed and reach.
//! There is no per-item behavior; item catalogs only feed these numbers.

use serde::{Deserialize, Serialize};

use crate::combat::stance::AttackStyle;

/// Formula family used to resolve an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    Melee,
    Ranged,
    Magic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub kind: WeaponKind,
    pub style: AttackStyle,
    /// Ticks between attacks
    pub attack_speed: i32,
    /// Maximum footprint gap in tiles
    pub attack_range: i32,
    /// Spell max hit before the magic damage multiplier (magic only)
    #[serde(default)]
    pub base_spell_damage: i32,
    /// Whether an overhead protection prayer can nullify it
    #[serde(default = "default_blockable")]
    pub blockable: bool,
}

fn default_blockable() -> bool {
    true
}

impl Weapon {
    pub fn melee(name: &str, style: AttackStyle, attack_speed: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: WeaponKind::Melee,
            style,
            attack_speed,
            attack_range: 1,
            base_spell_damage: 0,
            blockable: true,
        }
    }

    pub fn ranged(name: &str, attack_speed: i32, attack_range: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: WeaponKind::Ranged,
            style: AttackStyle::Range,
            attack_speed,
            attack_range,
            base_spell_damage: 0,
            blockable: true,
        }
    }

    pub fn magic(name: &str, base_spell_damage: i32, attack_speed: i32) -> Self {
        Self {
            name: name.to_string(),
            kind: WeaponKind::Magic,
            style: AttackStyle::Magic,
            attack_speed,
            attack_range: 10,
            base_spell_damage,
            blockable: true,
        }
    }

    /// Ancient barrage cast manually on a target
    pub fn ice_barrage() -> Self {
        Self::magic("Ice Barrage", 30, 5)
    }

    /// Scripted damage that ignores protection prayers
    pub fn unblockable(style: AttackStyle) -> Self {
        let kind = match style {
            AttackStyle::Magic => WeaponKind::Magic,
            AttackStyle::Range => WeaponKind::Ranged,
            _ => WeaponKind::Melee,
        };
        Self {
            name: "Unblockable".to_string(),
            kind,
            style,
            attack_speed: 0,
            attack_range: 1,
            base_spell_damage: 0,
            blockable: false,
        }
    }

    /// Ticks of travel before the projectile lands, given the footprint gap
    pub fn hit_delay(&self, distance: i32) -> i32 {
        let distance = distance.max(0);
        match self.kind {
            WeaponKind::Melee => 1,
            WeaponKind::Ranged => 1 + (3 + distance) / 6,
            WeaponKind::Magic => 1 + (1 + distance) / 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_delay_by_kind() {
        let sword = Weapon::melee("Sword", AttackStyle::Slash, 4);
        assert_eq!(sword.hit_delay(1), 1);
        assert_eq!(sword.hit_delay(9), 1);

        let bow = Weapon::ranged("Bow", 5, 10);
        assert_eq!(bow.hit_delay(1), 1);
        assert_eq!(bow.hit_delay(3), 2);
        assert_eq!(bow.hit_delay(9), 3);

        let spell = Weapon::ice_barrage();
        assert_eq!(spell.hit_delay(1), 1);
        assert_eq!(spell.hit_delay(2), 2);
        assert_eq!(spell.hit_delay(5), 3);
    }

    #[test]
    fn test_unblockable_flag() {
        let weapon = Weapon::unblockable(AttackStyle::Crush);
        assert!(!weapon.blockable);
        assert_eq!(weapon.kind, WeaponKind::Melee);
    }

    #[test]
    fn test_weapon_from_toml() {
        let weapon: Weapon = toml::from_str(
            r#"
            name = "Scythe"
            kind = "melee"
            style = "slash"
            attack_speed = 5
            attack_range = 1
            "#,
        )
        .unwrap();
        assert_eq!(weapon.kind, WeaponKind::Melee);
        assert!(weapon.blockable);
        assert_eq!(weapon.base_spell_damage, 0);
    }
}
