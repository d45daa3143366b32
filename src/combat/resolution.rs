//! Attack resolution
//!
//! Accuracy is an attack roll against a defence roll; damage is uniform below
//! the max hit. The three weapon families only differ in which levels and
//! bonuses feed those rolls.

use serde::{Deserialize, Serialize};

use crate::combat::prayer::{PrayerBook, PrayerFeature};
use crate::combat::stance::{AttackStyle, CombatStance, XpDrop};
use crate::combat::stats::{UnitBonuses, UnitStats};
use crate::combat::weapons::{Weapon, WeaponKind};
use crate::core::rng::{self, SimRng};

/// One side of an attack
///
/// Mobs have no stance and their prayer book is never consulted.
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    pub is_player: bool,
    pub stats: &'a UnitStats,
    pub bonuses: &'a UnitBonuses,
    pub prayers: &'a PrayerBook,
    pub stance: Option<CombatStance>,
}

impl Combatant<'_> {
    fn prayer(&self, feature: PrayerFeature) -> f64 {
        if self.is_player {
            self.prayers.multiplier(feature)
        } else {
            1.0
        }
    }

    fn stance(&self) -> CombatStance {
        self.stance.unwrap_or_default()
    }
}

/// Gear set effects that scale levels or damage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackModifiers {
    pub void_multiplier: f64,
    pub gear_multiplier: f64,
    pub overall_multiplier: f64,
}

impl Default for AttackModifiers {
    fn default() -> Self {
        Self {
            void_multiplier: 1.0,
            gear_multiplier: 1.0,
            overall_multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackOutcome {
    pub damage: i32,
    pub max_hit: i32,
    pub hit_chance: f64,
    /// Overhead prayer forced the damage to zero
    pub blocked: bool,
    pub style: AttackStyle,
    pub xp: Vec<XpDrop>,
}

/// `floor((floor(level * prayer) + style_bonus + 8) * void)`
pub fn effective_level(level: i32, prayer: f64, style_bonus: i32, void_multiplier: f64) -> i64 {
    let prayed = (f64::from(level) * prayer).floor();
    ((prayed + f64::from(style_bonus) + 8.0) * void_multiplier).floor() as i64
}

/// Asymmetric accuracy formula
pub fn hit_chance(attack_roll: i64, defence_roll: i64) -> f64 {
    let attack = attack_roll.max(0) as f64;
    let defence = defence_roll.max(0) as f64;
    if attack > defence {
        1.0 - (defence + 2.0) / (2.0 * attack + 1.0)
    } else {
        attack / (2.0 * defence + 1.0)
    }
}

pub fn attack_roll(weapon: &Weapon, from: &Combatant, mods: &AttackModifiers) -> i64 {
    let stance = from.stance();
    let bonus = from.bonuses.attack.get(weapon.style);
    let level = match weapon.kind {
        WeaponKind::Melee => effective_level(
            from.stats.attack,
            from.prayer(PrayerFeature::Attack),
            stance.attack_bonus(),
            mods.void_multiplier,
        ),
        WeaponKind::Ranged => effective_level(
            from.stats.range,
            from.prayer(PrayerFeature::RangedAccuracy),
            stance.attack_bonus(),
            mods.void_multiplier,
        ),
        WeaponKind::Magic => magic_level(from, mods),
    };
    (level as f64 * f64::from(bonus + 64) * mods.gear_multiplier).floor() as i64
}

/// `floor(floor(magic * prayer) * void + accurate bonus + 9)`
fn magic_level(from: &Combatant, mods: &AttackModifiers) -> i64 {
    let prayed = (f64::from(from.stats.magic) * from.prayer(PrayerFeature::MagicAccuracy)).floor();
    let accurate = if from.is_player && from.stance() == CombatStance::Accurate {
        2.0
    } else {
        0.0
    };
    (prayed * mods.void_multiplier + accurate + 9.0).floor() as i64
}

pub fn defence_roll(style: AttackStyle, to: &Combatant) -> i64 {
    let bonus = i64::from(to.bonuses.defence.get(style) + 64);
    if !to.is_player {
        let level = if style == AttackStyle::Magic {
            to.stats.magic
        } else {
            to.stats.defence
        };
        return i64::from(level + 9) * bonus;
    }
    if style == AttackStyle::Magic {
        let prayed = (f64::from(to.stats.magic) * to.prayer(PrayerFeature::MagicAccuracy)).floor();
        return (prayed as i64 + 9) * bonus;
    }
    let level = effective_level(
        to.stats.defence,
        to.prayer(PrayerFeature::Defence),
        to.stance().defence_bonus(),
        1.0,
    );
    level * bonus
}

pub fn max_hit(weapon: &Weapon, from: &Combatant, mods: &AttackModifiers) -> i32 {
    let stance = from.stance();
    let (level, strength_bonus) = match weapon.kind {
        WeaponKind::Melee => (
            effective_level(
                from.stats.strength,
                from.prayer(PrayerFeature::Strength),
                stance.strength_bonus(),
                mods.void_multiplier,
            ),
            from.bonuses.other.melee_strength,
        ),
        WeaponKind::Ranged => (
            effective_level(
                from.stats.range,
                from.prayer(PrayerFeature::RangedStrength),
                stance.attack_bonus(),
                mods.void_multiplier,
            ),
            from.bonuses.other.ranged_strength,
        ),
        WeaponKind::Magic => {
            let base = f64::from(weapon.base_spell_damage) * from.bonuses.other.magic_damage;
            return (base * mods.overall_multiplier).floor() as i32;
        }
    };
    let base = ((level * i64::from(strength_bonus + 64) + 320) / 640) as f64;
    (base * mods.gear_multiplier * mods.overall_multiplier).floor() as i32
}

/// Roll an attack from `from` against `to`
///
/// The accuracy roll is always drawn; the damage roll only on a hit. An
/// active matching overhead zeroes the damage after rolling.
pub fn resolve_attack(
    weapon: &Weapon,
    from: &Combatant,
    to: &Combatant,
    mods: &AttackModifiers,
    rng: &mut SimRng,
) -> AttackOutcome {
    let style = weapon.style;
    let chance = hit_chance(attack_roll(weapon, from, mods), defence_roll(style, to));
    let max_hit = max_hit(weapon, from, mods);

    let mut damage = if rng::roll(rng) > chance {
        0
    } else {
        rng::below(rng, max_hit)
    };

    let blocked = weapon.blockable && to.prayers.protects_against(style);
    if blocked {
        damage = 0;
    }
    damage = damage.min(to.stats.hitpoint).max(0);

    let xp = if from.is_player {
        from.stance().xp_drops(style, damage)
    } else {
        Vec::new()
    };

    AttackOutcome {
        damage,
        max_hit,
        hit_chance: chance,
        blocked,
        style,
        xp,
    }
}
