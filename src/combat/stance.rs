//! Attack styles, combat stances and experience splits
//!
//! The stance picked on the weapon panel adds flat invisible level bonuses and
//! decides which skills receive experience for damage dealt.

use serde::{Deserialize, Serialize};

/// Damage type of an attack, matched against defence bonuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStyle {
    Stab,
    Slash,
    Crush,
    Magic,
    Range,
}

/// Category an overhead protection prayer covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtectionCategory {
    Melee,
    Range,
    Magic,
}

impl AttackStyle {
    pub fn is_melee(&self) -> bool {
        matches!(self, AttackStyle::Stab | AttackStyle::Slash | AttackStyle::Crush)
    }

    /// Melee styles collapse into one protection category
    pub fn protection(&self) -> ProtectionCategory {
        match self {
            AttackStyle::Magic => ProtectionCategory::Magic,
            AttackStyle::Range => ProtectionCategory::Range,
            _ => ProtectionCategory::Melee,
        }
    }
}

/// Combat stance selected on the weapon panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatStance {
    #[default]
    Accurate,
    Aggressive,
    Defensive,
    Controlled,
    Rapid,
    Longrange,
    Autocast,
}

/// Skills that receive combat experience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Attack,
    Strength,
    Defence,
    Range,
    Magic,
    Hitpoint,
}

/// Experience gained in one skill from one hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpDrop {
    pub skill: Skill,
    pub xp: f64,
}

impl CombatStance {
    /// Invisible attack level bonus
    pub fn attack_bonus(&self) -> i32 {
        match self {
            CombatStance::Accurate => 3,
            CombatStance::Controlled => 1,
            _ => 0,
        }
    }

    /// Invisible strength level bonus
    pub fn strength_bonus(&self) -> i32 {
        match self {
            CombatStance::Aggressive => 3,
            CombatStance::Controlled => 1,
            _ => 0,
        }
    }

    /// Invisible defence level bonus
    pub fn defence_bonus(&self) -> i32 {
        match self {
            CombatStance::Defensive | CombatStance::Longrange => 3,
            CombatStance::Controlled => 1,
            _ => 0,
        }
    }

    /// Rapid fires one tick faster
    pub fn speed_modifier(&self) -> i32 {
        match self {
            CombatStance::Rapid => -1,
            _ => 0,
        }
    }

    /// Experience multipliers per point of damage, excluding hitpoints
    fn xp_split(&self, style: AttackStyle) -> &'static [(Skill, f64)] {
        match (style, self) {
            (AttackStyle::Magic, CombatStance::Autocast) => &[(Skill::Magic, 2.0)],
            (AttackStyle::Magic, _) => &[(Skill::Magic, 4.0)],
            (AttackStyle::Range, CombatStance::Longrange) => {
                &[(Skill::Range, 2.0), (Skill::Defence, 2.0)]
            }
            (AttackStyle::Range, _) => &[(Skill::Range, 4.0)],
            (_, CombatStance::Aggressive) => &[(Skill::Strength, 4.0)],
            (_, CombatStance::Defensive) => &[(Skill::Defence, 4.0)],
            (_, CombatStance::Controlled) => &[
                (Skill::Attack, 1.33),
                (Skill::Strength, 1.33),
                (Skill::Defence, 1.33),
            ],
            _ => &[(Skill::Attack, 4.0)],
        }
    }

    /// Experience drops for `damage` dealt with `style` in this stance
    pub fn xp_drops(&self, style: AttackStyle, damage: i32) -> Vec<XpDrop> {
        if damage <= 0 {
            return Vec::new();
        }
        let damage = f64::from(damage);
        let mut drops = vec![XpDrop {
            skill: Skill::Hitpoint,
            xp: damage * 1.33,
        }];
        drops.extend(
            self.xp_split(style)
                .iter()
                .map(|&(skill, multiplier)| XpDrop {
                    skill,
                    xp: damage * multiplier,
                }),
        );
        drops
    }
}
