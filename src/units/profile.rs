//! Mob profiles
//!
//! A mob's numbers and weapons as data. `script` picks a scripted behavior
//! layered on top of the generic mob state machine.

use serde::{Deserialize, Serialize};

use crate::combat::{AttackStyle, StyleBonuses, UnitBonuses, UnitStats, Weapon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobScript {
    /// Walk toward the target and attack when in range
    #[default]
    Standard,
    /// Fortis Colosseum final boss
    SolHeredit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MobProfile {
    pub name: String,
    pub stats: UnitStats,
    pub bonuses: UnitBonuses,
    pub size: i32,
    pub weapon: Weapon,
    /// Swapped in when the target is in melee contact
    #[serde(default)]
    pub melee_weapon: Option<Weapon>,
    pub death_animation_length: i32,
    /// Ticks stunned after spawning
    #[serde(default)]
    pub initial_stun: i32,
    /// Tiles moved per tick
    pub max_speed: i32,
    /// Ticks a projectile is held before the target receives it
    #[serde(default)]
    pub projectile_release_delay: i32,
    #[serde(default = "default_auto_retaliate")]
    pub auto_retaliate: bool,
    #[serde(default)]
    pub script: MobScript,
}

fn default_auto_retaliate() -> bool {
    true
}

impl MobProfile {
    /// Look up a built-in profile by its scenario key
    pub fn by_key(key: &str) -> Option<Self> {
        match key {
            "ranger" => Some(Self::jal_xil()),
            "melee" => Some(Self::jal_im_kot()),
            "mager" => Some(Self::jal_zek()),
            "sol" => Some(Self::sol_heredit()),
            _ => None,
        }
    }

    pub fn sol_heredit() -> Self {
        Self {
            name: "Sol Heredit".to_string(),
            stats: UnitStats {
                attack: 350,
                strength: 400,
                defence: 200,
                range: 350,
                magic: 300,
                hitpoint: 1500,
                ..UnitStats::default()
            },
            bonuses: UnitBonuses {
                attack: StyleBonuses {
                    stab: 250,
                    magic: 80,
                    range: 150,
                    ..StyleBonuses::default()
                },
                defence: StyleBonuses {
                    stab: 65,
                    slash: 5,
                    crush: 30,
                    magic: 750,
                    range: 825,
                },
                other: crate::combat::OtherBonuses {
                    ranged_strength: 5,
                    ..Default::default()
                },
            },
            size: 5,
            weapon: Weapon::melee("Spear", AttackStyle::Stab, 7),
            melee_weapon: None,
            death_animation_length: 8,
            initial_stun: 4,
            max_speed: 2,
            projectile_release_delay: 0,
            auto_retaliate: true,
            script: MobScript::SolHeredit,
        }
    }

    /// Inferno ranger; releases its projectile two ticks after firing
    pub fn jal_xil() -> Self {
        Self {
            name: "Jal-Xil".to_string(),
            stats: UnitStats {
                attack: 140,
                strength: 180,
                defence: 60,
                range: 250,
                magic: 90,
                hitpoint: 125,
                ..UnitStats::default()
            },
            bonuses: UnitBonuses {
                attack: StyleBonuses {
                    range: 40,
                    ..StyleBonuses::default()
                },
                defence: StyleBonuses::default(),
                other: crate::combat::OtherBonuses {
                    ranged_strength: 50,
                    ..Default::default()
                },
            },
            size: 3,
            weapon: Weapon::ranged("Jal-Xil bolts", 4, 15),
            melee_weapon: Some(Weapon::melee("Jal-Xil crush", AttackStyle::Crush, 4)),
            death_animation_length: 3,
            initial_stun: 1,
            max_speed: 1,
            projectile_release_delay: 2,
            auto_retaliate: true,
            script: MobScript::Standard,
        }
    }

    /// Inferno meleer
    pub fn jal_im_kot() -> Self {
        Self {
            name: "Jal-ImKot".to_string(),
            stats: UnitStats {
                attack: 210,
                strength: 290,
                defence: 120,
                range: 220,
                magic: 120,
                hitpoint: 75,
                ..UnitStats::default()
            },
            bonuses: UnitBonuses {
                attack: StyleBonuses {
                    slash: 40,
                    ..StyleBonuses::default()
                },
                defence: StyleBonuses {
                    stab: 65,
                    slash: 65,
                    crush: 65,
                    magic: 30,
                    range: 50,
                },
                other: crate::combat::OtherBonuses {
                    melee_strength: 40,
                    ..Default::default()
                },
            },
            size: 4,
            weapon: Weapon::melee("Jal-ImKot claws", AttackStyle::Slash, 4),
            melee_weapon: None,
            death_animation_length: 3,
            initial_stun: 1,
            max_speed: 1,
            projectile_release_delay: 0,
            auto_retaliate: true,
            script: MobScript::Standard,
        }
    }

    /// Inferno mager
    pub fn jal_zek() -> Self {
        Self {
            name: "Jal-Zek".to_string(),
            stats: UnitStats {
                attack: 370,
                strength: 510,
                defence: 260,
                range: 510,
                magic: 300,
                hitpoint: 220,
                ..UnitStats::default()
            },
            bonuses: UnitBonuses {
                attack: StyleBonuses {
                    magic: 80,
                    ..StyleBonuses::default()
                },
                defence: StyleBonuses::default(),
                other: crate::combat::OtherBonuses::default(),
            },
            size: 4,
            weapon: Weapon {
                attack_range: 15,
                ..Weapon::magic("Jal-Zek blast", 70, 4)
            },
            melee_weapon: Some(Weapon::melee("Jal-Zek crush", AttackStyle::Crush, 4)),
            death_animation_length: 3,
            initial_stun: 1,
            max_speed: 1,
            projectile_release_delay: 0,
            auto_retaliate: true,
            script: MobScript::Standard,
        }
    }
}
