//! Combat - weapon formulas, prayers and projectiles
//!
//! Nothing here knows about the grid or the tick loop. Units hand their
//! stats, bonuses and prayers in; rolled damage comes back out wrapped in a
//! projectile for the target's incoming list.

pub mod prayer;
pub mod projectile;
pub mod resolution;
pub mod stance;
pub mod stats;
pub mod weapons;

pub use prayer::{Prayer, PrayerBook, PrayerFeature};
pub use projectile::{Projectile, ProjectileOptions};
pub use resolution::{
    attack_roll, defence_roll, effective_level, hit_chance, max_hit, resolve_attack,
    AttackModifiers, AttackOutcome, Combatant,
};
pub use stance::{AttackStyle, CombatStance, ProtectionCategory, Skill, XpDrop};
pub use stats::{OtherBonuses, StyleBonuses, UnitBonuses, UnitStats};
pub use weapons::{Weapon, WeaponKind};
