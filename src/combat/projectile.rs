//! In-flight damage
//!
//! Damage is rolled when the attack fires and carried by a projectile until
//! its delay runs out. The hitpoint subtraction happens exactly once, on the
//! tick `remaining_delay` goes from 1 to 0.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::stance::AttackStyle;
use crate::combat::weapons::{Weapon, WeaponKind};
use crate::core::types::UnitId;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileOptions {
    /// No visible model in flight
    pub hidden: bool,
    /// Fixed delay instead of the weapon's distance-based one
    pub set_delay: Option<i32>,
    /// Ticks already spent before the projectile was handed over
    pub reduce_delay: i32,
    /// Re-check the target's overhead prayer when the projectile lands
    pub check_prayer_at_hit: bool,
}

impl Default for ProjectileOptions {
    fn default() -> Self {
        Self {
            hidden: false,
            set_delay: None,
            reduce_delay: 0,
            check_prayer_at_hit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: WeaponKind,
    pub blockable: bool,
    pub damage: i32,
    /// Attacking unit; `None` for terrain hazards
    pub from: Option<UnitId>,
    pub to: UnitId,
    pub style: AttackStyle,
    pub remaining_delay: i32,
    /// Position at the start of the current tick, in tile units
    pub current_location: Vec2,
    /// Total flight time, for interpolation
    pub total_delay: i32,
    pub options: ProjectileOptions,
}

impl Projectile {
    /// Launch a projectile from `origin` toward `to`
    ///
    /// `distance` is the footprint gap used for the weapon's travel time. The
    /// delay never drops below one tick, so damage always lands through the
    /// target's own incoming-attack pass.
    pub fn new(
        weapon: &Weapon,
        damage: i32,
        from: Option<UnitId>,
        to: UnitId,
        origin: Vec2,
        distance: i32,
        options: ProjectileOptions,
    ) -> Self {
        let delay = options
            .set_delay
            .unwrap_or_else(|| weapon.hit_delay(distance))
            - options.reduce_delay;
        let delay = delay.max(1);
        Self {
            kind: weapon.kind,
            blockable: weapon.blockable,
            damage: damage.max(0),
            from,
            to,
            style: weapon.style,
            remaining_delay: delay,
            current_location: origin,
            total_delay: delay,
            options,
        }
    }

    /// Advance one tick toward `target`
    ///
    /// Returns the damage to apply when this tick is the landing tick.
    pub fn advance(&mut self, target: Vec2) -> Option<i32> {
        if self.remaining_delay > 0 {
            let t = 1.0 / self.remaining_delay as f32;
            self.current_location = self.current_location.lerp(target, t);
        }
        self.remaining_delay -= 1;
        (self.remaining_delay == 0).then_some(self.damage)
    }

    /// Landed and already shown; eligible for removal
    pub fn is_spent(&self) -> bool {
        self.remaining_delay < 0
    }

    /// Interpolated render position; pure
    pub fn perceived_location(&self, target: Vec2, tick_percent: f64) -> Vec2 {
        if self.remaining_delay <= 0 {
            return target;
        }
        let step = tick_percent.clamp(0.0, 1.0) as f32 / self.remaining_delay as f32;
        self.current_location.lerp(target, step)
    }
}
