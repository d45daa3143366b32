//! Prayers and the active prayer book
//!
//! Formulas never ask for a prayer by name. They ask for a `PrayerFeature`
//! (e.g. "defence multiplier") and take the first active prayer providing it,
//! so tiers like Thick Skin / Rock Skin / Piety all answer the same question.

use serde::{Deserialize, Serialize};

use crate::combat::stance::{AttackStyle, ProtectionCategory};

/// A capability a prayer provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrayerFeature {
    ProtectMelee,
    ProtectRange,
    ProtectMagic,
    Attack,
    Strength,
    Defence,
    RangedAccuracy,
    RangedStrength,
    MagicAccuracy,
}

/// Exclusivity groups; activating a prayer turns off others sharing a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PrayerGroup {
    Overhead,
    Defence,
    Attack,
    Strength,
    Ranged,
    Magic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prayer {
    ThickSkin,
    BurstOfStrength,
    ClarityOfThought,
    SharpEye,
    MysticWill,
    RockSkin,
    SuperhumanStrength,
    ImprovedReflexes,
    HawkEye,
    MysticLore,
    SteelSkin,
    UltimateStrength,
    IncredibleReflexes,
    EagleEye,
    MysticMight,
    ProtectFromMagic,
    ProtectFromMissiles,
    ProtectFromMelee,
    Chivalry,
    Piety,
    Rigour,
    Augury,
}

impl Prayer {
    pub const ALL: [Prayer; 22] = [
        Prayer::ThickSkin,
        Prayer::BurstOfStrength,
        Prayer::ClarityOfThought,
        Prayer::SharpEye,
        Prayer::MysticWill,
        Prayer::RockSkin,
        Prayer::SuperhumanStrength,
        Prayer::ImprovedReflexes,
        Prayer::HawkEye,
        Prayer::MysticLore,
        Prayer::SteelSkin,
        Prayer::UltimateStrength,
        Prayer::IncredibleReflexes,
        Prayer::EagleEye,
        Prayer::MysticMight,
        Prayer::ProtectFromMagic,
        Prayer::ProtectFromMissiles,
        Prayer::ProtectFromMelee,
        Prayer::Chivalry,
        Prayer::Piety,
        Prayer::Rigour,
        Prayer::Augury,
    ];

    /// Multiplier this prayer applies for `feature`, if it provides it
    pub fn multiplier(&self, feature: PrayerFeature) -> Option<f64> {
        use Prayer::*;
        use PrayerFeature as F;
        let value = match (self, feature) {
            (ThickSkin, F::Defence) => 1.05,
            (RockSkin, F::Defence) => 1.1,
            (SteelSkin, F::Defence) => 1.15,
            (BurstOfStrength, F::Strength) => 1.05,
            (SuperhumanStrength, F::Strength) => 1.1,
            (UltimateStrength, F::Strength) => 1.15,
            (ClarityOfThought, F::Attack) => 1.05,
            (ImprovedReflexes, F::Attack) => 1.1,
            (IncredibleReflexes, F::Attack) => 1.15,
            (SharpEye, F::RangedAccuracy | F::RangedStrength) => 1.05,
            (HawkEye, F::RangedAccuracy | F::RangedStrength) => 1.1,
            (EagleEye, F::RangedAccuracy | F::RangedStrength) => 1.15,
            (MysticWill, F::MagicAccuracy) => 1.05,
            (MysticLore, F::MagicAccuracy) => 1.1,
            (MysticMight, F::MagicAccuracy) => 1.15,
            (Chivalry, F::Attack) => 1.15,
            (Chivalry, F::Strength) => 1.18,
            (Chivalry, F::Defence) => 1.2,
            (Piety, F::Attack) => 1.2,
            (Piety, F::Strength) => 1.23,
            (Piety, F::Defence) => 1.25,
            (Rigour, F::RangedAccuracy) => 1.2,
            (Rigour, F::RangedStrength) => 1.23,
            (Rigour, F::Defence) => 1.25,
            (Augury, F::MagicAccuracy) => 1.25,
            (Augury, F::Defence) => 1.25,
            (ProtectFromMelee, F::ProtectMelee) => 1.0,
            (ProtectFromMissiles, F::ProtectRange) => 1.0,
            (ProtectFromMagic, F::ProtectMagic) => 1.0,
            _ => return None,
        };
        Some(value)
    }

    pub fn provides(&self, feature: PrayerFeature) -> bool {
        self.multiplier(feature).is_some()
    }

    /// Which attacks this overhead blocks
    pub fn protects(&self) -> Option<ProtectionCategory> {
        match self {
            Prayer::ProtectFromMelee => Some(ProtectionCategory::Melee),
            Prayer::ProtectFromMissiles => Some(ProtectionCategory::Range),
            Prayer::ProtectFromMagic => Some(ProtectionCategory::Magic),
            _ => None,
        }
    }

    pub fn is_overhead(&self) -> bool {
        self.protects().is_some()
    }

    /// Prayer points drained per tick, in drain-counter units
    pub fn drain_rate(&self) -> u32 {
        use Prayer::*;
        match self {
            ThickSkin | BurstOfStrength | ClarityOfThought | SharpEye | MysticWill => 1,
            RockSkin | SuperhumanStrength | ImprovedReflexes | HawkEye | MysticLore => 6,
            SteelSkin | UltimateStrength | IncredibleReflexes | EagleEye | MysticMight => 12,
            ProtectFromMagic | ProtectFromMissiles | ProtectFromMelee => 12,
            Chivalry | Piety | Rigour | Augury => 24,
        }
    }

    fn groups(&self) -> &'static [PrayerGroup] {
        use Prayer::*;
        use PrayerGroup as G;
        match self {
            ThickSkin | RockSkin | SteelSkin => &[G::Defence],
            BurstOfStrength | SuperhumanStrength | UltimateStrength => &[G::Strength],
            ClarityOfThought | ImprovedReflexes | IncredibleReflexes => &[G::Attack],
            SharpEye | HawkEye | EagleEye => &[G::Ranged],
            MysticWill | MysticLore | MysticMight => &[G::Magic],
            ProtectFromMagic | ProtectFromMissiles | ProtectFromMelee => &[G::Overhead],
            Chivalry | Piety => &[G::Defence, G::Attack, G::Strength],
            Rigour => &[G::Defence, G::Ranged],
            Augury => &[G::Defence, G::Magic],
        }
    }

    /// Whether two prayers cannot be active together
    pub fn conflicts_with(&self, other: &Prayer) -> bool {
        if self == other {
            return false;
        }
        let melee = |g: &PrayerGroup| matches!(g, PrayerGroup::Attack | PrayerGroup::Strength);
        let missile = |g: &PrayerGroup| matches!(g, PrayerGroup::Ranged | PrayerGroup::Magic);
        self.groups().iter().any(|g| {
            other.groups().iter().any(|h| {
                g == h || (melee(g) && missile(h)) || (missile(g) && melee(h))
            })
        })
    }
}

/// Prayers currently switched on for one unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrayerBook {
    active: Vec<Prayer>,
    drain_counter: u32,
    last_overhead: Option<Prayer>,
}

impl PrayerBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &[Prayer] {
        &self.active
    }

    pub fn is_active(&self, prayer: Prayer) -> bool {
        self.active.contains(&prayer)
    }

    /// Switch a prayer on, switching off anything it conflicts with
    pub fn activate(&mut self, prayer: Prayer) {
        if self.is_active(prayer) {
            return;
        }
        self.active.retain(|p| !p.conflicts_with(&prayer));
        self.active.push(prayer);
    }

    pub fn deactivate(&mut self, prayer: Prayer) {
        self.active.retain(|p| *p != prayer);
    }

    pub fn toggle(&mut self, prayer: Prayer) {
        if self.is_active(prayer) {
            self.deactivate(prayer);
        } else {
            self.activate(prayer);
        }
    }

    pub fn deactivate_all(&mut self) {
        self.active.clear();
    }

    pub fn overhead(&self) -> Option<Prayer> {
        self.active.iter().copied().find(Prayer::is_overhead)
    }

    /// Multiplier for `feature` from the first active prayer providing it
    pub fn multiplier(&self, feature: PrayerFeature) -> f64 {
        self.active
            .iter()
            .find_map(|p| p.multiplier(feature))
            .unwrap_or(1.0)
    }

    pub fn protects_against(&self, style: AttackStyle) -> bool {
        self.overhead()
            .and_then(|p| p.protects())
            .is_some_and(|category| category == style.protection())
    }

    /// Report an overhead change since the last call, as `(previous, current)`
    pub fn take_overhead_change(&mut self) -> Option<(Option<Prayer>, Option<Prayer>)> {
        let current = self.overhead();
        if current == self.last_overhead {
            return None;
        }
        let previous = std::mem::replace(&mut self.last_overhead, current);
        Some((previous, current))
    }

    /// Drain prayer points for one tick
    ///
    /// Resistance is `2 * prayer_bonus + 60`; every full resistance worth of
    /// accumulated drain costs one point. Returns true when points ran out and
    /// every prayer was switched off.
    pub fn drain(&mut self, points: &mut i32, prayer_bonus: i32) -> bool {
        if self.active.is_empty() {
            return false;
        }
        let resistance = (2 * prayer_bonus + 60).max(1) as u32;
        self.drain_counter += self.active.iter().map(Prayer::drain_rate).sum::<u32>();
        while self.drain_counter > resistance {
            self.drain_counter -= resistance;
            *points -= 1;
        }
        if *points <= 0 {
            *points = 0;
            self.deactivate_all();
            return true;
        }
        false
    }
}
