//! Feedback events raised during a tick
//!
//! The simulation never waits on these. A renderer plays sounds and draws
//! hitsplats from them; a headless run may drop them on the floor.

use serde::{Deserialize, Serialize};

use crate::combat::{AttackStyle, Skill};
use crate::core::types::{GroundItemId, Location, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    PrayerOn,
    PrayerOff,
    SpearStart,
    SpearEnd,
    ShieldStart,
    ShieldEnd,
    TripleStart,
    TripleCharge1,
    TripleCharge2,
    TripleCharge3Short,
    TripleCharge3Long,
    TripleParry1,
    TripleParry2,
    TripleParry3,
    GrappleCharge,
    GrappleParry,
    PoolSpawn,
    PoolShriek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    GroundSlam,
    SandPool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationEvent {
    Sound(SoundCue),
    OverheadText {
        unit: UnitId,
        text: String,
    },
    AttackLaunched {
        attacker: UnitId,
        target: UnitId,
        style: AttackStyle,
        max_hit: i32,
    },
    Hitsplat {
        target: UnitId,
        from: Option<UnitId>,
        damage: i32,
        blocked: bool,
    },
    Experience {
        skill: Skill,
        xp: f64,
    },
    Died {
        unit: UnitId,
    },
    Removed {
        unit: UnitId,
    },
    PhaseChanged {
        boss: UnitId,
        phase: i32,
    },
    HazardsPlaced {
        source: Option<UnitId>,
        kind: HazardKind,
        tiles: Vec<Location>,
    },
    PrayerDepleted {
        unit: UnitId,
    },
    ItemPickedUp {
        item: GroundItemId,
        name: String,
    },
}
