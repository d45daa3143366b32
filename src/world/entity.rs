//! Terrain and hazard entities
//!
//! Entities are everything on the grid that is not a unit: walls, invisible
//! edge blockers, pillars and the hazards boss telegraphs leave behind.

use serde::{Deserialize, Serialize};

use crate::core::types::{EntityId, Location, UnitId};

/// Damage dealt by a ground slam: base plus a uniform spread
pub const GROUND_SLAM_DAMAGE: (i32, i32) = (20, 15);

/// Damage dealt each tick by a sand pool: base plus a uniform spread
pub const SAND_POOL_DAMAGE: (i32, i32) = (5, 6);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Blocks movement and sight
    Wall,
    /// Invisible edge blocker; blocks movement only
    MovementBlocker,
    /// Blocks movement and sight
    Pillar,
    /// One-shot hazard stamped by a boss telegraph
    GroundSlam {
        source: UnitId,
        target: UnitId,
        /// Distance from the telegraph's origin, 0..=1, for ripple animation
        ripple: f64,
    },
    /// Persistent hazard that hurts any player standing in it
    SandPool,
}

/// Damage request raised by a hazard during the entity pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardStrike {
    pub entity: EntityId,
    pub source: Option<UnitId>,
    /// Specific unit to check, or `None` for whichever player is present
    pub target: Option<UnitId>,
    pub location: Location,
    pub size: i32,
    pub damage: (i32, i32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub location: Location,
    pub size: i32,
    pub kind: EntityKind,
    /// Ticks since placement
    pub age: u32,
    /// -1 while present, 0 once it should be reaped
    pub dying: i32,
}

impl Entity {
    pub fn new(id: EntityId, location: Location, size: i32, kind: EntityKind) -> Self {
        Self {
            id,
            location,
            size,
            kind,
            age: 0,
            dying: -1,
        }
    }

    pub fn blocks_movement(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Wall | EntityKind::MovementBlocker | EntityKind::Pillar
        )
    }

    pub fn blocks_line_of_sight(&self) -> bool {
        matches!(self.kind, EntityKind::Wall | EntityKind::Pillar)
    }

    pub fn is_hazard(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::GroundSlam { .. } | EntityKind::SandPool
        )
    }

    /// Advance one tick
    pub fn tick(&mut self) -> Option<HazardStrike> {
        self.age += 1;
        match self.kind {
            EntityKind::GroundSlam { source, target, .. } => {
                // Strikes on its first tick, then gets reaped the same tick
                self.dying = 0;
                Some(HazardStrike {
                    entity: self.id,
                    source: Some(source),
                    target: Some(target),
                    location: self.location,
                    size: self.size,
                    damage: GROUND_SLAM_DAMAGE,
                })
            }
            EntityKind::SandPool => Some(HazardStrike {
                entity: self.id,
                source: None,
                target: None,
                location: self.location,
                size: self.size,
                damage: SAND_POOL_DAMAGE,
            }),
            _ => None,
        }
    }
}
