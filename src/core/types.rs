//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter (one tick is 600ms of game time)
pub type Tick = u64;

/// Integer grid tile
///
/// A unit of `size` anchored at `(x, y)` covers columns `x..=x + size - 1`
/// and rows `y - size + 1..=y`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// King-move distance between two tiles
    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Straight-line distance between two tiles
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(i32, i32)> for Location {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Generation-checked handle into a region's unit table
///
/// A handle goes stale as soon as its slot is freed; lookups with a stale
/// handle return `None` instead of aliasing whatever took the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId {
    index: u32,
    generation: u32,
}

impl UnitId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Identifier for terrain and hazard entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Identifier for items lying on the ground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundItemId(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_chebyshev() {
        let a = Location::new(14, 14);
        assert_eq!(a.chebyshev(&Location::new(20, 14)), 6);
        assert_eq!(a.chebyshev(&Location::new(15, 15)), 1);
        assert_eq!(a.chebyshev(&a), 0);
    }

    #[test]
    fn test_location_distance() {
        let a = Location::new(0, 0);
        let b = Location::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_unit_id_equality_includes_generation() {
        let a = UnitId::new(3, 0);
        let b = UnitId::new(3, 1);
        assert_ne!(a, b);
        assert_eq!(a.index(), b.index());
    }
}
