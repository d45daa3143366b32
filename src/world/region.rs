//! Region - the container for one play area
//!
//! Units live in a slot arena addressed by generation-checked `UnitId`s.
//! During its own step a unit is checked out of its slot, so the step can hold
//! `&mut Unit` while still mutating the rest of the region (targets, entities).

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{EntityId, GroundItemId, Location, UnitId};
use crate::units::{Loadout, MobProfile, Unit};
use crate::world::entity::{Entity, EntityKind};

/// Inclusive arena walls; playable tiles lie strictly inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaBounds {
    pub west: i32,
    pub east: i32,
    pub north: i32,
    pub south: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    pub id: GroundItemId,
    pub name: String,
    pub location: Location,
}

#[derive(Debug, Default)]
struct UnitSlot {
    generation: u32,
    unit: Option<Unit>,
    checked_out: bool,
}

#[derive(Debug, Default)]
pub struct Region {
    pub width: i32,
    pub height: i32,
    pub bounds: Option<ArenaBounds>,
    slots: Vec<UnitSlot>,
    free_slots: Vec<u32>,
    player: Option<UnitId>,
    /// Spawn order; mob passes iterate in this order
    mobs: Vec<UnitId>,
    pub entities: Vec<Entity>,
    next_entity_id: u32,
    pub ground_items: Vec<GroundItem>,
    next_item_id: u32,
}

impl Region {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: ArenaBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Whether a footprint of `size` anchored at `(x, y)` lies on the map
    pub fn in_bounds(&self, x: i32, y: i32, size: i32) -> bool {
        x >= 0 && y - size + 1 >= 0 && x + size - 1 < self.width && y < self.height
    }

    fn allocate(&mut self) -> UnitId {
        if let Some(index) = self.free_slots.pop() {
            return UnitId::new(index, self.slots[index as usize].generation);
        }
        self.slots.push(UnitSlot::default());
        UnitId::new((self.slots.len() - 1) as u32, 0)
    }

    fn place(&mut self, unit: Unit) {
        let slot = &mut self.slots[unit.id.index()];
        slot.unit = Some(unit);
        slot.checked_out = false;
    }

    fn check_spawn(&self, location: Location, size: i32) -> Result<()> {
        if !self.in_bounds(location.x, location.y, size) {
            return Err(SimError::InvalidSpawn {
                x: location.x,
                y: location.y,
                reason: format!("size {size} footprint leaves the {}x{} map", self.width, self.height),
            });
        }
        Ok(())
    }

    /// Spawn the player; a region holds at most one
    pub fn spawn_player(&mut self, location: Location, loadout: Loadout) -> Result<UnitId> {
        self.check_spawn(location, 1)?;
        if self.player.is_some() {
            return Err(SimError::InvalidSpawn {
                x: location.x,
                y: location.y,
                reason: "region already has a player".into(),
            });
        }
        let id = self.allocate();
        self.place(Unit::new_player(id, location, loadout));
        self.player = Some(id);
        tracing::debug!(unit = ?id, x = location.x, y = location.y, "spawned player");
        Ok(id)
    }

    pub fn spawn_mob(
        &mut self,
        profile: MobProfile,
        location: Location,
        aggro: Option<UnitId>,
    ) -> Result<UnitId> {
        self.check_spawn(location, profile.size)?;
        let id = self.allocate();
        let name = profile.name.clone();
        let mut unit = Unit::new_mob(id, profile, location);
        unit.aggro = aggro;
        self.place(unit);
        self.mobs.push(id);
        tracing::debug!(unit = ?id, name = %name, x = location.x, y = location.y, "spawned mob");
        Ok(id)
    }

    pub fn add_entity(&mut self, location: Location, size: i32, kind: EntityKind) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.push(Entity::new(id, location, size, kind));
        id
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn add_ground_item(&mut self, name: &str, location: Location) -> GroundItemId {
        let id = GroundItemId(self.next_item_id);
        self.next_item_id += 1;
        self.ground_items.push(GroundItem {
            id,
            name: name.to_string(),
            location,
        });
        id
    }

    pub fn ground_item(&self, id: GroundItemId) -> Option<&GroundItem> {
        self.ground_items.iter().find(|item| item.id == id)
    }

    pub fn take_ground_item(&mut self, id: GroundItemId) -> Option<GroundItem> {
        let index = self.ground_items.iter().position(|item| item.id == id)?;
        Some(self.ground_items.remove(index))
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.unit.as_ref())
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.unit.as_mut())
    }

    /// Present and not yet in its death sequence
    pub fn is_alive(&self, id: UnitId) -> bool {
        self.unit(id).is_some_and(Unit::is_alive)
    }

    pub fn player_id(&self) -> Option<UnitId> {
        self.player
    }

    pub fn player(&self) -> Option<&Unit> {
        self.player.and_then(|id| self.unit(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Unit> {
        let id = self.player?;
        self.unit_mut(id)
    }

    pub fn mob_ids(&self) -> Vec<UnitId> {
        self.mobs.clone()
    }

    /// Mobs currently in their slots (a checked-out mob is skipped)
    pub fn mobs(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.mobs.iter().filter_map(|id| self.unit(*id))
    }

    /// Take a unit out of its slot for its own step
    pub fn checkout(&mut self, id: UnitId) -> Option<Unit> {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())?;
        let unit = slot.unit.take()?;
        slot.checked_out = true;
        Some(unit)
    }

    /// Return a checked-out unit to its slot
    pub fn checkin(&mut self, unit: Unit) {
        let id = unit.id;
        match self.slots.get(id.index()) {
            Some(slot) if slot.generation == id.generation() && slot.checked_out => {
                self.place(unit)
            }
            _ => tracing::warn!(unit = ?id, "checkin for a unit that was not checked out"),
        }
    }

    /// Remove mobs and entities whose death sequence finished
    pub fn reap(&mut self) -> Vec<UnitId> {
        let mut reaped = Vec::new();
        let slots = &mut self.slots;
        let free_slots = &mut self.free_slots;
        self.mobs.retain(|id| {
            let slot = &mut slots[id.index()];
            let done = slot.unit.as_ref().is_some_and(Unit::is_removable);
            if done {
                slot.unit = None;
                slot.generation += 1;
                free_slots.push(id.index() as u32);
                reaped.push(*id);
            }
            !done
        });
        self.entities.retain(|e| e.dying != 0);
        if !reaped.is_empty() {
            tracing::debug!(count = reaped.len(), "reaped units");
        }
        reaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_bounds_uses_footprint() {
        let region = Region::new(10, 10);
        assert!(region.in_bounds(0, 0, 1));
        assert!(!region.in_bounds(0, 0, 2));
        assert!(region.in_bounds(8, 9, 2));
        assert!(!region.in_bounds(9, 9, 2));
    }

    #[test]
    fn test_stale_handle_after_reap() {
        let mut region = Region::new(20, 20);
        let first = region
            .spawn_mob(MobProfile::jal_xil(), Location::new(5, 5), None)
            .unwrap();
        region.unit_mut(first).unwrap().dying = 0;
        assert_eq!(region.reap(), vec![first]);
        assert!(region.unit(first).is_none());

        let second = region
            .spawn_mob(MobProfile::jal_xil(), Location::new(5, 5), None)
            .unwrap();
        assert_eq!(first.index(), second.index());
        assert!(region.unit(first).is_none());
        assert!(region.unit(second).is_some());
    }

    #[test]
    fn test_checkout_hides_unit() {
        let mut region = Region::new(20, 20);
        let id = region
            .spawn_mob(MobProfile::jal_xil(), Location::new(5, 5), None)
            .unwrap();
        let unit = region.checkout(id).unwrap();
        assert!(region.unit(id).is_none());
        assert_eq!(region.mobs().count(), 0);
        region.checkin(unit);
        assert!(region.unit(id).is_some());
    }

    #[test]
    fn test_spawn_outside_map_rejected() {
        let mut region = Region::new(10, 10);
        let err = region
            .spawn_mob(MobProfile::jal_xil(), Location::new(9, 9), None)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidSpawn { .. }));
    }

    #[test]
    fn test_single_player() {
        let mut region = Region::new(10, 10);
        region
            .spawn_player(Location::new(1, 1), Loadout::default())
            .unwrap();
        assert!(region
            .spawn_player(Location::new(2, 2), Loadout::default())
            .is_err());
    }

    #[test]
    fn test_ground_items() {
        let mut region = Region::new(10, 10);
        let id = region.add_ground_item("Shark", Location::new(3, 3));
        assert_eq!(region.ground_item(id).unwrap().name, "Shark");
        assert!(region.take_ground_item(id).is_some());
        assert!(region.take_ground_item(id).is_none());
    }
}
