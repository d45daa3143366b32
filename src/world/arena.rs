//! Arena builders

use crate::core::error::Result;
use crate::core::types::{Location, UnitId};
use crate::units::{Loadout, MobProfile};
use crate::world::entity::EntityKind;
use crate::world::region::{ArenaBounds, Region};

pub const COLOSSEUM_WIDTH: i32 = 51;
pub const COLOSSEUM_HEIGHT: i32 = 57;

/// Wall ring of the Fortis Colosseum; the floor lies strictly inside
pub const COLOSSEUM_BOUNDS: ArenaBounds = ArenaBounds {
    west: 19,
    east: 34,
    north: 18,
    south: 33,
};

pub const PLAYER_START: Location = Location::new(27, 29);
pub const BOSS_START: Location = Location::new(25, 24);

/// Wall off the ring described by `bounds`
fn add_wall_ring(region: &mut Region, bounds: ArenaBounds) {
    for x in bounds.west..=bounds.east {
        region.add_entity(Location::new(x, bounds.north), 1, EntityKind::Wall);
        region.add_entity(Location::new(x, bounds.south), 1, EntityKind::Wall);
    }
    for y in bounds.north + 1..bounds.south {
        region.add_entity(Location::new(bounds.west, y), 1, EntityKind::Wall);
        region.add_entity(Location::new(bounds.east, y), 1, EntityKind::Wall);
    }
}

/// Empty colosseum floor with its walls and cut corners
pub fn colosseum() -> Region {
    let bounds = COLOSSEUM_BOUNDS;
    let mut region = Region::new(COLOSSEUM_WIDTH, COLOSSEUM_HEIGHT).with_bounds(bounds);
    add_wall_ring(&mut region, bounds);
    for corner in [
        Location::new(bounds.east - 1, bounds.north + 1),
        Location::new(bounds.west + 1, bounds.north + 1),
        Location::new(bounds.east - 1, bounds.south - 1),
        Location::new(bounds.west + 1, bounds.south - 1),
    ] {
        region.add_entity(corner, 1, EntityKind::Wall);
    }
    region
}

/// The standard encounter: player at the south end, Sol Heredit aggroed on them
pub fn colosseum_encounter(loadout: Loadout) -> Result<(Region, UnitId, UnitId)> {
    let mut region = colosseum();
    let player = region.spawn_player(PLAYER_START, loadout)?;
    let boss = region.spawn_mob(MobProfile::sol_heredit(), BOSS_START, Some(player))?;
    tracing::info!(player = ?player, boss = ?boss, "colosseum encounter ready");
    Ok((region, player, boss))
}

/// Open floor of the given size ringed by walls, for pathing drills
pub fn training_ground(width: i32, height: i32) -> Region {
    let bounds = ArenaBounds {
        west: 0,
        east: width - 1,
        north: 0,
        south: height - 1,
    };
    let mut region = Region::new(width, height).with_bounds(bounds);
    add_wall_ring(&mut region, bounds);
    region
}
