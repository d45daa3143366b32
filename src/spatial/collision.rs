//! Footprint collision queries

use crate::core::types::UnitId;
use crate::world::region::Region;

/// Whether two square footprints overlap
///
/// A footprint of size `s` anchored at `(x, y)` spans `x..=x + s - 1` and
/// `y - s + 1..=y`.
pub fn collision_math(x: i32, y: i32, s: i32, x2: i32, y2: i32, s2: i32) -> bool {
    !(x > x2 + s2 - 1 || x + s - 1 < x2 || y - s + 1 > y2 || y < y2 - s2 + 1)
}

/// Any movement-blocking entity under the footprint
pub fn collides_with_any_entities(region: &Region, x: i32, y: i32, size: i32) -> bool {
    region.entities.iter().any(|entity| {
        entity.blocks_movement()
            && collision_math(
                x,
                y,
                size,
                entity.location.x,
                entity.location.y,
                entity.size,
            )
    })
}

/// First mob (other than `ignore`) whose footprint overlaps
pub fn collides_with_any_mobs(
    region: &Region,
    x: i32,
    y: i32,
    size: i32,
    ignore: Option<UnitId>,
) -> Option<UnitId> {
    region
        .mobs()
        .filter(|mob| Some(mob.id) != ignore && !mob.is_removable())
        .find(|mob| collision_math(x, y, size, mob.location.x, mob.location.y, mob.size))
        .map(|mob| mob.id)
}

/// Blocked by terrain or by another mob
pub fn is_occupied(region: &Region, x: i32, y: i32, size: i32, ignore: Option<UnitId>) -> bool {
    collides_with_any_entities(region, x, y, size)
        || collides_with_any_mobs(region, x, y, size, ignore).is_some()
}

/// On the map and not occupied
pub fn can_occupy(region: &Region, x: i32, y: i32, size: i32, ignore: Option<UnitId>) -> bool {
    region.in_bounds(x, y, size) && !is_occupied(region, x, y, size, ignore)
}
