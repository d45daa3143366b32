//! Line of sight between footprints

use crate::core::types::Location;
use crate::spatial::collision::collision_math;
use crate::world::region::Region;

/// Tile of a footprint nearest to `point`
pub fn closest_tile(location: Location, size: i32, point: Location) -> Location {
    Location::new(
        point.x.clamp(location.x, location.x + size - 1),
        point.y.clamp(location.y - size + 1, location.y),
    )
}

/// Chebyshev gap between two footprints; 0 when they overlap, 1 when touching
pub fn footprint_gap(a: Location, a_size: i32, b: Location, b_size: i32) -> i32 {
    let dx = (b.x - (a.x + a_size - 1)).max(a.x - (b.x + b_size - 1)).max(0);
    let dy = ((b.y - b_size + 1) - a.y).max((a.y - a_size + 1) - b.y).max(0);
    dx.max(dy)
}

fn blocks_sight(region: &Region, tile: Location) -> bool {
    region.entities.iter().any(|e| {
        e.blocks_line_of_sight()
            && collision_math(tile.x, tile.y, 1, e.location.x, e.location.y, e.size)
    })
}

/// Bresenham walk between two tiles; endpoints are not checked
pub fn is_line_clear(region: &Region, from: Location, to: Location) -> bool {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    loop {
        if (x, y) == (to.x, to.y) {
            return true;
        }
        if (x, y) != (from.x, from.y) && blocks_sight(region, Location::new(x, y)) {
            return false;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Can a footprint at `origin` attack one at `target` from `range` tiles
///
/// Diagonal contact counts as range 1. Overlapping footprints never have
/// line of sight.
pub fn has_line_of_sight(
    region: &Region,
    origin: Location,
    size: i32,
    target: Location,
    target_size: i32,
    range: i32,
) -> bool {
    let gap = footprint_gap(origin, size, target, target_size);
    if gap == 0 || gap > range {
        return false;
    }
    let to = closest_tile(target, target_size, origin);
    let from = closest_tile(origin, size, to);
    is_line_clear(region, from, to)
}
