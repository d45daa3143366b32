//! Spatial queries - collision, pathing and line of sight on the tile grid

pub mod collision;
pub mod line_of_sight;
pub mod pathing;

pub use collision::{
    can_occupy, collides_with_any_entities, collides_with_any_mobs, collision_math, is_occupied,
};
pub use line_of_sight::{closest_tile, footprint_gap, has_line_of_sight, is_line_clear};
pub use pathing::{
    angle, can_tile_be_pathed_to, construct_paths, dist, linear_interpolation, path, PathResult,
    PathStep, RUN_SPEED, WALK_SPEED,
};
