//! Ground-slam telegraph shapes
//!
//! Spear and shield attacks stamp a pattern of slam tiles around the boss.
//! The shapes are built from two primitives: a filled rectangle with an
//! optional safe ring, and a Bresenham line running away from the boss.
//! Each tile carries a ripple value in `0..=1` for the expanding animation.

use serde::{Deserialize, Serialize};

use crate::core::types::Location;
use crate::spatial::closest_tile;

/// Length of the slam lines thrown toward the target
pub const LINE_LENGTH: i32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackDirection {
    West,
    East,
    North,
    South,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl AttackDirection {
    /// Unit step for this direction; north is -y
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::West => (-1, 0),
            Self::East => (1, 0),
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::NorthEast => (1, -1),
            Self::NorthWest => (-1, -1),
            Self::SouthEast => (1, 1),
            Self::SouthWest => (-1, 1),
        }
    }

    /// Direction of an offset; a zero offset falls through to south-west
    pub fn toward(dx: i32, dy: i32) -> Self {
        match (dx.signum(), dy.signum()) {
            (-1, 0) => Self::West,
            (-1, -1) => Self::NorthWest,
            (0, -1) => Self::North,
            (1, -1) => Self::NorthEast,
            (1, 0) => Self::East,
            (1, 1) => Self::SouthEast,
            (0, 1) => Self::South,
            _ => Self::SouthWest,
        }
    }
}

/// Which way the target lies from the nearest tile of the boss footprint
pub fn attack_direction(boss: Location, size: i32, target: Location) -> AttackDirection {
    let closest = closest_tile(boss, size, target);
    AttackDirection::toward(target.x - closest.x, target.y - closest.y)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlamTile {
    pub location: Location,
    pub ripple: f64,
}

/// Filled rectangle with its bounds taken exactly as given
///
/// Columns run `from_x..to_x` and rows `to_y` down to `from_y + 1`. Tiles on
/// the square ring at `except_radius` from the middle are left out.
pub fn fill_rect(
    from_x: i32,
    from_y: i32,
    to_x: i32,
    to_y: i32,
    except_radius: Option<i32>,
) -> Vec<SlamTile> {
    let mid_x = f64::from(to_x - from_x + 1) / 2.0;
    let mid_y = f64::from(to_y - from_y + 1) / 2.0;
    let radius = f64::from((from_x - to_x).abs()).max(1.0);
    let except = except_radius.map(f64::from);

    let mut tiles = Vec::new();
    for xx in from_x..to_x {
        for yy in (from_y + 1..=to_y).rev() {
            let rad_x = (mid_x - f64::from(xx) + f64::from(from_x)).abs();
            let rad_y = (mid_y - f64::from(yy) + f64::from(from_y)).abs();
            if let Some(e) = except {
                if (rad_x == e && rad_y <= e) || (rad_y == e && rad_x <= e) {
                    continue;
                }
            }
            tiles.push(SlamTile {
                location: Location::new(xx, yy),
                ripple: rad_x.max(rad_y) / radius,
            });
        }
    }
    tiles
}

/// Bresenham line of `length + 1` tiles starting at `from`
pub fn fill_line(from: Location, direction: AttackDirection, length: i32) -> Vec<SlamTile> {
    let (step_x, step_y) = direction.delta();
    let to = from.offset(step_x * length, step_y * length);
    let dx = (to.x - from.x).abs();
    let dy = (to.y - from.y).abs();
    let sx = (to.x - from.x).signum();
    let sy = (to.y - from.y).signum();
    let span = f64::from(length.max(1));

    let mut err = dx - dy;
    let (mut x, mut y) = (from.x, from.y);
    let mut tiles = Vec::new();
    for n in 0.. {
        tiles.push(SlamTile {
            location: Location::new(x, y),
            ripple: f64::from(n) / span,
        });
        if (x, y) == (to.x, to.y) {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    tiles
}

fn lines(starts: &[(i32, i32)], direction: AttackDirection) -> Vec<SlamTile> {
    starts
        .iter()
        .flat_map(|&(x, y)| fill_line(Location::new(x, y), direction, LINE_LENGTH))
        .collect()
}

/// Opening spear: the boss footprint plus two lines toward the target
pub fn first_spear(location: Location, size: i32, direction: AttackDirection) -> Vec<SlamTile> {
    use AttackDirection::*;
    let Location { x, y } = location;
    let s = size;
    let mut tiles = fill_rect(x, y - s, x + s, y, None);
    match direction {
        West => {
            tiles.extend(fill_rect(x - 1, y - s, x, y, None));
            tiles.extend(lines(&[(x - 2, y - 1), (x - 2, y - 3)], direction));
        }
        East => {
            tiles.extend(fill_rect(x + s, y - s, x + s + 1, y, None));
            tiles.extend(lines(&[(x + s + 1, y - 1), (x + s + 1, y - 3)], direction));
        }
        North => {
            tiles.extend(fill_rect(x, y - s - 1, x + s, y - s, None));
            tiles.extend(lines(&[(x + 1, y - s - 1), (x + 3, y - s - 1)], direction));
        }
        South => {
            tiles.extend(fill_rect(x, y, x + s, y + 1, None));
            tiles.extend(lines(&[(x + 1, y + 2), (x + 3, y + 2)], direction));
        }
        NorthEast => tiles.extend(lines(&[(x + s - 1, y - s), (x + s, y - s + 1)], direction)),
        SouthEast => tiles.extend(lines(&[(x + s, y), (x + s - 1, y + 1)], direction)),
        SouthWest => tiles.extend(lines(&[(x - 1, y), (x, y + 1)], direction)),
        NorthWest => tiles.extend(lines(&[(x - 1, y - s + 1), (x, y - s)], direction)),
    }
    tiles
}

/// Follow-up spear: a ring one tile wider than the boss and three lines
pub fn second_spear(location: Location, size: i32, direction: AttackDirection) -> Vec<SlamTile> {
    use AttackDirection::*;
    let Location { x, y } = location;
    let s = size;
    let mut tiles = fill_rect(x - 1, y - s - 1, x + s + 1, y + 1, None);
    let starts = match direction {
        West => {
            tiles.extend(fill_rect(x - 1, y - s, x, y, None));
            [(x - 2, y), (x - 2, y - 2), (x - 2, y - 4)]
        }
        East => [(x + s + 1, y), (x + s + 1, y - 2), (x + s + 1, y - 4)],
        North => [(x, y - s - 1), (x + 2, y - s - 1), (x + 4, y - s - 1)],
        South => [(x, y + 2), (x + 2, y + 2), (x + 4, y + 2)],
        NorthEast => [
            (x + s + 1, y - s - 1),
            (x + s - 2, y - s - 1),
            (x + s + 1, y - s + 2),
        ],
        SouthEast => [(x + s + 1, y - 1), (x + s + 1, y + 2), (x + s - 2, y + 2)],
        SouthWest => [(x - 2, y + 2), (x - 2, y - 1), (x + 1, y + 2)],
        NorthWest => [(x - 2, y - s + 2), (x - 2, y - s - 1), (x + 1, y - s - 1)],
    };
    tiles.extend(lines(&starts, direction));
    tiles
}

/// Shield slam: a wide square with a safe ring four (first) or five tiles
/// out from the boss's middle
pub fn shield(location: Location, first: bool) -> Vec<SlamTile> {
    let Location { x, y } = location;
    let safe_ring = if first { 4 } else { 5 };
    fill_rect(x - 8, y - 12, x + 11, y + 7, Some(safe_ring))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has(tiles: &[SlamTile], x: i32, y: i32) -> bool {
        tiles.iter().any(|t| t.location == Location::new(x, y))
    }

    #[test]
    fn test_direction_from_offsets() {
        assert_eq!(AttackDirection::toward(-3, 0), AttackDirection::West);
        assert_eq!(AttackDirection::toward(-1, -2), AttackDirection::NorthWest);
        assert_eq!(AttackDirection::toward(0, -1), AttackDirection::North);
        assert_eq!(AttackDirection::toward(2, -1), AttackDirection::NorthEast);
        assert_eq!(AttackDirection::toward(4, 0), AttackDirection::East);
        assert_eq!(AttackDirection::toward(1, 1), AttackDirection::SouthEast);
        assert_eq!(AttackDirection::toward(0, 3), AttackDirection::South);
        assert_eq!(AttackDirection::toward(-1, 1), AttackDirection::SouthWest);
        assert_eq!(AttackDirection::toward(0, 0), AttackDirection::SouthWest);
    }

    #[test]
    fn test_attack_direction_uses_closest_tile() {
        // Boss covers x 25..=29, y 20..=24
        let boss = Location::new(25, 24);
        assert_eq!(attack_direction(boss, 5, Location::new(27, 26)), AttackDirection::South);
        assert_eq!(attack_direction(boss, 5, Location::new(23, 22)), AttackDirection::West);
        assert_eq!(attack_direction(boss, 5, Location::new(31, 18)), AttackDirection::NorthEast);
    }

    #[test]
    fn test_rect_covers_footprint() {
        let tiles = fill_rect(25, 19, 30, 24, None);
        assert_eq!(tiles.len(), 25);
        assert!(has(&tiles, 25, 20));
        assert!(has(&tiles, 29, 24));
        assert!(!has(&tiles, 30, 24));
        assert!(!has(&tiles, 25, 19));
        assert!(tiles.iter().all(|t| (0.0..=1.0).contains(&t.ripple)));
    }

    #[test]
    fn test_line_walks_length_plus_one_tiles() {
        let tiles = fill_line(Location::new(10, 10), AttackDirection::West, 7);
        assert_eq!(tiles.len(), 8);
        assert_eq!(tiles[7].location, Location::new(3, 10));
        assert_eq!(tiles[0].ripple, 0.0);
        assert_eq!(tiles[7].ripple, 1.0);

        let diagonal = fill_line(Location::new(0, 0), AttackDirection::NorthEast, 3);
        let points: Vec<_> = diagonal.iter().map(|t| (t.location.x, t.location.y)).collect();
        assert_eq!(points, vec![(0, 0), (1, -1), (2, -2), (3, -3)]);
    }

    #[test]
    fn test_shield_leaves_safe_ring() {
        let boss = Location::new(25, 24);
        let first = shield(boss, true);
        // 19 x 19 square minus the 32-tile ring at distance 4
        assert_eq!(first.len(), 361 - 32);
        assert!(!has(&first, 27 + 4, 22));
        assert!(has(&first, 27 + 3, 22));
        assert!(has(&first, 27 + 5, 22));

        let second = shield(boss, false);
        assert_eq!(second.len(), 361 - 40);
        assert!(!has(&second, 27, 22 - 5));
        assert!(has(&second, 27, 22 - 4));
    }

    #[test]
    fn test_first_spear_south_lines() {
        let boss = Location::new(25, 24);
        let tiles = first_spear(boss, 5, AttackDirection::South);
        // Footprint, the row below it, then two 8-tile lines
        assert_eq!(tiles.len(), 25 + 5 + 16);
        assert!(has(&tiles, 26, 33));
        assert!(has(&tiles, 28, 33));
        assert!(!has(&tiles, 27, 33));
    }

    #[test]
    fn test_second_spear_grows_the_ring() {
        let boss = Location::new(25, 24);
        let tiles = second_spear(boss, 5, AttackDirection::East);
        assert_eq!(tiles.len(), 49 + 24);
        assert!(has(&tiles, 24, 25));
        assert!(has(&tiles, 38, 24));
        assert!(has(&tiles, 38, 20));
    }
}
