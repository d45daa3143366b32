//! Scenario replay from a URL query
//!
//! A replay link carries the player position and, per mob type, a JSON array
//! of `[x, y]` spawn points in wave coordinates, e.g.
//! `?wave=62&x=28&y=17&ranger=%5B%5B2,3%5D%5D`. Spawn points are shifted by
//! the arena offset when applied.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};
use crate::core::types::{Location, UnitId};
use crate::units::MobProfile;
use crate::world::region::Region;

/// Wave coordinates to region coordinates
pub const SPAWN_OFFSET: (i32, i32) = (11, 14);

/// Query keys holding spawn arrays, in the order they are spawned
pub const MOB_KEYS: [&str; 6] = ["mager", "ranger", "melee", "blob", "bat", "sol"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobSpawn {
    pub key: String,
    /// Wave coordinates, before `SPAWN_OFFSET`
    pub location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub wave: Option<i32>,
    pub player: Option<Location>,
    pub spawns: Vec<MobSpawn>,
}

fn percent_decode(value: &str) -> Result<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = value
                    .get(i + 1..i + 3)
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| {
                        SimError::InvalidScenario(format!("bad percent escape in {value:?}"))
                    })?;
                out.push(hex);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|e| SimError::InvalidScenario(e.to_string()))
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~' | b',') {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{b:02X}");
        }
    }
    out
}

fn parse_int(key: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| SimError::InvalidScenario(format!("{key}={value:?} is not an integer")))
}

impl Scenario {
    /// Parse a query string, with or without the leading `?`
    pub fn from_query(query: &str) -> Result<Self> {
        let query = query.trim().trim_start_matches('?');
        let mut scenario = Scenario::default();
        let (mut x, mut y) = (None, None);
        let mut arrays: Vec<(usize, Vec<[i32; 2]>)> = Vec::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode(raw)?;
            match key {
                "wave" => scenario.wave = Some(parse_int(key, &value)?),
                "x" => x = Some(parse_int(key, &value)?),
                "y" => y = Some(parse_int(key, &value)?),
                _ => match MOB_KEYS.iter().position(|k| *k == key) {
                    Some(order) => {
                        let points: Vec<[i32; 2]> = serde_json::from_str(&value).map_err(|e| {
                            SimError::InvalidScenario(format!("{key} spawns: {e}"))
                        })?;
                        arrays.push((order, points));
                    }
                    None => tracing::debug!(key, "ignoring unknown query key"),
                },
            }
        }

        scenario.player = match (x, y) {
            (Some(x), Some(y)) => Some(Location::new(x, y)),
            (None, None) => None,
            _ => {
                return Err(SimError::InvalidScenario(
                    "player x and y must be given together".into(),
                ))
            }
        };

        arrays.sort_by_key(|(order, _)| *order);
        for (order, points) in arrays {
            scenario
                .spawns
                .extend(points.into_iter().map(|[x, y]| MobSpawn {
                    key: MOB_KEYS[order].to_string(),
                    location: Location::new(x, y),
                }));
        }
        Ok(scenario)
    }

    /// Rebuild the replay query for this scenario
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(wave) = self.wave {
            parts.push(format!("wave={wave}"));
        }
        if let Some(player) = self.player {
            parts.push(format!("x={}&y={}", player.x, player.y));
        }
        for key in MOB_KEYS {
            let points: Vec<[i32; 2]> = self
                .spawns
                .iter()
                .filter(|s| s.key == key)
                .map(|s| [s.location.x, s.location.y])
                .collect();
            if points.is_empty() {
                continue;
            }
            let json = serde_json::to_string(&points).unwrap_or_default();
            parts.push(format!("{key}={}", percent_encode(&json)));
        }
        format!("?{}", parts.join("&"))
    }

    /// Place the player and spawn every mob with a known profile
    ///
    /// Spawns that do not fit or name an unsupported mob are logged and
    /// skipped. Returns the ids of the mobs that were spawned.
    pub fn apply(&self, region: &mut Region) -> Vec<UnitId> {
        let player_id = region.player_id();
        if let (Some(location), Some(player)) = (self.player, region.player_mut()) {
            player.location = location;
            player.perceived_location = location;
            if let Some(state) = player.player_mut() {
                state.destination = location;
            }
        }

        let mut spawned = Vec::new();
        for spawn in &self.spawns {
            let Some(profile) = MobProfile::by_key(&spawn.key) else {
                tracing::warn!(key = %spawn.key, "no profile for scenario mob, skipping");
                continue;
            };
            let location = spawn.location.offset(SPAWN_OFFSET.0, SPAWN_OFFSET.1);
            match region.spawn_mob(profile, location, player_id) {
                Ok(id) => spawned.push(id),
                Err(err) => tracing::warn!(key = %spawn.key, error = %err, "scenario spawn rejected"),
            }
        }
        tracing::info!(wave = ?self.wave, mobs = spawned.len(), "scenario applied");
        spawned
    }
}
