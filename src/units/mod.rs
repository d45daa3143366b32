//! Units - the player and mobs
//!
//! `unit` holds the record both share; `player` and `mob` hold the per-tick
//! steps the world runs for each side.

pub mod loadout;
pub mod mob;
pub mod player;
pub mod profile;
pub mod unit;

pub use loadout::{EquipmentSlot, Loadout};
pub use mob::{MobBehavior, MobState};
pub use player::PlayerState;
pub use profile::{MobProfile, MobScript};
pub use unit::{LandedHit, Unit, UnitKind};
