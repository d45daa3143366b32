//! World - the region, its entities and the tick loop

pub mod arena;
pub mod clock;
pub mod context;
pub mod delayed;
pub mod entity;
pub mod events;
pub mod input;
pub mod region;
pub mod scenario;
pub mod tick;

pub use clock::TickClock;
pub use context::TickContext;
pub use delayed::{DelayedAction, DelayedActionQueue, ScheduledAction};
pub use entity::{Entity, EntityKind};
pub use events::{HazardKind, SimulationEvent, SoundCue};
pub use input::{InputScript, PlayerInput, ScriptCommand, ScriptStep};
pub use region::{ArenaBounds, GroundItem, Region};
pub use scenario::{MobSpawn, Scenario};
pub use tick::{run_tick, World};
