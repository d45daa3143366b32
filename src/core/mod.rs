pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use config::{BossAttackToggles, RunEnergyConfig, SimulationConfig};
pub use error::{Result, SimError};
pub use rng::SimRng;
pub use types::{EntityId, GroundItemId, Location, Tick, UnitId};
