//! Simulation configuration with documented constants
//!
//! Settings are loaded from TOML and handed to the world explicitly; nothing in
//! the simulation reads ambient global state.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for the simulation systems
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === CLOCK ===
    /// Wall-clock length of one tick in milliseconds
    ///
    /// Gameplay never reads this; it only paces `TickClock`.
    pub tick_ms: u64,

    /// Render frames drawn per tick when driven by a frame loop
    pub frames_per_tick: u32,

    // === RANDOMNESS ===
    /// Seed for the shared random source
    pub seed: u64,

    // === SUBSYSTEMS ===
    pub run: RunEnergyConfig,
    pub boss: BossAttackToggles,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_ms: 600,
            frames_per_tick: 30,
            seed: 0,
            run: RunEnergyConfig::default(),
            boss: BossAttackToggles::default(),
        }
    }
}

/// Run energy constants
///
/// Energy is stored in hundredths of a percent (10000 = 100%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunEnergyConfig {
    /// Energy ceiling
    pub max_energy: i32,

    /// Flat drain per running tick before the weight term
    pub base_drain: i32,

    /// Carried weight beyond this no longer increases drain
    pub weight_cap_kg: i32,

    /// Drain multiplier while a stamina effect is active
    pub stamina_multiplier: f64,

    /// Flat recovery per walking or idle tick, added to `agility / 6`
    pub recovery_base: i32,
}

impl Default for RunEnergyConfig {
    fn default() -> Self {
        Self {
            max_energy: 10_000,
            base_drain: 67,
            weight_cap_kg: 64,
            stamina_multiplier: 0.3,
            recovery_base: 8,
        }
    }
}

/// Which boss attacks may be picked by random selection
///
/// Forced attacks (phase transitions, scripted overrides) ignore these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossAttackToggles {
    pub use_spears: bool,
    pub use_shields: bool,
    pub use_triple_long: bool,
    pub use_triple_short: bool,
    pub use_grapple: bool,
}

impl Default for BossAttackToggles {
    fn default() -> Self {
        Self {
            use_spears: true,
            use_shields: true,
            use_triple_long: true,
            use_triple_short: true,
            use_grapple: true,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate().map_err(SimError::InvalidConfig)?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.as_ref().display(), seed = config.seed, "loaded simulation config");
        Ok(config)
    }

    /// Validate that configuration values are sensible
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tick_ms == 0 {
            return Err("tick_ms must be positive".into());
        }
        if self.frames_per_tick == 0 {
            return Err("frames_per_tick must be positive".into());
        }
        if self.run.max_energy <= 0 {
            return Err("run.max_energy must be positive".into());
        }
        if self.run.base_drain < 0 || self.run.recovery_base < 0 {
            return Err("run drain and recovery must not be negative".into());
        }
        if self.run.weight_cap_kg <= 0 {
            return Err("run.weight_cap_kg must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.run.stamina_multiplier) {
            return Err("run.stamina_multiplier must be in 0.0..=1.0".into());
        }
        Ok(())
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
