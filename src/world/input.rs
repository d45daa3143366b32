//! Player inputs
//!
//! Inputs are queued between ticks and applied at the start of the next one,
//! before any system runs. `InputScript` replays a fixed list of commands
//! keyed by tick, which is how headless runs and tests drive the player.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::{CombatStance, Prayer, Weapon};
use crate::core::error::{Result, SimError};
use crate::core::types::{GroundItemId, Tick, UnitId};
use crate::units::player;
use crate::units::{EquipmentSlot, Unit};
use crate::world::region::Region;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerInput {
    SetAggro { target: Option<UnitId> },
    MoveTo { x: i32, y: i32 },
    SetSeekingItem { item: GroundItemId },
    TogglePrayer { prayer: Prayer },
    SetRunning { running: bool },
    SetStance { stance: CombatStance },
    CastSpell { spell: Weapon, target: UnitId },
    EquipmentInteraction { slot: EquipmentSlot },
}

/// Apply one input to the checked-out player
pub fn apply_input(unit: &mut Unit, region: &Region, input: PlayerInput) -> Result<()> {
    let id = unit.id;
    let wrong_kind = || SimError::WrongUnitKind {
        unit: id,
        expected: "player",
    };
    match input {
        PlayerInput::SetAggro { target } => {
            if let Some(target) = target.filter(|t| region.unit(*t).is_none()) {
                tracing::warn!(target = ?target, "ignoring aggro on a missing unit");
                return Ok(());
            }
            player::set_aggro(unit, target)
        }
        PlayerInput::MoveTo { x, y } => player::move_to(unit, region, x, y),
        PlayerInput::SetSeekingItem { item } => player::set_seeking_item(unit, item),
        PlayerInput::TogglePrayer { prayer } => {
            if !unit.prayers.is_active(prayer) && unit.current_stats.prayer <= 0 {
                tracing::debug!(?prayer, "no prayer points left");
                return Ok(());
            }
            unit.prayers.toggle(prayer);
            Ok(())
        }
        PlayerInput::SetRunning { running } => {
            unit.player_mut().ok_or_else(wrong_kind)?.running = running;
            Ok(())
        }
        PlayerInput::SetStance { stance } => {
            unit.player_mut().ok_or_else(wrong_kind)?.stance = stance;
            Ok(())
        }
        PlayerInput::CastSpell { spell, target } => player::cast_spell(unit, spell, target),
        PlayerInput::EquipmentInteraction { slot } => {
            unit.player_mut()
                .ok_or_else(wrong_kind)?
                .equipment_interactions
                .push(slot);
            Ok(())
        }
    }
}

/// Scripted command; mobs are referred to by spawn order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ScriptCommand {
    Attack { mob: usize },
    ClearTarget,
    MoveTo { x: i32, y: i32 },
    Prayer { prayer: Prayer },
    Run { running: bool },
    Stance { stance: CombatStance },
    Barrage { mob: usize },
    Equipment { slot: EquipmentSlot },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub tick: Tick,
    #[serde(flatten)]
    pub command: ScriptCommand,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl InputScript {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut script: InputScript = toml::from_str(content)?;
        script.steps.sort_by_key(|step| step.tick);
        Ok(script)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let script = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.as_ref().display(), steps = script.steps.len(), "loaded input script");
        Ok(script)
    }

    /// Inputs for `tick`, with mob indices resolved against `region`
    pub fn inputs_for(&self, tick: Tick, region: &Region) -> Vec<PlayerInput> {
        let mobs = region.mob_ids();
        let resolve = |index: usize| {
            let id = mobs.get(index).copied();
            if id.is_none() {
                tracing::warn!(tick, mob = index, "script refers to a mob that does not exist");
            }
            id
        };
        self.steps
            .iter()
            .filter(|step| step.tick == tick)
            .filter_map(|step| match &step.command {
                ScriptCommand::Attack { mob } => resolve(*mob).map(|id| PlayerInput::SetAggro {
                    target: Some(id),
                }),
                ScriptCommand::ClearTarget => Some(PlayerInput::SetAggro { target: None }),
                ScriptCommand::MoveTo { x, y } => Some(PlayerInput::MoveTo { x: *x, y: *y }),
                ScriptCommand::Prayer { prayer } => {
                    Some(PlayerInput::TogglePrayer { prayer: *prayer })
                }
                ScriptCommand::Run { running } => Some(PlayerInput::SetRunning { running: *running }),
                ScriptCommand::Stance { stance } => Some(PlayerInput::SetStance { stance: *stance }),
                ScriptCommand::Barrage { mob } => resolve(*mob).map(|id| PlayerInput::CastSpell {
                    spell: Weapon::ice_barrage(),
                    target: id,
                }),
                ScriptCommand::Equipment { slot } => {
                    Some(PlayerInput::EquipmentInteraction { slot: *slot })
                }
            })
            .collect()
    }

    pub fn last_tick(&self) -> Tick {
        self.steps.last().map_or(0, |step| step.tick)
    }
}
