//! Delayed actions
//!
//! Scripted follow-ups (telegraph slams, parry checks, sound cues, held
//! projectiles) are plain data keyed by the absolute tick they fire on. The
//! world drains them at the end of every tick, NPC actions first, each queue
//! in scheduling order. Every action re-checks its owner when it fires; a
//! dead owner turns the action into a no-op.

use serde::{Deserialize, Serialize};

use crate::boss::sol_heredit;
use crate::combat::Projectile;
use crate::core::error::Result;
use crate::core::types::{Tick, UnitId};
use crate::units::EquipmentSlot;
use crate::world::context::TickContext;
use crate::world::events::SimulationEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DelayedAction {
    /// Raise an event on behalf of `owner`
    Emit {
        owner: UnitId,
        event: SimulationEvent,
    },
    SpearSlam {
        boss: UnitId,
        first: bool,
    },
    ShieldSlam {
        boss: UnitId,
        first: bool,
    },
    /// Triple-attack hit; punished if the overhead was up during `window`
    Parry {
        boss: UnitId,
        damage: i32,
        window: usize,
    },
    Grapple {
        boss: UnitId,
        slot: EquipmentSlot,
    },
    RestoreAggro {
        unit: UnitId,
        target: Option<UnitId>,
    },
    /// Hand a held projectile to its target
    ReleaseProjectile {
        owner: UnitId,
        projectile: Box<Projectile>,
    },
}

impl DelayedAction {
    pub fn owner(&self) -> UnitId {
        match self {
            Self::Emit { owner, .. } | Self::ReleaseProjectile { owner, .. } => *owner,
            Self::SpearSlam { boss, .. }
            | Self::ShieldSlam { boss, .. }
            | Self::Parry { boss, .. }
            | Self::Grapple { boss, .. } => *boss,
            Self::RestoreAggro { unit, .. } => *unit,
        }
    }

    /// Carry out the action against the current region
    pub fn run(self, ctx: &mut TickContext) -> Result<()> {
        if !ctx.region.is_alive(self.owner()) {
            tracing::debug!(owner = ?self.owner(), "delayed action owner gone, skipping");
            return Ok(());
        }
        match self {
            Self::Emit { event, .. } => ctx.emit(event),
            Self::SpearSlam { boss, first } => sol_heredit::spear_slam(ctx, boss, first)?,
            Self::ShieldSlam { boss, first } => sol_heredit::shield_slam(ctx, boss, first)?,
            Self::Parry {
                boss,
                damage,
                window,
            } => sol_heredit::parry(ctx, boss, damage, window)?,
            Self::Grapple { boss, slot } => sol_heredit::grapple(ctx, boss, slot)?,
            Self::RestoreAggro { unit, target } => {
                if let Some(unit) = ctx.region.unit_mut(unit) {
                    unit.aggro = target;
                }
            }
            Self::ReleaseProjectile { projectile, .. } => {
                match ctx.region.unit_mut(projectile.to) {
                    Some(target) => target.incoming_projectiles.push(*projectile),
                    None => tracing::debug!(target = ?projectile.to, "held projectile lost its target"),
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledAction {
    pub fire_at: Tick,
    pub seq: u64,
    pub action: DelayedAction,
}

#[derive(Debug, Clone, Default)]
pub struct DelayedActionQueue {
    npc: Vec<ScheduledAction>,
    world: Vec<ScheduledAction>,
    next_seq: u64,
}

impl DelayedActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, fire_at: Tick, action: DelayedAction) -> ScheduledAction {
        let seq = self.next_seq;
        self.next_seq += 1;
        ScheduledAction {
            fire_at,
            seq,
            action,
        }
    }

    pub fn schedule(&mut self, fire_at: Tick, action: DelayedAction) {
        let entry = self.entry(fire_at, action);
        self.world.push(entry);
    }

    pub fn schedule_npc(&mut self, fire_at: Tick, action: DelayedAction) {
        let entry = self.entry(fire_at, action);
        self.npc.push(entry);
    }

    /// Remove and return everything due by `tick`: NPC queue first, FIFO
    pub fn drain_due(&mut self, tick: Tick) -> Vec<ScheduledAction> {
        let (mut due, npc): (Vec<_>, Vec<_>) = std::mem::take(&mut self.npc)
            .into_iter()
            .partition(|entry| entry.fire_at <= tick);
        let (world_due, world): (Vec<_>, Vec<_>) = std::mem::take(&mut self.world)
            .into_iter()
            .partition(|entry| entry.fire_at <= tick);
        self.npc = npc;
        self.world = world;
        due.extend(world_due);
        due
    }

    pub fn len(&self) -> usize {
        self.npc.len() + self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending(&self) -> impl Iterator<Item = &ScheduledAction> {
        self.npc.iter().chain(self.world.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::events::SoundCue;

    fn sound(owner: UnitId, cue: SoundCue) -> DelayedAction {
        DelayedAction::Emit {
            owner,
            event: SimulationEvent::Sound(cue),
        }
    }

    #[test]
    fn test_npc_queue_drains_first() {
        let owner = UnitId::new(0, 0);
        let mut queue = DelayedActionQueue::new();
        queue.schedule(5, sound(owner, SoundCue::SpearEnd));
        queue.schedule_npc(5, sound(owner, SoundCue::ShieldEnd));
        queue.schedule(5, sound(owner, SoundCue::PoolShriek));
        let due: Vec<_> = queue.drain_due(5).into_iter().map(|e| e.action).collect();
        assert_eq!(
            due,
            vec![
                sound(owner, SoundCue::ShieldEnd),
                sound(owner, SoundCue::SpearEnd),
                sound(owner, SoundCue::PoolShriek),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_not_due_stays_queued() {
        let owner = UnitId::new(0, 0);
        let mut queue = DelayedActionQueue::new();
        queue.schedule(3, sound(owner, SoundCue::SpearEnd));
        queue.schedule(4, sound(owner, SoundCue::ShieldEnd));
        assert_eq!(queue.drain_due(3).len(), 1);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pending().next().unwrap().fire_at, 4);
    }
}
