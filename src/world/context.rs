//! Per-tick context handed to every unit step
//!
//! Bundles the region (minus the unit currently checked out), the shared
//! random source, the delayed-action queues, config and the event outbox.

use crate::core::config::SimulationConfig;
use crate::core::rng::SimRng;
use crate::core::types::{Tick, UnitId};
use crate::units::LandedHit;
use crate::world::delayed::{DelayedAction, DelayedActionQueue};
use crate::world::events::SimulationEvent;
use crate::world::region::Region;

pub struct TickContext<'a> {
    pub tick: Tick,
    pub region: &'a mut Region,
    pub rng: &'a mut SimRng,
    pub actions: &'a mut DelayedActionQueue,
    pub config: &'a SimulationConfig,
    pub events: &'a mut Vec<SimulationEvent>,
}

impl TickContext<'_> {
    pub fn emit(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Run `action` during the delayed-action step `delay` ticks from now
    pub fn schedule(&mut self, delay: u64, action: DelayedAction) {
        self.actions.schedule(self.tick + delay, action);
    }

    /// Same as `schedule`, but fired ahead of world actions due that tick
    pub fn schedule_npc(&mut self, delay: u64, action: DelayedAction) {
        self.actions.schedule_npc(self.tick + delay, action);
    }

    pub fn report_hits(&mut self, target: UnitId, hits: &[LandedHit]) {
        for hit in hits {
            self.events.push(SimulationEvent::Hitsplat {
                target,
                from: hit.from,
                damage: hit.damage,
                blocked: hit.blocked,
            });
        }
    }
}
