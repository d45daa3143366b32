//! Tick system - orchestrates one 600ms game tick
//!
//! Every tick runs the same fixed order so that a seed and an input list
//! always produce the same encounter:
//!
//! inputs -> prayers -> entities -> mob movement -> mob attacks ->
//! player movement -> player attack -> reap -> delayed actions

use std::time::Duration;

use crate::combat::{AttackStyle, Projectile, ProjectileOptions, Weapon};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::rng::{self, SimRng};
use crate::core::types::{Tick, UnitId};
use crate::spatial::collision_math;
use crate::units::{mob, player, Unit};
use crate::world::clock::TickClock;
use crate::world::context::TickContext;
use crate::world::delayed::DelayedActionQueue;
use crate::world::entity::{Entity, HazardStrike};
use crate::world::events::SimulationEvent;
use crate::world::input::{apply_input, PlayerInput};
use crate::world::region::Region;

type UnitStep = fn(&mut Unit, &mut TickContext) -> Result<()>;

pub struct World {
    pub region: Region,
    config: SimulationConfig,
    rng: SimRng,
    actions: DelayedActionQueue,
    current_tick: Tick,
    pending_inputs: Vec<PlayerInput>,
    clock: TickClock,
}

impl World {
    pub fn new(region: Region, config: SimulationConfig) -> Self {
        let rng = rng::seeded(config.seed);
        let clock = TickClock::new(config.tick_duration());
        Self {
            region,
            config,
            rng,
            actions: DelayedActionQueue::new(),
            current_tick: 0,
            pending_inputs: Vec::new(),
            clock,
        }
    }

    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn actions(&self) -> &DelayedActionQueue {
        &self.actions
    }

    /// Queue an input for the start of the next tick
    pub fn queue_input(&mut self, input: PlayerInput) {
        self.pending_inputs.push(input);
    }

    /// Progress through the current tick for interpolated drawing
    pub fn tick_percent(&self) -> f64 {
        self.clock.tick_percent()
    }

    /// Feed elapsed wall-clock time and run every tick that became due
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SimulationEvent> {
        let due = self.clock.advance(elapsed);
        let mut events = Vec::new();
        for _ in 0..due {
            events.extend(self.tick_world());
        }
        events
    }

    pub fn tick_world(&mut self) -> Vec<SimulationEvent> {
        run_tick(self)
    }

    pub fn player_alive(&self) -> bool {
        self.region.player().is_some_and(Unit::is_alive)
    }

    /// Any mob still standing
    pub fn mobs_alive(&self) -> bool {
        self.region.mobs().any(Unit::is_alive)
    }
}

/// Run a single tick
///
/// 1. Apply queued inputs to the player
/// 2. Player prayers (overhead sound cues, drain)
/// 3. Entities (hazards raise strikes)
/// 4. Mob movement, in spawn order
/// 5. Mob attacks, in spawn order
/// 6. Player movement
/// 7. Player attack (incoming damage lands here)
/// 8. Reap finished death sequences
/// 9. Delayed actions due this tick, NPC queue first
///
/// Returns the feedback events raised during the tick.
pub fn run_tick(world: &mut World) -> Vec<SimulationEvent> {
    world.current_tick += 1;
    let tick = world.current_tick;
    let inputs = std::mem::take(&mut world.pending_inputs);
    let mut events = Vec::new();
    let mut ctx = TickContext {
        tick,
        region: &mut world.region,
        rng: &mut world.rng,
        actions: &mut world.actions,
        config: &world.config,
        events: &mut events,
    };

    let player_id = ctx.region.player_id();
    if let Some(id) = player_id {
        apply_inputs(&mut ctx, id, inputs);
        run_unit_step(&mut ctx, id, "prayers", |unit, ctx| {
            player::activate_prayers(unit, ctx);
            Ok(())
        });
    }

    tick_entities(&mut ctx);

    let mobs = ctx.region.mob_ids();
    for id in &mobs {
        run_unit_step(&mut ctx, *id, "mob movement", mob::movement_step);
    }
    for id in &mobs {
        run_unit_step(&mut ctx, *id, "mob attack", mob::attack_step);
    }

    if let Some(id) = player_id {
        run_unit_step(&mut ctx, id, "player movement", player::movement_step);
        run_unit_step(&mut ctx, id, "player attack", player::attack_step);
    }

    for id in ctx.region.reap() {
        ctx.emit(SimulationEvent::Removed { unit: id });
    }

    for entry in ctx.actions.drain_due(tick) {
        tracing::debug!(tick, seq = entry.seq, action = ?entry.action, "delayed action");
        if let Err(err) = entry.action.run(&mut ctx) {
            tracing::warn!(tick, error = %err, "delayed action failed");
        }
    }

    events
}

/// Check a unit out, run one of its steps, and put it back
///
/// A failing step is logged and skipped; it never stops the tick.
fn run_unit_step(ctx: &mut TickContext, id: UnitId, phase: &'static str, step: UnitStep) {
    let Some(mut unit) = ctx.region.checkout(id) else {
        return;
    };
    if let Err(err) = step(&mut unit, ctx) {
        tracing::warn!(unit = ?id, phase, error = %err, "unit step failed");
    }
    ctx.region.checkin(unit);
}

fn apply_inputs(ctx: &mut TickContext, player_id: UnitId, inputs: Vec<PlayerInput>) {
    if inputs.is_empty() {
        return;
    }
    let Some(mut unit) = ctx.region.checkout(player_id) else {
        return;
    };
    for input in inputs {
        tracing::debug!(tick = ctx.tick, ?input, "player input");
        if let Err(err) = apply_input(&mut unit, ctx.region, input) {
            tracing::warn!(error = %err, "input rejected");
        }
    }
    ctx.region.checkin(unit);
}

fn tick_entities(ctx: &mut TickContext) {
    let strikes: Vec<HazardStrike> = ctx
        .region
        .entities
        .iter_mut()
        .filter_map(Entity::tick)
        .collect();
    for strike in strikes {
        resolve_hazard(ctx, strike);
    }
}

/// Hit whoever the hazard is aimed at if they are standing on it
fn resolve_hazard(ctx: &mut TickContext, strike: HazardStrike) {
    let Some(target) = strike.target.or_else(|| ctx.region.player_id()) else {
        return;
    };
    let Some(unit) = ctx.region.unit(target).filter(|u| u.is_alive()) else {
        return;
    };
    if !collision_math(
        unit.location.x,
        unit.location.y,
        unit.size,
        strike.location.x,
        strike.location.y,
        strike.size,
    ) {
        return;
    }
    let origin = unit.center();
    let (base, spread) = strike.damage;
    let damage = base + rng::below(ctx.rng, spread);
    let projectile = Projectile::new(
        &Weapon::unblockable(AttackStyle::Crush),
        damage,
        strike.source,
        target,
        origin,
        0,
        ProjectileOptions {
            hidden: true,
            set_delay: Some(1),
            reduce_delay: 0,
            check_prayer_at_hit: false,
        },
    );
    tracing::debug!(entity = ?strike.entity, target = ?target, damage, "hazard struck");
    if let Some(unit) = ctx.region.unit_mut(target) {
        unit.incoming_projectiles.push(projectile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Location;
    use crate::units::{Loadout, MobProfile};
    use crate::world::entity::EntityKind;

    fn world_with_player(x: i32, y: i32) -> (World, UnitId) {
        let mut region = Region::new(40, 40);
        let player = region
            .spawn_player(Location::new(x, y), Loadout::default())
            .unwrap();
        (World::new(region, SimulationConfig::default()), player)
    }

    #[test]
    fn test_inputs_apply_at_next_tick() {
        let (mut world, player) = world_with_player(14, 14);
        world.queue_input(PlayerInput::MoveTo { x: 20, y: 14 });
        assert_eq!(world.region.unit(player).unwrap().location, Location::new(14, 14));
        world.tick_world();
        assert_eq!(world.region.unit(player).unwrap().location, Location::new(16, 14));
        assert_eq!(world.current_tick(), 1);
    }

    #[test]
    fn test_sand_pool_hurts_player_standing_in_it() {
        let (mut world, player) = world_with_player(10, 10);
        world
            .region
            .add_entity(Location::new(10, 10), 1, EntityKind::SandPool);
        world.tick_world();
        let unit = world.region.unit(player).unwrap();
        let lost = unit.stats.hitpoint - unit.current_stats.hitpoint;
        assert!((5..=10).contains(&lost));
    }

    #[test]
    fn test_ground_slam_misses_when_target_moved() {
        let (mut world, player) = world_with_player(10, 10);
        let boss = world
            .region
            .spawn_mob(MobProfile::jal_im_kot(), Location::new(30, 30), None)
            .unwrap();
        world.region.add_entity(
            Location::new(12, 12),
            1,
            EntityKind::GroundSlam {
                source: boss,
                target: player,
                ripple: 0.0,
            },
        );
        world.tick_world();
        let unit = world.region.unit(player).unwrap();
        assert_eq!(unit.current_stats.hitpoint, unit.stats.hitpoint);
        assert!(world.region.entities.is_empty());
    }

    #[test]
    fn test_dead_mob_removed_after_animation() {
        let (mut world, _) = world_with_player(2, 2);
        let mob = world
            .region
            .spawn_mob(MobProfile::jal_im_kot(), Location::new(30, 30), None)
            .unwrap();
        world.region.unit_mut(mob).unwrap().current_stats.hitpoint = 0;
        let mut removed_at = None;
        for _ in 0..10 {
            let events = world.tick_world();
            if events.contains(&SimulationEvent::Removed { unit: mob }) {
                removed_at = Some(world.current_tick());
                break;
            }
        }
        // Death starts on tick 1, then the three-tick animation plays out
        assert_eq!(removed_at, Some(4));
        assert!(world.region.unit(mob).is_none());
    }
}
