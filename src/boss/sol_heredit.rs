//! Sol Heredit, the Fortis Colosseum boss
//!
//! Sol keeps the generic mob lifecycle (incoming hits, aggro, death) and
//! replaces its movement and attack logic. Every attack is telegraphed:
//! ground slams are stamped two ticks after the wind-up, parry hits land a
//! fixed number of ticks later, and phase changes flood the floor with sand
//! pools. All follow-ups are scheduled as delayed actions and resolved by
//! the handlers at the bottom of this file.

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::boss::ring_buffer::RingBuffer;
use crate::boss::telegraph::{self, attack_direction, SlamTile};
use crate::combat::{AttackStyle, Prayer, Projectile, ProjectileOptions, Weapon};
use crate::core::config::BossAttackToggles;
use crate::core::error::{Result, SimError};
use crate::core::rng::{self, SimRng};
use crate::core::types::{Location, UnitId};
use crate::spatial::{
    angle, can_tile_be_pathed_to, closest_tile, collision_math, construct_paths, has_line_of_sight,
};
use crate::units::player::seeking_tiles;
use crate::units::{EquipmentSlot, MobState, Unit};
use crate::world::context::TickContext;
use crate::world::delayed::DelayedAction;
use crate::world::entity::EntityKind;
use crate::world::events::{HazardKind, SimulationEvent, SoundCue};
use crate::world::region::{ArenaBounds, Region};

/// Hitpoint thresholds, highest first, and the line shouted on crossing
pub const PHASE_TRANSITION_POINTS: [(i32, &str); 6] = [
    (1500, "Let's start by testing your footwork."),
    (1350, "Not bad. Let's try something else..."),
    (1110, "Impressive. Let's see how you handle this..."),
    (700, "You can't win!"),
    (350, "Ralos guides my hand!"),
    (110, "LET'S END THIS!"),
];

/// Slots the grapple can go for; clicking the named slot parries it
pub const GRAPPLE_SLOTS: [(EquipmentSlot, &str); 5] = [
    (EquipmentSlot::Chest, "I'LL CRUSH YOUR BODY!"),
    (EquipmentSlot::Cape, "I'LL BREAK YOUR BACK!"),
    (EquipmentSlot::Gloves, "I'LL TWIST YOUR HANDS OFF!"),
    (EquipmentSlot::Legs, "I'LL BREAK YOUR LEGS!"),
    (EquipmentSlot::Feet, "I'LL CUT YOUR FEET OFF!"),
];

/// Ticks of target overhead history kept for parry checks
const OVERHEAD_HISTORY: usize = 5;

const GRAPPLE_BASE_DAMAGE: i32 = 20;
const GRAPPLE_DAMAGE_SPREAD: i32 = 25;

/// The phase that only gets four extra pools
const FINAL_POOL_PHASE: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolAttack {
    Shield,
    Spear,
    TripleLong,
    TripleShort,
    Grapple,
    PhaseTransition,
}

#[derive(Debug, Clone)]
pub struct SolHereditState {
    /// Next spear uses the opening pattern
    pub first_spear: bool,
    /// Next shield uses the inner safe ring
    pub first_shield: bool,
    /// Overrides the random pick on the next attack
    pub force_attack: Option<SolAttack>,
    pub last_location: Location,
    /// Index into `PHASE_TRANSITION_POINTS`; -1 before the fight starts
    pub phase_id: i32,
    /// Crossed phases still owed a pool transition, oldest first
    pub pending_transitions: VecDeque<i32>,
    /// Tiles already holding a sand pool
    pub pool_cache: AHashSet<Location>,
    /// Whether the target had an overhead up, one entry per attack step
    pub overhead_history: RingBuffer<bool>,
    /// Movement steps spent without moving
    pub stationary_timer: i32,
    pub grapple_slot: Option<EquipmentSlot>,
}

impl SolHereditState {
    pub fn new(location: Location) -> Self {
        Self {
            first_spear: true,
            first_shield: true,
            force_attack: None,
            last_location: location,
            phase_id: -1,
            pending_transitions: VecDeque::new(),
            pool_cache: AHashSet::new(),
            overhead_history: RingBuffer::new(OVERHEAD_HISTORY),
            stationary_timer: 0,
            grapple_slot: None,
        }
    }

    /// Drain up to `ticks` entries, newest first, stopping at the first one
    /// that had an overhead up
    pub fn was_overhead_on(&mut self, ticks: usize) -> bool {
        (0..ticks).any(|_| self.overhead_history.pop().unwrap_or(false))
    }
}

fn script_mut(region: &mut Region, boss: UnitId) -> Result<&mut SolHereditState> {
    region
        .unit_mut(boss)
        .ok_or(SimError::UnitNotFound(boss))?
        .mob_mut()
        .and_then(MobState::sol_heredit_mut)
        .ok_or(SimError::WrongUnitKind {
            unit: boss,
            expected: "Sol Heredit",
        })
}

fn sound_later(owner: UnitId, cue: SoundCue) -> DelayedAction {
    DelayedAction::Emit {
        owner,
        event: SimulationEvent::Sound(cue),
    }
}

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Freeze and stun count down separately, but either one roots the boss
fn can_move(unit: &Unit) -> bool {
    !unit.has_los && unit.frozen <= 0 && !unit.is_dying() && unit.stunned <= 0
}

pub fn movement_step(
    unit: &mut Unit,
    state: &mut SolHereditState,
    ctx: &mut TickContext,
) -> Result<()> {
    if let Some(target) = unit.aggro.and_then(|id| ctx.region.unit(id)) {
        let (target_location, target_size) = (target.location, target.size);
        unit.has_los = has_line_of_sight(
            ctx.region,
            unit.location,
            unit.size,
            target_location,
            target_size,
            1,
        );
        if can_move(unit) {
            step_toward(unit, target_location, target_size, ctx)?;
        }
    }

    if unit.location == state.last_location {
        state.stationary_timer += 1;
    } else {
        state.stationary_timer = 0;
    }
    state.last_location = unit.location;
    Ok(())
}

/// Path from the nearest footprint tile to a tile next to the target and
/// shift the whole footprint by up to `max_speed` steps of that path
fn step_toward(
    unit: &mut Unit,
    target_location: Location,
    target_size: i32,
    ctx: &mut TickContext,
) -> Result<()> {
    let max_speed = unit
        .mob()
        .map(|mob| mob.profile.max_speed)
        .ok_or(SimError::WrongUnitKind {
            unit: unit.id,
            expected: "mob",
        })?;
    let origin = closest_tile(unit.location, unit.size, target_location);
    let tiles = seeking_tiles(ctx.region, target_location, target_size);
    let path = construct_paths(ctx.region, origin, 1, &tiles).path;
    let Some(&last) = path.last() else {
        tracing::warn!(unit = ?unit.id, target = ?target_location, "no path toward target");
        return Ok(());
    };
    let speed = usize::try_from(max_speed.max(1)).unwrap_or(1);
    let step = if path.len() <= speed {
        last
    } else {
        path[speed - 1]
    };

    let Location { x, y } = unit.location;
    let mut dx = x + step.x - origin.x;
    let mut dy = y + step.y - origin.y;

    if collision_math(x, y, unit.size, target_location.x, target_location.y, 1) {
        // Target under the boss: shuffle one tile on a random axis
        let horizontal = rng::coin(ctx.rng);
        let shift = if rng::coin(ctx.rng) { 1 } else { -1 };
        if horizontal {
            dx = x + shift;
            dy = y;
        } else {
            dx = x;
            dy = y + shift;
        }
    }

    let open = |tx: i32, ty: i32| can_tile_be_pathed_to(ctx.region, tx, ty, unit.size);
    let next = if (dx, dy) == (x, y) {
        None
    } else if open(dx, dy) {
        Some(Location::new(dx, dy))
    } else if dx != x && open(dx, y) {
        Some(Location::new(dx, y))
    } else if dy != y && open(x, dy) {
        Some(Location::new(x, dy))
    } else {
        None
    };

    if let Some(next) = next {
        unit.location = next;
        unit.steps.push(next);
        unit.next_angle = angle(
            f64::from(x),
            f64::from(y),
            f64::from(next.x),
            f64::from(next.y),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Attacks
// ---------------------------------------------------------------------------

/// Advance the phase when hitpoints drop past the next threshold
fn check_phase(unit: &Unit, state: &mut SolHereditState, ctx: &mut TickContext) {
    let next = usize::try_from(state.phase_id + 1)
        .ok()
        .and_then(|index| PHASE_TRANSITION_POINTS.get(index));
    let Some(&(threshold, message)) = next else {
        return;
    };
    if unit.current_stats.hitpoint > threshold {
        return;
    }
    state.phase_id += 1;
    if state.phase_id > 0 {
        state.pending_transitions.push_back(state.phase_id);
    }
    tracing::debug!(
        boss = ?unit.id,
        phase = state.phase_id,
        hitpoint = unit.current_stats.hitpoint,
        "phase changed"
    );
    ctx.emit(SimulationEvent::OverheadText {
        unit: unit.id,
        text: message.to_string(),
    });
    ctx.emit(SimulationEvent::PhaseChanged {
        boss: unit.id,
        phase: state.phase_id,
    });
}

/// Forced attack first, then any owed phase transition, otherwise a uniform
/// pick from the enabled attacks
pub fn select_attack(
    state: &SolHereditState,
    toggles: &BossAttackToggles,
    rng: &mut SimRng,
) -> Option<SolAttack> {
    if state.force_attack.is_some() {
        return state.force_attack;
    }
    if !state.pending_transitions.is_empty() {
        return Some(SolAttack::PhaseTransition);
    }
    let pool: Vec<SolAttack> = [
        (toggles.use_shields, SolAttack::Shield),
        (toggles.use_spears, SolAttack::Spear),
        (toggles.use_triple_long, SolAttack::TripleLong),
        (toggles.use_triple_short, SolAttack::TripleShort),
        (toggles.use_grapple, SolAttack::Grapple),
    ]
    .into_iter()
    .filter_map(|(enabled, attack)| enabled.then_some(attack))
    .collect();
    if pool.is_empty() {
        return None;
    }
    let index = usize::try_from(rng::below(rng, pool.len() as i32)).unwrap_or(0);
    pool.get(index).copied()
}

/// Records the target's overhead, checks phase thresholds, then attacks
/// when adjacent (diagonals included), off cooldown and standing still
pub fn attack_if_possible(
    unit: &mut Unit,
    state: &mut SolHereditState,
    ctx: &mut TickContext,
) -> Result<bool> {
    let overhead_on = unit
        .aggro
        .and_then(|id| ctx.region.unit(id))
        .is_some_and(|target| target.prayers.overhead().is_some());
    state.overhead_history.push(overhead_on);

    check_phase(unit, state, ctx);

    let Some(target) = unit.aggro.and_then(|id| ctx.region.unit(id)) else {
        return Ok(false);
    };
    let closest = closest_tile(unit.location, unit.size, target.location);
    let (dx, dy) = (target.location.x - closest.x, target.location.y - closest.y);
    unit.has_los = dx.abs() <= 1 && dy.abs() <= 1;

    if !unit.can_attack() {
        return Ok(false);
    }
    if !unit.has_los || unit.attack_delay > 0 || state.stationary_timer <= 0 {
        return Ok(false);
    }

    let attack = select_attack(state, &ctx.config.boss, ctx.rng);
    tracing::debug!(boss = ?unit.id, tick = ctx.tick, ?attack, "boss attack");
    let delay = match attack {
        Some(SolAttack::Shield) => attack_shield(unit, state, ctx),
        Some(SolAttack::Spear) => attack_spear(unit, state, ctx),
        Some(SolAttack::TripleShort) => attack_triple(unit, state, ctx, true),
        Some(SolAttack::TripleLong) => attack_triple(unit, state, ctx, false),
        Some(SolAttack::Grapple) => attack_grapple(unit, state, ctx),
        Some(SolAttack::PhaseTransition) => {
            let phase = state
                .pending_transitions
                .pop_front()
                .unwrap_or(state.phase_id);
            phase_transition(unit, state, ctx, phase)?
        }
        None => 0,
    };
    unit.attack_delay = delay;
    state.force_attack = None;
    Ok(attack.is_some())
}

fn attack_spear(unit: &mut Unit, state: &mut SolHereditState, ctx: &mut TickContext) -> i32 {
    unit.freeze(6);
    ctx.emit(SimulationEvent::Sound(SoundCue::SpearStart));
    ctx.schedule(
        2,
        DelayedAction::SpearSlam {
            boss: unit.id,
            first: state.first_spear,
        },
    );
    ctx.schedule(3, sound_later(unit.id, SoundCue::SpearEnd));
    state.first_spear = !state.first_spear;
    state.first_shield = true;
    7
}

fn attack_shield(unit: &mut Unit, state: &mut SolHereditState, ctx: &mut TickContext) -> i32 {
    unit.freeze(4);
    ctx.emit(SimulationEvent::Sound(SoundCue::ShieldStart));
    ctx.schedule(
        2,
        DelayedAction::ShieldSlam {
            boss: unit.id,
            first: state.first_shield,
        },
    );
    ctx.schedule(3, sound_later(unit.id, SoundCue::ShieldEnd));
    state.first_spear = true;
    state.first_shield = !state.first_shield;
    6
}

/// Three parry hits; the short form lands its last two faster and lighter
fn attack_triple(
    unit: &mut Unit,
    state: &mut SolHereditState,
    ctx: &mut TickContext,
    short: bool,
) -> i32 {
    state.first_shield = true;
    state.first_spear = true;
    let boss = unit.id;
    ctx.emit(SimulationEvent::Sound(SoundCue::TripleStart));
    ctx.emit(SimulationEvent::Sound(SoundCue::TripleCharge1));

    let parry = |damage, window| DelayedAction::Parry {
        boss,
        damage,
        window,
    };
    ctx.schedule(2, parry(15, 3));
    ctx.schedule(3, sound_later(boss, SoundCue::TripleParry1));
    ctx.schedule(4, sound_later(boss, SoundCue::TripleCharge2));
    ctx.schedule(5, parry(if short { 25 } else { 30 }, 2));
    ctx.schedule(6, sound_later(boss, SoundCue::TripleParry2));
    if short {
        ctx.schedule(6, sound_later(boss, SoundCue::TripleCharge3Short));
        ctx.schedule(8, parry(35, 2));
        ctx.schedule(9, sound_later(boss, SoundCue::TripleParry3));
    } else {
        ctx.schedule(6, sound_later(boss, SoundCue::TripleCharge3Long));
        ctx.schedule(9, parry(45, 3));
        ctx.schedule(10, sound_later(boss, SoundCue::TripleParry3));
    }
    12
}

fn attack_grapple(unit: &mut Unit, state: &mut SolHereditState, ctx: &mut TickContext) -> i32 {
    state.first_shield = true;
    state.first_spear = true;
    ctx.emit(SimulationEvent::Sound(SoundCue::GrappleCharge));

    let index = usize::try_from(rng::below(ctx.rng, GRAPPLE_SLOTS.len() as i32)).unwrap_or(0);
    let (slot, text) = GRAPPLE_SLOTS[index.min(GRAPPLE_SLOTS.len() - 1)];
    state.grapple_slot = Some(slot);
    ctx.emit(SimulationEvent::OverheadText {
        unit: unit.id,
        text: text.to_string(),
    });

    // Only clicks made after the shout count
    if let Some(player) = unit
        .aggro
        .and_then(|id| ctx.region.unit_mut(id))
        .and_then(Unit::player_mut)
    {
        player.equipment_interactions.clear();
    }
    ctx.schedule_npc(
        3,
        DelayedAction::Grapple {
            boss: unit.id,
            slot,
        },
    );
    8
}

/// Freeze, drop sand pools around the target and step back for five ticks
fn phase_transition(
    unit: &mut Unit,
    state: &mut SolHereditState,
    ctx: &mut TickContext,
    phase: i32,
) -> Result<i32> {
    let Some(target_id) = unit.aggro else {
        return Ok(0);
    };
    let target = ctx
        .region
        .unit(target_id)
        .ok_or(SimError::UnitNotFound(target_id))?;
    let Location { x, y } = target.location;

    unit.freeze(5);
    ctx.emit(SimulationEvent::Sound(SoundCue::PoolSpawn));

    let bounds = ctx.region.bounds.unwrap_or(ArenaBounds {
        west: 0,
        east: ctx.region.width - 1,
        north: 0,
        south: ctx.region.height - 1,
    });
    let clamp = |value: i32, low: i32, high: i32| value.min(high).max(low);

    let mut placed = Vec::new();
    try_place_pool(state, ctx.region, Location::new(x, y), &mut placed);
    let extra = if phase == FINAL_POOL_PHASE { 4 } else { 5 };
    for _ in 0..extra {
        let xx = clamp(
            x - 4 + rng::below(ctx.rng, 9),
            bounds.west + 1,
            bounds.east - 1,
        );
        let yy = clamp(
            y - 4 + rng::below(ctx.rng, 9),
            bounds.north + 1,
            bounds.south - 1,
        );
        try_place_pool(state, ctx.region, Location::new(xx, yy), &mut placed);
    }
    tracing::debug!(boss = ?unit.id, phase, pools = placed.len(), "sand pools placed");
    ctx.emit(SimulationEvent::HazardsPlaced {
        source: Some(unit.id),
        kind: HazardKind::SandPool,
        tiles: placed,
    });

    unit.aggro = None;
    ctx.schedule(3, sound_later(unit.id, SoundCue::PoolShriek));
    ctx.schedule(
        5,
        DelayedAction::RestoreAggro {
            unit: unit.id,
            target: Some(target_id),
        },
    );
    Ok(7)
}

fn try_place_pool(
    state: &mut SolHereditState,
    region: &mut Region,
    location: Location,
    placed: &mut Vec<Location>,
) {
    if state.pool_cache.insert(location) {
        region.add_entity(location, 1, EntityKind::SandPool);
        placed.push(location);
    }
}

// ---------------------------------------------------------------------------
// Delayed follow-ups
// ---------------------------------------------------------------------------

/// Stamp a telegraph shape as ground slams aimed at the boss's target
fn stamp_slams(
    ctx: &mut TickContext,
    boss: UnitId,
    shape: impl FnOnce(&Unit, Location) -> Vec<SlamTile>,
) -> Result<()> {
    let unit = ctx.region.unit(boss).ok_or(SimError::UnitNotFound(boss))?;
    let Some((target, target_location)) = unit
        .aggro
        .and_then(|id| ctx.region.unit(id).map(|t| (id, t.location)))
    else {
        tracing::debug!(boss = ?boss, "slam with no target");
        return Ok(());
    };
    let tiles = shape(unit, target_location);

    let mut placed = Vec::with_capacity(tiles.len());
    for tile in tiles {
        ctx.region.add_entity(
            tile.location,
            1,
            EntityKind::GroundSlam {
                source: boss,
                target,
                ripple: tile.ripple,
            },
        );
        placed.push(tile.location);
    }
    ctx.emit(SimulationEvent::HazardsPlaced {
        source: Some(boss),
        kind: HazardKind::GroundSlam,
        tiles: placed,
    });
    Ok(())
}

pub fn spear_slam(ctx: &mut TickContext, boss: UnitId, first: bool) -> Result<()> {
    stamp_slams(ctx, boss, |unit, target| {
        let direction = attack_direction(unit.location, unit.size, target);
        if first {
            telegraph::first_spear(unit.location, unit.size, direction)
        } else {
            telegraph::second_spear(unit.location, unit.size, direction)
        }
    })
}

pub fn shield_slam(ctx: &mut TickContext, boss: UnitId, first: bool) -> Result<()> {
    stamp_slams(ctx, boss, |unit, _| telegraph::shield(unit.location, first))
}

/// Resolve one triple-attack hit
///
/// An overhead raised at any point in the last `window` attack steps makes
/// the hit unblockable. Otherwise it is a plain stab that a protection
/// prayer switched on before it lands still blocks. Protection prayers are
/// knocked off either way.
pub fn parry(ctx: &mut TickContext, boss: UnitId, damage: i32, window: usize) -> Result<()> {
    let state = script_mut(ctx.region, boss)?;
    let overhead_was_on = state.was_overhead_on(window);
    state.overhead_history.clear();

    let unit = ctx.region.unit(boss).ok_or(SimError::UnitNotFound(boss))?;
    let (origin, aggro) = (unit.center(), unit.aggro);
    let Some(target) = aggro.and_then(|id| ctx.region.unit_mut(id)) else {
        return Ok(());
    };

    let weapon = if overhead_was_on {
        Weapon::unblockable(AttackStyle::Stab)
    } else {
        Weapon::melee("Spear", AttackStyle::Stab, 7)
    };
    let projectile = Projectile::new(
        &weapon,
        damage,
        Some(boss),
        target.id,
        origin,
        0,
        ProjectileOptions {
            hidden: true,
            set_delay: Some(1),
            reduce_delay: 0,
            check_prayer_at_hit: !overhead_was_on,
        },
    );
    tracing::debug!(boss = ?boss, damage, overhead_was_on, "parry hit");
    target.incoming_projectiles.push(projectile);
    for prayer in [
        Prayer::ProtectFromMelee,
        Prayer::ProtectFromMissiles,
        Prayer::ProtectFromMagic,
    ] {
        target.prayers.deactivate(prayer);
    }
    Ok(())
}

/// Resolve a grapple; clicking the shouted slot since the wind-up parries it
pub fn grapple(ctx: &mut TickContext, boss: UnitId, slot: EquipmentSlot) -> Result<()> {
    script_mut(ctx.region, boss)?.grapple_slot = None;

    let unit = ctx.region.unit(boss).ok_or(SimError::UnitNotFound(boss))?;
    let (origin, aggro) = (unit.center(), unit.aggro);
    let Some(target_id) = aggro else {
        tracing::warn!(boss = ?boss, "grapple resolved with no target");
        return Ok(());
    };
    let parried = ctx
        .region
        .unit(target_id)
        .and_then(Unit::player)
        .is_some_and(|player| player.equipment_interactions.contains(&slot));
    if parried {
        ctx.emit(SimulationEvent::Sound(SoundCue::GrappleParry));
    }
    let damage = if parried {
        0
    } else {
        GRAPPLE_BASE_DAMAGE + rng::below(ctx.rng, GRAPPLE_DAMAGE_SPREAD)
    };

    let projectile = Projectile::new(
        &Weapon::unblockable(AttackStyle::Stab),
        damage,
        Some(boss),
        target_id,
        origin,
        0,
        ProjectileOptions {
            hidden: true,
            set_delay: Some(1),
            ..ProjectileOptions::default()
        },
    );
    tracing::debug!(boss = ?boss, ?slot, parried, damage, "grapple");
    if let Some(target) = ctx.region.unit_mut(target_id) {
        target.incoming_projectiles.push(projectile);
        if let Some(player) = target.player_mut() {
            player.equipment_interactions.clear();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::rng::seeded;
    use crate::units::{Loadout, MobBehavior, MobProfile};
    use crate::world::arena::{colosseum, BOSS_START};
    use crate::world::delayed::DelayedActionQueue;

    struct Harness {
        region: Region,
        rng: SimRng,
        actions: DelayedActionQueue,
        config: SimulationConfig,
        events: Vec<SimulationEvent>,
        player: UnitId,
        boss: UnitId,
    }

    impl Harness {
        /// Boss at its start tile, player standing at `player_at`
        fn new(player_at: Location) -> Self {
            let mut region = colosseum();
            let player = region.spawn_player(player_at, Loadout::melee()).unwrap();
            let boss = region
                .spawn_mob(MobProfile::sol_heredit(), BOSS_START, Some(player))
                .unwrap();
            region.unit_mut(boss).unwrap().stunned = 0;
            Self {
                region,
                rng: seeded(7),
                actions: DelayedActionQueue::default(),
                config: SimulationConfig::default(),
                events: Vec::new(),
                player,
                boss,
            }
        }

        fn run<T>(&mut self, f: impl FnOnce(&mut TickContext) -> T) -> T {
            let mut ctx = TickContext {
                tick: 10,
                region: &mut self.region,
                rng: &mut self.rng,
                actions: &mut self.actions,
                config: &self.config,
                events: &mut self.events,
            };
            f(&mut ctx)
        }

        fn with_boss<T>(
            &mut self,
            f: impl FnOnce(&mut Unit, &mut SolHereditState, &mut TickContext) -> T,
        ) -> T {
            let mut unit = self.region.checkout(self.boss).unwrap();
            let behavior =
                std::mem::replace(&mut unit.mob_mut().unwrap().behavior, MobBehavior::Standard);
            let MobBehavior::SolHeredit(mut script) = behavior else {
                panic!("boss lost its script");
            };
            let out = self.run(|ctx| f(&mut unit, &mut script, ctx));
            unit.mob_mut().unwrap().behavior = MobBehavior::SolHeredit(script);
            self.region.checkin(unit);
            out
        }

        fn script(&self) -> &SolHereditState {
            self.region
                .unit(self.boss)
                .and_then(Unit::mob)
                .and_then(MobState::sol_heredit)
                .unwrap()
        }

        fn script_mut(&mut self) -> &mut SolHereditState {
            script_mut(&mut self.region, self.boss).unwrap()
        }
    }

    /// Directly south of the boss footprint
    const ADJACENT: Location = Location::new(27, 25);

    #[test]
    fn test_first_threshold_sets_phase_without_transition() {
        let mut h = Harness::new(ADJACENT);
        h.with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert_eq!(h.script().phase_id, 0);
        assert!(h.events.contains(&SimulationEvent::PhaseChanged {
            boss: h.boss,
            phase: 0,
        }));
        assert!(h.events.iter().any(|e| matches!(
            e,
            SimulationEvent::OverheadText { text, .. } if text == "Let's start by testing your footwork."
        )));
    }

    #[test]
    fn test_later_threshold_forces_transition() {
        let mut h = Harness::new(ADJACENT);
        h.script_mut().phase_id = 0;
        h.region.unit_mut(h.boss).unwrap().current_stats.hitpoint = 1300;
        // Not standing still yet, so the forced attack waits
        h.with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert_eq!(h.script().phase_id, 1);
        assert_eq!(h.script().pending_transitions, VecDeque::from([1]));
    }

    #[test]
    fn test_burst_owes_one_transition_per_threshold() {
        let mut h = Harness::new(ADJACENT);
        h.script_mut().phase_id = 0;
        h.region.unit_mut(h.boss).unwrap().current_stats.hitpoint = 1000;
        // One threshold per attack step, and none of them fire yet
        h.with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        h.with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert_eq!(h.script().phase_id, 2);
        assert_eq!(h.script().pending_transitions, VecDeque::from([1, 2]));

        h.script_mut().stationary_timer = 1;
        let attacked = h
            .with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert!(attacked);
        assert_eq!(h.script().pending_transitions, VecDeque::from([2]));
        let pool_drops = h
            .events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::Sound(SoundCue::PoolSpawn)))
            .count();
        assert_eq!(pool_drops, 1);
        assert_eq!(
            select_attack(h.script(), &BossAttackToggles::default(), &mut seeded(1)),
            Some(SolAttack::PhaseTransition)
        );
    }

    #[test]
    fn test_attack_needs_boss_to_stand_still() {
        let mut h = Harness::new(ADJACENT);
        let attacked = h
            .with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert!(!attacked);

        h.script_mut().stationary_timer = 1;
        h.config.boss = BossAttackToggles {
            use_spears: true,
            use_shields: false,
            use_triple_long: false,
            use_triple_short: false,
            use_grapple: false,
        };
        let attacked = h
            .with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert!(attacked);
        let boss = h.region.unit(h.boss).unwrap();
        assert_eq!(boss.attack_delay, 7);
        assert_eq!(boss.frozen, 6);
        assert!(!h.script().first_spear);
    }

    #[test]
    fn test_diagonal_contact_counts_as_adjacent() {
        let mut h = Harness::new(Location::new(30, 25));
        h.script_mut().stationary_timer = 1;
        let attacked = h
            .with_boss(|unit, state, ctx| attack_if_possible(unit, state, ctx))
            .unwrap();
        assert!(attacked);
    }

    #[test]
    fn test_empty_pool_selects_nothing() {
        let state = SolHereditState::new(BOSS_START);
        let toggles = BossAttackToggles {
            use_spears: false,
            use_shields: false,
            use_triple_long: false,
            use_triple_short: false,
            use_grapple: false,
        };
        assert_eq!(select_attack(&state, &toggles, &mut seeded(1)), None);

        let mut forced = state.clone();
        forced.force_attack = Some(SolAttack::PhaseTransition);
        assert_eq!(
            select_attack(&forced, &toggles, &mut seeded(1)),
            Some(SolAttack::PhaseTransition)
        );
    }

    #[test]
    fn test_spear_and_shield_flip_each_other() {
        let mut h = Harness::new(ADJACENT);
        let delay = h.with_boss(attack_spear);
        assert_eq!(delay, 7);
        assert!(!h.script().first_spear);
        let delay = h.with_boss(attack_shield);
        assert_eq!(delay, 6);
        assert!(h.script().first_spear);
        assert!(!h.script().first_shield);
        h.with_boss(attack_spear);
        assert!(h.script().first_shield);
        assert_eq!(h.actions.len(), 6);
    }

    #[test]
    fn test_triple_short_schedule() {
        let mut h = Harness::new(ADJACENT);
        let delay = h.with_boss(|unit, state, ctx| attack_triple(unit, state, ctx, true));
        assert_eq!(delay, 12);
        let parries: Vec<_> = h
            .actions
            .pending()
            .filter_map(|entry| match entry.action {
                DelayedAction::Parry { damage, window, .. } => Some((entry.fire_at, damage, window)),
                _ => None,
            })
            .collect();
        assert_eq!(parries, vec![(12, 15, 3), (15, 25, 2), (18, 35, 2)]);
        assert_eq!(h.actions.len(), 8);
    }

    #[test]
    fn test_triple_long_hits_harder() {
        let mut h = Harness::new(ADJACENT);
        h.with_boss(|unit, state, ctx| attack_triple(unit, state, ctx, false));
        let damages: Vec<_> = h
            .actions
            .pending()
            .filter_map(|entry| match entry.action {
                DelayedAction::Parry { damage, .. } => Some(damage),
                _ => None,
            })
            .collect();
        assert_eq!(damages, vec![15, 30, 45]);
    }

    #[test]
    fn test_overhead_history_window() {
        let mut state = SolHereditState::new(BOSS_START);
        for on in [true, false, false] {
            state.overhead_history.push(on);
        }
        assert!(!state.was_overhead_on(2));
        state.overhead_history.clear();
        for on in [true, false, false] {
            state.overhead_history.push(on);
        }
        assert!(state.was_overhead_on(3));
    }

    #[test]
    fn test_parry_punishes_early_overhead() {
        let mut h = Harness::new(ADJACENT);
        h.script_mut().overhead_history.push(true);
        h.region
            .unit_mut(h.player)
            .unwrap()
            .prayers
            .activate(Prayer::ProtectFromMelee);
        let boss = h.boss;
        h.run(|ctx| parry(ctx, boss, 15, 3)).unwrap();

        let player = h.region.unit(h.player).unwrap();
        assert!(player.prayers.overhead().is_none());
        let hit = &player.incoming_projectiles[0];
        assert!(!hit.blockable);
        assert_eq!(hit.damage, 15);
        assert_eq!(hit.remaining_delay, 1);
        assert!(h.script().overhead_history.is_empty());
    }

    #[test]
    fn test_parry_without_overhead_is_blockable() {
        let mut h = Harness::new(ADJACENT);
        h.script_mut().overhead_history.push(false);
        let boss = h.boss;
        h.run(|ctx| parry(ctx, boss, 25, 2)).unwrap();
        let hit = &h.region.unit(h.player).unwrap().incoming_projectiles[0];
        assert!(hit.blockable);
        assert!(hit.options.check_prayer_at_hit);
    }

    #[test]
    fn test_grapple_parried_by_clicking_slot() {
        let mut h = Harness::new(ADJACENT);
        h.region
            .unit_mut(h.player)
            .unwrap()
            .player_mut()
            .unwrap()
            .equipment_interactions
            .push(EquipmentSlot::Legs);
        let boss = h.boss;
        h.run(|ctx| grapple(ctx, boss, EquipmentSlot::Legs)).unwrap();
        assert!(h
            .events
            .contains(&SimulationEvent::Sound(SoundCue::GrappleParry)));
        let player = h.region.unit(h.player).unwrap();
        assert_eq!(player.incoming_projectiles[0].damage, 0);
        assert!(player.player().unwrap().equipment_interactions.is_empty());
    }

    #[test]
    fn test_grapple_unparried_damage_range() {
        let mut h = Harness::new(ADJACENT);
        let boss = h.boss;
        h.run(|ctx| grapple(ctx, boss, EquipmentSlot::Chest)).unwrap();
        let hit = &h.region.unit(h.player).unwrap().incoming_projectiles[0];
        assert!((20..=44).contains(&hit.damage));
        assert!(!hit.blockable);
    }

    #[test]
    fn test_grapple_announces_slot() {
        let mut h = Harness::new(ADJACENT);
        let delay = h.with_boss(attack_grapple);
        assert_eq!(delay, 8);
        let slot = h.script().grapple_slot.unwrap();
        let text = GRAPPLE_SLOTS.iter().find(|(s, _)| *s == slot).unwrap().1;
        assert!(h.events.contains(&SimulationEvent::OverheadText {
            unit: h.boss,
            text: text.to_string(),
        }));
        assert!(matches!(
            h.actions.pending().next().unwrap().action,
            DelayedAction::Grapple { .. }
        ));
    }

    #[test]
    fn test_phase_transition_places_pools_inside_arena() {
        let mut h = Harness::new(Location::new(21, 31));
        h.script_mut().phase_id = 2;
        let delay = h
            .with_boss(|unit, state, ctx| phase_transition(unit, state, ctx, 2))
            .unwrap();
        assert_eq!(delay, 7);
        let pools: Vec<_> = h
            .region
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::SandPool))
            .map(|e| e.location)
            .collect();
        assert!(pools.contains(&Location::new(21, 31)));
        assert!(pools.len() <= 6);
        assert!(pools
            .iter()
            .all(|p| (20..=33).contains(&p.x) && (19..=32).contains(&p.y)));
        assert_eq!(h.script().pool_cache.len(), pools.len());

        let boss = h.region.unit(h.boss).unwrap();
        assert_eq!(boss.aggro, None);
        assert_eq!(boss.frozen, 5);
        assert!(h.actions.pending().any(|entry| entry.fire_at == 15
            && entry.action
                == DelayedAction::RestoreAggro {
                    unit: h.boss,
                    target: Some(h.player),
                }));
    }

    #[test]
    fn test_pools_never_stack() {
        let mut h = Harness::new(Location::new(27, 30));
        h.with_boss(|unit, state, ctx| phase_transition(unit, state, ctx, 1))
            .unwrap();
        let first = h.script().pool_cache.len();
        let (boss, player) = (h.boss, h.player);
        h.region.unit_mut(boss).unwrap().aggro = Some(player);
        h.with_boss(|unit, state, ctx| phase_transition(unit, state, ctx, 1))
            .unwrap();
        let pools = h
            .region
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::SandPool))
            .count();
        assert_eq!(pools, h.script().pool_cache.len());
        assert!(pools >= first);
    }

    #[test]
    fn test_spear_slam_stamps_toward_target() {
        let mut h = Harness::new(ADJACENT);
        let boss = h.boss;
        h.run(|ctx| spear_slam(ctx, boss, true)).unwrap();
        let slams: Vec<_> = h
            .region
            .entities
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::GroundSlam { .. }))
            .collect();
        // Footprint, the row south of it and two lines
        assert_eq!(slams.len(), 46);
        assert!(matches!(
            h.events.last(),
            Some(SimulationEvent::HazardsPlaced {
                kind: HazardKind::GroundSlam,
                ..
            })
        ));
    }

    #[test]
    fn test_slam_without_target_does_nothing() {
        let mut h = Harness::new(ADJACENT);
        h.region.unit_mut(h.boss).unwrap().aggro = None;
        let boss = h.boss;
        h.run(|ctx| shield_slam(ctx, boss, true)).unwrap();
        assert!(!h
            .region
            .entities
            .iter()
            .any(|e| matches!(e.kind, EntityKind::GroundSlam { .. })));
    }

    #[test]
    fn test_boss_walks_two_tiles_toward_target() {
        let mut h = Harness::new(Location::new(27, 31));
        h.with_boss(|unit, state, ctx| movement_step(unit, state, ctx))
            .unwrap();
        assert_eq!(h.region.unit(h.boss).unwrap().location, Location::new(25, 26));
        assert_eq!(h.script().stationary_timer, 0);
        assert_eq!(h.script().last_location, Location::new(25, 26));
    }

    #[test]
    fn test_adjacent_boss_stays_and_counts() {
        let mut h = Harness::new(ADJACENT);
        for expected in 1..=2 {
            h.with_boss(|unit, state, ctx| movement_step(unit, state, ctx))
                .unwrap();
            assert_eq!(h.script().stationary_timer, expected);
        }
        assert_eq!(h.region.unit(h.boss).unwrap().location, BOSS_START);
    }

    #[test]
    fn test_stunned_boss_holds_position() {
        let mut h = Harness::new(Location::new(27, 31));
        h.region.unit_mut(h.boss).unwrap().stunned = 2;
        h.with_boss(|unit, state, ctx| movement_step(unit, state, ctx))
            .unwrap();
        let boss = h.region.unit(h.boss).unwrap();
        assert_eq!(boss.location, BOSS_START);
        assert_eq!(boss.frozen, 0);
    }

    #[test]
    fn test_target_under_boss_nudges_one_tile() {
        let mut h = Harness::new(Location::new(27, 22));
        h.with_boss(|unit, state, ctx| movement_step(unit, state, ctx))
            .unwrap();
        let moved = h.region.unit(h.boss).unwrap().location;
        assert_eq!(moved.chebyshev(&BOSS_START), 1);
        assert!(moved.x == BOSS_START.x || moved.y == BOSS_START.y);
    }
}
