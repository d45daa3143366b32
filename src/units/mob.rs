//! Mob state machine
//!
//! Generic mobs walk straight at their target and attack when their weapon
//! reaches it. Scripted mobs keep the same lifecycle and swap in their own
//! movement and attack logic through `MobBehavior`.

use crate::boss::sol_heredit::{self, SolHereditState};
use crate::combat::{AttackModifiers, ProjectileOptions, WeaponKind};
use crate::core::error::{Result, SimError};
use crate::core::rng;
use crate::core::types::{Location, UnitId};
use crate::spatial::{can_occupy, collision_math, footprint_gap, has_line_of_sight};
use crate::units::profile::{MobProfile, MobScript};
use crate::units::unit::{launch_attack, Unit};
use crate::world::context::TickContext;
use crate::world::events::SimulationEvent;

#[derive(Debug, Clone)]
pub enum MobBehavior {
    Standard,
    SolHeredit(Box<SolHereditState>),
}

#[derive(Debug, Clone)]
pub struct MobState {
    pub profile: MobProfile,
    pub behavior: MobBehavior,
}

impl MobState {
    pub fn new(profile: MobProfile, location: Location) -> Self {
        let behavior = match profile.script {
            MobScript::Standard => MobBehavior::Standard,
            MobScript::SolHeredit => {
                MobBehavior::SolHeredit(Box::new(SolHereditState::new(location)))
            }
        };
        Self { profile, behavior }
    }

    pub fn sol_heredit(&self) -> Option<&SolHereditState> {
        match &self.behavior {
            MobBehavior::SolHeredit(state) => Some(state),
            MobBehavior::Standard => None,
        }
    }

    pub fn sol_heredit_mut(&mut self) -> Option<&mut SolHereditState> {
        match &mut self.behavior {
            MobBehavior::SolHeredit(state) => Some(state),
            MobBehavior::Standard => None,
        }
    }
}

fn state(unit: &Unit) -> Result<&MobState> {
    unit.mob().ok_or(SimError::WrongUnitKind {
        unit: unit.id,
        expected: "mob",
    })
}

fn state_mut(unit: &mut Unit) -> Result<&mut MobState> {
    let id = unit.id;
    unit.mob_mut().ok_or(SimError::WrongUnitKind {
        unit: id,
        expected: "mob",
    })
}

/// Switch targets when hit by someone else
pub fn should_change_aggro(unit: &Unit, from: UnitId) -> bool {
    unit.aggro != Some(from) && unit.auto_retaliate
}

/// Footprints touching, diagonals included
pub fn is_within_melee_range(unit: &Unit, target: &Unit) -> bool {
    footprint_gap(unit.location, unit.size, target.location, target.size) == 1
}

/// Drop an aggro that no longer points at a unit
fn revalidate_aggro(unit: &mut Unit, ctx: &TickContext) {
    if let Some(target) = unit.aggro {
        if ctx.region.unit(target).is_none() {
            tracing::debug!(unit = ?unit.id, target = ?target, "aggro target gone");
            unit.aggro = None;
        }
    }
}

/// Run a scripted behavior with the script state taken out of the unit
fn with_script<T>(
    unit: &mut Unit,
    ctx: &mut TickContext,
    standard: impl FnOnce(&mut Unit, &mut TickContext) -> Result<T>,
    sol: impl FnOnce(&mut Unit, &mut SolHereditState, &mut TickContext) -> Result<T>,
) -> Result<T> {
    let behavior = std::mem::replace(&mut state_mut(unit)?.behavior, MobBehavior::Standard);
    match behavior {
        MobBehavior::Standard => standard(unit, ctx),
        MobBehavior::SolHeredit(mut script) => {
            let result = sol(unit, &mut script, ctx);
            state_mut(unit)?.behavior = MobBehavior::SolHeredit(script);
            result
        }
    }
}

pub fn movement_step(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    if unit.is_removable() {
        return Ok(());
    }
    let landed = unit.process_incoming_attacks();
    ctx.report_hits(unit.id, &landed);
    for from in landed.iter().filter_map(|hit| hit.from) {
        if should_change_aggro(unit, from) && ctx.region.is_alive(from) {
            tracing::debug!(unit = ?unit.id, target = ?from, "switching aggro");
            unit.aggro = Some(from);
        }
    }
    revalidate_aggro(unit, ctx);

    unit.begin_tick_motion();
    // Killed by this tick's hits; the attack step starts the death sequence
    if unit.current_stats.hitpoint <= 0 {
        unit.frozen = (unit.frozen - 1).max(0);
        return Ok(());
    }
    with_script(unit, ctx, step_toward_target, sol_heredit::movement_step)?;
    unit.frozen = (unit.frozen - 1).max(0);
    Ok(())
}

/// Stun roots a mob just like freeze; the two only differ in that stun
/// also blocks attacks
fn can_move(unit: &Unit) -> bool {
    !unit.has_los && unit.frozen <= 0 && !unit.is_dying() && unit.stunned <= 0
}

/// Walk one tile straight at the target
fn step_toward_target(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    let Some(target) = unit.aggro.and_then(|id| ctx.region.unit(id)) else {
        return Ok(());
    };
    let (target_location, target_size) = (target.location, target.size);
    let range = state(unit)?.profile.weapon.attack_range;
    unit.has_los = has_line_of_sight(
        ctx.region,
        unit.location,
        unit.size,
        target_location,
        target_size,
        range,
    );
    if !can_move(unit) {
        return Ok(());
    }

    let Location { x, y } = unit.location;
    let mut dx = x + (target_location.x - x).signum();
    let mut dy = y + (target_location.y - y).signum();

    if collision_math(x, y, unit.size, target_location.x, target_location.y, target_size) {
        // Under the target: shuffle out on one axis
        let horizontal = rng::coin(ctx.rng);
        let shift = if rng::coin(ctx.rng) { 1 } else { -1 };
        if horizontal {
            dx = x + shift;
            dy = y;
        } else {
            dx = x;
            dy = y + shift;
        }
    } else if collision_math(dx, dy, unit.size, target_location.x, target_location.y, target_size)
    {
        // Would step onto the target's corner
        dy = y;
    }

    let open = |tx: i32, ty: i32| can_occupy(ctx.region, tx, ty, unit.size, Some(unit.id));
    let next = if (dx, dy) == (x, y) {
        None
    } else if open(dx, dy) && (dx == x || dy == y || (open(dx, y) && open(x, dy))) {
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
        unit.next_angle = crate::spatial::angle(
            f64::from(x),
            f64::from(y),
            f64::from(next.x),
            f64::from(next.y),
        );
    }
    Ok(())
}

pub fn attack_step(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    unit.attack_delay -= 1;
    if unit.detect_death() {
        tracing::info!(unit = ?unit.id, name = %unit.name, tick = ctx.tick, "mob died");
        ctx.emit(SimulationEvent::Died { unit: unit.id });
        return Ok(());
    }
    if !unit.is_alive() {
        return Ok(());
    }
    revalidate_aggro(unit, ctx);
    with_script(
        unit,
        ctx,
        |unit, ctx| attack_if_possible(unit, ctx).map(|_| ()),
        |unit, script, ctx| sol_heredit::attack_if_possible(unit, script, ctx).map(|_| ()),
    )?;
    unit.stunned = (unit.stunned - 1).max(0);
    Ok(())
}

/// Attack the aggro target if it can be reached
pub fn attack_if_possible(unit: &mut Unit, ctx: &mut TickContext) -> Result<bool> {
    let Some(target_id) = unit.aggro else {
        return Ok(false);
    };
    let Some(target) = ctx.region.unit(target_id).filter(|t| t.is_alive()) else {
        return Ok(false);
    };
    let (weapon, melee_weapon, release_delay) = {
        let profile = &state(unit)?.profile;
        (
            profile.weapon.clone(),
            profile.melee_weapon.clone(),
            profile.projectile_release_delay,
        )
    };
    unit.has_los = has_line_of_sight(
        ctx.region,
        unit.location,
        unit.size,
        target.location,
        target.size,
        weapon.attack_range,
    );
    let under = collision_math(
        unit.location.x,
        unit.location.y,
        unit.size,
        target.location.x,
        target.location.y,
        target.size,
    );
    if !unit.can_attack() || under || !unit.has_los || unit.attack_delay > 0 {
        return Ok(false);
    }

    let weapon = match melee_weapon {
        Some(melee) if is_within_melee_range(unit, target) => melee,
        _ => weapon,
    };
    let release_after = if weapon.kind == WeaponKind::Melee {
        0
    } else {
        release_delay
    };
    launch_attack(
        ctx,
        unit,
        target_id,
        &weapon,
        &AttackModifiers::default(),
        ProjectileOptions::default(),
        release_after,
    )?;
    unit.attack_delay = weapon.attack_speed;
    Ok(true)
}
