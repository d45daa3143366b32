//! The common unit record shared by the player and mobs
//!
//! Player- and mob-only state hangs off `kind`. Everything the tick loop, the
//! combat formulas and the renderer need from either side lives here.

use glam::{Vec2, Vec3};

use crate::combat::{
    AttackModifiers, AttackOutcome, AttackStyle, Combatant, PrayerBook, Projectile,
    ProjectileOptions, UnitBonuses, UnitStats, Weapon,
};
use crate::core::error::{Result, SimError};
use crate::core::types::{Location, UnitId};
use crate::spatial::{footprint_gap, linear_interpolation};
use crate::units::loadout::Loadout;
use crate::units::mob::MobState;
use crate::units::player::PlayerState;
use crate::units::profile::MobProfile;
use crate::world::context::TickContext;
use crate::world::delayed::DelayedAction;
use crate::world::events::SimulationEvent;

/// Death animation length used by the player
pub const PLAYER_DEATH_ANIMATION: i32 = 3;

#[derive(Debug, Clone)]
pub enum UnitKind {
    Player(Box<PlayerState>),
    Mob(Box<MobState>),
}

/// A projectile that reached its target this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandedHit {
    pub from: Option<UnitId>,
    pub damage: i32,
    pub style: AttackStyle,
    /// Zeroed by the target's overhead on arrival
    pub blocked: bool,
    pub hidden: bool,
}

#[derive(Debug, Clone)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub location: Location,
    /// Location at the start of the current tick
    pub perceived_location: Location,
    pub size: i32,
    pub stats: UnitStats,
    pub current_stats: UnitStats,
    pub bonuses: UnitBonuses,
    pub prayers: PrayerBook,
    pub aggro: Option<UnitId>,
    pub has_los: bool,
    pub attack_delay: i32,
    pub frozen: i32,
    pub stunned: i32,
    /// -1 alive, counts down once dead, 0 ready for removal
    pub dying: i32,
    pub death_animation_length: i32,
    pub auto_retaliate: bool,
    pub incoming_projectiles: Vec<Projectile>,
    /// Tiles entered this tick, for interpolation
    pub steps: Vec<Location>,
    pub resting_angle: f64,
    pub next_angle: f64,
    pub kind: UnitKind,
}

impl Unit {
    pub fn new_player(id: UnitId, location: Location, loadout: Loadout) -> Self {
        Self {
            id,
            name: "Player".to_string(),
            location,
            perceived_location: location,
            size: 1,
            stats: loadout.stats,
            current_stats: loadout.stats,
            bonuses: loadout.bonuses,
            prayers: PrayerBook::new(),
            aggro: None,
            has_los: false,
            attack_delay: 0,
            frozen: 0,
            stunned: 0,
            dying: -1,
            death_animation_length: PLAYER_DEATH_ANIMATION,
            auto_retaliate: loadout.auto_retaliate,
            incoming_projectiles: Vec::new(),
            steps: Vec::new(),
            resting_angle: 0.0,
            next_angle: 0.0,
            kind: UnitKind::Player(Box::new(PlayerState::new(location, loadout))),
        }
    }

    pub fn new_mob(id: UnitId, profile: MobProfile, location: Location) -> Self {
        Self {
            id,
            name: profile.name.clone(),
            location,
            perceived_location: location,
            size: profile.size,
            stats: profile.stats,
            current_stats: profile.stats,
            bonuses: profile.bonuses,
            prayers: PrayerBook::new(),
            aggro: None,
            has_los: false,
            attack_delay: 0,
            frozen: 0,
            stunned: profile.initial_stun,
            dying: -1,
            death_animation_length: profile.death_animation_length,
            auto_retaliate: profile.auto_retaliate,
            incoming_projectiles: Vec::new(),
            steps: Vec::new(),
            resting_angle: 0.0,
            next_angle: 0.0,
            kind: UnitKind::Mob(Box::new(MobState::new(profile, location))),
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, UnitKind::Player(_))
    }

    pub fn player(&self) -> Option<&PlayerState> {
        match &self.kind {
            UnitKind::Player(state) => Some(state),
            UnitKind::Mob(_) => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerState> {
        match &mut self.kind {
            UnitKind::Player(state) => Some(state),
            UnitKind::Mob(_) => None,
        }
    }

    pub fn mob(&self) -> Option<&MobState> {
        match &self.kind {
            UnitKind::Mob(state) => Some(state),
            UnitKind::Player(_) => None,
        }
    }

    pub fn mob_mut(&mut self) -> Option<&mut MobState> {
        match &mut self.kind {
            UnitKind::Mob(state) => Some(state),
            UnitKind::Player(_) => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.dying == -1
    }

    /// Playing the death animation
    pub fn is_dying(&self) -> bool {
        self.dying > 0
    }

    pub fn is_removable(&self) -> bool {
        self.dying == 0
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen > 0
    }

    pub fn can_attack(&self) -> bool {
        self.stunned <= 0 && self.is_alive()
    }

    pub fn freeze(&mut self, ticks: i32) {
        self.frozen = self.frozen.max(ticks);
    }

    /// Start or advance the death sequence; true on the tick death begins
    pub fn detect_death(&mut self) -> bool {
        if self.dying == -1 && self.current_stats.hitpoint <= 0 {
            self.dying = self.death_animation_length;
            self.perceived_location = self.location;
            self.steps.clear();
            return true;
        }
        if self.dying > 0 {
            self.dying -= 1;
        }
        false
    }

    /// Advance every incoming projectile one tick and apply the ones landing
    pub fn process_incoming_attacks(&mut self) -> Vec<LandedHit> {
        let center = self.center();
        let mut landed = Vec::new();
        for projectile in &mut self.incoming_projectiles {
            let Some(mut damage) = projectile.advance(center) else {
                continue;
            };
            let blocked = projectile.blockable
                && projectile.options.check_prayer_at_hit
                && self.prayers.protects_against(projectile.style);
            if blocked {
                damage = 0;
            }
            let damage = damage.clamp(0, self.current_stats.hitpoint.max(0));
            self.current_stats.hitpoint -= damage;
            landed.push(LandedHit {
                from: projectile.from,
                damage,
                style: projectile.style,
                blocked,
                hidden: projectile.options.hidden,
            });
        }
        self.incoming_projectiles.retain(|p| !p.is_spent());
        self.current_stats.hitpoint = self.current_stats.hitpoint.clamp(0, self.stats.hitpoint);
        landed
    }

    /// Stats, bonuses and prayers as seen by the combat formulas
    pub fn combatant(&self) -> Combatant<'_> {
        Combatant {
            is_player: self.is_player(),
            stats: &self.current_stats,
            bonuses: &self.bonuses,
            prayers: &self.prayers,
            stance: self.player().map(|p| p.stance),
        }
    }

    /// Middle of the footprint in tile units
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.location.x as f32 + self.size as f32 / 2.0,
            self.location.y as f32 - self.size as f32 / 2.0 + 1.0,
        )
    }

    /// Reset per-tick motion bookkeeping before moving
    pub fn begin_tick_motion(&mut self) {
        self.perceived_location = self.location;
        self.steps.clear();
        self.resting_angle = self.next_angle;
    }

    /// Interpolated render position; never mutates
    pub fn perceived_location(&self, tick_percent: f64) -> Vec3 {
        let t = if self.dying > -1 {
            0.0
        } else {
            tick_percent.clamp(0.0, 1.0)
        };
        let from = self.perceived_location;
        let (x, y) = if self.steps.len() == 2 {
            let mid = self.steps[0];
            if t < 0.5 {
                (
                    linear_interpolation(f64::from(from.x), f64::from(mid.x), t * 2.0),
                    linear_interpolation(f64::from(from.y), f64::from(mid.y), t * 2.0),
                )
            } else {
                (
                    linear_interpolation(f64::from(mid.x), f64::from(self.location.x), (t - 0.5) * 2.0),
                    linear_interpolation(f64::from(mid.y), f64::from(self.location.y), (t - 0.5) * 2.0),
                )
            }
        } else {
            (
                linear_interpolation(f64::from(from.x), f64::from(self.location.x), t),
                linear_interpolation(f64::from(from.y), f64::from(self.location.y), t),
            )
        };
        Vec3::new(x as f32, y as f32, 0.0)
    }

    /// Interpolated facing in radians along the shortest arc
    pub fn perceived_rotation(&self, tick_percent: f64) -> f64 {
        use std::f64::consts::TAU;
        let da = (self.next_angle - self.resting_angle) % TAU;
        let shortest = (2.0 * da) % TAU - da;
        self.resting_angle + shortest * (tick_percent.clamp(0.0, 1.0) * 2.0).min(1.0)
    }
}

/// Roll an attack from `attacker` on `target_id` and send the projectile
///
/// With `release_after` the projectile is handed over by a delayed action
/// that many ticks later, its flight time shortened to match.
pub(crate) fn launch_attack(
    ctx: &mut TickContext,
    attacker: &mut Unit,
    target_id: UnitId,
    weapon: &Weapon,
    mods: &AttackModifiers,
    mut options: ProjectileOptions,
    release_after: i32,
) -> Result<AttackOutcome> {
    let target = ctx
        .region
        .unit_mut(target_id)
        .ok_or(SimError::UnitNotFound(target_id))?;
    let outcome = crate::combat::resolve_attack(
        weapon,
        &attacker.combatant(),
        &target.combatant(),
        mods,
        ctx.rng,
    );
    let distance = footprint_gap(attacker.location, attacker.size, target.location, target.size);
    if release_after > 0 {
        options.reduce_delay += release_after;
    }
    let projectile = Projectile::new(
        weapon,
        outcome.damage,
        Some(attacker.id),
        target_id,
        attacker.center(),
        distance,
        options,
    );
    if release_after > 0 {
        ctx.schedule_npc(
            release_after as u64,
            DelayedAction::ReleaseProjectile {
                owner: attacker.id,
                projectile: Box::new(projectile),
            },
        );
    } else {
        target.incoming_projectiles.push(projectile);
    }

    if let Some(player) = attacker.player_mut() {
        player.xp_drops.extend(outcome.xp.iter().copied());
    }
    tracing::debug!(
        attacker = ?attacker.id,
        target = ?target_id,
        weapon = %weapon.name,
        damage = outcome.damage,
        max_hit = outcome.max_hit,
        "attack launched"
    );
    ctx.emit(SimulationEvent::AttackLaunched {
        attacker: attacker.id,
        target: target_id,
        style: weapon.style,
        max_hit: outcome.max_hit,
    });
    Ok(outcome)
}
