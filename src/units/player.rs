//! Player state and the player's per-tick steps
//!
//! The three core inputs (`set_aggro`, `move_to`, `set_seeking_item`) only
//! mutate state; all movement and combat happens in `movement_step` and
//! `attack_step` during the tick.

use ordered_float::OrderedFloat;

use crate::combat::{CombatStance, ProjectileOptions, Weapon, WeaponKind, XpDrop};
use crate::core::config::RunEnergyConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::{GroundItemId, Location, UnitId};
use crate::spatial::{
    angle, can_occupy, collides_with_any_entities, collision_math, construct_paths,
    has_line_of_sight, path, RUN_SPEED, WALK_SPEED,
};
use crate::units::loadout::{EquipmentSlot, Loadout};
use crate::units::unit::{launch_attack, Unit, UnitKind};
use crate::world::context::TickContext;
use crate::world::events::{SimulationEvent, SoundCue};
use crate::world::region::Region;

pub const INVENTORY_SIZE: usize = 28;

/// Upper bound on stamina potion duration, in ticks
const MAX_STAMINA_TICKS: i32 = 200;

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub loadout: Loadout,
    pub stance: CombatStance,
    /// Spell picked from the spellbook for a single cast
    pub manual_spell: Option<Weapon>,
    pub manual_cast_has_target: bool,
    pub destination: Location,
    pub running: bool,
    pub stamina_ticks: i32,
    pub seeking_item: Option<GroundItemId>,
    pub inventory: Vec<Option<String>>,
    /// Experience gained during the current attack step
    pub xp_drops: Vec<XpDrop>,
    /// Equipment slots clicked since the last reset
    pub equipment_interactions: Vec<EquipmentSlot>,
}

impl PlayerState {
    pub fn new(location: Location, loadout: Loadout) -> Self {
        Self {
            stance: loadout.stance,
            loadout,
            manual_spell: None,
            manual_cast_has_target: false,
            destination: location,
            running: true,
            stamina_ticks: 0,
            seeking_item: None,
            inventory: vec![None; INVENTORY_SIZE],
            xp_drops: Vec::new(),
            equipment_interactions: Vec::new(),
        }
    }

    fn open_slot(&self) -> Option<usize> {
        self.inventory.iter().position(Option::is_none)
    }

    pub fn attack_range(&self) -> i32 {
        match &self.manual_spell {
            Some(spell) => spell.attack_range,
            None => self.loadout.attack_weapon().attack_range,
        }
    }
}

fn state(unit: &Unit) -> Result<&PlayerState> {
    unit.player().ok_or(SimError::WrongUnitKind {
        unit: unit.id,
        expected: "player",
    })
}

fn state_mut(unit: &mut Unit) -> Result<&mut PlayerState> {
    let id = unit.id;
    unit.player_mut().ok_or(SimError::WrongUnitKind {
        unit: id,
        expected: "player",
    })
}

pub fn set_aggro(unit: &mut Unit, target: Option<UnitId>) -> Result<()> {
    let player = state_mut(unit)?;
    player.manual_cast_has_target = player.manual_spell.is_some() && target.is_some();
    player.seeking_item = None;
    unit.aggro = target;
    Ok(())
}

pub fn interrupt_combat(unit: &mut Unit) -> Result<()> {
    set_aggro(unit, None)
}

/// Walk to a clicked tile
///
/// Clicking a blocked tile looks for the nearest open tile around it and
/// walks to whichever of those is closest to the player.
pub fn move_to(unit: &mut Unit, region: &Region, x: i32, y: i32) -> Result<()> {
    interrupt_combat(unit)?;
    let origin = unit.location;
    let player = state_mut(unit)?;
    player.manual_spell = None;

    let Some(blocker) = region
        .entities
        .iter()
        .find(|e| e.blocks_movement() && collision_math(x, y, 1, e.location.x, e.location.y, e.size))
    else {
        player.destination = Location::new(x, y);
        return Ok(());
    };

    let clicked = Location::new(x, y);
    let reach = (blocker.size + 1) / 2;
    let mut best: Vec<Location> = Vec::new();
    let mut best_distance = f64::MAX;
    for yy in -reach..reach {
        for xx in -reach..reach {
            let tile = clicked.offset(xx, yy);
            if collides_with_any_entities(region, tile.x, tile.y, 1) {
                continue;
            }
            let distance = tile.distance(&clicked);
            if distance < best_distance {
                best_distance = distance;
                best.clear();
            }
            if distance <= best_distance {
                best.push(tile);
            }
        }
    }
    match best
        .into_iter()
        .min_by_key(|tile| OrderedFloat(tile.distance(&origin)))
    {
        Some(winner) => player.destination = winner,
        None => tracing::warn!(x, y, "no open tile around clicked obstacle"),
    }
    Ok(())
}

pub fn set_seeking_item(unit: &mut Unit, item: GroundItemId) -> Result<()> {
    interrupt_combat(unit)?;
    state_mut(unit)?.seeking_item = Some(item);
    Ok(())
}

/// Queue a single manual cast on `target`
pub fn cast_spell(unit: &mut Unit, spell: Weapon, target: UnitId) -> Result<()> {
    state_mut(unit)?.manual_spell = Some(spell);
    set_aggro(unit, Some(target))
}

/// Apply this tick's prayer selection: overhead sounds and drain
pub fn activate_prayers(unit: &mut Unit, ctx: &mut TickContext) {
    if let Some((previous, current)) = unit.prayers.take_overhead_change() {
        let cue = if previous.is_some() && current.is_none() {
            SoundCue::PrayerOff
        } else {
            SoundCue::PrayerOn
        };
        ctx.emit(SimulationEvent::Sound(cue));
    }
    let prayer_bonus = unit.bonuses.other.prayer;
    if unit.prayers.drain(&mut unit.current_stats.prayer, prayer_bonus) {
        tracing::debug!(unit = ?unit.id, "prayer points depleted");
        ctx.emit(SimulationEvent::PrayerDepleted { unit: unit.id });
    }
}

pub fn movement_step(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    unit.begin_tick_motion();
    if unit.dying > -1 {
        return Ok(());
    }
    take_seeking_item(unit, ctx)?;
    if !unit.is_frozen() {
        determine_destination(unit, ctx.region)?;
        move_towards_destination(unit, ctx)?;
    }
    unit.frozen = (unit.frozen - 1).max(0);
    Ok(())
}

fn take_seeking_item(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    let location = unit.location;
    let player = state_mut(unit)?;
    let Some(item_id) = player.seeking_item else {
        return Ok(());
    };
    let Some(item) = ctx.region.ground_item(item_id) else {
        player.seeking_item = None;
        return Ok(());
    };
    if item.location != location {
        return Ok(());
    }
    let Some(item) = ctx.region.take_ground_item(item_id) else {
        return Ok(());
    };
    match player.open_slot() {
        Some(slot) => player.inventory[slot] = Some(item.name.clone()),
        None => tracing::debug!(item = %item.name, "inventory full, item dropped"),
    }
    player.seeking_item = None;
    ctx.emit(SimulationEvent::ItemPickedUp {
        item: item_id,
        name: item.name,
    });
    Ok(())
}

/// Tiles in melee range of a footprint, north and south rows first
pub fn seeking_tiles(region: &Region, target: Location, size: i32) -> Vec<Location> {
    let mut tiles = Vec::new();
    for xx in 0..size {
        for yy in [-1, size] {
            tiles.push(Location::new(target.x + xx, target.y - yy));
        }
    }
    for yy in 0..size {
        for xx in [-1, size] {
            tiles.push(Location::new(target.x + xx, target.y - yy));
        }
    }
    tiles.retain(|t| !collides_with_any_entities(region, t.x, t.y, 1));
    tiles
}

fn determine_destination(unit: &mut Unit, region: &Region) -> Result<()> {
    let location = unit.location;
    let range = state(unit)?.attack_range();

    let Some(target_id) = unit.aggro else {
        let player = state_mut(unit)?;
        if let Some(item_id) = player.seeking_item {
            match region.ground_item(item_id) {
                Some(item) => player.destination = item.location,
                None => player.seeking_item = None,
            }
        }
        return Ok(());
    };

    let Some(target) = region.unit(target_id) else {
        interrupt_combat(unit)?;
        state_mut(unit)?.destination = location;
        return Ok(());
    };
    if target.dying > -1 {
        state_mut(unit)?.destination = location;
        return Ok(());
    }
    let (target_location, target_size) = (target.location, target.size);

    let under = collision_math(
        location.x,
        location.y,
        1,
        target_location.x,
        target_location.y,
        target_size,
    );
    unit.has_los = has_line_of_sight(region, location, 1, target_location, target_size, range);

    let destination = if under {
        match escape_tile(region, location, target_size) {
            Some(tile) => tile,
            None => {
                tracing::warn!(unit = ?unit.id, "no open tile to step out from under target");
                location
            }
        }
    } else if !unit.has_los {
        let tiles = seeking_tiles(region, target_location, target_size);
        construct_paths(region, location, 1, &tiles)
            .destination
            .unwrap_or(location)
    } else {
        location
    };
    state_mut(unit)?.destination = destination;
    Ok(())
}

/// Nearest open tile around `location`, scanning rows then columns
///
/// Only a strictly smaller distance replaces the current best, so the first
/// tile scanned wins ties.
pub fn escape_tile(region: &Region, location: Location, target_size: i32) -> Option<Location> {
    let reach = (target_size + 1) / 2;
    let mut best_distance = f64::MAX;
    let mut winner = None;
    for yy in -reach..reach {
        for xx in -reach..reach {
            let tile = location.offset(xx, yy);
            if !can_occupy(region, tile.x, tile.y, 1, None) {
                continue;
            }
            let distance = location.distance(&tile);
            if distance > 0.0 && distance < best_distance {
                best_distance = distance;
                winner = Some(tile);
            }
        }
    }
    winner
}

/// Run energy cost of one running tick
pub fn run_drain(config: &RunEnergyConfig, weight_kg: i32) -> i32 {
    let weight = weight_kg.clamp(0, config.weight_cap_kg);
    config.base_drain + config.base_drain * weight / config.weight_cap_kg
}

fn update_run_energy(unit: &mut Unit, config: &RunEnergyConfig) {
    let UnitKind::Player(player) = &mut unit.kind else {
        return;
    };
    let distance = unit.location.chebyshev(&player.destination);
    let run = &mut unit.current_stats.run;
    if player.running && distance > 1 {
        let drain = run_drain(config, player.loadout.weight_kg);
        *run -= if player.stamina_ticks > 0 {
            (f64::from(drain) * config.stamina_multiplier).floor() as i32
        } else {
            drain
        };
    } else {
        *run += player.loadout.agility / 6 + config.recovery_base;
    }
    *run = (*run).clamp(0, config.max_energy);
    if *run == 0 {
        player.running = false;
    }
    player.stamina_ticks = (player.stamina_ticks - 1).clamp(0, MAX_STAMINA_TICKS);
}

fn move_towards_destination(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    update_run_energy(unit, &ctx.config.run);
    let player = state(unit)?;
    let speed = if player.running { RUN_SPEED } else { WALK_SPEED };
    let step = path(ctx.region, unit.location, player.destination, speed, 1);

    unit.location = step.location;
    unit.steps = step.steps;
    state_mut(unit)?.destination = step.destination;
    unit.next_angle = facing(unit, ctx.region);
    Ok(())
}

fn facing(unit: &Unit, region: &Region) -> f64 {
    let from = unit.perceived_location;
    let size = f64::from(unit.size);
    if let Some(target) = unit.aggro.and_then(|id| region.unit(id)) {
        let half = f64::from(target.size) / 2.0;
        return -angle(
            f64::from(from.x) + size / 2.0,
            f64::from(from.y) - size / 2.0,
            f64::from(target.location.x) + half,
            f64::from(target.location.y) - half,
        );
    }
    match unit.steps.last() {
        Some(last) => -angle(
            f64::from(from.x),
            f64::from(from.y),
            f64::from(last.x),
            f64::from(last.y),
        ),
        None => unit.resting_angle,
    }
}

pub fn attack_step(unit: &mut Unit, ctx: &mut TickContext) -> Result<()> {
    if unit.detect_death() {
        tracing::info!(unit = ?unit.id, tick = ctx.tick, "player died");
        ctx.emit(SimulationEvent::Died { unit: unit.id });
    }
    if unit.dying > -1 {
        return Ok(());
    }
    state_mut(unit)?.xp_drops.clear();
    attack_if_possible(unit, ctx)?;

    let landed = unit.process_incoming_attacks();
    ctx.report_hits(unit.id, &landed);

    for drop in std::mem::take(&mut state_mut(unit)?.xp_drops) {
        ctx.emit(SimulationEvent::Experience {
            skill: drop.skill,
            xp: drop.xp,
        });
    }

    if unit.auto_retaliate && unit.aggro.is_none() {
        let attacker = landed
            .iter()
            .filter_map(|hit| hit.from)
            .find(|id| ctx.region.is_alive(*id));
        if attacker.is_some() {
            set_aggro(unit, attacker)?;
        }
    }
    Ok(())
}

/// Attack the current target if in range and off cooldown
///
/// A manual cast may also land on a target on the first tick of its death
/// animation; the normal weapon never does.
pub fn attack_if_possible(unit: &mut Unit, ctx: &mut TickContext) -> Result<bool> {
    unit.attack_delay -= 1;
    if !unit.can_attack() {
        return Ok(false);
    }
    let Some(target_id) = unit.aggro else {
        return Ok(false);
    };
    let Some(target) = ctx.region.unit(target_id) else {
        interrupt_combat(unit)?;
        return Ok(false);
    };
    let (target_location, target_size) = (target.location, target.size);
    let (target_dying, target_death_length) = (target.dying, target.death_animation_length);

    let player = state(unit)?;
    let range = player.attack_range();
    let ghost_cast = player.manual_spell.is_some()
        && player.manual_cast_has_target
        && target_dying == target_death_length;
    unit.has_los = has_line_of_sight(
        ctx.region,
        unit.location,
        unit.size,
        target_location,
        target_size,
        range,
    );

    let ready = unit.has_los && unit.attack_delay <= 0;
    let mut attacked = false;
    if ready && target_dying == -1 {
        attacked = attack(unit, ctx, target_id)?;
    } else if ready && ghost_cast {
        tracing::debug!(unit = ?unit.id, target = ?target_id, "ghost barrage");
        attacked = attack(unit, ctx, target_id)?;
    }

    if unit.aggro.is_some() && target_dying > 0 {
        interrupt_combat(unit)?;
    }
    Ok(attacked)
}

fn attack(unit: &mut Unit, ctx: &mut TickContext, target: UnitId) -> Result<bool> {
    let player = state(unit)?;
    let mods = player.loadout.modifiers;

    if let Some(spell) = player.manual_spell.clone() {
        launch_attack(ctx, unit, target, &spell, &mods, ProjectileOptions::default(), 0)?;
        unit.attack_delay = spell.attack_speed;
        interrupt_combat(unit)?;
        let location = unit.location;
        let player = state_mut(unit)?;
        player.manual_spell = None;
        player.destination = location;
        return Ok(true);
    }

    let weapon = player.loadout.attack_weapon();
    let speed_modifier = if weapon.kind == WeaponKind::Ranged {
        player.stance.speed_modifier()
    } else {
        0
    };
    launch_attack(ctx, unit, target, &weapon, &mods, ProjectileOptions::default(), 0)?;
    unit.attack_delay = weapon.attack_speed + speed_modifier;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::entity::EntityKind;

    fn player_at(region: &mut Region, x: i32, y: i32) -> UnitId {
        region
            .spawn_player(Location::new(x, y), Loadout::melee())
            .unwrap()
    }

    #[test]
    fn test_move_to_open_tile() {
        let mut region = Region::new(30, 30);
        let id = player_at(&mut region, 5, 5);
        let mut unit = region.checkout(id).unwrap();
        move_to(&mut unit, &region, 9, 5).unwrap();
        assert_eq!(unit.player().unwrap().destination, Location::new(9, 5));
    }

    #[test]
    fn test_move_to_blocked_tile_picks_neighbour() {
        let mut region = Region::new(30, 30);
        region.add_entity(Location::new(10, 10), 1, EntityKind::Pillar);
        let id = player_at(&mut region, 5, 10);
        let mut unit = region.checkout(id).unwrap();
        move_to(&mut unit, &region, 10, 10).unwrap();
        // Candidates at distance 1 are (10, 9) and (9, 10); (9, 10) is nearer the player
        assert_eq!(unit.player().unwrap().destination, Location::new(9, 10));
    }

    #[test]
    fn test_escape_scan_prefers_first_scanned() {
        let region = Region::new(30, 30);
        // Rows scanned from the top; (10, 9) comes before (9, 10) and (11, 10)
        assert_eq!(
            escape_tile(&region, Location::new(10, 10), 3),
            Some(Location::new(10, 9))
        );
    }

    #[test]
    fn test_seeking_tiles_order() {
        let region = Region::new(30, 30);
        let tiles = seeking_tiles(&region, Location::new(10, 10), 1);
        assert_eq!(
            tiles,
            vec![
                Location::new(10, 11),
                Location::new(10, 9),
                Location::new(9, 10),
                Location::new(11, 10),
            ]
        );
    }

    #[test]
    fn test_run_drain_scales_with_weight() {
        let config = RunEnergyConfig::default();
        assert_eq!(run_drain(&config, 0), 67);
        assert_eq!(run_drain(&config, 32), 100);
        assert_eq!(run_drain(&config, 500), 134);
        assert_eq!(run_drain(&config, -5), 67);
    }

    #[test]
    fn test_set_aggro_tracks_manual_cast_target() {
        let mut region = Region::new(30, 30);
        let id = player_at(&mut region, 5, 5);
        let mut unit = region.checkout(id).unwrap();
        cast_spell(&mut unit, Weapon::ice_barrage(), UnitId::new(3, 0)).unwrap();
        assert!(unit.player().unwrap().manual_cast_has_target);
        interrupt_combat(&mut unit).unwrap();
        assert!(!unit.player().unwrap().manual_cast_has_target);
        assert!(unit.aggro.is_none());
    }

    #[test]
    fn test_player_steps_reject_mobs() {
        let mut region = Region::new(30, 30);
        let id = region
            .spawn_mob(crate::units::MobProfile::jal_xil(), Location::new(5, 5), None)
            .unwrap();
        let mut unit = region.checkout(id).unwrap();
        assert!(matches!(
            set_aggro(&mut unit, None),
            Err(SimError::WrongUnitKind { .. })
        ));
    }
}
