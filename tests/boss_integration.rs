//! Sol Heredit integration tests
//!
//! Each test runs the full encounter through `World::tick_world` with only
//! some of the boss's attacks enabled, and reads the outcome from the event
//! stream.

use colosseum_sim::boss::GRAPPLE_SLOTS;
use colosseum_sim::combat::Prayer;
use colosseum_sim::core::config::{BossAttackToggles, SimulationConfig};
use colosseum_sim::core::types::UnitId;
use colosseum_sim::units::Loadout;
use colosseum_sim::world::arena::colosseum_encounter;
use colosseum_sim::world::{HazardKind, PlayerInput, SimulationEvent, SoundCue, World};

const NO_ATTACKS: BossAttackToggles = BossAttackToggles {
    use_spears: false,
    use_shields: false,
    use_triple_long: false,
    use_triple_short: false,
    use_grapple: false,
};

struct Encounter {
    world: World,
    player: UnitId,
    boss: UnitId,
}

/// Encounter with a player sturdy enough to stand through every attack
fn encounter(boss: BossAttackToggles, seed: u64) -> Encounter {
    let (mut region, player, boss_id) = colosseum_encounter(Loadout::melee()).unwrap();
    let unit = region.unit_mut(player).unwrap();
    unit.stats.hitpoint = 10_000;
    unit.current_stats.hitpoint = 10_000;
    let config = SimulationConfig {
        seed,
        boss,
        ..SimulationConfig::default()
    };
    Encounter {
        world: World::new(region, config),
        player,
        boss: boss_id,
    }
}

#[test]
fn test_phases_advance_one_at_a_time() {
    let mut e = encounter(BossAttackToggles::default(), 7);
    let mut phases = Vec::new();
    for _ in 0..30 {
        if let Some(boss) = e.world.region.unit_mut(e.boss) {
            boss.current_stats.hitpoint = (boss.current_stats.hitpoint - 60).max(0);
        }
        for event in e.world.tick_world() {
            if let SimulationEvent::PhaseChanged { boss, phase } = event {
                assert_eq!(boss, e.boss);
                phases.push(phase);
            }
        }
    }
    assert_eq!(phases, vec![0, 1, 2, 3, 4, 5]);
}

/// Count phase changes and pool drops over `ticks` after setting the boss's
/// hitpoints in one burst
fn burst_then_count(hitpoint: i32, ticks: usize) -> (Vec<i32>, usize) {
    let mut e = encounter(NO_ATTACKS, 9);
    e.world.region.unit_mut(e.boss).unwrap().current_stats.hitpoint = hitpoint;
    let mut phases = Vec::new();
    let mut pool_drops = 0;
    for _ in 0..ticks {
        for event in e.world.tick_world() {
            match event {
                SimulationEvent::PhaseChanged { phase, .. } => phases.push(phase),
                SimulationEvent::HazardsPlaced {
                    kind: HazardKind::SandPool,
                    ..
                } => pool_drops += 1,
                _ => {}
            }
        }
    }
    (phases, pool_drops)
}

#[test]
fn test_burst_over_two_thresholds_drops_pools_twice() {
    let (phases, pool_drops) = burst_then_count(1000, 60);
    assert_eq!(phases, vec![0, 1, 2]);
    assert_eq!(pool_drops, 2);
}

#[test]
fn test_burst_over_every_threshold_drops_pools_each_time() {
    let (phases, pool_drops) = burst_then_count(100, 150);
    assert_eq!(phases, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(pool_drops, 5);
}

#[test]
fn test_opening_phase_drops_no_pools() {
    let (phases, pool_drops) = burst_then_count(1500, 20);
    assert_eq!(phases, vec![0]);
    assert_eq!(pool_drops, 0);
}

#[test]
fn test_spear_patterns_alternate() {
    let mut e = encounter(
        BossAttackToggles {
            use_spears: true,
            ..NO_ATTACKS
        },
        3,
    );
    let mut slams = Vec::new();
    for _ in 0..60 {
        for event in e.world.tick_world() {
            if let SimulationEvent::HazardsPlaced {
                source,
                kind: HazardKind::GroundSlam,
                tiles,
            } = event
            {
                assert_eq!(source, Some(e.boss));
                slams.push(tiles.len());
            }
        }
        if slams.len() >= 2 {
            break;
        }
    }
    assert!(slams.len() >= 2, "boss never slammed twice");
    // The second spear covers a wider pattern than the first
    assert!(slams[0] < slams[1]);
}

#[test]
fn test_held_overhead_is_punished_by_triple() {
    let mut e = encounter(
        BossAttackToggles {
            use_triple_short: true,
            ..NO_ATTACKS
        },
        11,
    );
    e.world.queue_input(PlayerInput::TogglePrayer {
        prayer: Prayer::ProtectFromMelee,
    });

    let mut parries = Vec::new();
    for _ in 0..40 {
        for event in e.world.tick_world() {
            if let SimulationEvent::Hitsplat {
                target,
                from: Some(from),
                damage,
                blocked,
            } = event
            {
                if target == e.player && from == e.boss {
                    parries.push((damage, blocked));
                }
            }
        }
        if !parries.is_empty() {
            break;
        }
    }
    assert_eq!(parries.first(), Some(&(15, false)));
    let player = e.world.region.unit(e.player).unwrap();
    assert_eq!(player.prayers.overhead(), None);
}

#[test]
fn test_grapple_parried_by_clicking_named_slot() {
    let mut e = encounter(
        BossAttackToggles {
            use_grapple: true,
            ..NO_ATTACKS
        },
        5,
    );
    let mut parried = false;
    let mut grapple_hit = None;
    for _ in 0..40 {
        for event in e.world.tick_world() {
            match event {
                SimulationEvent::OverheadText { unit, text } if unit == e.boss => {
                    if let Some((slot, _)) = GRAPPLE_SLOTS.iter().find(|(_, t)| *t == text) {
                        e.world
                            .queue_input(PlayerInput::EquipmentInteraction { slot: *slot });
                    }
                }
                SimulationEvent::Sound(SoundCue::GrappleParry) => parried = true,
                SimulationEvent::Hitsplat {
                    target,
                    from: Some(from),
                    damage,
                    ..
                } if target == e.player && from == e.boss => {
                    grapple_hit.get_or_insert(damage);
                }
                _ => {}
            }
        }
        if grapple_hit.is_some() {
            break;
        }
    }
    assert!(parried);
    assert_eq!(grapple_hit, Some(0));
}

#[test]
fn test_ignored_grapple_deals_damage() {
    let mut e = encounter(
        BossAttackToggles {
            use_grapple: true,
            ..NO_ATTACKS
        },
        5,
    );
    let mut grapple_hit = None;
    for _ in 0..40 {
        for event in e.world.tick_world() {
            if let SimulationEvent::Hitsplat {
                target,
                from: Some(from),
                damage,
                ..
            } = event
            {
                if target == e.player && from == e.boss {
                    grapple_hit.get_or_insert(damage);
                }
            }
        }
        if grapple_hit.is_some() {
            break;
        }
    }
    let damage = grapple_hit.expect("grapple never landed");
    assert!((20..45).contains(&damage));
}
