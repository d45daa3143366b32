//! Combat integration tests
//!
//! Formula bounds, prayer protection and projectile delivery checked against
//! real units in a region.

use colosseum_sim::combat::{
    hit_chance, resolve_attack, AttackModifiers, AttackStyle, Prayer, Projectile,
    ProjectileOptions, Weapon,
};
use colosseum_sim::core::rng::seeded;
use colosseum_sim::core::types::{Location, UnitId};
use colosseum_sim::units::{Loadout, MobProfile};
use colosseum_sim::world::Region;
use proptest::prelude::*;

fn duel() -> (Region, UnitId, UnitId) {
    let mut region = Region::new(30, 30);
    let player = region
        .spawn_player(Location::new(10, 10), Loadout::melee())
        .unwrap();
    let mob = region
        .spawn_mob(MobProfile::jal_im_kot(), Location::new(11, 10), Some(player))
        .unwrap();
    (region, player, mob)
}

fn hit(region: &Region, weapon: &Weapon, damage: i32, from: UnitId, to: UnitId, delay: i32) -> Projectile {
    let source = region.unit(from).unwrap();
    Projectile::new(
        weapon,
        damage,
        Some(from),
        to,
        source.center(),
        1,
        ProjectileOptions {
            set_delay: Some(delay),
            ..ProjectileOptions::default()
        },
    )
}

proptest! {
    #[test]
    fn test_hit_chance_is_a_probability(attack in 0i64..500_000, defence in 0i64..500_000) {
        let chance = hit_chance(attack, defence);
        prop_assert!((0.0..=1.0).contains(&chance));
    }

    #[test]
    fn test_rolled_damage_within_max_hit(seed in any::<u64>()) {
        let (region, player, mob) = duel();
        let weapon = Weapon::melee("Ghrazi rapier", AttackStyle::Stab, 4);
        let outcome = resolve_attack(
            &weapon,
            &region.unit(player).unwrap().combatant(),
            &region.unit(mob).unwrap().combatant(),
            &AttackModifiers::default(),
            &mut seeded(seed),
        );
        prop_assert!(outcome.damage >= 0);
        prop_assert!(outcome.damage <= outcome.max_hit);
    }

    #[test]
    fn test_hitpoints_stay_in_range(damages in prop::collection::vec(0i32..150, 1..12)) {
        let (mut region, player, mob) = duel();
        let weapon = Weapon::melee("Spear", AttackStyle::Stab, 4);
        let projectiles: Vec<_> = damages
            .iter()
            .map(|&damage| hit(&region, &weapon, damage, mob, player, 1))
            .collect();
        let unit = region.unit_mut(player).unwrap();
        unit.incoming_projectiles.extend(projectiles);
        unit.process_incoming_attacks();
        prop_assert!(unit.current_stats.hitpoint >= 0);
        prop_assert!(unit.current_stats.hitpoint <= unit.stats.hitpoint);
    }
}

#[test]
fn test_protection_prayer_zeroes_matching_style() {
    let (mut region, player, mob) = duel();
    let weapon = Weapon::melee("Spear", AttackStyle::Stab, 4);
    let melee = hit(&region, &weapon, 30, mob, player, 1);
    let magic = hit(&region, &Weapon::magic("Blast", 20, 5), 12, mob, player, 1);

    let unit = region.unit_mut(player).unwrap();
    unit.prayers.activate(Prayer::ProtectFromMelee);
    unit.incoming_projectiles.push(melee);
    unit.incoming_projectiles.push(magic);
    let landed = unit.process_incoming_attacks();

    assert_eq!(landed.len(), 2);
    assert!(landed[0].blocked);
    assert_eq!(landed[0].damage, 0);
    assert!(!landed[1].blocked);
    assert_eq!(landed[1].damage, 12);
    assert_eq!(unit.current_stats.hitpoint, unit.stats.hitpoint - 12);
}

#[test]
fn test_unblockable_ignores_prayer() {
    let (mut region, player, mob) = duel();
    let projectile = hit(&region, &Weapon::unblockable(AttackStyle::Stab), 25, mob, player, 1);
    let unit = region.unit_mut(player).unwrap();
    unit.prayers.activate(Prayer::ProtectFromMelee);
    unit.incoming_projectiles.push(projectile);
    let landed = unit.process_incoming_attacks();
    assert_eq!(landed[0].damage, 25);
    assert!(!landed[0].blocked);
}

#[test]
fn test_projectile_lands_exactly_once() {
    let (mut region, player, mob) = duel();
    let weapon = Weapon::ranged("Bow", 4, 10);
    let projectile = hit(&region, &weapon, 7, mob, player, 3);
    let unit = region.unit_mut(player).unwrap();
    unit.incoming_projectiles.push(projectile);

    let mut landings = Vec::new();
    for tick in 1..=6 {
        for landed in unit.process_incoming_attacks() {
            landings.push((tick, landed.damage));
        }
    }
    assert_eq!(landings, vec![(3, 7)]);
    assert!(unit.incoming_projectiles.is_empty());
    assert_eq!(unit.current_stats.hitpoint, unit.stats.hitpoint - 7);
}
