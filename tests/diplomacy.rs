mod common;

use common::WorldBuilder;
use proptest::prelude::*;
use tribesim_core::config::DiplomacyConfig;
use tribesim_core::diplomacy::{Diplomacy, REPUTATION_MAX, REPUTATION_MIN};
use tribesim_core::{SimError, World};
use tribesim_data::{
    DiplomaticStatus, GroupId, OrganismKind, ResourceBundle, TreatyType, WarOutcome, WarReason,
};

fn pair() -> (Diplomacy, GroupId, GroupId) {
    (
        Diplomacy::new(4, DiplomacyConfig::default()),
        GroupId(0),
        GroupId(1),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_reputation_change_is_asymmetric(
        start_ab in -100.0f32..100.0,
        start_ba in -100.0f32..100.0,
        delta in prop_oneof![-150.0f32..-0.01, 0.01f32..150.0],
    ) {
        let (mut d, a, b) = pair();
        d.modify_reputation(a, b, start_ab);
        // Undo the counterpart share of the setup step, then set b's view.
        let ba_now = d.reputation(b, a);
        d.modify_reputation(b, a, start_ba - ba_now);
        let before_ab = d.reputation(a, b);
        let before_ba = d.reputation(b, a);

        prop_assert!(d.modify_reputation(a, b, delta));

        let expected_ab = (before_ab + delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        let expected_ba = (before_ba + 0.75 * delta).clamp(REPUTATION_MIN, REPUTATION_MAX);
        prop_assert!((d.reputation(a, b) - expected_ab).abs() < 1e-3);
        prop_assert!((d.reputation(b, a) - expected_ba).abs() < 1e-3);
    }

    #[test]
    fn test_one_sided_battles_always_end_the_war(attacker_wins in any::<bool>()) {
        let (mut d, a, b) = pair();
        d.declare_war(a, b, WarReason::Decree, 0.0).unwrap();
        let (winner, loser) = if attacker_wins { (a, b) } else { (b, a) };

        let mut resolution = None;
        for step in 0..20 {
            resolution = d.record_battle(winner, loser, step as f32);
            if resolution.is_some() {
                break;
            }
        }
        let resolution = resolution.expect("war should resolve");
        prop_assert!(resolution.war.score.abs() >= 80.0);
        prop_assert_eq!(resolution.winner(), Some(winner));
        prop_assert!(!d.is_at_war(a, b));
    }
}

#[test]
fn test_casualties_drive_defender_victory() {
    let (mut d, a, b) = pair();
    d.declare_war(a, b, WarReason::Territory, 0.0).unwrap();
    let mut outcome = None;
    for i in 0..40 {
        if let Some(r) = d.record_casualty(b, a, i as f32) {
            outcome = Some(r.outcome);
            break;
        }
    }
    assert_eq!(outcome, Some(WarOutcome::DefenderVictory));
    assert!(!d.is_at_war(a, b));
    assert_eq!(d.status(b, a), DiplomaticStatus::Overlord);
    assert_eq!(d.status(a, b), DiplomaticStatus::Vassal);
}

#[test]
fn test_war_voids_treaties_and_costs_reputation() {
    let (mut d, a, b) = pair();
    d.sign_treaty(TreatyType::Trade, a, b, 0.0).unwrap();
    let before = d.reputation(a, b);
    d.declare_war(a, b, WarReason::Decree, 1.0).unwrap();
    assert_eq!(d.treaties_between(a, b).count(), 0);
    assert!(d.reputation(a, b) < before);
    assert_eq!(d.status(a, b), DiplomaticStatus::Hostile);
    assert!(d.declare_war(b, a, WarReason::Decree, 2.0).is_err());
}

#[test]
fn test_world_force_peace_and_trade() {
    let (mut world, groups, _) = WorldBuilder::new().with_groups(2).build();
    let (a, b) = (groups[0], groups[1]);

    world.declare_war(a, b).unwrap();
    assert!(world.is_at_war(a, b));
    let peace = world.force_peace(a, b).unwrap();
    assert_eq!(peace.outcome, WarOutcome::WhitePeace);
    assert!(!world.is_at_war(a, b));
    assert!(world.force_peace(a, b).is_err());

    let offered = ResourceBundle {
        food: 10.0,
        ..ResourceBundle::default()
    };
    let requested = ResourceBundle {
        wood: 5.0,
        ..ResourceBundle::default()
    };
    let food_a = world.group_resources(a).unwrap().food;
    let offer = world.propose_trade(a, b, offered, requested).unwrap();
    world.accept_trade(offer).unwrap();
    assert!((world.group_resources(a).unwrap().food - (food_a - 10.0)).abs() < 1e-3);
    assert!(world.accept_trade(offer).is_err());
}

fn food(amount: f32) -> ResourceBundle {
    ResourceBundle {
        food: amount,
        ..ResourceBundle::default()
    }
}

fn wood(amount: f32) -> ResourceBundle {
    ResourceBundle {
        wood: amount,
        ..ResourceBundle::default()
    }
}

fn stocks(world: &World, a: GroupId, b: GroupId) -> (ResourceBundle, ResourceBundle) {
    (
        world.group_resources(a).unwrap(),
        world.group_resources(b).unwrap(),
    )
}

#[test]
fn test_trade_fails_when_recipient_cannot_pay() {
    let (mut world, groups, _) = WorldBuilder::new().with_groups(2).build();
    let (a, b) = (groups[0], groups[1]);
    let before = stocks(&world, a, b);

    let offer = world.propose_trade(a, b, food(10.0), wood(1.0e6)).unwrap();
    assert_eq!(world.accept_trade(offer), Err(SimError::InsufficientResources));
    assert_eq!(stocks(&world, a, b), before);
    assert!(world.diplomacy().trade_offers().is_empty());
}

#[test]
fn test_trade_fails_when_offerer_spent_its_stock() {
    let (mut world, groups, _) = WorldBuilder::new().with_groups(2).build();
    let (a, b) = (groups[0], groups[1]);
    let all_food = world.group_resources(a).unwrap().food;

    let stale = world
        .propose_trade(a, b, food(all_food), ResourceBundle::default())
        .unwrap();
    let fresh = world
        .propose_trade(a, b, food(all_food), ResourceBundle::default())
        .unwrap();
    world.accept_trade(fresh).unwrap();
    let after_first = stocks(&world, a, b);
    assert!(after_first.0.food.abs() < 1e-3);

    assert_eq!(world.accept_trade(stale), Err(SimError::InsufficientResources));
    assert_eq!(stocks(&world, a, b), after_first);
}

#[test]
fn test_extinct_partner_voids_pending_trade() {
    let (mut world, groups, ids) = WorldBuilder::new()
        .with_still_agents()
        .with_groups(2)
        .with_organism(OrganismKind::Tribal, 50.0, 0.0, 50.0, Some(0))
        .with_organism(OrganismKind::Tribal, 300.0, 0.0, 300.0, Some(1))
        .build();
    let (a, b) = (groups[0], groups[1]);
    let offer = world.propose_trade(a, b, food(10.0), wood(5.0)).unwrap();

    assert!(world.set_health(ids[1], 0.0));
    world.update(0.05);
    assert_dead!(world, ids[1]);
    assert_eq!(world.group_count(), 1);
    assert!(world.diplomacy().trade_offers().is_empty());

    let before = stocks(&world, a, b);
    assert!(matches!(
        world.accept_trade(offer),
        Err(SimError::InvalidReference { .. })
    ));
    assert_eq!(stocks(&world, a, b), before);
}
