mod common;

use common::WorldBuilder;
use proptest::prelude::*;
use tribesim_core::config::TerritoryConfig;
use tribesim_core::math::{Vec3, XorShiftRng};
use tribesim_core::territory::{ClaimOutcome, Territory};
use tribesim_data::GroupId;

#[test]
fn test_contested_cell_goes_to_the_pressing_side() {
    let (mut world, groups, _) = WorldBuilder::new().with_groups(2).build();
    let (a, b) = (groups[0], groups[1]);
    let (x, z) = (60.0, 60.0);

    assert_eq!(world.claim_territory(a, x, 0.0, z), Ok(ClaimOutcome::Claimed));
    assert_eq!(world.claim_territory(b, x, 0.0, z), Ok(ClaimOutcome::Contested));
    let cell = world.territory().cell_index(Vec3::new(x, 0.0, z)).unwrap();
    assert_eq!(world.cell_owner(cell), Some(a));
    assert_eq!(world.territory_count(a), 1);

    let mut transfer = None;
    for _ in 0..100 {
        transfer = world.apply_border_pressure(b, a, 10.0);
        if transfer.is_some() {
            break;
        }
        assert_eq!(world.cell_owner(cell), Some(a));
    }
    let transfer = transfer.expect("pressure should settle the contest");
    assert_eq!(transfer.from, Some(a));
    assert_eq!(transfer.to, b);
    assert_eq!(world.cell_owner(cell), Some(b));
    assert_eq!(world.territory_count(a), 0);
    assert_eq!(world.territory_count(b), 1);
}

#[test]
fn test_pressure_without_a_contest_does_nothing() {
    let (mut world, groups, _) = WorldBuilder::new().with_groups(2).build();
    assert!(world.apply_border_pressure(groups[0], groups[1], 10.0).is_none());
    assert!(world.apply_border_pressure(groups[0], groups[1], -1.0).is_none());
}

#[test]
fn test_claims_outside_the_map_are_rejected() {
    let (mut world, groups, _) = WorldBuilder::new().with_groups(1).build();
    assert!(world.claim_territory(groups[0], f32::NAN, 0.0, 1.0).is_err());
    assert!(world.claim_territory(GroupId(9), 1.0, 0.0, 1.0).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_each_cell_has_at_most_one_owner(
        claims in prop::collection::vec((0u16..3, 0.0f32..200.0, 0.0f32..200.0), 1..60),
    ) {
        let mut rng = XorShiftRng::new(5);
        let mut territory = Territory::new(
            Vec3::new(200.0, 20.0, 200.0),
            3,
            TerritoryConfig::default(),
            &mut rng,
        );
        for (i, (g, x, z)) in claims.iter().enumerate() {
            let group = GroupId(*g);
            let position = Vec3::new(*x, 0.0, *z);
            let index = territory.cell_index(position).unwrap();
            let before = territory.owner_at(position);
            let contester = territory.cell(index).unwrap().contested_by;
            let outcome = territory.claim(position, group, i as f32).unwrap();
            let after = territory.owner_at(position);
            match before {
                None => prop_assert_eq!(after, Some(group)),
                Some(owner) if owner == group => prop_assert_eq!(outcome, ClaimOutcome::Reinforced),
                Some(owner) => match contester {
                    Some(c) if c != group => {
                        prop_assert_eq!(outcome, ClaimOutcome::Blocked);
                        prop_assert_eq!(after, Some(owner));
                        prop_assert_eq!(territory.cell(index).unwrap().contested_by, Some(c));
                    }
                    _ => prop_assert!(matches!(
                        outcome,
                        ClaimOutcome::Contested | ClaimOutcome::ContestStrengthened
                    )),
                },
            }
            let conflicts = territory.conflicts();
            for (n, c) in conflicts.iter().enumerate() {
                prop_assert!(conflicts[n + 1..].iter().all(|o| o.cell != c.cell));
            }

            let owned = territory.cells().iter().filter(|c| c.owner.is_some()).count();
            let counted: usize = (0..3).map(|g| territory.territory_count(GroupId(g))).sum();
            prop_assert_eq!(owned, counted);
        }
    }
}
