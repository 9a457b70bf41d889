mod common;

use common::WorldBuilder;
use proptest::prelude::*;
use tribesim_core::{SimError, World};
use tribesim_data::OrganismKind;

const KINDS: [OrganismKind; 3] = [
    OrganismKind::Plant,
    OrganismKind::Herbivore,
    OrganismKind::Carnivore,
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_spawn_never_exceeds_capacity(
        capacity in 1usize..48,
        kinds in prop::collection::vec(0usize..3, 1..96),
    ) {
        let (mut world, _, _) = WorldBuilder::new().with_capacity(capacity).build();
        let mut accepted = 0;
        for (i, k) in kinds.iter().enumerate() {
            let before = world.entity_count();
            match world.spawn_organism(KINDS[*k], i as f32, 0.0, i as f32, None) {
                Ok(_) => accepted += 1,
                Err(err) => {
                    prop_assert!(matches!(err, SimError::CapacityExceeded { .. }), "unexpected error: {:?}", err);
                    prop_assert_eq!(world.entity_count(), before);
                }
            }
            prop_assert!(world.alive_count() <= capacity);
            prop_assert!(world.entity_count() <= capacity);
        }
        prop_assert_eq!(accepted, kinds.len().min(capacity));
    }
}

#[test]
fn test_init_rejects_out_of_range_capacity() {
    assert!(World::init(0, 1).is_err());
    assert!(World::init(1_000_001, 1).is_err());
    assert!(World::init(1, 1).is_ok());
}

#[test]
fn test_raw_views_cover_every_slot() {
    let (world, _, ids) = WorldBuilder::new()
        .with_groups(1)
        .with_organism(OrganismKind::Plant, 1.0, 0.0, 1.0, None)
        .with_organism(OrganismKind::Tribal, 2.0, 0.0, 2.0, Some(0))
        .build();
    let n = world.entity_count();
    assert_eq!(n, 2);
    assert_eq!(world.positions().len(), n);
    assert_eq!(world.energies().len(), n);
    assert_eq!(world.alive_flags().len(), n);
    assert_eq!(world.kinds()[ids[1].index()], OrganismKind::Tribal);
    assert_alive!(world, ids[0]);
}
