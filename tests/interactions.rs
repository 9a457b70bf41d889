mod common;

use common::{scripted_brain, WorldBuilder};
use proptest::prelude::*;
use tribesim_core::brain::output;
use tribesim_data::OrganismKind;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_eating_moves_energy_from_prey_to_eater(dt in 0.02f32..1.0) {
        let (mut world, _, ids) = WorldBuilder::new()
            .with_organism(OrganismKind::Herbivore, 50.0, 0.0, 50.0, None)
            .with_organism(OrganismKind::Plant, 51.0, 0.0, 50.0, None)
            .build();
        let (eater, plant) = (ids[0], ids[1]);
        world.set_brain(eater, scripted_brain(&[(output::EAT, 3.0)]));
        world.set_energy(eater, 30.0);
        world.set_energy(plant, 60.0);

        let eater_before = world.energies()[eater.index()];
        let plant_before = world.energies()[plant.index()];
        world.update(dt);

        prop_assert!(world.energies()[eater.index()] > eater_before);
        prop_assert!(world.energies()[plant.index()] < plant_before);
    }
}

#[test]
fn test_carnivore_attack_wounds_prey() {
    let (mut world, _, ids) = WorldBuilder::new()
        .with_organism(OrganismKind::Carnivore, 50.0, 0.0, 50.0, None)
        .with_organism(OrganismKind::Herbivore, 51.0, 0.0, 50.0, None)
        .build();
    let (hunter, prey) = (ids[0], ids[1]);
    world.set_brain(hunter, scripted_brain(&[(output::ATTACK, 3.0)]));
    world.set_brain(prey, scripted_brain(&[]));
    world.set_health(prey, 100.0);

    world.update(0.1);
    assert!(world.healths()[prey.index()] < 100.0);
    assert!(world.attacking_flags()[hunter.index()]);
}

#[test]
fn test_tribal_agents_only_fight_at_war() {
    let (mut world, groups, ids) = WorldBuilder::new()
        .with_groups(2)
        .with_organism(OrganismKind::Tribal, 50.0, 0.0, 50.0, Some(0))
        .with_organism(OrganismKind::Tribal, 51.0, 0.0, 50.0, Some(1))
        .build();
    let (a, b) = (ids[0], ids[1]);
    world.set_brain(a, scripted_brain(&[(output::ATTACK, 3.0)]));
    world.set_brain(b, scripted_brain(&[]));
    world.set_health(b, 100.0);

    world.update(0.1);
    assert_eq!(world.healths()[b.index()], 100.0);

    world.declare_war(groups[0], groups[1]).expect("war");
    world.update(0.1);
    assert!(world.healths()[b.index()] < 100.0);
    assert!(world.is_at_war(groups[0], groups[1]));
}
