mod common;

use common::WorldBuilder;
use tribesim_core::DiseaseLogic;
use tribesim_data::{Disease, OrganismKind};

#[test]
fn test_forced_conception_yields_exactly_one_birth() {
    let (mut world, groups, ids) = WorldBuilder::new()
        .with_still_agents()
        .with_groups(1)
        .with_organism(OrganismKind::Tribal, 100.0, 0.0, 100.0, Some(0))
        .with_organism(OrganismKind::Tribal, 101.0, 0.0, 100.0, Some(0))
        .build();
    let g = groups[0];
    let adult = world.population().adult_age_secs();
    for &id in &ids {
        assert!(world.set_age(id, adult + 1.0));
        assert!(world.set_energy(id, 90.0));
        assert!(world.set_health(id, 90.0));
    }
    let parent = ids[0];
    assert!(world.force_conception(parent));
    assert!(!world.force_conception(parent), "already pregnant");

    let gestation = world.config().population.gestation_secs;
    let ticks = (gestation / 0.5) as usize + 4;
    let births_before = world.tribes().get(g).unwrap().births;
    let mut born_at = None;
    for tick in 0..ticks {
        world.update(0.5);
        if world.tribes().get(g).unwrap().births > births_before {
            born_at = Some(tick);
            break;
        }
    }
    assert!(born_at.is_some(), "no birth after the gestation window");
    assert_eq!(world.tribes().get(g).unwrap().births, births_before + 1);
    assert_eq!(world.group_members(g), 3);

    let parent_pos = world.positions()[parent.index()];
    let radius = world.config().population.birth_radius;
    let child = world
        .organisms()
        .iter_alive()
        .find(|&s| {
            world.kinds()[s] == OrganismKind::Tribal && !ids.iter().any(|id| id.index() == s)
        })
        .expect("newborn");
    assert_eq!(world.groups()[child], Some(g));
    assert!(world.positions()[child].distance(parent_pos) <= radius + 1e-3);
    assert_eq!(world.population_stats().births, 1);
}

#[test]
fn test_recovery_grants_immunity() {
    let (mut world, _, ids) = WorldBuilder::new()
        .with_still_agents()
        .with_organism(OrganismKind::Tribal, 100.0, 0.0, 100.0, None)
        .build();
    let id = ids[0];
    world.set_energy(id, 100.0);
    let slot = id.index();
    let before = world.population().state(slot).unwrap().immunity_to(Disease::Cold);

    assert!(world.infect(id, Disease::Cold));
    assert!(!world.infect(id, Disease::Fever), "one disease at a time");
    assert_eq!(world.population().state(slot).unwrap().disease, Disease::Cold);

    let ticks = Disease::Cold.recovery_secs() as usize + 3;
    for _ in 0..ticks {
        world.update(1.0);
    }
    assert_alive!(world, id);
    let state = world.population().state(slot).unwrap();
    assert_eq!(state.disease, Disease::None);
    assert!(state.immunity_to(Disease::Cold) > before);
    assert_eq!(world.population_stats().recoveries, 1);
    assert_eq!(world.population_stats().disease_cases, 1);
}

#[test]
fn test_starvation_kills_and_is_counted() {
    let (mut world, _, ids) = WorldBuilder::new()
        .with_still_agents()
        .with_organism(OrganismKind::Herbivore, 10.0, 0.0, 10.0, None)
        .build();
    let id = ids[0];
    world.set_energy(id, 0.5);
    for _ in 0..20 {
        world.update(0.5);
    }
    assert_dead!(world, id);
    assert_eq!(world.population_stats().deaths_starvation, 1);
    assert_population!(world, 0);
}

#[test]
fn test_outbreak_only_hits_animals() {
    let (mut plants_only, _, _) = WorldBuilder::new()
        .with_organism(OrganismKind::Plant, 50.0, 0.0, 50.0, None)
        .build();
    assert_eq!(plants_only.start_outbreak(), None);

    let (mut world, _, ids) = WorldBuilder::new()
        .with_still_agents()
        .with_organism(OrganismKind::Plant, 50.0, 0.0, 50.0, None)
        .with_organism(OrganismKind::Tribal, 60.0, 0.0, 60.0, None)
        .build();
    let patient = ids[1];
    assert_eq!(world.start_outbreak(), Some(patient));
    let state = world.population().state(patient.index()).unwrap();
    assert_ne!(state.disease, Disease::None);
    assert_eq!(world.population_stats().disease_cases, 1);
}
