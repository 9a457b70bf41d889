use super::interaction::{can_attack, DietLogic};
use super::{Decision, World};
use crate::brain::{input, BRAIN_INPUTS, BRAIN_OUTPUTS};
use rand::Rng;
use std::f32::consts::TAU;

/// Neighbour counts saturate at this many.
const COUNT_SCALE: f32 = 8.0;

impl World {
    /// Builds the input vector for every organism with a brain and records
    /// first contacts between groups. Runs sequentially since the
    /// harshness input draws from the world RNG.
    pub(super) fn perceive(&mut self) {
        self.decisions.clear();
        self.contacts.clear();

        let radius = self.config.world.perception_radius;
        let bounds = self.organisms.bounds();
        let harsh = self.environment.weather().is_harsh();
        let day = (TAU * self.environment.day_phase()).sin();
        let year = (TAU * self.environment.year_phase()).sin();
        let secs_per_year = self.config.population.secs_per_year;

        for slot in 0..self.organisms.len() {
            if !self.organisms.is_alive(slot) || self.organisms.brains()[slot].is_none() {
                continue;
            }
            let organisms = &self.organisms;
            let diplomacy = &self.diplomacy;
            let contacts = &mut self.contacts;

            let kind = organisms.kinds()[slot];
            let group = organisms.groups()[slot];
            let position = organisms.positions()[slot];
            let (mut food, mut threat, mut ally, mut enemy) = (0u32, 0u32, 0u32, 0u32);

            self.grid.for_each_in_radius(position, radius, |other, _| {
                if other == slot || !organisms.is_alive(other) {
                    return;
                }
                let other_kind = organisms.kinds()[other];
                if kind.eats(other_kind) {
                    food += 1;
                }
                if can_attack(organisms, diplomacy, other, slot) {
                    threat += 1;
                }
                if can_attack(organisms, diplomacy, slot, other) {
                    enemy += 1;
                }
                match (group, organisms.groups()[other]) {
                    (Some(g), Some(h)) if g == h => ally += 1,
                    (Some(g), Some(h)) => {
                        let pair = if g < h { (g, h) } else { (h, g) };
                        if !diplomacy.has_met(g, h) && !contacts.contains(&pair) {
                            contacts.push(pair);
                        }
                    }
                    (None, None) if other_kind == kind => ally += 1,
                    _ => {}
                }
            });

            let cfg = organisms.config().kind(kind);
            let mut inputs = [0.0f32; BRAIN_INPUTS];
            inputs[input::ENERGY] = organisms.energies()[slot] / cfg.max_energy;
            inputs[input::HEALTH] = organisms.healths()[slot] / cfg.max_health;
            inputs[input::POS_X] = position.x / bounds.x.max(1.0);
            inputs[input::POS_Y] = position.y / bounds.y.max(1.0);
            inputs[input::POS_Z] = position.z / bounds.z.max(1.0);
            inputs[input::FOOD] = (food as f32 / COUNT_SCALE).min(1.0);
            inputs[input::THREAT] = (threat as f32 / COUNT_SCALE).min(1.0);
            inputs[input::ALLY] = (ally as f32 / COUNT_SCALE).min(1.0);
            inputs[input::ENEMY] = (enemy as f32 / COUNT_SCALE).min(1.0);
            inputs[input::AGE] = (organisms.ages()[slot] / secs_per_year / 80.0).min(1.0);
            inputs[input::SIZE] = organisms.sizes()[slot];
            inputs[input::ATTACKING] = f32::from(u8::from(organisms.attacking()[slot]));
            inputs[input::EATING] = f32::from(u8::from(organisms.eating()[slot]));
            inputs[input::HARSHNESS] = if harsh { self.rng.gen::<f32>() } else { 0.0 };
            inputs[input::DAY_PHASE] = day;
            inputs[input::YEAR_PHASE] = year;

            self.decisions.push(Decision {
                slot,
                inputs,
                outputs: [0.0; BRAIN_OUTPUTS],
            });
        }

        for i in 0..self.contacts.len() {
            let (a, b) = self.contacts[i];
            self.diplomacy.meet(a, b);
        }
    }

    /// Runs inference for every pending decision. Pure per organism, so it
    /// fans out over rayon when the `parallel` feature is on.
    pub(super) fn decide(&mut self) {
        let brains = self.organisms.brains();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.decisions.par_iter_mut().for_each(|d| {
                if let Some(brain) = &brains[d.slot] {
                    d.outputs = brain.predict(&d.inputs);
                }
            });
        }

        #[cfg(not(feature = "parallel"))]
        {
            for d in &mut self.decisions {
                if let Some(brain) = &brains[d.slot] {
                    d.outputs = brain.predict(&d.inputs);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribesim_data::OrganismKind;

    #[test]
    fn test_perceive_counts_neighbours_and_meets_groups() {
        let mut world = World::init(64, 11).expect("world");
        let g1 = world.create_group().expect("g1");
        let g2 = world.create_group().expect("g2");
        let a = world
            .spawn_organism(OrganismKind::Tribal, 20.0, 5.0, 20.0, Some(g1))
            .expect("a");
        world
            .spawn_organism(OrganismKind::Tribal, 22.0, 5.0, 20.0, Some(g1))
            .expect("ally");
        world
            .spawn_organism(OrganismKind::Tribal, 20.0, 5.0, 23.0, Some(g2))
            .expect("stranger");
        world
            .spawn_organism(OrganismKind::Plant, 21.0, 5.0, 21.0, None)
            .expect("plant");
        world.rebuild_grid();

        assert!(!world.diplomacy.has_met(g1, g2));
        world.perceive();
        assert!(world.diplomacy.has_met(g1, g2));

        let d = world
            .decisions
            .iter()
            .find(|d| d.slot == a.index())
            .expect("decision");
        assert!((d.inputs[input::ALLY] - 1.0 / COUNT_SCALE).abs() < 1e-6);
        assert!((d.inputs[input::FOOD] - 1.0 / COUNT_SCALE).abs() < 1e-6);
        assert_eq!(d.inputs[input::ENEMY], 0.0);
        assert_eq!(world.decisions.len(), 3);
    }

    #[test]
    fn test_decide_matches_direct_inference() {
        let mut world = World::init(32, 5).expect("world");
        let id = world
            .spawn_organism(OrganismKind::Herbivore, 5.0, 5.0, 5.0, None)
            .expect("herbivore");
        world.rebuild_grid();
        world.perceive();
        world.decide();
        let d = world.decisions[0];
        let brain = world.organisms.brain(id.index()).expect("brain");
        assert_eq!(d.outputs, brain.predict(&d.inputs));
    }
}
