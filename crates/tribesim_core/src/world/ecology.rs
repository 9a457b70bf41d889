use super::World;
use crate::math::Vec3;
use rand::Rng;
use tribesim_data::{DeathCause, OrganismKind};

/// Plants above this fraction of max energy may seed.
const SEED_ENERGY_FRACTION: f32 = 0.8;

impl World {
    /// Plant seeding, plant floor top-up and asexual animal reproduction.
    pub(super) fn run_ecology(&mut self, dt: f32) {
        self.seed_plants(dt);
        self.refill_plants();
        self.breed_animals();
    }

    fn seed_plants(&mut self, dt: f32) {
        let chance = self.config.world.plant_seed_chance * dt;
        if chance <= 0.0 {
            return;
        }
        let threshold = self.organisms.config().plant.max_energy * SEED_ENERGY_FRACTION;
        let radius = self.config.world.plant_seed_radius;

        self.offspring.clear();
        for slot in self.organisms.iter_alive() {
            if self.organisms.kinds()[slot] == OrganismKind::Plant
                && self.organisms.energies()[slot] > threshold
            {
                self.offspring.push(slot);
            }
        }
        for i in 0..self.offspring.len() {
            let parent = self.offspring[i];
            if self.rng.gen::<f32>() >= chance {
                continue;
            }
            let origin = self.organisms.positions()[parent];
            let site = self.scatter(origin, radius);
            if let Err(err) = self.spawn_member(OrganismKind::Plant, site, None) {
                tracing::trace!(%err, "plant seeding stopped");
                break;
            }
        }
        self.offspring.clear();
    }

    /// Keeps at least `min_plants` alive, a few per tick.
    fn refill_plants(&mut self) {
        let plants = self
            .organisms
            .iter_alive()
            .filter(|&s| self.organisms.kinds()[s] == OrganismKind::Plant)
            .count();
        let missing = self
            .config
            .world
            .min_plants
            .saturating_sub(plants)
            .min(self.config.world.plant_refill_per_tick);
        let bounds = self.organisms.bounds();
        for _ in 0..missing {
            let site = Vec3::new(
                self.rng.gen_range(0.0..=bounds.x),
                0.0,
                self.rng.gen_range(0.0..=bounds.z),
            );
            if let Err(err) = self.spawn_member(OrganismKind::Plant, site, None) {
                tracing::trace!(%err, "plant refill stopped");
                break;
            }
        }
    }

    /// Herbivores and carnivores split when their reproduce output fired,
    /// they hold enough energy and their cooldown has run out.
    fn breed_animals(&mut self) {
        self.offspring.clear();
        for slot in self.organisms.iter_alive() {
            let kind = self.organisms.kinds()[slot];
            if !matches!(kind, OrganismKind::Herbivore | OrganismKind::Carnivore) {
                continue;
            }
            let cfg = self.organisms.config().kind(kind);
            if self.reproduce_intent.get(slot).copied().unwrap_or(false)
                && self.organisms.energies()[slot] > cfg.reproduce_energy
                && self.organisms.reproduction_cooldowns()[slot] <= 0.0
            {
                self.offspring.push(slot);
            }
        }

        for i in 0..self.offspring.len() {
            let parent = self.offspring[i];
            if !self.organisms.is_alive(parent) {
                continue;
            }
            let kind = self.organisms.kinds()[parent];
            let cooldown = self.organisms.config().kind(kind).reproduce_cooldown_secs;
            let origin = self.organisms.positions()[parent];
            let site = self.scatter(origin, 2.0);
            let child = match self.spawn_member(kind, site, None) {
                Ok(id) => id.index(),
                Err(err) => {
                    tracing::trace!(%err, "animal birth skipped");
                    break;
                }
            };
            self.inherit_brain(parent, child);
            let half = self.organisms.energies()[parent] * 0.5;
            self.organisms
                .drain_energy(parent, half, DeathCause::Starvation);
            self.organisms.set_energy(child, half);
            self.organisms.set_reproduction_cooldown(parent, cooldown);
            self.population.on_birth(parent, child);
        }
        self.offspring.clear();
    }

    /// Gives `child` a mutated copy of `parent`'s brain.
    pub(super) fn inherit_brain(&mut self, parent: usize, child: usize) {
        let Some(mut brain) = self.organisms.brain(parent).cloned() else {
            return;
        };
        brain.mutate(
            self.config.brain.mutation_rate,
            self.config.brain.mutation_amount,
            &mut self.rng,
        );
        self.organisms.set_brain(child, brain);
    }

    /// Random point on the ground within `radius` of `origin`.
    pub(super) fn scatter(&mut self, origin: Vec3, radius: f32) -> Vec3 {
        let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
        let r = radius * self.rng.gen::<f32>().sqrt();
        let site = Vec3::new(origin.x + r * angle.cos(), origin.y, origin.z + r * angle.sin());
        site.clamp(Vec3::ZERO, self.organisms.bounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_refill_tops_up_plants_gradually() {
        let mut config = AppConfig::default();
        config.world.capacity = 128;
        config.world.min_plants = 20;
        config.world.plant_refill_per_tick = 8;
        let mut world = World::new(config).expect("world");
        world.refill_plants();
        assert_eq!(world.organisms.alive_count(), 8);
        world.refill_plants();
        world.refill_plants();
        assert_eq!(world.organisms.alive_count(), 20);
    }

    #[test]
    fn test_animal_split_halves_energy() {
        let mut world = World::init(32, 9).expect("world");
        let parent = world
            .spawn_organism(OrganismKind::Herbivore, 50.0, 0.0, 50.0, None)
            .expect("parent")
            .index();
        world.organisms.set_energy(parent, 95.0);
        world.reproduce_intent[parent] = true;

        world.breed_animals();
        assert_eq!(world.organisms.alive_count(), 2);
        let child = (0..world.organisms.len())
            .find(|&s| s != parent && world.organisms.is_alive(s))
            .expect("child");
        assert!((world.organisms.energies()[parent] - 47.5).abs() < 1e-4);
        assert!((world.organisms.energies()[child] - 47.5).abs() < 1e-4);
        assert!(world.organisms.reproduction_cooldowns()[parent] > 0.0);
        assert!(world.organisms.brain(child).is_some());
        assert_eq!(world.population.stats.births, 1);
    }
}
