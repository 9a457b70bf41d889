pub mod macros;

use tribesim_core::brain::{output, Brain, BRAIN_OUTPUTS};
use tribesim_core::{AppConfig, World};
use tribesim_data::{GroupId, OrganismId, OrganismKind};

struct Spawn {
    kind: OrganismKind,
    position: (f32, f32, f32),
    group: Option<usize>,
}

/// Builds small, quiet worlds: no plant top-up or seeding, no random
/// outbreaks, events or natural conception unless a test turns them on.
#[allow(dead_code)]
pub struct WorldBuilder {
    config: AppConfig,
    groups: usize,
    spawns: Vec<Spawn>,
}

#[allow(dead_code)]
impl WorldBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.capacity = 256;
        config.world.seed = 1;
        config.world.min_plants = 0;
        config.world.plant_seed_chance = 0.0;
        config.population.outbreak_chance_per_min = 0.0;
        config.population.food_poisoning_chance = 0.0;
        config.population.conception_rate = 0.0;
        config.environment.random_event_chance = 0.0;
        Self {
            config,
            groups: 0,
            spawns: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = seed;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.world.capacity = capacity;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Tribal agents neither move nor fight.
    pub fn with_still_agents(mut self) -> Self {
        self.config.organisms.tribal.max_speed = 0.0;
        self.config.organisms.tribal.attack_damage = 0.0;
        self
    }

    pub fn with_groups(mut self, groups: usize) -> Self {
        self.groups = groups;
        self
    }

    /// `group` indexes the groups created by [`WorldBuilder::with_groups`].
    pub fn with_organism(
        mut self,
        kind: OrganismKind,
        x: f32,
        y: f32,
        z: f32,
        group: Option<usize>,
    ) -> Self {
        self.spawns.push(Spawn {
            kind,
            position: (x, y, z),
            group,
        });
        self
    }

    pub fn build(self) -> (World, Vec<GroupId>, Vec<OrganismId>) {
        let mut world = World::new(self.config).expect("Failed to create world in test builder");
        let groups: Vec<GroupId> = (0..self.groups)
            .map(|_| world.create_group().expect("group"))
            .collect();
        let ids = self
            .spawns
            .into_iter()
            .map(|s| {
                let (x, y, z) = s.position;
                let group = s.group.map(|i| groups[i]);
                world
                    .spawn_organism(s.kind, x, y, z, group)
                    .expect("spawn in test builder")
            })
            .collect();
        (world, groups, ids)
    }
}

/// A brain that ignores its inputs and always emits `tanh(bias)` per output.
/// Unlisted outputs stay at zero, under every action threshold, and speed is
/// pinned at zero.
#[allow(dead_code)]
pub fn scripted_brain(active: &[(usize, f32)]) -> Brain {
    let mut biases = [0.0; BRAIN_OUTPUTS];
    biases[output::SPEED] = -10.0;
    for &(index, bias) in active {
        biases[index] = bias;
    }
    let mut brain = Brain::uniform(4, 0.0);
    brain.set_output_bias(&biases);
    brain
}
