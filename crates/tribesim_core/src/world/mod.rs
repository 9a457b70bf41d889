//! The simulation context.
//!
//! [`World`] owns every subsystem and is the only code that touches more than
//! one of them per call. Each tick is one synchronous pass (see
//! [`World::update`]); the submodules hold the individual stages:
//!
//! - `perception`: builds brain inputs and records first contacts
//! - `actions`: maps brain outputs onto movement, building, messaging,
//!   gathering, sharing and recruiting
//! - `interaction`: eating and combat between neighbours
//! - `ecology`: plant seeding and asexual animal reproduction
//! - `update`: the pipeline itself, births, deaths and cadences
//! - `controls`: the external control surface
//! - `telemetry`: read-only queries

mod actions;
mod controls;
mod ecology;
mod interaction;
mod messages;
mod perception;
mod telemetry;
mod update;

pub use interaction::DietLogic;
pub use messages::{Message, MessageLog};

use crate::brain::{BrainInputs, BrainOutputs};
use crate::config::AppConfig;
use crate::diplomacy::Diplomacy;
use crate::environment::Environment;
use crate::error::{SimError, SimResult};
use crate::math::{Vec3, XorShiftRng};
use crate::metrics::Metrics;
use crate::organisms::Organisms;
use crate::population::{BirthRequest, Population};
use crate::spatial_grid::SpatialGrid;
use crate::structures::StructureStore;
use crate::technology::{TechBonuses, Technology};
use crate::territory::Territory;
use crate::tribe::TribeRegistry;
use tribesim_data::{DeathCause, GroupId, OrganismId, OrganismKind};

/// One deciding organism's inputs and, after inference, outputs.
#[derive(Debug, Clone, Copy)]
struct Decision {
    slot: usize,
    inputs: BrainInputs,
    outputs: BrainOutputs,
}

/// Hits exchanged between two warring groups during one tick.
#[derive(Debug, Clone, Copy)]
struct WarHits {
    a: GroupId,
    b: GroupId,
    hits: u32,
    damage_by_a: f32,
    damage_by_b: f32,
}

pub struct World {
    config: AppConfig,
    rng: XorShiftRng,
    tick: u64,
    time: f32,

    organisms: Organisms,
    grid: SpatialGrid,
    tribes: TribeRegistry,
    structures: StructureStore,
    diplomacy: Diplomacy,
    technology: Technology,
    territory: Territory,
    population: Population,
    environment: Environment,
    messages: MessageLog,
    metrics: Metrics,

    // Per-tick scratch, sized once.
    decisions: Vec<Decision>,
    reproduce_intent: Vec<bool>,
    neighbors: Vec<usize>,
    contacts: Vec<(GroupId, GroupId)>,
    war_hits: Vec<WarHits>,
    births: Vec<BirthRequest>,
    offspring: Vec<usize>,
    bonuses: Vec<TechBonuses>,
    huts: Vec<usize>,
}

impl World {
    /// Builds a world from a full configuration, validating it first.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::build(config)?)
    }

    /// Default configuration with an explicit organism capacity and seed.
    pub fn init(capacity: usize, seed: u64) -> SimResult<Self> {
        if capacity == 0 || capacity > 1_000_000 {
            return Err(SimError::PreconditionNotMet(
                "capacity must be in [1, 1000000]",
            ));
        }
        let mut config = AppConfig::default();
        config.world.capacity = capacity;
        config.world.seed = seed;
        Self::build(config)
    }

    fn build(config: AppConfig) -> SimResult<Self> {
        let capacity = config.world.effective_capacity();
        let bounds = Vec3::new(config.world.width, config.world.height, config.world.depth);
        let max_groups = config.tribe.max_groups;
        let mut rng = XorShiftRng::new(config.world.seed);

        let technology = Technology::new(max_groups, config.technology.clone())?;
        let territory = Territory::new(bounds, max_groups, config.territory.clone(), &mut rng);
        let organisms = Organisms::new(
            capacity,
            bounds,
            config.world.velocity_damping,
            config.brain.hidden,
            config.organisms.clone(),
        );
        let grid = SpatialGrid::new(
            config.world.grid_cell_size,
            bounds,
            config.world.grid_cell_capacity,
        );

        tracing::info!(
            capacity,
            seed = config.world.seed,
            territory_cells = territory.cells().len(),
            fingerprint = %config.fingerprint(),
            "world initialised"
        );

        Ok(Self {
            rng,
            tick: 0,
            time: 0.0,
            organisms,
            grid,
            tribes: TribeRegistry::new(&config.tribe),
            structures: StructureStore::new(config.tribe.max_structures),
            diplomacy: Diplomacy::new(max_groups, config.diplomacy.clone()),
            technology,
            territory,
            population: Population::new(capacity, config.population.clone()),
            environment: Environment::new(config.environment.clone()),
            messages: MessageLog::new(config.world.message_log_capacity),
            metrics: Metrics::new(),
            decisions: Vec::with_capacity(capacity),
            reproduce_intent: vec![false; capacity],
            neighbors: Vec::with_capacity(256),
            contacts: Vec::with_capacity(max_groups * max_groups),
            war_hits: Vec::with_capacity(config.diplomacy.max_wars),
            births: Vec::new(),
            offspring: Vec::new(),
            bonuses: vec![TechBonuses::BASE; max_groups],
            huts: vec![0; max_groups],
            config,
        })
    }

    /// Drops every organism, group, structure and relation and rewinds the
    /// clock. Terrain and configuration survive; the RNG is reseeded.
    pub fn cleanup(&mut self) {
        self.organisms.clear();
        self.grid.clear();
        self.tribes.clear();
        self.structures.clear();
        self.diplomacy.clear();
        self.technology.clear();
        self.territory.clear();
        self.population.clear();
        self.environment.clear();
        self.messages.clear();
        self.metrics.reset();
        self.decisions.clear();
        self.reproduce_intent.iter_mut().for_each(|f| *f = false);
        self.war_hits.clear();
        self.births.clear();
        self.offspring.clear();
        self.bonuses.iter_mut().for_each(|b| *b = TechBonuses::BASE);
        self.huts.iter_mut().for_each(|n| *n = 0);
        self.rng = XorShiftRng::new(self.config.world.seed);
        self.tick = 0;
        self.time = 0.0;
        tracing::info!("world cleared");
    }

    /// Spawns an organism and registers it with its group and the health
    /// tracker. Nothing is spawned when the group cannot take a new member.
    fn spawn_member(
        &mut self,
        kind: OrganismKind,
        position: Vec3,
        group: Option<GroupId>,
    ) -> SimResult<OrganismId> {
        if let Some(g) = group {
            if kind != OrganismKind::Tribal {
                return Err(SimError::PreconditionNotMet("only tribal agents join groups"));
            }
            if !self.tribes.is_active(g) {
                return Err(SimError::invalid("group", g));
            }
            if self.tribes.member_count(g) >= self.config.tribe.max_members {
                return Err(SimError::capacity("group members"));
            }
        }
        let id = self.organisms.spawn(kind, position, group, &mut self.rng)?;
        let slot = id.index();
        if let Some(g) = group {
            if let Err(err) = self.tribes.add_member(g, id) {
                self.organisms.set_group(slot, None);
                self.organisms.kill(slot, DeathCause::Other);
                return Err(err);
            }
            self.organisms
                .set_equipment(slot, self.technology.equipment_tier(g));
        }
        self.population.on_spawn(slot, &mut self.rng);
        if let Some(flag) = self.reproduce_intent.get_mut(slot) {
            *flag = false;
        }
        Ok(id)
    }
}
