//! Hunger, disease, ageing and sexual reproduction for tracked organisms.
//!
//! Health state covers only the first `tracked_capacity` organism slots.
//! Plants in that prefix are skipped; every other kind suffers hunger and
//! disease, and tribal agents additionally conceive and give birth here.
//! Births are queued for the orchestrator, which owns spawning.

use crate::config::PopulationConfig;
use crate::math::Vec3;
use crate::organisms::Organisms;
use crate::spatial_grid::SpatialGrid;
use crate::technology::TechBonuses;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tribesim_data::{AgeBand, DeathCause, Disease, GroupId, HungerBand, OrganismKind, Season};

pub trait DiseaseLogic {
    fn recovery_secs(&self) -> f32;
    fn severity(&self) -> f32;
    fn contagiousness(&self) -> f32;
}

impl DiseaseLogic for Disease {
    fn recovery_secs(&self) -> f32 {
        match self {
            Disease::None => 0.0,
            Disease::Cold => 30.0,
            Disease::Fever => 45.0,
            Disease::Plague => 90.0,
            Disease::FoodPoisoning => 20.0,
            Disease::Infection => 60.0,
        }
    }

    fn severity(&self) -> f32 {
        match self {
            Disease::None => 0.0,
            Disease::Cold => 0.2,
            Disease::Fever => 0.4,
            Disease::Plague => 0.9,
            Disease::FoodPoisoning => 0.5,
            Disease::Infection => 0.6,
        }
    }

    fn contagiousness(&self) -> f32 {
        match self {
            Disease::None | Disease::FoodPoisoning => 0.0,
            Disease::Cold => 0.6,
            Disease::Fever => 0.4,
            Disease::Plague => 0.8,
            Disease::Infection => 0.2,
        }
    }
}

pub trait HungerLogic {
    /// Health lost per second in this band, before starvation acceleration.
    fn health_drain(&self) -> f32;
    fn movement_multiplier(&self) -> f32;
}

impl HungerLogic for HungerBand {
    fn health_drain(&self) -> f32 {
        match self {
            HungerBand::Full | HungerBand::Satisfied => 0.0,
            HungerBand::Hungry => 0.1,
            HungerBand::Starving => 0.5,
            HungerBand::Critical => 1.5,
        }
    }

    fn movement_multiplier(&self) -> f32 {
        match self {
            HungerBand::Full | HungerBand::Satisfied => 1.0,
            HungerBand::Hungry => 0.9,
            HungerBand::Starving => 0.7,
            HungerBand::Critical => 0.4,
        }
    }
}

#[must_use]
pub fn hunger_band(energy: f32) -> HungerBand {
    if energy >= 80.0 {
        HungerBand::Full
    } else if energy >= 60.0 {
        HungerBand::Satisfied
    } else if energy >= 40.0 {
        HungerBand::Hungry
    } else if energy >= 20.0 {
        HungerBand::Starving
    } else {
        HungerBand::Critical
    }
}

#[must_use]
pub fn season_birth_modifier(season: Season) -> f32 {
    match season {
        Season::Spring => 1.3,
        Season::Summer => 1.0,
        Season::Autumn => 0.8,
        Season::Winter => 0.5,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthState {
    pub disease: Disease,
    pub disease_secs: f32,
    pub immunity: [f32; Disease::ALL.len()],
    pub fertility: f32,
    pub pregnant: bool,
    pub gestation_secs: f32,
    pub starvation_secs: f32,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            disease: Disease::None,
            disease_secs: 0.0,
            immunity: [0.0; Disease::ALL.len()],
            fertility: 1.0,
            pregnant: false,
            gestation_secs: 0.0,
            starvation_secs: 0.0,
        }
    }
}

impl HealthState {
    #[must_use]
    pub fn immunity_to(&self, disease: Disease) -> f32 {
        disease.immunity_index().map_or(0.0, |i| self.immunity[i])
    }
}

/// Cumulative counters. The yearly copy is reset on every year rollover.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationStats {
    pub births: u32,
    pub deaths_starvation: u32,
    pub deaths_disease: u32,
    pub deaths_old_age: u32,
    pub deaths_combat: u32,
    pub deaths_predation: u32,
    pub deaths_other: u32,
    pub disease_cases: u32,
    pub recoveries: u32,
}

impl PopulationStats {
    #[must_use]
    pub fn total_deaths(&self) -> u32 {
        self.deaths_starvation
            + self.deaths_disease
            + self.deaths_old_age
            + self.deaths_combat
            + self.deaths_predation
            + self.deaths_other
    }

    fn count_death(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::Starvation => self.deaths_starvation += 1,
            DeathCause::Disease => self.deaths_disease += 1,
            DeathCause::OldAge => self.deaths_old_age += 1,
            DeathCause::Combat => self.deaths_combat += 1,
            DeathCause::Predation => self.deaths_predation += 1,
            DeathCause::Other => self.deaths_other += 1,
        }
    }
}

/// A birth that came due this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirthRequest {
    pub parent: usize,
    pub group: GroupId,
    pub position: Vec3,
}

pub struct PopulationContext<'a> {
    pub organisms: &'a mut Organisms,
    pub grid: &'a SpatialGrid,
    pub season: Season,
    /// Indexed by group id.
    pub bonuses: &'a [TechBonuses],
    /// Huts owned, indexed by group id.
    pub huts: &'a [usize],
    /// Whether each slot's brain asked to reproduce this tick.
    pub reproduce_intent: &'a [bool],
}

#[derive(Debug, Clone)]
pub struct Population {
    config: PopulationConfig,
    states: Vec<HealthState>,
    births: Vec<BirthRequest>,
    infections: Vec<(usize, Disease)>,
    pub stats: PopulationStats,
    pub yearly: PopulationStats,
}

impl Population {
    /// Tracks `min(tracked_capacity, organism_capacity)` slots.
    #[must_use]
    pub fn new(organism_capacity: usize, config: PopulationConfig) -> Self {
        let tracked = config.tracked_capacity.min(organism_capacity);
        Self {
            states: vec![HealthState::default(); tracked],
            births: Vec::with_capacity(tracked),
            infections: Vec::with_capacity(tracked),
            config,
            stats: PopulationStats::default(),
            yearly: PopulationStats::default(),
        }
    }

    #[must_use]
    pub fn tracked_capacity(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn state(&self, slot: usize) -> Option<&HealthState> {
        self.states.get(slot)
    }

    #[must_use]
    pub fn age_band(&self, age_secs: f32) -> AgeBand {
        let years = age_secs / self.config.secs_per_year;
        if years < self.config.child_age {
            AgeBand::Infant
        } else if years < self.config.adult_age {
            AgeBand::Child
        } else if years < self.config.elder_age {
            AgeBand::Adult
        } else {
            AgeBand::Elder
        }
    }

    /// Seconds of simulated age at which an organism becomes an adult.
    #[must_use]
    pub fn adult_age_secs(&self) -> f32 {
        self.config.adult_age * self.config.secs_per_year
    }

    #[must_use]
    pub fn movement_multiplier(&self, slot: usize, energy: f32) -> f32 {
        if slot < self.states.len() {
            hunger_band(energy).movement_multiplier()
        } else {
            1.0
        }
    }

    /// Resets the state of a freshly spawned slot.
    pub fn on_spawn<R: Rng>(&mut self, slot: usize, rng: &mut R) {
        if let Some(state) = self.states.get_mut(slot) {
            *state = HealthState {
                fertility: rng.gen_range(0.8..1.2),
                ..HealthState::default()
            };
        }
    }

    /// Records a birth. The child inherits half its parent's immunity.
    pub fn on_birth(&mut self, parent: usize, child: usize) {
        self.stats.births += 1;
        self.yearly.births += 1;
        let inherited = self.states.get(parent).map(|p| (p.immunity, p.fertility));
        if let (Some(state), Some((immunity, fertility))) = (self.states.get_mut(child), inherited) {
            *state = HealthState {
                immunity: immunity.map(|v| v * 0.5),
                fertility,
                ..HealthState::default()
            };
        }
    }

    pub fn on_death(&mut self, slot: usize, cause: DeathCause) {
        self.stats.count_death(cause);
        self.yearly.count_death(cause);
        if let Some(state) = self.states.get_mut(slot) {
            *state = HealthState::default();
        }
    }

    pub fn reset_yearly(&mut self) {
        self.yearly = PopulationStats::default();
    }

    /// Direct infection, ignoring immunity. Fails for untracked or already
    /// sick slots.
    pub fn infect(&mut self, slot: usize, disease: Disease) -> bool {
        if disease == Disease::None {
            return false;
        }
        let Some(state) = self.states.get_mut(slot) else {
            return false;
        };
        if state.disease != Disease::None {
            return false;
        }
        state.disease = disease;
        state.disease_secs = 0.0;
        self.stats.disease_cases += 1;
        self.yearly.disease_cases += 1;
        true
    }

    /// Infects a random living tracked animal with a random contagious
    /// disease. Returns the slot hit.
    pub fn start_outbreak<R: Rng>(&mut self, organisms: &Organisms, rng: &mut R) -> Option<usize> {
        let tracked = self.states.len().min(organisms.len());
        if tracked == 0 {
            return None;
        }
        let contagious = [Disease::Cold, Disease::Fever, Disease::Plague, Disease::Infection];
        for _ in 0..16 {
            let slot = rng.gen_range(0..tracked);
            if organisms.is_alive(slot) && organisms.kinds()[slot].is_mobile() {
                let disease = contagious[rng.gen_range(0..contagious.len())];
                if self.infect(slot, disease) {
                    tracing::info!(slot, ?disease, "disease outbreak");
                    return Some(slot);
                }
            }
        }
        None
    }

    /// Rolls for food poisoning after `slot` ate.
    pub fn maybe_food_poisoning<R: Rng>(&mut self, slot: usize, dt: f32, rng: &mut R) -> bool {
        slot < self.states.len()
            && rng.gen::<f32>() < self.config.food_poisoning_chance * dt
            && self.infect(slot, Disease::FoodPoisoning)
    }

    /// Forces conception for a living tracked tribal agent.
    pub fn force_conception(&mut self, slot: usize, organisms: &Organisms) -> bool {
        let eligible = organisms.is_alive(slot)
            && organisms.kinds()[slot] == OrganismKind::Tribal
            && organisms.groups()[slot].is_some();
        match self.states.get_mut(slot) {
            Some(state) if eligible && !state.pregnant => {
                state.pregnant = true;
                state.gestation_secs = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Births that came due during the last [`Population::update`].
    pub fn take_births(&mut self) -> std::vec::Drain<'_, BirthRequest> {
        self.births.drain(..)
    }

    pub fn update<R: Rng>(&mut self, ctx: &mut PopulationContext, dt: f32, rng: &mut R) {
        let tracked = self.states.len().min(ctx.organisms.len());
        for slot in 0..tracked {
            if !ctx.organisms.is_alive(slot) || !ctx.organisms.kinds()[slot].is_mobile() {
                continue;
            }
            self.apply_hunger(ctx, slot, dt);
            self.progress_disease(ctx, slot, dt);
            self.apply_elder_mortality(ctx, slot, dt, rng);
            if ctx.organisms.kinds()[slot] == OrganismKind::Tribal {
                self.progress_reproduction(ctx, slot, dt, rng);
            }
        }
        self.spread_disease(ctx, tracked, dt, rng);

        let outbreak_chance = self.config.outbreak_chance_per_min / 60.0 * dt;
        if rng.gen::<f32>() < outbreak_chance {
            self.start_outbreak(&*ctx.organisms, rng);
        }
    }

    fn apply_hunger(&mut self, ctx: &mut PopulationContext, slot: usize, dt: f32) {
        let band = hunger_band(ctx.organisms.energies()[slot]);
        let state = &mut self.states[slot];
        if band.is_severe() {
            state.starvation_secs += dt;
        } else {
            state.starvation_secs = 0.0;
        }
        let mut drain = band.health_drain();
        if band.is_severe() {
            drain *= 1.0 + state.starvation_secs / self.config.starvation_grace_secs;
        }
        if drain > 0.0 {
            ctx.organisms.damage(slot, drain * dt, DeathCause::Starvation);
        }
    }

    fn progress_disease(&mut self, ctx: &mut PopulationContext, slot: usize, dt: f32) {
        let state = &mut self.states[slot];
        let disease = state.disease;
        if disease == Disease::None {
            return;
        }
        let severity = disease.severity();
        ctx.organisms
            .damage(slot, 0.5 * severity * dt, DeathCause::Disease);
        ctx.organisms
            .drain_energy(slot, 0.3 * severity * dt, DeathCause::Disease);
        state.disease_secs += dt;
        if state.disease_secs >= disease.recovery_secs() {
            if let Some(i) = disease.immunity_index() {
                state.immunity[i] = (state.immunity[i] + self.config.immunity_gain).min(1.0);
            }
            state.disease = Disease::None;
            state.disease_secs = 0.0;
            self.stats.recoveries += 1;
            self.yearly.recoveries += 1;
        }
    }

    fn apply_elder_mortality<R: Rng>(
        &mut self,
        ctx: &mut PopulationContext,
        slot: usize,
        dt: f32,
        rng: &mut R,
    ) {
        let years = ctx.organisms.ages()[slot] / self.config.secs_per_year;
        if years < self.config.elder_age {
            return;
        }
        let death_rate = ctx.organisms.groups()[slot]
            .and_then(|g| ctx.bonuses.get(g.index()))
            .map_or(1.0, |b| b.death_rate);
        let chance =
            self.config.elder_mortality * death_rate * (years - self.config.elder_age + 1.0) * dt;
        if rng.gen::<f32>() < chance {
            ctx.organisms.kill(slot, DeathCause::OldAge);
        }
    }

    fn progress_reproduction<R: Rng>(
        &mut self,
        ctx: &mut PopulationContext,
        slot: usize,
        dt: f32,
        rng: &mut R,
    ) {
        let Some(group) = ctx.organisms.groups()[slot] else {
            return;
        };
        if !ctx.organisms.is_alive(slot) {
            return;
        }
        if self.states[slot].pregnant {
            let state = &mut self.states[slot];
            state.gestation_secs += dt;
            if state.gestation_secs >= self.config.gestation_secs {
                state.pregnant = false;
                state.gestation_secs = 0.0;
                self.births.push(BirthRequest {
                    parent: slot,
                    group,
                    position: ctx.organisms.positions()[slot],
                });
            }
            return;
        }

        let orgs = &*ctx.organisms;
        let adult = self.age_band(orgs.ages()[slot]) == AgeBand::Adult;
        if !adult
            || orgs.energies()[slot] <= self.config.conception_min_energy
            || orgs.healths()[slot] <= self.config.conception_min_health
            || orgs.reproduction_cooldowns()[slot] > 0.0
        {
            return;
        }

        let position = orgs.positions()[slot];
        let mut has_partner = false;
        ctx.grid
            .for_each_in_radius(position, self.config.mate_radius, |other, _| {
                if has_partner || other == slot || !orgs.is_alive(other) {
                    return;
                }
                has_partner = orgs.kinds()[other] == OrganismKind::Tribal
                    && orgs.groups()[other] == Some(group)
                    && self.age_band(orgs.ages()[other]) == AgeBand::Adult;
            });
        if !has_partner {
            return;
        }

        let bonuses = ctx.bonuses.get(group.index()).copied().unwrap_or(TechBonuses::BASE);
        let huts = ctx.huts.get(group.index()).copied().unwrap_or(0) as f32;
        let intent = if ctx.reproduce_intent.get(slot).copied().unwrap_or(false) {
            2.0
        } else {
            1.0
        };
        let chance = self.config.conception_rate
            * self.states[slot].fertility
            * season_birth_modifier(ctx.season)
            * bonuses.birth_rate
            * (1.0 + self.config.hut_birth_bonus * huts)
            * intent
            * dt;
        if rng.gen::<f32>() < chance {
            self.states[slot].pregnant = true;
            self.states[slot].gestation_secs = 0.0;
        }
    }

    fn spread_disease<R: Rng>(
        &mut self,
        ctx: &PopulationContext,
        tracked: usize,
        dt: f32,
        rng: &mut R,
    ) {
        let radius = self.config.spread_radius;
        let base = self.config.spread_chance;
        let orgs = &*ctx.organisms;
        self.infections.clear();
        for slot in 0..tracked {
            let disease = self.states[slot].disease;
            let contagious = disease.contagiousness();
            if contagious <= 0.0 || !orgs.is_alive(slot) {
                continue;
            }
            let origin = orgs.positions()[slot];
            let states = &self.states;
            let infections = &mut self.infections;
            ctx.grid.for_each_in_radius(origin, radius, |other, pos| {
                if other == slot
                    || other >= tracked
                    || !orgs.is_alive(other)
                    || !orgs.kinds()[other].is_mobile()
                    || states[other].disease != Disease::None
                {
                    return;
                }
                let falloff = 1.0 - pos.distance(origin) / radius;
                let resist = 1.0 - states[other].immunity_to(disease);
                let chance = base * contagious * falloff * resist * dt;
                if rng.gen::<f32>() < chance {
                    infections.push((other, disease));
                }
            });
        }
        for i in 0..self.infections.len() {
            let (slot, disease) = self.infections[i];
            self.infect(slot, disease);
        }
    }

    pub fn clear(&mut self) {
        self.states.iter_mut().for_each(|s| *s = HealthState::default());
        self.births.clear();
        self.infections.clear();
        self.stats = PopulationStats::default();
        self.yearly = PopulationStats::default();
    }
}
