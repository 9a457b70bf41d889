//! Fixed-capacity struct-of-arrays store for every organism.
//!
//! Each organism is one row across the parallel columns below, addressed by
//! slot. Columns are reserved to `capacity` up front and rows are appended
//! until the capacity is reached; afterwards only dead slots are reused. Rows
//! never move, so the raw slices handed to renderers stay index-stable, and
//! the generation counter in [`OrganismId`] catches handles that outlived
//! their organism.

use crate::brain::Brain;
use crate::config::OrganismConfig;
use crate::error::{SimError, SimResult};
use crate::math::Vec3;
use rand::Rng;
use tribesim_data::{DeathCause, GroupId, OrganismId, OrganismKind};

/// Record of one organism death, kept until the orchestrator drains it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Death {
    pub id: OrganismId,
    pub kind: OrganismKind,
    pub group: Option<GroupId>,
    pub cause: DeathCause,
    pub position: Vec3,
}

pub struct Organisms {
    capacity: usize,
    bounds: Vec3,
    damping: f32,
    brain_hidden: usize,
    config: OrganismConfig,

    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    energies: Vec<f32>,
    healths: Vec<f32>,
    ages: Vec<f32>,
    sizes: Vec<f32>,
    kinds: Vec<OrganismKind>,
    groups: Vec<Option<GroupId>>,
    equipment: Vec<u8>,
    alive: Vec<bool>,
    attacking: Vec<bool>,
    eating: Vec<bool>,
    reproduction_cooldown: Vec<f32>,
    last_harm: Vec<Option<DeathCause>>,
    brains: Vec<Option<Brain>>,
    generations: Vec<u32>,

    free_slots: Vec<u32>,
    alive_count: usize,
    deaths: Vec<Death>,
}

impl Organisms {
    #[must_use]
    pub fn new(
        capacity: usize,
        bounds: Vec3,
        damping: f32,
        brain_hidden: usize,
        config: OrganismConfig,
    ) -> Self {
        Self {
            capacity,
            bounds,
            damping,
            brain_hidden,
            config,
            positions: Vec::with_capacity(capacity),
            velocities: Vec::with_capacity(capacity),
            energies: Vec::with_capacity(capacity),
            healths: Vec::with_capacity(capacity),
            ages: Vec::with_capacity(capacity),
            sizes: Vec::with_capacity(capacity),
            kinds: Vec::with_capacity(capacity),
            groups: Vec::with_capacity(capacity),
            equipment: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            attacking: Vec::with_capacity(capacity),
            eating: Vec::with_capacity(capacity),
            reproduction_cooldown: Vec::with_capacity(capacity),
            last_harm: Vec::with_capacity(capacity),
            brains: Vec::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            free_slots: Vec::with_capacity(capacity),
            alive_count: 0,
            deaths: Vec::with_capacity(capacity.min(1024)),
        }
    }

    /// Creates an organism with stats drawn from its kind's ranges.
    ///
    /// Fails with `CapacityExceeded` when every slot holds a living organism;
    /// in that case nothing is touched, not even the RNG.
    pub fn spawn<R: Rng>(
        &mut self,
        kind: OrganismKind,
        position: Vec3,
        group: Option<GroupId>,
        rng: &mut R,
    ) -> SimResult<OrganismId> {
        if !position.is_finite() {
            return Err(SimError::PreconditionNotMet("spawn position must be finite"));
        }
        let reuse = self.free_slots.last().copied();
        if reuse.is_none() && self.positions.len() >= self.capacity {
            return Err(SimError::capacity("organisms"));
        }

        let cfg = self.config.kind(kind);
        let size = sample(rng, cfg.size);
        let energy = sample(rng, cfg.energy).min(cfg.max_energy);
        let health = sample(rng, cfg.health).min(cfg.max_health);
        let brain = kind
            .is_mobile()
            .then(|| Brain::new_random(self.brain_hidden, rng));
        let position = position.clamp(Vec3::ZERO, self.bounds);

        let slot = match reuse {
            Some(slot) => {
                self.free_slots.pop();
                let s = slot as usize;
                self.positions[s] = position;
                self.velocities[s] = Vec3::ZERO;
                self.energies[s] = energy;
                self.healths[s] = health;
                self.ages[s] = 0.0;
                self.sizes[s] = size;
                self.kinds[s] = kind;
                self.groups[s] = group;
                self.equipment[s] = 0;
                self.alive[s] = true;
                self.attacking[s] = false;
                self.eating[s] = false;
                self.reproduction_cooldown[s] = 0.0;
                self.last_harm[s] = None;
                self.brains[s] = brain;
                s
            }
            None => {
                self.positions.push(position);
                self.velocities.push(Vec3::ZERO);
                self.energies.push(energy);
                self.healths.push(health);
                self.ages.push(0.0);
                self.sizes.push(size);
                self.kinds.push(kind);
                self.groups.push(group);
                self.equipment.push(0);
                self.alive.push(true);
                self.attacking.push(false);
                self.eating.push(false);
                self.reproduction_cooldown.push(0.0);
                self.last_harm.push(None);
                self.brains.push(brain);
                self.generations.push(0);
                self.positions.len() - 1
            }
        };
        self.alive_count += 1;
        Ok(OrganismId::new(slot as u32, self.generations[slot]))
    }

    /// Advances age and cooldowns, applies metabolism, integrates velocity
    /// with world clamping and exponential damping, and kills anything whose
    /// energy or health ran out. `light` in `[0, 1]` scales plant growth.
    pub fn update(&mut self, dt: f32, light: f32) {
        let damping = (-self.damping * dt).exp();
        for slot in 0..self.positions.len() {
            if !self.alive[slot] {
                continue;
            }
            let (rate, max_energy) = {
                let cfg = self.config.kind(self.kinds[slot]);
                (cfg.metabolic_rate * self.sizes[slot], cfg.max_energy)
            };

            self.ages[slot] += dt;
            self.reproduction_cooldown[slot] = (self.reproduction_cooldown[slot] - dt).max(0.0);

            if rate < 0.0 {
                self.energies[slot] = (self.energies[slot] - rate * light * dt).min(max_energy);
            } else {
                self.energies[slot] -= rate * dt;
            }

            let mut velocity = self.velocities[slot];
            let target = self.positions[slot] + velocity * dt;
            let clamped = target.clamp(Vec3::ZERO, self.bounds);
            if clamped.x != target.x {
                velocity.x = 0.0;
            }
            if clamped.y != target.y {
                velocity.y = 0.0;
            }
            if clamped.z != target.z {
                velocity.z = 0.0;
            }
            self.positions[slot] = clamped;
            self.velocities[slot] = velocity * damping;

            if self.energies[slot] <= 0.0 {
                let cause = self.last_harm[slot].unwrap_or(DeathCause::Starvation);
                self.kill(slot, cause);
            } else if self.healths[slot] <= 0.0 {
                let cause = self.last_harm[slot].unwrap_or(DeathCause::Other);
                self.kill(slot, cause);
            }
        }
    }

    /// Marks a slot dead and frees its brain. Returns false if it was not alive.
    pub fn kill(&mut self, slot: usize, cause: DeathCause) -> bool {
        if slot >= self.positions.len() || !self.alive[slot] {
            return false;
        }
        let id = OrganismId::new(slot as u32, self.generations[slot]);
        self.alive[slot] = false;
        self.attacking[slot] = false;
        self.eating[slot] = false;
        self.velocities[slot] = Vec3::ZERO;
        self.brains[slot] = None;
        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.free_slots.push(slot as u32);
        self.alive_count -= 1;
        self.deaths.push(Death {
            id,
            kind: self.kinds[slot],
            group: self.groups[slot],
            cause,
            position: self.positions[slot],
        });
        true
    }

    /// Deaths since the last [`Organisms::clear_deaths`].
    #[must_use]
    pub fn recent_deaths(&self) -> &[Death] {
        &self.deaths
    }

    pub fn clear_deaths(&mut self) {
        self.deaths.clear();
    }

    /// Drops every organism and brain, keeping the reserved columns.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.energies.clear();
        self.healths.clear();
        self.ages.clear();
        self.sizes.clear();
        self.kinds.clear();
        self.groups.clear();
        self.equipment.clear();
        self.alive.clear();
        self.attacking.clear();
        self.eating.clear();
        self.reproduction_cooldown.clear();
        self.last_harm.clear();
        self.brains.clear();
        self.generations.clear();
        self.free_slots.clear();
        self.deaths.clear();
        self.alive_count = 0;
    }

    // ---------------------------------------------------------------------
    // Identity
    // ---------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots ever handed out (live or dead).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive_count
    }

    #[inline]
    #[must_use]
    pub fn is_alive(&self, slot: usize) -> bool {
        self.alive.get(slot).copied().unwrap_or(false)
    }

    /// True when `id` still names the organism living in its slot.
    #[must_use]
    pub fn is_valid(&self, id: OrganismId) -> bool {
        let slot = id.index();
        self.is_alive(slot) && self.generations[slot] == id.generation
    }

    /// Slot for a live id, `None` for stale or dead ids.
    #[must_use]
    pub fn resolve(&self, id: OrganismId) -> Option<usize> {
        self.is_valid(id).then_some(id.index())
    }

    #[must_use]
    pub fn id_of(&self, slot: usize) -> OrganismId {
        OrganismId::new(slot as u32, self.generations[slot])
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = usize> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter_map(|(slot, &alive)| alive.then_some(slot))
    }

    #[must_use]
    pub fn bounds(&self) -> Vec3 {
        self.bounds
    }

    #[must_use]
    pub fn config(&self) -> &OrganismConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Raw column views
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[must_use]
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    #[must_use]
    pub fn energies(&self) -> &[f32] {
        &self.energies
    }

    #[must_use]
    pub fn healths(&self) -> &[f32] {
        &self.healths
    }

    #[must_use]
    pub fn ages(&self) -> &[f32] {
        &self.ages
    }

    #[must_use]
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    #[must_use]
    pub fn kinds(&self) -> &[OrganismKind] {
        &self.kinds
    }

    #[must_use]
    pub fn groups(&self) -> &[Option<GroupId>] {
        &self.groups
    }

    #[must_use]
    pub fn equipment(&self) -> &[u8] {
        &self.equipment
    }

    #[must_use]
    pub fn alive(&self) -> &[bool] {
        &self.alive
    }

    #[must_use]
    pub fn attacking(&self) -> &[bool] {
        &self.attacking
    }

    #[must_use]
    pub fn eating(&self) -> &[bool] {
        &self.eating
    }

    #[must_use]
    pub fn reproduction_cooldowns(&self) -> &[f32] {
        &self.reproduction_cooldown
    }

    #[must_use]
    pub fn brain(&self, slot: usize) -> Option<&Brain> {
        self.brains.get(slot).and_then(Option::as_ref)
    }

    /// Brain column, for bulk inference.
    #[must_use]
    pub fn brains(&self) -> &[Option<Brain>] {
        &self.brains
    }

    // ---------------------------------------------------------------------
    // Writes. All of them ignore dead or out-of-range slots.
    // ---------------------------------------------------------------------

    /// Authoritative overwrite, clamped into the world.
    pub fn set_position(&mut self, slot: usize, position: Vec3) -> bool {
        if !self.is_alive(slot) || !position.is_finite() {
            return false;
        }
        self.positions[slot] = position.clamp(Vec3::ZERO, self.bounds);
        true
    }

    pub fn set_velocity(&mut self, slot: usize, velocity: Vec3) -> bool {
        if !self.is_alive(slot) || !velocity.is_finite() {
            return false;
        }
        self.velocities[slot] = velocity;
        true
    }

    pub fn set_age(&mut self, slot: usize, age_secs: f32) -> bool {
        if !self.is_alive(slot) {
            return false;
        }
        self.ages[slot] = age_secs.max(0.0);
        true
    }

    pub fn set_energy(&mut self, slot: usize, energy: f32) -> bool {
        if !self.is_alive(slot) {
            return false;
        }
        let max = self.config.kind(self.kinds[slot]).max_energy;
        self.energies[slot] = energy.min(max);
        true
    }

    pub fn set_health(&mut self, slot: usize, health: f32) -> bool {
        if !self.is_alive(slot) {
            return false;
        }
        let max = self.config.kind(self.kinds[slot]).max_health;
        self.healths[slot] = health.min(max);
        true
    }

    pub fn set_group(&mut self, slot: usize, group: Option<GroupId>) -> bool {
        if !self.is_alive(slot) {
            return false;
        }
        self.groups[slot] = group;
        true
    }

    pub fn set_equipment(&mut self, slot: usize, tier: u8) {
        if self.is_alive(slot) {
            self.equipment[slot] = tier;
        }
    }

    pub fn set_flags(&mut self, slot: usize, eating: bool, attacking: bool) {
        if self.is_alive(slot) {
            self.eating[slot] = eating;
            self.attacking[slot] = attacking;
        }
    }

    pub fn set_reproduction_cooldown(&mut self, slot: usize, secs: f32) {
        if self.is_alive(slot) {
            self.reproduction_cooldown[slot] = secs.max(0.0);
        }
    }

    pub fn set_brain(&mut self, slot: usize, brain: Brain) {
        if self.is_alive(slot) && self.kinds[slot].is_mobile() {
            self.brains[slot] = Some(brain);
        }
    }

    /// Adds energy up to the kind's maximum. Returns the amount actually added.
    pub fn feed(&mut self, slot: usize, amount: f32) -> f32 {
        if !self.is_alive(slot) || amount <= 0.0 {
            return 0.0;
        }
        let max = self.config.kind(self.kinds[slot]).max_energy;
        let before = self.energies[slot];
        self.energies[slot] = (before + amount).min(max);
        self.energies[slot] - before
    }

    /// Removes up to `amount` energy. Returns the amount actually removed.
    pub fn drain_energy(&mut self, slot: usize, amount: f32, cause: DeathCause) -> f32 {
        if !self.is_alive(slot) || amount <= 0.0 {
            return 0.0;
        }
        let taken = amount.min(self.energies[slot].max(0.0));
        self.energies[slot] -= amount;
        self.last_harm[slot] = Some(cause);
        taken
    }

    /// Removes up to `amount` health. Returns the amount actually removed.
    pub fn damage(&mut self, slot: usize, amount: f32, cause: DeathCause) -> f32 {
        if !self.is_alive(slot) || amount <= 0.0 {
            return 0.0;
        }
        let taken = amount.min(self.healths[slot].max(0.0));
        self.healths[slot] -= amount;
        self.last_harm[slot] = Some(cause);
        taken
    }
}

fn sample<R: Rng>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::XorShiftRng;

    fn store(capacity: usize) -> Organisms {
        Organisms::new(
            capacity,
            Vec3::new(100.0, 10.0, 100.0),
            2.0,
            4,
            OrganismConfig::default(),
        )
    }

    #[test]
    fn test_capacity_exceeded_leaves_columns_untouched() {
        let mut rng = XorShiftRng::new(1);
        let mut orgs = store(3);
        for _ in 0..3 {
            orgs.spawn(OrganismKind::Herbivore, Vec3::new(1.0, 0.0, 1.0), None, &mut rng)
                .unwrap();
        }
        let rng_before = rng.clone();
        let err = orgs
            .spawn(OrganismKind::Herbivore, Vec3::ZERO, None, &mut rng)
            .unwrap_err();
        assert_eq!(err, SimError::capacity("organisms"));
        assert_eq!(orgs.len(), 3);
        assert_eq!(orgs.positions().len(), 3);
        assert_eq!(orgs.brains().len(), 3);
        assert_eq!(rng, rng_before);
    }

    #[test]
    fn test_spawn_draws_from_kind_ranges() {
        let mut rng = XorShiftRng::new(2);
        let mut orgs = store(50);
        let cfg = OrganismConfig::default();
        for _ in 0..50 {
            let id = orgs
                .spawn(OrganismKind::Carnivore, Vec3::ZERO, None, &mut rng)
                .unwrap();
            let s = id.index();
            assert!(orgs.sizes()[s] >= cfg.carnivore.size.0 && orgs.sizes()[s] <= cfg.carnivore.size.1);
            assert!(orgs.energies()[s] <= cfg.carnivore.max_energy);
        }
    }

    #[test]
    fn test_only_mobile_kinds_get_brains() {
        let mut rng = XorShiftRng::new(3);
        let mut orgs = store(4);
        let plant = orgs.spawn(OrganismKind::Plant, Vec3::ZERO, None, &mut rng).unwrap();
        let tribal = orgs.spawn(OrganismKind::Tribal, Vec3::ZERO, None, &mut rng).unwrap();
        assert!(orgs.brain(plant.index()).is_none());
        assert!(orgs.brain(tribal.index()).is_some());
    }

    #[test]
    fn test_update_integrates_clamps_and_damps() {
        let mut rng = XorShiftRng::new(4);
        let mut orgs = store(2);
        let id = orgs
            .spawn(OrganismKind::Herbivore, Vec3::new(99.0, 0.0, 50.0), None, &mut rng)
            .unwrap();
        let s = id.index();
        orgs.set_velocity(s, Vec3::new(10.0, 0.0, 2.0));
        orgs.update(1.0, 1.0);
        let p = orgs.positions()[s];
        assert_eq!(p.x, 100.0);
        assert!((p.z - 52.0).abs() < 1e-4);
        let v = orgs.velocities()[s];
        assert_eq!(v.x, 0.0);
        assert!(v.z < 2.0 && v.z > 0.0);
    }

    #[test]
    fn test_energy_exhaustion_kills_and_frees_brain() {
        let mut rng = XorShiftRng::new(5);
        let mut orgs = store(2);
        let id = orgs.spawn(OrganismKind::Tribal, Vec3::ZERO, None, &mut rng).unwrap();
        orgs.set_energy(id.index(), 0.01);
        orgs.update(1.0, 1.0);
        assert!(!orgs.is_valid(id));
        assert!(orgs.brain(id.index()).is_none());
        assert_eq!(orgs.alive_count(), 0);
        assert_eq!(orgs.recent_deaths().len(), 1);
        assert_eq!(orgs.recent_deaths()[0].cause, DeathCause::Starvation);
    }

    #[test]
    fn test_health_loss_reports_last_harm() {
        let mut rng = XorShiftRng::new(6);
        let mut orgs = store(2);
        let id = orgs.spawn(OrganismKind::Herbivore, Vec3::ZERO, None, &mut rng).unwrap();
        orgs.damage(id.index(), 500.0, DeathCause::Predation);
        orgs.update(0.1, 1.0);
        assert_eq!(orgs.recent_deaths()[0].cause, DeathCause::Predation);
    }

    #[test]
    fn test_dead_slot_is_reused_with_new_generation() {
        let mut rng = XorShiftRng::new(7);
        let mut orgs = store(1);
        let first = orgs.spawn(OrganismKind::Herbivore, Vec3::ZERO, None, &mut rng).unwrap();
        assert!(orgs.kill(first.index(), DeathCause::Other));
        let second = orgs.spawn(OrganismKind::Carnivore, Vec3::ZERO, None, &mut rng).unwrap();
        assert_eq!(first.slot, second.slot);
        assert_ne!(first.generation, second.generation);
        assert!(!orgs.is_valid(first));
        assert!(orgs.is_valid(second));
        assert_eq!(orgs.kinds()[second.index()], OrganismKind::Carnivore);
    }

    #[test]
    fn test_plants_regrow_with_light() {
        let mut rng = XorShiftRng::new(8);
        let mut orgs = store(1);
        let id = orgs.spawn(OrganismKind::Plant, Vec3::ZERO, None, &mut rng).unwrap();
        orgs.set_energy(id.index(), 10.0);
        orgs.update(1.0, 1.0);
        assert!(orgs.energies()[id.index()] > 10.0);
        let lit = orgs.energies()[id.index()];
        orgs.update(1.0, 0.0);
        assert_eq!(orgs.energies()[id.index()], lit);
    }

    #[test]
    fn test_writes_to_dead_slots_are_ignored() {
        let mut rng = XorShiftRng::new(9);
        let mut orgs = store(1);
        let id = orgs.spawn(OrganismKind::Herbivore, Vec3::ZERO, None, &mut rng).unwrap();
        orgs.kill(id.index(), DeathCause::Other);
        assert!(!orgs.set_position(id.index(), Vec3::new(5.0, 0.0, 5.0)));
        assert_eq!(orgs.feed(id.index(), 10.0), 0.0);
    }

    #[test]
    fn test_non_finite_spawn_rejected() {
        let mut rng = XorShiftRng::new(10);
        let mut orgs = store(1);
        assert!(orgs
            .spawn(OrganismKind::Herbivore, Vec3::new(f32::NAN, 0.0, 0.0), None, &mut rng)
            .is_err());
        assert_eq!(orgs.len(), 0);
    }
}
