//! Group registry: stockpiles, membership and per-group bookkeeping.

use crate::config::TribeConfig;
use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use tribesim_data::{GroupId, OrganismId, ResourceBundle, ResourceKind, StructureId};

const PALETTE: [[u8; 3]; 16] = [
    [220, 60, 60],
    [60, 120, 220],
    [70, 180, 80],
    [230, 180, 40],
    [160, 80, 200],
    [40, 190, 190],
    [240, 120, 30],
    [200, 90, 150],
    [120, 120, 40],
    [90, 60, 30],
    [150, 200, 240],
    [250, 220, 160],
    [60, 60, 120],
    [180, 240, 120],
    [130, 30, 60],
    [200, 200, 200],
];

/// One group. Never removed from the registry once created, so a [`GroupId`]
/// stays meaningful for the whole run.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Tribe {
    pub id: GroupId,
    pub name: String,
    pub active: bool,
    pub resources: ResourceBundle,
    pub color: [u8; 3],
    pub founded_at: f32,
    pub births: u32,
    pub deaths: u32,
    pub births_this_year: u32,
    pub deaths_this_year: u32,
    pub peak_members: usize,
    members: Vec<OrganismId>,
    structures: Vec<StructureId>,
}

impl Tribe {
    #[must_use]
    pub fn members(&self) -> &[OrganismId] {
        &self.members
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn structures(&self) -> &[StructureId] {
        &self.structures
    }
}

#[derive(Debug, Clone)]
pub struct TribeRegistry {
    tribes: Vec<Tribe>,
    max_groups: usize,
    max_members: usize,
    max_structures: usize,
    food_drain_per_member: f32,
    starting: ResourceBundle,
}

impl TribeRegistry {
    #[must_use]
    pub fn new(config: &TribeConfig) -> Self {
        Self {
            tribes: Vec::with_capacity(config.max_groups),
            max_groups: config.max_groups,
            max_members: config.max_members,
            max_structures: config.max_structures_per_group,
            food_drain_per_member: config.food_drain_per_member,
            starting: ResourceBundle::new(config.starting_food, config.starting_wood, 0.0, 0.0),
        }
    }

    pub fn create_group(&mut self, now: f32) -> SimResult<GroupId> {
        if self.tribes.len() >= self.max_groups {
            return Err(SimError::capacity("groups"));
        }
        let index = self.tribes.len();
        let id = GroupId(index as u16);
        self.tribes.push(Tribe {
            id,
            name: format!("Tribe {}", index + 1),
            active: true,
            resources: self.starting,
            color: PALETTE[index % PALETTE.len()],
            founded_at: now,
            births: 0,
            deaths: 0,
            births_this_year: 0,
            deaths_this_year: 0,
            peak_members: 0,
            members: Vec::with_capacity(self.max_members),
            structures: Vec::with_capacity(self.max_structures),
        });
        tracing::info!(group = %id, "group founded");
        Ok(id)
    }

    #[must_use]
    pub fn get(&self, id: GroupId) -> Option<&Tribe> {
        self.tribes.get(id.index())
    }

    fn get_mut(&mut self, id: GroupId) -> Option<&mut Tribe> {
        self.tribes.get_mut(id.index())
    }

    fn active_mut(&mut self, id: GroupId) -> SimResult<&mut Tribe> {
        match self.tribes.get_mut(id.index()) {
            Some(t) if t.active => Ok(t),
            _ => Err(SimError::invalid("group", id)),
        }
    }

    #[must_use]
    pub fn is_active(&self, id: GroupId) -> bool {
        self.get(id).is_some_and(|t| t.active)
    }

    /// Groups ever created, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tribes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tribes.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.max_groups
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.tribes.iter().filter(|t| t.active).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tribe> {
        self.tribes.iter()
    }

    pub fn active_ids(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.tribes.iter().filter(|t| t.active).map(|t| t.id)
    }

    #[must_use]
    pub fn color(&self, id: GroupId) -> Option<[u8; 3]> {
        self.get(id).map(|t| t.color)
    }

    #[must_use]
    pub fn resources(&self, id: GroupId) -> Option<ResourceBundle> {
        self.get(id).map(|t| t.resources)
    }

    // ---------------------------------------------------------------------
    // Stockpiles
    // ---------------------------------------------------------------------

    /// Returns false for unknown/inactive groups or a non-positive amount.
    pub fn add_resource(&mut self, id: GroupId, kind: ResourceKind, amount: f32) -> bool {
        if amount.is_nan() || amount <= 0.0 {
            return false;
        }
        match self.active_mut(id) {
            Ok(t) => {
                *t.resources.get_mut(kind) += amount;
                true
            }
            Err(_) => false,
        }
    }

    pub fn add_bundle(&mut self, id: GroupId, bundle: &ResourceBundle) -> bool {
        match self.active_mut(id) {
            Ok(t) => {
                t.resources.add(bundle);
                true
            }
            Err(_) => false,
        }
    }

    /// Deducts `amount` only if the whole amount is available.
    pub fn consume_resource(&mut self, id: GroupId, kind: ResourceKind, amount: f32) -> bool {
        let Ok(t) = self.active_mut(id) else {
            return false;
        };
        let stock = t.resources.get_mut(kind);
        if amount < 0.0 || *stock < amount {
            return false;
        }
        *stock -= amount;
        true
    }

    /// All-or-nothing deduction of a whole bundle.
    pub fn consume_bundle(&mut self, id: GroupId, cost: &ResourceBundle) -> SimResult<()> {
        let t = self.active_mut(id)?;
        if !t.resources.covers(cost) {
            return Err(SimError::InsufficientResources);
        }
        for kind in ResourceKind::ALL {
            *t.resources.get_mut(kind) -= cost.get(kind);
        }
        Ok(())
    }

    #[must_use]
    pub fn has_resources(&self, id: GroupId, cost: &ResourceBundle) -> bool {
        self.get(id)
            .is_some_and(|t| t.active && t.resources.covers(cost))
    }

    // ---------------------------------------------------------------------
    // Membership
    // ---------------------------------------------------------------------

    pub fn add_member(&mut self, id: GroupId, member: OrganismId) -> SimResult<()> {
        let max = self.max_members;
        let t = self.active_mut(id)?;
        if t.members.contains(&member) {
            return Err(SimError::PreconditionNotMet("already a member"));
        }
        if t.members.len() >= max {
            return Err(SimError::capacity("group members"));
        }
        t.members.push(member);
        t.peak_members = t.peak_members.max(t.members.len());
        Ok(())
    }

    /// Swap-removes `member`. The group goes inactive when its last member
    /// leaves.
    pub fn remove_member(&mut self, id: GroupId, member: OrganismId) -> bool {
        let Some(t) = self.get_mut(id) else {
            return false;
        };
        let Some(pos) = t.members.iter().position(|&m| m == member) else {
            return false;
        };
        t.members.swap_remove(pos);
        if t.members.is_empty() && t.active {
            t.active = false;
            tracing::info!(group = %id, births = t.births, deaths = t.deaths, "group extinct");
        }
        true
    }

    #[must_use]
    pub fn member_count(&self, id: GroupId) -> usize {
        self.get(id).map_or(0, Tribe::member_count)
    }

    // ---------------------------------------------------------------------
    // Structures
    // ---------------------------------------------------------------------

    pub fn add_structure(&mut self, id: GroupId, structure: StructureId) -> SimResult<()> {
        let max = self.max_structures;
        let t = self.active_mut(id)?;
        if t.structures.len() >= max {
            return Err(SimError::capacity("group structures"));
        }
        t.structures.push(structure);
        Ok(())
    }

    pub fn remove_structure(&mut self, id: GroupId, structure: StructureId) -> bool {
        let Some(t) = self.get_mut(id) else {
            return false;
        };
        match t.structures.iter().position(|&s| s == structure) {
            Some(pos) => {
                t.structures.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------------------
    // Bookkeeping
    // ---------------------------------------------------------------------

    pub fn record_birth(&mut self, id: GroupId) {
        if let Some(t) = self.get_mut(id) {
            t.births += 1;
            t.births_this_year += 1;
        }
    }

    pub fn record_death(&mut self, id: GroupId) {
        if let Some(t) = self.get_mut(id) {
            t.deaths += 1;
            t.deaths_this_year += 1;
        }
    }

    pub fn reset_yearly(&mut self) {
        for t in &mut self.tribes {
            t.births_this_year = 0;
            t.deaths_this_year = 0;
        }
    }

    /// Passive food upkeep proportional to membership. Food never goes
    /// negative.
    pub fn update(&mut self, dt: f32) {
        let rate = self.food_drain_per_member;
        for t in self.tribes.iter_mut().filter(|t| t.active) {
            let drain = rate * t.members.len() as f32 * dt;
            t.resources.food = (t.resources.food - drain).max(0.0);
        }
    }

    pub fn clear(&mut self) {
        self.tribes.clear();
    }
}
