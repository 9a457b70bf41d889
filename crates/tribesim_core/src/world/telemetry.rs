use super::{MessageLog, World};
use crate::config::AppConfig;
use crate::diplomacy::Diplomacy;
use crate::environment::Environment;
use crate::math::Vec3;
use crate::metrics::Metrics;
use crate::organisms::Organisms;
use crate::population::{Population, PopulationStats};
use crate::spatial_grid::SpatialGrid;
use crate::structures::{Structure, StructureStore};
use crate::technology::Technology;
use crate::territory::Territory;
use crate::tribe::TribeRegistry;
use tribesim_data::{
    DiplomaticStatus, Era, GroupId, OrganismKind, ResourceBundle, Season, StructureId, TerrainType,
    Weather,
};

/// Read-only views. Slices come straight from the organism columns and are
/// indexed by slot, so `positions()[id.index()]` is the organism `id`.
impl World {
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated seconds since start.
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn organisms(&self) -> &Organisms {
        &self.organisms
    }

    #[must_use]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[must_use]
    pub fn tribes(&self) -> &TribeRegistry {
        &self.tribes
    }

    #[must_use]
    pub fn structures(&self) -> &StructureStore {
        &self.structures
    }

    #[must_use]
    pub fn diplomacy(&self) -> &Diplomacy {
        &self.diplomacy
    }

    #[must_use]
    pub fn technology(&self) -> &Technology {
        &self.technology
    }

    #[must_use]
    pub fn territory(&self) -> &Territory {
        &self.territory
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    #[must_use]
    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    // ---------------------------------------------------------------------
    // Counts
    // ---------------------------------------------------------------------

    /// Slots in use, dead or alive. Bounds every raw column view.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.organisms.len()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.organisms.alive_count()
    }

    /// Active groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.tribes.active_count()
    }

    #[must_use]
    pub fn structure_count(&self) -> usize {
        self.structures.count()
    }

    // ---------------------------------------------------------------------
    // Raw columns
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn positions(&self) -> &[Vec3] {
        self.organisms.positions()
    }

    #[must_use]
    pub fn velocities(&self) -> &[Vec3] {
        self.organisms.velocities()
    }

    #[must_use]
    pub fn energies(&self) -> &[f32] {
        self.organisms.energies()
    }

    #[must_use]
    pub fn healths(&self) -> &[f32] {
        self.organisms.healths()
    }

    #[must_use]
    pub fn sizes(&self) -> &[f32] {
        self.organisms.sizes()
    }

    #[must_use]
    pub fn kinds(&self) -> &[OrganismKind] {
        self.organisms.kinds()
    }

    /// Kind tags, see `OrganismKind::tag`.
    pub fn kind_tags(&self) -> impl Iterator<Item = u8> + '_ {
        self.organisms.kinds().iter().map(|k| k.tag())
    }

    #[must_use]
    pub fn groups(&self) -> &[Option<GroupId>] {
        self.organisms.groups()
    }

    #[must_use]
    pub fn alive_flags(&self) -> &[bool] {
        self.organisms.alive()
    }

    #[must_use]
    pub fn attacking_flags(&self) -> &[bool] {
        self.organisms.attacking()
    }

    #[must_use]
    pub fn eating_flags(&self) -> &[bool] {
        self.organisms.eating()
    }

    // ---------------------------------------------------------------------
    // Groups and structures
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn group_resources(&self, group: GroupId) -> Option<ResourceBundle> {
        self.tribes.resources(group)
    }

    #[must_use]
    pub fn group_members(&self, group: GroupId) -> usize {
        self.tribes.member_count(group)
    }

    #[must_use]
    pub fn group_color(&self, group: GroupId) -> Option<[u8; 3]> {
        self.tribes.color(group)
    }

    #[must_use]
    pub fn structure(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(id)
    }

    // ---------------------------------------------------------------------
    // Environment
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn season(&self) -> Season {
        self.environment.season()
    }

    #[must_use]
    pub fn weather(&self) -> Weather {
        self.environment.weather()
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.environment.day()
    }

    #[must_use]
    pub fn year(&self) -> u32 {
        self.environment.year()
    }

    #[must_use]
    pub fn light_level(&self) -> f32 {
        self.environment.light_level()
    }

    // ---------------------------------------------------------------------
    // Diplomacy, technology, territory
    // ---------------------------------------------------------------------

    /// How `a` regards `b`.
    #[must_use]
    pub fn reputation(&self, a: GroupId, b: GroupId) -> f32 {
        self.diplomacy.reputation(a, b)
    }

    #[must_use]
    pub fn status(&self, a: GroupId, b: GroupId) -> DiplomaticStatus {
        self.diplomacy.status(a, b)
    }

    #[must_use]
    pub fn is_at_war(&self, a: GroupId, b: GroupId) -> bool {
        self.diplomacy.is_at_war(a, b)
    }

    #[must_use]
    pub fn treaty_count(&self, a: GroupId, b: GroupId) -> usize {
        self.diplomacy.treaties_between(a, b).count()
    }

    #[must_use]
    pub fn tech_level(&self, group: GroupId) -> u32 {
        self.technology.level(group)
    }

    #[must_use]
    pub fn tech_progress(&self, group: GroupId) -> f32 {
        self.technology.progress(group)
    }

    #[must_use]
    pub fn era(&self, group: GroupId) -> Era {
        self.technology.era(group)
    }

    #[must_use]
    pub fn cell_owner(&self, cell: usize) -> Option<GroupId> {
        self.territory.cell(cell).and_then(|c| c.owner)
    }

    #[must_use]
    pub fn cell_terrain(&self, cell: usize) -> Option<TerrainType> {
        self.territory.cell(cell).map(|c| c.terrain)
    }

    #[must_use]
    pub fn territory_count(&self, group: GroupId) -> usize {
        self.territory.territory_count(group)
    }

    /// Cumulative births, deaths by cause and disease counters.
    #[must_use]
    pub fn population_stats(&self) -> &PopulationStats {
        &self.population.stats
    }
}
