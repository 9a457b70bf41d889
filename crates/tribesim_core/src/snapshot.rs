use crate::diplomacy::{DiplomacyStats, Treaty, War};
use crate::population::PopulationStats;
use crate::world::World;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tribesim_data::{Era, GroupId, OrganismKind, ResourceBundle, Season, SeasonalEvent, Weather};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub name: String,
    pub color: [u8; 3],
    pub members: usize,
    pub peak_members: usize,
    pub resources: ResourceBundle,
    pub births: u32,
    pub deaths: u32,
    pub structures: usize,
    pub territory: usize,
    pub tech_level: u32,
    pub era: Era,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KindCounts {
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
    pub tribal: usize,
}

/// Point-in-time summary of a world, cheap enough to take every few ticks
/// and serialisable for logs or external viewers.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub time: f32,
    pub day: u32,
    pub year: u32,
    pub season: Season,
    pub weather: Weather,
    pub light: f32,
    pub event: Option<SeasonalEvent>,
    pub alive: usize,
    pub kinds: KindCounts,
    pub groups: Vec<GroupSnapshot>,
    pub structures: usize,
    pub contested_cells: usize,
    pub wars: Vec<War>,
    pub treaties: Vec<Treaty>,
    pub population: PopulationStats,
    pub population_this_year: PopulationStats,
    pub diplomacy: DiplomacyStats,
    pub messages_sent: u64,
}

impl WorldSnapshot {
    #[must_use]
    pub fn capture(world: &World) -> Self {
        let organisms = world.organisms();
        let mut kinds = KindCounts::default();
        for slot in organisms.iter_alive() {
            match organisms.kinds()[slot] {
                OrganismKind::Plant => kinds.plants += 1,
                OrganismKind::Herbivore => kinds.herbivores += 1,
                OrganismKind::Carnivore => kinds.carnivores += 1,
                OrganismKind::Tribal => kinds.tribal += 1,
            }
        }

        let groups = world
            .tribes()
            .iter()
            .filter(|t| t.active)
            .map(|t| GroupSnapshot {
                id: t.id,
                name: t.name.clone(),
                color: t.color,
                members: t.member_count(),
                peak_members: t.peak_members,
                resources: t.resources,
                births: t.births,
                deaths: t.deaths,
                structures: t.structures().len(),
                territory: world.territory_count(t.id),
                tech_level: world.tech_level(t.id),
                era: world.era(t.id),
            })
            .collect();

        let environment = world.environment();
        Self {
            tick: world.tick(),
            time: world.time(),
            day: environment.day(),
            year: environment.year(),
            season: environment.season(),
            weather: environment.weather(),
            light: environment.light_level(),
            event: environment.active_event(),
            alive: world.alive_count(),
            kinds,
            groups,
            structures: world.structure_count(),
            contested_cells: world.territory().contested_count(),
            wars: world.diplomacy().wars().to_vec(),
            treaties: world.diplomacy().treaties().to_vec(),
            population: world.population().stats,
            population_this_year: world.population().yearly,
            diplomacy: world.diplomacy().stats,
            messages_sent: world.messages().total(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Hash of the serialised summary.
    pub fn digest(&self) -> anyhow::Result<String> {
        let json = serde_json::to_string(self)?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&GroupSnapshot> {
        self.groups.iter().find(|g| g.id == id)
    }
}

/// Hash over the raw organism columns. Two runs with the same seed and
/// inputs produce the same digest tick for tick.
#[must_use]
pub fn state_digest(world: &World) -> String {
    let mut hasher = Sha256::new();
    hasher.update(world.tick().to_le_bytes());
    for slot in world.organisms().iter_alive() {
        let p = world.positions()[slot];
        hasher.update((slot as u32).to_le_bytes());
        hasher.update([world.kinds()[slot].tag()]);
        for v in [p.x, p.y, p.z, world.energies()[slot], world.healths()[slot]] {
            hasher.update(v.to_bits().to_le_bytes());
        }
        let group = world.groups()[slot].map_or(u16::MAX, |g| g.0);
        hasher.update(group.to_le_bytes());
    }
    for tribe in world.tribes().iter() {
        let r = tribe.resources;
        for v in [r.food, r.wood, r.stone, r.metal] {
            hasher.update(v.to_bits().to_le_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_counts_kinds_and_groups() {
        let mut world = World::init(32, 4).expect("world");
        let g = world.create_group().expect("group");
        world
            .spawn_organism(OrganismKind::Tribal, 5.0, 1.0, 5.0, Some(g))
            .expect("member");
        world
            .spawn_organism(OrganismKind::Plant, 9.0, 0.0, 9.0, None)
            .expect("plant");

        let snap = WorldSnapshot::capture(&world);
        assert_eq!(snap.alive, 2);
        assert_eq!(snap.kinds.tribal, 1);
        assert_eq!(snap.kinds.plants, 1);
        let group = snap.group(g).expect("group snapshot");
        assert_eq!(group.members, 1);
        assert_eq!(group.era, Era::Stone);

        let json = snap.to_json().expect("json");
        assert!(json.contains("\"tribal\":1"));
        assert_eq!(snap.digest().expect("digest").len(), 64);
    }

    #[test]
    fn test_state_digest_tracks_changes() {
        let mut world = World::init(8, 4).expect("world");
        let id = world
            .spawn_organism(OrganismKind::Herbivore, 5.0, 0.0, 5.0, None)
            .expect("herbivore");
        let before = state_digest(&world);
        assert_eq!(before, state_digest(&world));
        world.set_energy(id, 10.0);
        assert_ne!(before, state_digest(&world));
    }
}
