//! Configuration management for simulation parameters.
//!
//! Strongly-typed sections mapping onto `config.toml`. Every balance constant
//! lives here rather than in the subsystems, since none of them encode a
//! derived invariant.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (the `Default` impls below)
//! 2. `config.toml` (any subset of sections/fields overrides defaults)
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 400.0
//! depth = 400.0
//! capacity = 4096
//! seed = 42
//!
//! [diplomacy]
//! decay_interval_secs = 60.0
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tribesim_data::OrganismKind;

/// World bounds, capacity and cadences.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    /// Explicit organism capacity. `0` derives it from `memory_budget_bytes`.
    pub capacity: usize,
    pub memory_budget_bytes: usize,
    pub seed: u64,
    /// Exponential velocity damping coefficient (per second).
    pub velocity_damping: f32,
    pub perception_radius: f32,
    pub interaction_radius: f32,
    pub grid_cell_size: f32,
    pub grid_cell_capacity: usize,
    pub min_plants: usize,
    /// Cap on plants reseeded per tick to hold `min_plants`.
    pub plant_refill_per_tick: usize,
    /// Per-second chance a well-fed plant drops a seed.
    pub plant_seed_chance: f32,
    pub plant_seed_radius: f32,
    pub message_log_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 40.0,
            depth: 400.0,
            capacity: 0,
            memory_budget_bytes: 4 * 1024 * 1024,
            seed: 1,
            velocity_damping: 2.0,
            perception_radius: 12.0,
            interaction_radius: 2.5,
            grid_cell_size: 10.0,
            grid_cell_capacity: 48,
            min_plants: 200,
            plant_refill_per_tick: 8,
            plant_seed_chance: 0.02,
            plant_seed_radius: 6.0,
            message_log_capacity: 128,
        }
    }
}

impl WorldConfig {
    /// Approximate bytes one organism slot costs: every parallel column plus
    /// an owned brain of the default width.
    pub const BYTES_PER_ORGANISM: usize = 1024;

    /// Organism capacity that fits in `bytes` of memory budget.
    #[must_use]
    pub fn capacity_for_budget(bytes: usize) -> usize {
        (bytes / Self::BYTES_PER_ORGANISM).max(1)
    }

    /// Capacity actually used: explicit when set, otherwise budget-derived.
    #[must_use]
    pub fn effective_capacity(&self) -> usize {
        if self.capacity > 0 {
            self.capacity
        } else {
            Self::capacity_for_budget(self.memory_budget_bytes)
        }
    }
}

/// Per-kind spawn ranges and physiology.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct KindConfig {
    pub size: (f32, f32),
    pub energy: (f32, f32),
    pub health: (f32, f32),
    pub max_energy: f32,
    pub max_health: f32,
    pub max_speed: f32,
    /// Energy lost per second per unit of size. Negative values regrow.
    pub metabolic_rate: f32,
    pub eat_rate: f32,
    pub attack_damage: f32,
    pub reproduce_energy: f32,
    pub reproduce_cooldown_secs: f32,
}

impl Default for KindConfig {
    fn default() -> Self {
        Self {
            size: (0.8, 1.2),
            energy: (60.0, 90.0),
            health: (80.0, 100.0),
            max_energy: 100.0,
            max_health: 100.0,
            max_speed: 3.0,
            metabolic_rate: 0.5,
            eat_rate: 10.0,
            attack_damage: 8.0,
            reproduce_energy: 80.0,
            reproduce_cooldown_secs: 30.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct OrganismConfig {
    pub plant: KindConfig,
    pub herbivore: KindConfig,
    pub carnivore: KindConfig,
    pub tribal: KindConfig,
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            plant: KindConfig {
                size: (0.5, 1.5),
                energy: (30.0, 60.0),
                health: (100.0, 100.0),
                max_energy: 80.0,
                max_speed: 0.0,
                metabolic_rate: -0.6,
                eat_rate: 0.0,
                attack_damage: 0.0,
                reproduce_energy: 60.0,
                reproduce_cooldown_secs: 20.0,
                ..KindConfig::default()
            },
            herbivore: KindConfig {
                size: (0.7, 1.1),
                max_speed: 3.5,
                metabolic_rate: 0.6,
                eat_rate: 12.0,
                attack_damage: 0.0,
                ..KindConfig::default()
            },
            carnivore: KindConfig {
                size: (1.0, 1.5),
                max_speed: 4.0,
                metabolic_rate: 0.8,
                eat_rate: 14.0,
                attack_damage: 10.0,
                reproduce_energy: 90.0,
                reproduce_cooldown_secs: 45.0,
                ..KindConfig::default()
            },
            tribal: KindConfig {
                size: (0.9, 1.1),
                energy: (70.0, 100.0),
                health: (90.0, 100.0),
                max_speed: 3.0,
                metabolic_rate: 0.35,
                eat_rate: 10.0,
                attack_damage: 9.0,
                ..KindConfig::default()
            },
        }
    }
}

impl OrganismConfig {
    #[must_use]
    pub fn kind(&self, kind: OrganismKind) -> &KindConfig {
        match kind {
            OrganismKind::Plant => &self.plant,
            OrganismKind::Herbivore => &self.herbivore,
            OrganismKind::Carnivore => &self.carnivore,
            OrganismKind::Tribal => &self.tribal,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BrainConfig {
    pub hidden: usize,
    pub mutation_rate: f32,
    pub mutation_amount: f32,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            hidden: 12,
            mutation_rate: 0.1,
            mutation_amount: 0.3,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TribeConfig {
    pub max_groups: usize,
    pub max_members: usize,
    pub max_structures_per_group: usize,
    pub max_structures: usize,
    pub food_drain_per_member: f32,
    pub starting_food: f32,
    pub starting_wood: f32,
    pub gather_rate: f32,
    pub gather_energy_cost: f32,
    pub share_amount: f32,
    pub recruit_radius: f32,
    pub max_build_distance: f32,
}

impl Default for TribeConfig {
    fn default() -> Self {
        Self {
            max_groups: 16,
            max_members: 512,
            max_structures_per_group: 64,
            max_structures: 256,
            food_drain_per_member: 0.01,
            starting_food: 100.0,
            starting_wood: 50.0,
            gather_rate: 1.0,
            gather_energy_cost: 0.2,
            share_amount: 10.0,
            recruit_radius: 6.0,
            max_build_distance: 5.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DiplomacyConfig {
    pub max_treaties: usize,
    pub max_wars: usize,
    pub max_trade_offers: usize,
    pub counterpart_perception: f32,
    pub war_declaration_penalty: f32,
    pub treaty_break_penalty: f32,
    pub treaty_signing_bonus: f32,
    pub casualty_score: f32,
    pub battle_score: f32,
    pub surrender_score: f32,
    pub trade_offer_expiry_secs: f32,
    pub decay_interval_secs: f32,
    pub decay_step: f32,
    pub ai_interval_ticks: u64,
    pub ai_war_threshold: f32,
    pub ai_war_chance: f32,
    pub ai_peace_after_secs: f32,
    pub ai_peace_chance: f32,
    pub tribute_fraction: f32,
    pub combat_reputation_hit: f32,
}

impl Default for DiplomacyConfig {
    fn default() -> Self {
        Self {
            max_treaties: 64,
            max_wars: 16,
            max_trade_offers: 32,
            counterpart_perception: 0.75,
            war_declaration_penalty: 50.0,
            treaty_break_penalty: 25.0,
            treaty_signing_bonus: 5.0,
            casualty_score: 5.0,
            battle_score: 15.0,
            surrender_score: 80.0,
            trade_offer_expiry_secs: 60.0,
            decay_interval_secs: 60.0,
            decay_step: 1.0,
            ai_interval_ticks: 120,
            ai_war_threshold: -70.0,
            ai_war_chance: 0.3,
            ai_peace_after_secs: 300.0,
            ai_peace_chance: 0.2,
            tribute_fraction: 0.1,
            combat_reputation_hit: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TechnologyConfig {
    pub base_cost: f32,
    pub era_cost_scale: f32,
    pub points_per_member: f32,
}

impl Default for TechnologyConfig {
    fn default() -> Self {
        Self {
            base_cost: 100.0,
            era_cost_scale: 1.5,
            points_per_member: 0.05,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TerritoryConfig {
    pub cell_size: f32,
    pub initial_strength: f32,
    pub reinforce_strength: f32,
    pub max_strength: f32,
    pub contested_decay_per_sec: f32,
    pub initial_pressure: f32,
    pub max_pressure: f32,
    pub max_conflicts: usize,
    pub yield_interval_ticks: u64,
    pub base_yield: f32,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            cell_size: 25.0,
            initial_strength: 10.0,
            reinforce_strength: 5.0,
            max_strength: 100.0,
            contested_decay_per_sec: 2.0,
            initial_pressure: 50.0,
            max_pressure: 100.0,
            max_conflicts: 64,
            yield_interval_ticks: 60,
            base_yield: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PopulationConfig {
    /// Health state is tracked for the first `tracked_capacity` organism slots.
    pub tracked_capacity: usize,
    pub secs_per_year: f32,
    pub child_age: f32,
    pub adult_age: f32,
    pub elder_age: f32,
    pub elder_mortality: f32,
    pub conception_rate: f32,
    pub conception_min_energy: f32,
    pub conception_min_health: f32,
    pub mate_radius: f32,
    pub gestation_secs: f32,
    pub birth_energy_cost: f32,
    pub birth_cooldown_secs: f32,
    pub birth_radius: f32,
    pub starvation_grace_secs: f32,
    pub spread_radius: f32,
    pub spread_chance: f32,
    pub immunity_gain: f32,
    pub outbreak_chance_per_min: f32,
    pub food_poisoning_chance: f32,
    pub hut_birth_bonus: f32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            tracked_capacity: 2048,
            secs_per_year: 60.0,
            child_age: 2.0,
            adult_age: 12.0,
            elder_age: 50.0,
            elder_mortality: 0.002,
            conception_rate: 0.01,
            conception_min_energy: 50.0,
            conception_min_health: 50.0,
            mate_radius: 6.0,
            gestation_secs: 20.0,
            birth_energy_cost: 25.0,
            birth_cooldown_secs: 30.0,
            birth_radius: 2.0,
            starvation_grace_secs: 30.0,
            spread_radius: 8.0,
            spread_chance: 0.5,
            immunity_gain: 0.4,
            outbreak_chance_per_min: 0.05,
            food_poisoning_chance: 0.002,
            hut_birth_bonus: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub day_length_secs: f32,
    pub days_per_season: u32,
    /// Food granted to every active group by a harvest.
    pub harvest_food: f32,
    pub festival_reputation: f32,
    /// Energy per second lost by every mobile organism during a blizzard.
    pub blizzard_energy_drain: f32,
    /// Energy per second lost by every plant during a drought.
    pub drought_plant_drain: f32,
    /// Per-day chance that a season-appropriate event starts on its own.
    pub random_event_chance: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            day_length_secs: 60.0,
            days_per_season: 4,
            harvest_food: 50.0,
            festival_reputation: 10.0,
            blizzard_energy_drain: 0.5,
            drought_plant_drain: 0.5,
            random_event_chance: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub organisms: OrganismConfig,
    pub brain: BrainConfig,
    pub tribe: TribeConfig,
    pub diplomacy: DiplomacyConfig,
    pub technology: TechnologyConfig,
    pub territory: TerritoryConfig,
    pub population: PopulationConfig,
    pub environment: EnvironmentConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` describing the
    /// first failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.world.width > 0.0 && self.world.height > 0.0 && self.world.depth > 0.0,
            "World dimensions must be positive"
        );
        anyhow::ensure!(
            self.world.effective_capacity() <= 1_000_000,
            "Organism capacity too large (max 1000000)"
        );
        anyhow::ensure!(
            self.world.velocity_damping >= 0.0,
            "Velocity damping must be non-negative"
        );
        anyhow::ensure!(
            self.world.perception_radius > 0.0 && self.world.interaction_radius > 0.0,
            "Perception and interaction radii must be positive"
        );
        anyhow::ensure!(
            self.world.grid_cell_size > 0.0 && self.world.grid_cell_capacity > 0,
            "Grid cell size and capacity must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.world.plant_seed_chance),
            "Plant seed chance must be in [0.0, 1.0]"
        );

        for kind in OrganismKind::ALL {
            let k = self.organisms.kind(kind);
            anyhow::ensure!(
                k.size.0 > 0.0 && k.size.0 <= k.size.1,
                "{kind:?}: size range must be positive and ordered"
            );
            anyhow::ensure!(
                k.energy.0 <= k.energy.1 && k.health.0 <= k.health.1,
                "{kind:?}: energy/health ranges must be ordered"
            );
            anyhow::ensure!(
                k.max_energy > 0.0 && k.max_health > 0.0,
                "{kind:?}: max energy/health must be positive"
            );
            anyhow::ensure!(k.max_speed >= 0.0, "{kind:?}: max speed must be non-negative");
        }

        anyhow::ensure!(
            (1..=crate::brain::MAX_HIDDEN).contains(&self.brain.hidden),
            "Brain hidden width must be in [1, {}]",
            crate::brain::MAX_HIDDEN
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.brain.mutation_rate),
            "Mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.brain.mutation_amount >= 0.0,
            "Mutation amount must be non-negative"
        );

        anyhow::ensure!(
            self.tribe.max_groups > 0 && self.tribe.max_groups <= u16::MAX as usize,
            "Max groups must be in [1, 65535]"
        );
        anyhow::ensure!(self.tribe.max_members > 0, "Max members must be positive");
        anyhow::ensure!(
            self.tribe.food_drain_per_member >= 0.0,
            "Food drain must be non-negative"
        );

        anyhow::ensure!(
            (0.0..=1.0).contains(&self.diplomacy.counterpart_perception),
            "Counterpart perception must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.diplomacy.surrender_score > 0.0 && self.diplomacy.surrender_score <= 100.0,
            "Surrender score must be in (0, 100]"
        );
        anyhow::ensure!(
            self.diplomacy.decay_interval_secs > 0.0,
            "Decay interval must be positive"
        );
        anyhow::ensure!(
            self.diplomacy.ai_interval_ticks > 0,
            "Diplomacy AI interval must be positive"
        );

        anyhow::ensure!(
            self.technology.base_cost > 0.0,
            "Technology base cost must be positive"
        );

        anyhow::ensure!(
            self.territory.cell_size > 0.0,
            "Territory cell size must be positive"
        );
        anyhow::ensure!(
            self.territory.initial_pressure > 0.0
                && self.territory.initial_pressure <= self.territory.max_pressure,
            "Initial pressure must be in (0, max_pressure]"
        );
        anyhow::ensure!(
            self.territory.yield_interval_ticks > 0,
            "Yield interval must be positive"
        );

        anyhow::ensure!(
            self.population.secs_per_year > 0.0,
            "Seconds per year must be positive"
        );
        anyhow::ensure!(
            self.population.child_age <= self.population.adult_age
                && self.population.adult_age <= self.population.elder_age,
            "Age bands must be ordered"
        );
        anyhow::ensure!(
            self.population.gestation_secs > 0.0,
            "Gestation must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.population.immunity_gain),
            "Immunity gain must be in [0.0, 1.0]"
        );

        anyhow::ensure!(
            self.environment.day_length_secs > 0.0 && self.environment.days_per_season > 0,
            "Day length and season length must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.environment.random_event_chance),
            "Random event chance must be in [0.0, 1.0]"
        );

        Ok(())
    }

    /// Parses and validates a TOML document. Missing sections or fields keep
    /// their defaults.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Stable hash of every balance section, used to tag run summaries.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.organisms).as_bytes());
        hasher.update(format!("{:?}", self.brain).as_bytes());
        hasher.update(format!("{:?}", self.tribe).as_bytes());
        hasher.update(format!("{:?}", self.diplomacy).as_bytes());
        hasher.update(format!("{:?}", self.technology).as_bytes());
        hasher.update(format!("{:?}", self.territory).as_bytes());
        hasher.update(format!("{:?}", self.population).as_bytes());
        hasher.update(format!("{:?}", self.environment).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_world_width() {
        let config = AppConfig {
            world: WorldConfig {
                width: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_mutation_rate() {
        let config = AppConfig {
            brain: BrainConfig {
                mutation_rate: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unordered_age_bands_rejected() {
        let config = AppConfig {
            population: PopulationConfig {
                adult_age: 80.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml("[world]\nseed = 99\ncapacity = 500\n").unwrap();
        assert_eq!(config.world.seed, 99);
        assert_eq!(config.world.effective_capacity(), 500);
        assert_eq!(config.diplomacy.max_wars, DiplomacyConfig::default().max_wars);
    }

    #[test]
    fn test_capacity_derived_from_budget() {
        let world = WorldConfig {
            capacity: 0,
            memory_budget_bytes: 1024 * 100,
            ..Default::default()
        };
        assert_eq!(world.effective_capacity(), 100);
    }

    #[test]
    fn test_fingerprint_consistency() {
        assert_eq!(
            AppConfig::default().fingerprint(),
            AppConfig::default().fingerprint()
        );
    }

    #[test]
    fn test_fingerprint_tracks_balance_changes() {
        let mut tweaked = AppConfig::default();
        tweaked.diplomacy.decay_step = 2.0;
        assert_ne!(AppConfig::default().fingerprint(), tweaked.fingerprint());
    }
}
