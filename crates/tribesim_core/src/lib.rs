//! # Tribesim Core
//!
//! The simulation engine for tribesim, a deterministic world of plants,
//! animals and tribal agents that form groups, build, research, trade and
//! go to war.
//!
//! This crate contains:
//! - Fixed-topology neural brains driving every mobile organism
//! - A structure-of-arrays organism store with generational handles
//! - A uniform 3D grid for neighbour queries
//! - Group ledgers, structures, technology, territory and diplomacy
//! - Health, hunger, disease and gestation
//! - Day/night, seasons, weather and seasonal events
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! [`World`] owns every subsystem and advances them in a fixed order once
//! per [`World::update`]. Subsystems never reference each other; the world
//! passes whatever a stage needs. Brain inference runs on Rayon when the
//! `parallel` feature is on, everything else is single threaded, and all
//! randomness comes from one seeded generator so a run is reproducible.
//!
//! ## Example
//!
//! ```
//! use tribesim_core::World;
//! use tribesim_data::OrganismKind;
//!
//! let mut world = World::init(256, 42).unwrap();
//! let group = world.create_group().unwrap();
//! world
//!     .spawn_organism(OrganismKind::Tribal, 10.0, 0.0, 10.0, Some(group))
//!     .unwrap();
//! world.update(0.1);
//! assert_eq!(world.tick(), 1);
//! ```

/// Fixed-topology feed-forward brains
pub mod brain;
/// Configuration sections and `config.toml` loading
pub mod config;
/// Reputation, treaties, wars and trade
pub mod diplomacy;
/// Day/night, seasons, weather and seasonal events
pub mod environment;
/// Engine error type
pub mod error;
/// Vector maths, activation approximations and the engine RNG
pub mod math;
/// Performance metrics collection and logging
pub mod metrics;
/// Structure-of-arrays organism storage
pub mod organisms;
/// Health, hunger, disease and gestation
pub mod population;
/// Serialisable world summaries
pub mod snapshot;
/// Uniform 3D grid for radius queries
pub mod spatial_grid;
/// Group-owned buildings
pub mod structures;
/// Tech tree and per-group research
pub mod technology;
/// Terrain cells, ownership and border conflicts
pub mod territory;
/// Group ledger and membership
pub mod tribe;
/// The simulation context
pub mod world;

pub use brain::{Brain, BRAIN_INPUTS, BRAIN_OUTPUTS};
pub use config::AppConfig;
pub use diplomacy::{Diplomacy, TreatyLogic};
pub use environment::{Environment, SeasonLogic};
pub use error::{SimError, SimResult};
pub use metrics::{init_logging, Metrics};
pub use population::{DiseaseLogic, HungerLogic, PopulationStats};
pub use snapshot::{state_digest, WorldSnapshot};
pub use structures::StructureLogic;
pub use technology::{TechBonuses, TechLogic};
pub use territory::TerrainLogic;
pub use world::{DietLogic, Message, MessageLog, World};
