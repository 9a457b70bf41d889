//! Plain data types shared between the tribesim engine and anything that
//! reads its telemetry (renderers, save-file writers, analysis tools).
//!
//! Nothing in here owns simulation behaviour; the logic lives in
//! `tribesim_core`, usually as `*Logic` extension traits on these types.

pub mod data;

pub use data::diplomacy::{DiplomaticStatus, TreatyType, WarOutcome, WarReason};
pub use data::environment::{Season, SeasonalEvent, Weather};
pub use data::geometry::Vec3;
pub use data::health::{AgeBand, DeathCause, Disease, HungerBand};
pub use data::ids::{GroupId, OrganismId, StructureId, TradeOfferId, TreatyId, WarId};
pub use data::organism::OrganismKind;
pub use data::resources::{ResourceBundle, ResourceKind};
pub use data::structure::StructureKind;
pub use data::technology::{Era, Tech};
pub use data::terrain::TerrainType;
