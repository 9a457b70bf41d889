//! Core data structures for the tribesim simulation.

pub mod diplomacy;
pub mod environment;
pub mod geometry;
pub mod health;
pub mod ids;
pub mod organism;
pub mod resources;
pub mod structure;
pub mod technology;
pub mod terrain;
