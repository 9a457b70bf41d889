//! tribesim: an agent-based world of plants, animals and tribes.
//!
//! The engine lives in `tribesim_core` and its plain data types in
//! `tribesim_data`; this crate adds the headless [`runner`] used by the
//! `tribesim` binary.

pub mod runner;

pub use tribesim_core;
pub use tribesim_core::{AppConfig, SimError, SimResult, World, WorldSnapshot};
pub use tribesim_data;
