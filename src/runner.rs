//! Headless batch runs: seed a world, advance it, summarise the result.

use anyhow::Context;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tribesim_core::math::XorShiftRng;
use tribesim_core::{state_digest, AppConfig, World, WorldSnapshot};
use tribesim_data::{GroupId, OrganismKind};

/// Initial population and run length.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub ticks: u64,
    pub dt: f32,
    pub groups: usize,
    pub agents_per_group: usize,
    pub loners: usize,
    pub plants: usize,
    pub herbivores: usize,
    pub carnivores: usize,
    /// Progress is logged every this many ticks. `0` disables it.
    pub log_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: 1000,
            dt: 0.1,
            groups: 4,
            agents_per_group: 12,
            loners: 4,
            plants: 300,
            herbivores: 40,
            carnivores: 10,
            log_every: 250,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub config_fingerprint: String,
    pub ticks_requested: u64,
    pub ticks_run: u64,
    pub wall_secs: f64,
    pub mean_tick_micros: u64,
    /// All groups died out before the run finished.
    pub extinct: bool,
    pub digest: String,
    pub world: WorldSnapshot,
}

impl RunSummary {
    pub fn write_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("writing summary {}", path.display()))
    }
}

/// Builds the starting world: groups evenly spaced on a ring around the
/// centre, loners and animals scattered, plants anywhere.
pub fn seed_world(config: AppConfig, options: &RunOptions) -> anyhow::Result<World> {
    let seed = config.world.seed;
    let (width, depth) = (config.world.width, config.world.depth);
    let mut world = World::new(config)?;
    let mut rng = XorShiftRng::new(seed ^ 0x5EED);

    let centre = (width * 0.5, depth * 0.5);
    let ring = width.min(depth) * 0.3;
    let mut groups: Vec<GroupId> = Vec::with_capacity(options.groups);
    for i in 0..options.groups {
        let group = world.create_group().context("creating group")?;
        groups.push(group);
        let angle = i as f32 / options.groups as f32 * std::f32::consts::TAU;
        let home = (centre.0 + ring * angle.cos(), centre.1 + ring * angle.sin());
        for _ in 0..options.agents_per_group {
            let x = home.0 + rng.gen_range(-8.0..8.0);
            let z = home.1 + rng.gen_range(-8.0..8.0);
            world
                .spawn_organism(OrganismKind::Tribal, x, 0.0, z, Some(group))
                .with_context(|| format!("spawning members of {group}"))?;
        }
    }

    let scattered = [
        (OrganismKind::Tribal, options.loners),
        (OrganismKind::Herbivore, options.herbivores),
        (OrganismKind::Carnivore, options.carnivores),
        (OrganismKind::Plant, options.plants),
    ];
    for (kind, count) in scattered {
        for _ in 0..count {
            let x = rng.gen_range(0.0..width);
            let z = rng.gen_range(0.0..depth);
            if let Err(err) = world.spawn_organism(kind, x, 0.0, z, None) {
                tracing::warn!(%err, kind = ?kind, "initial population truncated");
                break;
            }
        }
    }

    tracing::info!(
        groups = groups.len(),
        alive = world.alive_count(),
        capacity = world.organisms().capacity(),
        "world seeded"
    );
    Ok(world)
}

/// Runs `options.ticks` updates, stopping early once nothing is alive.
pub fn run(config: AppConfig, options: &RunOptions) -> anyhow::Result<RunSummary> {
    anyhow::ensure!(
        options.dt.is_finite() && options.dt > 0.0,
        "dt must be positive"
    );
    let seed = config.world.seed;
    let fingerprint = config.fingerprint();
    let mut world = seed_world(config, options)?;

    let started = Instant::now();
    let mut ticks_run = 0;
    for tick in 1..=options.ticks {
        world.update(options.dt);
        ticks_run = tick;
        if options.log_every > 0 && tick % options.log_every == 0 {
            tracing::info!(
                tick,
                alive = world.alive_count(),
                groups = world.group_count(),
                structures = world.structure_count(),
                season = world.season().label(),
                year = world.year(),
                "progress"
            );
        }
        if world.alive_count() == 0 {
            tracing::warn!(tick, "everything died, stopping early");
            break;
        }
    }
    let wall_secs = started.elapsed().as_secs_f64();

    let summary = RunSummary {
        seed,
        config_fingerprint: fingerprint,
        ticks_requested: options.ticks,
        ticks_run,
        wall_secs,
        mean_tick_micros: world.metrics().mean_tick_micros(),
        extinct: options.groups > 0 && world.group_count() == 0,
        digest: state_digest(&world),
        world: WorldSnapshot::capture(&world),
    };
    tracing::info!(
        ticks = summary.ticks_run,
        alive = summary.world.alive,
        groups = summary.world.groups.len(),
        wall_secs = summary.wall_secs,
        "run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.world.seed = seed;
        config.world.capacity = 512;
        config.world.min_plants = 20;
        config
    }

    fn small_options() -> RunOptions {
        RunOptions {
            ticks: 30,
            groups: 2,
            agents_per_group: 5,
            loners: 1,
            plants: 30,
            herbivores: 5,
            carnivores: 2,
            log_every: 0,
            ..RunOptions::default()
        }
    }

    #[test]
    fn test_seed_world_places_every_group() {
        let world = seed_world(small_config(3), &small_options()).unwrap();
        assert_eq!(world.group_count(), 2);
        assert_eq!(world.alive_count(), 2 * 5 + 1 + 30 + 5 + 2);
    }

    #[test]
    fn test_same_seed_same_summary() {
        let a = run(small_config(11), &small_options()).unwrap();
        let b = run(small_config(11), &small_options()).unwrap();
        assert_eq!(a.ticks_run, 30);
        assert_eq!(a.digest, b.digest);
        assert_eq!(a.config_fingerprint, b.config_fingerprint);
    }

    #[test]
    fn test_rejects_bad_dt() {
        let options = RunOptions {
            dt: 0.0,
            ..small_options()
        };
        assert!(run(small_config(1), &options).is_err());
    }
}
