use anyhow::Result;
use clap::Parser;
use tribesim_core::{init_logging, AppConfig};
use tribesim_lib::runner::{self, RunOptions};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Ticks to simulate
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// Simulated seconds per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Overrides `world.seed` from the config
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 4)]
    groups: usize,

    #[arg(long, default_value_t = 12)]
    agents_per_group: usize,

    /// Groupless tribal agents
    #[arg(long, default_value_t = 4)]
    loners: usize,

    #[arg(long, default_value_t = 300)]
    plants: usize,

    /// Herbivores and carnivores, as `H,C`
    #[arg(long, value_delimiter = ',', num_args = 1..=2, default_values_t = [40, 10])]
    animals: Vec<usize>,

    /// Log progress every N ticks (0 = off)
    #[arg(long, default_value_t = 250)]
    log_every: u64,

    /// Write the run summary as JSON
    #[arg(long)]
    summary: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log);

    let mut config = AppConfig::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if args.print_config {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let options = RunOptions {
        ticks: args.ticks,
        dt: args.dt,
        groups: args.groups,
        agents_per_group: args.agents_per_group,
        loners: args.loners,
        plants: args.plants,
        herbivores: args.animals.first().copied().unwrap_or(0),
        carnivores: args.animals.get(1).copied().unwrap_or(0),
        log_every: args.log_every,
    };
    tracing::info!(
        seed = config.world.seed,
        fingerprint = %config.fingerprint(),
        ticks = options.ticks,
        "starting headless run"
    );

    let summary = runner::run(config, &options)?;
    if let Some(path) = &args.summary {
        summary.write_json(path)?;
        tracing::info!(path = %path, "summary written");
    }

    println!(
        "ran {} ticks: {} alive, {} groups, {} structures, {} wars, digest {}",
        summary.ticks_run,
        summary.world.alive,
        summary.world.groups.len(),
        summary.world.structures,
        summary.world.wars.len(),
        summary.digest.get(..12).unwrap_or(&summary.digest)
    );
    Ok(())
}
