//! Tick metrics and logging setup.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// How often [`Metrics::record_tick`] emits an `info!` summary.
pub const SUMMARY_INTERVAL: u64 = 1000;

/// Running counters updated once per tick.
pub struct Metrics {
    tick_count: AtomicU64,
    alive_count: AtomicU64,
    group_count: AtomicU64,
    last_tick_micros: AtomicU64,
    total_tick_micros: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tick_count", &self.tick_count())
            .field("alive_count", &self.alive_count())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            alive_count: AtomicU64::new(0),
            group_count: AtomicU64::new(0),
            last_tick_micros: AtomicU64::new(0),
            total_tick_micros: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick with its duration.
    pub fn record_tick(&self, duration: Duration, alive: usize, groups: usize) {
        let micros = duration.as_micros() as u64;
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.alive_count.store(alive as u64, Ordering::Relaxed);
        self.group_count.store(groups as u64, Ordering::Relaxed);
        self.last_tick_micros.store(micros, Ordering::Relaxed);
        self.total_tick_micros.fetch_add(micros, Ordering::Relaxed);

        if tick % SUMMARY_INTERVAL == 0 {
            tracing::info!(
                tick,
                alive,
                groups,
                tick_us = micros,
                mean_tick_us = self.mean_tick_micros(),
                "simulation tick"
            );
        }
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn alive_count(&self) -> u64 {
        self.alive_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn group_count(&self) -> u64 {
        self.group_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn last_tick(&self) -> Duration {
        Duration::from_micros(self.last_tick_micros.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn mean_tick_micros(&self) -> u64 {
        let ticks = self.tick_count();
        if ticks == 0 {
            0
        } else {
            self.total_tick_micros.load(Ordering::Relaxed) / ticks
        }
    }

    /// Wall time since the metrics were created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn reset(&self) {
        self.tick_count.store(0, Ordering::Relaxed);
        self.alive_count.store(0, Ordering::Relaxed);
        self.group_count.store(0, Ordering::Relaxed);
        self.last_tick_micros.store(0, Ordering::Relaxed);
        self.total_tick_micros.store(0, Ordering::Relaxed);
    }
}

static LOGGING: Once = Once::new();

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
/// Later calls are no-ops.
pub fn init_logging(default_filter: &str) {
    LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(default_filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .finish(),
        )
        .ok();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = Metrics::new();
        assert_eq!(metrics.tick_count(), 0);
        assert_eq!(metrics.mean_tick_micros(), 0);
    }

    #[test]
    fn test_record_tick() {
        let metrics = Metrics::new();
        metrics.record_tick(Duration::from_micros(300), 100, 3);
        metrics.record_tick(Duration::from_micros(100), 90, 3);
        assert_eq!(metrics.tick_count(), 2);
        assert_eq!(metrics.alive_count(), 90);
        assert_eq!(metrics.mean_tick_micros(), 200);
        assert_eq!(metrics.last_tick(), Duration::from_micros(100));
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging("warn");
        init_logging("debug");
    }
}
