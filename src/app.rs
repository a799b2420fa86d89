use crate::config::UploadConfig;
use crate::metrics::UploadMetricsSnapshot;
use crate::scheduler::UploadScheduler;
use crate::snapshot::ProngCache;
use anyhow::{Context, Result};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEMO_ROUNDS: usize = 5;
const DEMO_FRAME_INTERVAL: Duration = Duration::from_millis(250);

/// Binary entrypoint: `prong_uplink [config.json]`.
pub fn run() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();

    let config = match env::args().nth(1) {
        Some(path) => UploadConfig::load_from_file(&path)
            .with_context(|| format!("loading upload config from {path}"))?,
        None => UploadConfig::default(),
    };
    let metrics = run_demo(config, DEMO_ROUNDS, DEMO_FRAME_INTERVAL)?;
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

/// Drives a scheduler backed by the diagnostic backend with synthetic frame
/// timings, then stops it and returns the final counters.
pub fn run_demo(
    config: UploadConfig,
    rounds: usize,
    frame_interval: Duration,
) -> Result<UploadMetricsSnapshot> {
    let scheduler = UploadScheduler::builder()
        .config(config)
        .spawn()
        .context("starting upload scheduler")?;
    let defaults = scheduler
        .fetch_default_fidelity_params(Duration::from_secs(1))
        .context("bootstrapping default fidelity params")?;
    scheduler.set_fidelity_params_id(defaults.id);

    for round in 0..rounds {
        if !scheduler.submit(Arc::new(synthetic_cache(round as u64))) {
            tracing::debug!(round, "upload slot busy, frame histograms dropped");
        }
        thread::sleep(frame_interval);
    }
    // Give the worker one tick to pick up the final submission.
    thread::sleep(scheduler.tick_interval());
    scheduler.stop();
    Ok(scheduler.metrics().snapshot())
}

fn synthetic_cache(round: u64) -> ProngCache {
    let mut builder = ProngCache::builder().buckets(16, 2_000);
    for frame in 0..60u64 {
        let jitter = (frame * 7 + round * 13) % 9;
        builder.record(0, round, 16_000 + jitter * 500);
        builder.record(1, round, 4_000 + jitter * 250);
    }
    builder.build()
}
