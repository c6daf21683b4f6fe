//! Runs warmup and steady-state sampling for every configured batch size.

use crate::config::BenchConfig;
use crate::record::Record;
use crate::sampler::{SteadyStateSampler, TrialResult};
use crate::store::Datastore;
use crate::warmup::run_warmup;
use anyhow::{Context, Result};

/// Benchmark each batch size in configuration order. The first failure
/// aborts the run.
pub fn run_benchmark<D>(
    store: &mut D,
    records: &[Record],
    config: &BenchConfig,
) -> Result<Vec<TrialResult>>
where
    D: Datastore + ?Sized,
{
    config.validate().context("invalid configuration")?;
    let sampler = SteadyStateSampler::new(config.policy)?;

    let mut results = Vec::with_capacity(config.batch_sizes.len());
    for &batch_size in &config.batch_sizes {
        log::info!("Testing batch size: {batch_size}");

        run_warmup(store, records, batch_size, config.warmup_cycles)
            .with_context(|| format!("warmup failed for batch size {batch_size}"))?;

        let result = sampler
            .run_trial(store, records, batch_size)
            .with_context(|| format!("sampling failed for batch size {batch_size}"))?;

        log::info!(
            "  Throughput: {:.0} ± {:.0} rows/sec ({} samples, {:.2?} estimated for {} rows)",
            result.mean_throughput,
            result.std_dev,
            result.sample_count,
            result.estimated_duration(),
            result.total_rows
        );
        results.push(result);
    }

    Ok(results)
}
