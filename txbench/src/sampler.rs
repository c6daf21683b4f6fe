//! Steady-state sampler.
//!
//! A trial for one batch size is a small state machine:
//!
//! ```text
//! Sampling ──(len >= min && CV <= target)──▶ Converged
//!     │
//!     └────────(len == max)─────────────────▶ MaxReached
//! ```
//!
//! [`evaluate`] is the pure transition function over the series collected so
//! far. [`SteadyStateSampler::sample_with`] drives it with an injected
//! measurement; [`SteadyStateSampler::run_trial`] wires that measurement to a
//! [`Datastore`].

use crate::config::SamplingPolicy;
use crate::executor::insert_batched;
use crate::record::Record;
use crate::stats;
use crate::store::Datastore;
use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Converged,
    MaxReached,
}

/// Append-only throughput samples (rows/sec) for one batch size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSeries {
    samples: Vec<f64>,
}

impl SampleSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, throughput: f64) {
        self.samples.push(throughput);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }
}

impl From<Vec<f64>> for SampleSeries {
    fn from(samples: Vec<f64>) -> Self {
        Self { samples }
    }
}

/// Statistics over an entire series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub mean: f64,
    pub std_dev: f64,
    pub cv: f64,
    pub sample_count: usize,
}

impl SeriesStats {
    pub fn of(series: &SampleSeries) -> Result<Self> {
        let xs = series.as_slice();
        let mean = stats::mean(xs).ok_or_else(|| anyhow!("no samples collected"))?;
        let std_dev = stats::std_dev(xs, mean);
        let cv = stats::coefficient_of_variation(std_dev, mean)?;
        Ok(Self {
            mean,
            std_dev,
            cv,
            sample_count: xs.len(),
        })
    }
}

/// Result of one step of the state machine. `Continue` keeps the trial in
/// `Sampling`; the other two variants are the terminal states.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Keep sampling. Statistics are present once `min_samples` is reached.
    Continue(Option<SeriesStats>),
    Converged(SeriesStats),
    MaxReached(SeriesStats),
}

/// Decide what follows the most recently appended sample.
pub fn evaluate(series: &SampleSeries, policy: &SamplingPolicy) -> Result<Transition> {
    let len = series.len();
    let checked = len >= policy.min_samples;
    let at_ceiling = len >= policy.max_samples;

    if !checked && !at_ceiling {
        return Ok(Transition::Continue(None));
    }

    let stats = SeriesStats::of(series)?;
    if checked && stats.cv <= policy.target_cv {
        Ok(Transition::Converged(stats))
    } else if at_ceiling {
        Ok(Transition::MaxReached(stats))
    } else {
        Ok(Transition::Continue(Some(stats)))
    }
}

/// Aggregate throughput for one batch size.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    pub batch_size: usize,
    pub mean_throughput: f64,
    pub std_dev: f64,
    pub sample_count: usize,
    pub outcome: Outcome,
    pub rows_per_sample: usize,
    /// Rows inserted across every measured sample.
    pub total_rows: usize,
}

impl TrialResult {
    fn new(
        batch_size: usize,
        rows_per_sample: usize,
        stats: SeriesStats,
        outcome: Outcome,
    ) -> Self {
        Self {
            batch_size,
            mean_throughput: stats.mean,
            std_dev: stats.std_dev,
            sample_count: stats.sample_count,
            outcome,
            rows_per_sample,
            total_rows: rows_per_sample * stats.sample_count,
        }
    }

    pub fn cv(&self) -> f64 {
        if self.mean_throughput > 0.0 {
            self.std_dev / self.mean_throughput
        } else {
            0.0
        }
    }

    /// Time the measured rows would take at the mean throughput.
    pub fn estimated_duration(&self) -> Duration {
        if self.mean_throughput > 0.0 {
            Duration::from_secs_f64(self.total_rows as f64 / self.mean_throughput)
        } else {
            Duration::ZERO
        }
    }
}

pub struct SteadyStateSampler {
    policy: SamplingPolicy,
}

impl SteadyStateSampler {
    pub fn new(policy: SamplingPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// Collect samples from `measure` until the series converges or hits the
    /// ceiling. `measure` receives the 1-based sample number and returns a
    /// throughput in rows/sec.
    pub fn sample_with<F>(
        &self,
        batch_size: usize,
        rows_per_sample: usize,
        mut measure: F,
    ) -> Result<TrialResult>
    where
        F: FnMut(usize) -> Result<f64>,
    {
        let mut series = SampleSeries::with_capacity(self.policy.max_samples);

        loop {
            let n = series.len() + 1;
            let throughput = measure(n)?;
            if !(throughput.is_finite() && throughput > 0.0) {
                bail!("sample {n} produced invalid throughput {throughput}");
            }
            series.push(throughput);

            match evaluate(&series, &self.policy)? {
                Transition::Continue(None) => {
                    log::info!("    Sample {n}: {throughput:.0} rows/sec");
                }
                Transition::Continue(Some(stats)) => {
                    log::info!(
                        "    Sample {n}: {throughput:.0} rows/sec (mean: {:.0}, CV: {:.2}%)",
                        stats.mean,
                        stats.cv * 100.0
                    );
                }
                Transition::Converged(stats) => {
                    log::info!(
                        "    Sample {n}: {throughput:.0} rows/sec (mean: {:.0}, CV: {:.2}%)",
                        stats.mean,
                        stats.cv * 100.0
                    );
                    log::info!(
                        "  Reached steady state after {n} samples (CV: {:.2}%)",
                        stats.cv * 100.0
                    );
                    return Ok(TrialResult::new(
                        batch_size,
                        rows_per_sample,
                        stats,
                        Outcome::Converged,
                    ));
                }
                Transition::MaxReached(stats) => {
                    log::warn!(
                        "  Reached max samples ({n}) with CV: {:.2}% (target {:.2}%)",
                        stats.cv * 100.0,
                        self.policy.target_cv * 100.0
                    );
                    return Ok(TrialResult::new(
                        batch_size,
                        rows_per_sample,
                        stats,
                        Outcome::MaxReached,
                    ));
                }
            }
        }
    }

    /// Measure `batch_size` against `store`. Each sample clears the table and
    /// inserts the first `sample_size` records.
    pub fn run_trial<D>(
        &self,
        store: &mut D,
        records: &[Record],
        batch_size: usize,
    ) -> Result<TrialResult>
    where
        D: Datastore + ?Sized,
    {
        let rows = self.policy.sample_size.min(records.len());
        if rows == 0 {
            bail!("no records available to sample");
        }
        let sample_rows = &records[..rows];

        self.sample_with(batch_size, rows, |n| {
            store
                .clear()
                .with_context(|| format!("clearing before sample {n} failed"))?;
            let inserted = insert_batched(store, sample_rows, batch_size)
                .with_context(|| format!("sample {n} failed"))?;
            inserted.throughput().ok_or_else(|| {
                anyhow!("sample {n}: elapsed time is zero, throughput is undefined")
            })
        })
    }
}
