//! Run configuration.
//!
//! Everything that used to be a process-wide constant lives in
//! [`BenchConfig`]. Values are read from the environment (after an optional
//! `.env` file has been loaded by `main`) and validated before any database
//! work starts.

use anyhow::{bail, Context, Result};
use bench_core::env_config::{parse_list_or, parse_or, require, resolve_log_file, resolve_log_level};
use log::LevelFilter;
use std::path::Path;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

const DEFAULT_BATCH_SIZES: [usize; 6] = [100, 1_000, 10_000, 100_000, 1_000_000, 10_000_000];
const DEFAULT_TOTAL_ROWS: usize = 10_000_000;
const DEFAULT_WARMUP_CYCLES: u32 = 2;
const DEFAULT_LOG_FILE: &str = "txbench.log";

/// Stopping rule for the steady-state sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPolicy {
    /// Rows inserted per sample, capped to the generated data.
    pub sample_size: usize,
    /// Coefficient of variation at or below which the series is stable.
    pub target_cv: f64,
    /// Samples collected before convergence is checked.
    pub min_samples: usize,
    /// Hard ceiling on samples per batch size.
    pub max_samples: usize,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            sample_size: 100_000,
            target_cv: 0.05,
            min_samples: 5,
            max_samples: 20,
        }
    }
}

impl SamplingPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.sample_size == 0 {
            bail!("sample size must be positive");
        }
        if !(self.target_cv > 0.0 && self.target_cv < 1.0) {
            bail!("target CV {} must be in (0, 1)", self.target_cv);
        }
        if self.min_samples == 0 {
            bail!("minimum sample count must be positive");
        }
        if self.max_samples < self.min_samples {
            bail!(
                "maximum sample count {} is below the minimum {}",
                self.max_samples,
                self.min_samples
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Batch sizes to test, in order.
    pub batch_sizes: Vec<usize>,
    /// Number of synthetic rows generated up front.
    pub total_rows: usize,
    /// Discarded insert cycles before each batch size is measured.
    pub warmup_cycles: u32,
    pub policy: SamplingPolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            batch_sizes: DEFAULT_BATCH_SIZES.to_vec(),
            total_rows: DEFAULT_TOTAL_ROWS,
            warmup_cycles: DEFAULT_WARMUP_CYCLES,
            policy: SamplingPolicy::default(),
        }
    }
}

impl BenchConfig {
    /// Build a configuration from `lookup`, falling back to the defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let default_policy = defaults.policy;

        let config = Self {
            batch_sizes: parse_list_or(lookup, "BENCH_BATCH_SIZES", defaults.batch_sizes)?,
            total_rows: parse_or(lookup, "BENCH_TOTAL_ROWS", defaults.total_rows)?,
            warmup_cycles: parse_or(lookup, "BENCH_WARMUP_CYCLES", defaults.warmup_cycles)?,
            policy: SamplingPolicy {
                sample_size: parse_or(lookup, "BENCH_SAMPLE_SIZE", default_policy.sample_size)?,
                target_cv: parse_or(lookup, "BENCH_TARGET_CV", default_policy.target_cv)?,
                min_samples: parse_or(lookup, "BENCH_MIN_SAMPLES", default_policy.min_samples)?,
                max_samples: parse_or(lookup, "BENCH_MAX_SAMPLES", default_policy.max_samples)?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_sizes.is_empty() {
            bail!("at least one batch size is required");
        }
        if let Some(pos) = self.batch_sizes.iter().position(|&b| b == 0) {
            bail!("batch size at position {pos} is zero");
        }
        if self.total_rows == 0 {
            bail!("total row count must be positive");
        }
        self.policy.validate()
    }
}

/// Load `.env` from the working directory. A missing file is fine; a file
/// that exists but cannot be read or parsed is a configuration error.
pub fn load_dotenv() -> Result<()> {
    accept_missing(dotenvy::dotenv(), Path::new(".env"))
}

/// Load the env file at `path` with the same rules as [`load_dotenv`].
pub fn load_env_file(path: &Path) -> Result<()> {
    accept_missing(dotenvy::from_path(path), path)
}

fn accept_missing<T>(result: dotenvy::Result<T>, path: &Path) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to load {}", path.display())),
    }
}

/// Connection string for the target database.
pub fn database_url<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    require(lookup, DATABASE_URL_VAR)
}

/// Logger settings: level and optional file.
pub fn log_settings<F>(lookup: &F) -> (LevelFilter, Option<String>)
where
    F: Fn(&str) -> Option<String>,
{
    (
        resolve_log_level(lookup, "BENCH_LOG_LEVEL", LevelFilter::Info),
        resolve_log_file(lookup, "BENCH_LOG_FILE", DEFAULT_LOG_FILE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_run() {
        let config = BenchConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config, BenchConfig::default());
        assert_eq!(
            config.batch_sizes,
            vec![100, 1_000, 10_000, 100_000, 1_000_000, 10_000_000]
        );
        assert_eq!(config.policy.min_samples, 5);
        assert_eq!(config.policy.max_samples, 20);
        assert_eq!(config.policy.target_cv, 0.05);
        assert_eq!(config.policy.sample_size, 100_000);
        assert_eq!(config.warmup_cycles, 2);
    }

    #[test]
    fn overrides_are_applied() {
        let lookup = lookup_from(&[
            ("BENCH_BATCH_SIZES", "10, 20"),
            ("BENCH_TOTAL_ROWS", "500"),
            ("BENCH_SAMPLE_SIZE", "1000"),
            ("BENCH_TARGET_CV", "0.1"),
            ("BENCH_MIN_SAMPLES", "2"),
            ("BENCH_MAX_SAMPLES", "4"),
            ("BENCH_WARMUP_CYCLES", "0"),
        ]);
        let config = BenchConfig::from_lookup(&lookup).unwrap();
        assert_eq!(config.batch_sizes, vec![10, 20]);
        assert_eq!(config.warmup_cycles, 0);
        assert_eq!(config.policy.max_samples, 4);
        assert_eq!(config.policy.sample_size, 1_000);
        assert_eq!(config.total_rows, 500);
    }

    #[test]
    fn rejects_invalid_policies() {
        for pairs in [
            [("BENCH_TARGET_CV", "1.5")],
            [("BENCH_TARGET_CV", "0")],
            [("BENCH_MIN_SAMPLES", "0")],
            [("BENCH_MAX_SAMPLES", "3")],
            [("BENCH_SAMPLE_SIZE", "0")],
            [("BENCH_BATCH_SIZES", "100,0")],
            [("BENCH_BATCH_SIZES", " , ")],
            [("BENCH_TOTAL_ROWS", "-5")],
        ] {
            assert!(
                BenchConfig::from_lookup(&lookup_from(&pairs)).is_err(),
                "{pairs:?} should be rejected"
            );
        }
    }

    #[test]
    fn database_url_is_required() {
        let err = database_url(&lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
        let url = database_url(&lookup_from(&[("DATABASE_URL", "bench.db")])).unwrap();
        assert_eq!(url, "bench.db");
    }

    #[test]
    fn log_settings_defaults() {
        let (level, file) = log_settings(&lookup_from(&[]));
        assert_eq!(level, LevelFilter::Info);
        assert_eq!(file.as_deref(), Some("txbench.log"));
    }

    fn temp_env_file(name: &str, contents: &str) -> std::path::PathBuf {
        let file_name = format!("txbench-{}-{name}.env", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        let path = std::env::temp_dir().join("txbench-no-such-dir/.env");
        load_env_file(&path).unwrap();
    }

    #[test]
    fn malformed_env_file_is_an_error() {
        let path = temp_env_file("malformed", "TXBENCH_TEST_BROKEN=\"unterminated\n");
        let err = load_env_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{err:#}").contains("failed to load"));
    }

    #[test]
    fn valid_env_file_loads() {
        let path = temp_env_file("valid", "TXBENCH_TEST_LOADED=yes\n");
        load_env_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(std::env::var("TXBENCH_TEST_LOADED").as_deref(), Ok("yes"));
    }
}
