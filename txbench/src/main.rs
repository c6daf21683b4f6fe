//! Benchmark runner that prints the throughput histogram.
//!
//! Settings come from the environment, optionally seeded by a `.env` file in
//! the working directory:
//!
//!   DATABASE_URL=bench.db cargo run --release -p txbench
//!   BENCH_BATCH_SIZES=100,1000 BENCH_TOTAL_ROWS=100000 cargo run --release -p txbench

use anyhow::{Context, Result};
use std::process;
use txbench::config::{self, BenchConfig};
use txbench::record::generate;
use txbench::report::print_report;
use txbench::runner::run_benchmark;
use txbench::store::sqlite::SqliteStore;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn run<F>(lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let config = BenchConfig::from_lookup(lookup).context("invalid configuration")?;
    let database_url = config::database_url(lookup)?;

    let mut store = SqliteStore::open(&database_url).context("unable to connect to database")?;
    store.bootstrap()?;

    log::info!("Generating test data...");
    let records = generate(config.total_rows);
    log::info!("Generated {} rows", records.len());

    let results = run_benchmark(&mut store, &records, &config)?;
    print_report(&results);
    Ok(())
}

fn main() {
    // Settings in .env feed the logger too, so load it before anything else.
    if let Err(e) = config::load_dotenv() {
        eprintln!("Invalid configuration: {e:#}. Exiting.");
        process::exit(1);
    }

    let (log_level, log_file) = config::log_settings(&env_lookup);
    bench_core::initialize_logger(log_level, log_file.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {e:#}. Exiting.");
        process::exit(1);
    });

    log::info!(
        "txbench starting (level={}, logfile={})",
        log_level,
        log_file.as_deref().unwrap_or("none")
    );

    if let Err(e) = run(&env_lookup) {
        log::error!("Benchmark aborted: {e:#}");
        process::exit(1);
    }
}
