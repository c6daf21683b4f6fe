//! Transaction Batch Size Throughput Benchmark
//!
//! Measures sustained SQLite insert throughput while varying how many rows
//! are committed per transaction. Each batch size is warmed up, then sampled
//! until the coefficient of variation of the observed throughput drops below
//! a target or a sample ceiling is reached.
//!
//! Run the benchmark: `DATABASE_URL=bench.db cargo run --release -p txbench`
//! Run tests: `cargo test --workspace`

pub mod config;
pub mod executor;
pub mod record;
pub mod report;
pub mod runner;
pub mod sampler;
pub mod stats;
pub mod store;
pub mod warmup;
