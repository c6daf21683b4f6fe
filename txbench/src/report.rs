//! Report module: renders per-batch-size throughput as a scaled bar chart.

use crate::sampler::{Outcome, TrialResult};
use std::fmt::Write;

pub const BAR_WIDTH: usize = 50;

/// Bar length for `value`, scaled so `max` fills [`BAR_WIDTH`].
pub fn bar_length(value: f64, max: f64) -> usize {
    if max <= 0.0 || !value.is_finite() {
        return 0;
    }
    (((value / max) * BAR_WIDTH as f64) as usize).min(BAR_WIDTH)
}

pub fn render(results: &[TrialResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Throughput Results ===");
    let _ = writeln!(out);

    let max_throughput = results
        .iter()
        .map(|r| r.mean_throughput)
        .fold(0.0_f64, f64::max);

    for r in results {
        let bar = "█".repeat(bar_length(r.mean_throughput, max_throughput));
        let marker = match r.outcome {
            Outcome::Converged => "",
            Outcome::MaxReached => " [max samples]",
        };
        let _ = writeln!(
            out,
            "{:<11} | {:<width$} | {:>10.0} ± {:>6.0} rows/sec (CV: {:>4.1}%, n={}){}",
            r.batch_size,
            bar,
            r.mean_throughput,
            r.std_dev,
            r.cv() * 100.0,
            r.sample_count,
            marker,
            width = BAR_WIDTH,
        );
    }

    out
}

pub fn print_report(results: &[TrialResult]) {
    println!();
    print!("{}", render(results));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(batch_size: usize, mean: f64, std_dev: f64, outcome: Outcome) -> TrialResult {
        TrialResult {
            batch_size,
            mean_throughput: mean,
            std_dev,
            sample_count: 5,
            outcome,
            rows_per_sample: 100,
            total_rows: 500,
        }
    }

    #[test]
    fn bars_scale_to_fastest_result() {
        assert_eq!(bar_length(100.0, 100.0), BAR_WIDTH);
        assert_eq!(bar_length(50.0, 100.0), 25);
        assert_eq!(bar_length(0.0, 0.0), 0);
    }

    #[test]
    fn renders_one_row_per_result() {
        let results = vec![
            result(100, 5_000.0, 100.0, Outcome::Converged),
            result(1_000, 10_000.0, 800.0, Outcome::MaxReached),
        ];
        let text = render(&results);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== Throughput Results ===");
        assert_eq!(lines.len(), 4);

        assert!(lines[2].starts_with("100         | "));
        assert_eq!(lines[2].matches('█').count(), 25);
        assert!(lines[2].contains("5000 ±    100 rows/sec (CV:  2.0%, n=5)"));
        assert!(!lines[2].contains("[max samples]"));

        assert_eq!(lines[3].matches('█').count(), BAR_WIDTH);
        assert!(lines[3].contains("(CV:  8.0%, n=5) [max samples]"));
    }

    #[test]
    fn empty_results_render_header_only() {
        let text = render(&[]);
        assert_eq!(text.lines().count(), 2);
    }
}
