//! Summary statistics over throughput samples.

use anyhow::{bail, Result};

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Population standard deviation (divides by `n`). Zero for an empty or
/// single-element slice.
pub fn std_dev(samples: &[f64], mean: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples
        .iter()
        .map(|x| {
            let diff = x - mean;
            diff * diff
        })
        .sum();
    (sum_squares / samples.len() as f64).sqrt()
}

/// Coefficient of variation. A non-positive or non-finite mean cannot come
/// from successful inserts and is reported as an error.
pub fn coefficient_of_variation(std_dev: f64, mean: f64) -> Result<f64> {
    if mean == 0.0 {
        bail!("mean throughput is zero; coefficient of variation is undefined");
    }
    if !(mean.is_finite() && mean > 0.0) {
        bail!("mean throughput {mean} is not a positive finite number");
    }
    Ok(std_dev / mean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn single_sample_has_zero_spread() {
        let xs = [1234.5];
        let m = mean(&xs).unwrap();
        assert_eq!(m, 1234.5);
        assert_eq!(std_dev(&xs, m), 0.0);
    }

    #[test]
    fn population_formula_divides_by_n() {
        // Population variance of [2,4,4,4,5,5,7,9] is exactly 4.
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&xs).unwrap();
        assert_eq!(m, 5.0);
        assert!((std_dev(&xs, m) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn std_dev_is_zero_only_for_identical_samples() {
        let series: [&[f64]; 5] = [
            &[100.0, 100.0, 100.0],
            &[100.0, 100.0, 100.000001],
            &[1.0, 2.0],
            &[5e6, 4e6, 6e6, 5e6],
            &[0.5],
        ];
        for xs in series {
            let m = mean(xs).unwrap();
            let sd = std_dev(xs, m);
            assert!(sd >= 0.0);
            let identical = xs.windows(2).all(|w| w[0] == w[1]);
            assert_eq!(sd == 0.0, identical, "series {xs:?} gave {sd}");
        }
    }

    #[test]
    fn cv_is_relative_spread() {
        let cv = coefficient_of_variation(5.0, 100.0).unwrap();
        assert!((cv - 0.05).abs() < 1e-12);
    }

    #[test]
    fn zero_mean_is_an_error() {
        let err = coefficient_of_variation(0.0, 0.0).unwrap_err();
        assert!(err.to_string().contains("mean throughput is zero"));
        assert!(coefficient_of_variation(1.0, f64::NAN).is_err());
        assert!(coefficient_of_variation(1.0, -3.0).is_err());
    }
}
