//! Seasonal decomposition
//!
//! Splits a regularly indexed series into trend, repeating seasonal pattern,
//! and residual, with autocorrelation-based period detection when no explicit
//! period is supplied.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Fallback period when autocorrelation shows no local maximum.
const DEFAULT_PERIOD: usize = 12;

/// Decomposition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecompositionMode {
    /// Y(t) = Trend(t) + Seasonal(t) + Residual(t)
    Additive,
    /// Y(t) = Trend(t) * Seasonal(t) * Residual(t)
    Multiplicative,
}

/// Result of seasonal decomposition.
///
/// The four component series are index-aligned with the input. Trend and
/// residual carry NaN at the edges the moving-average window cannot cover;
/// the strength diagnostics exclude those positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionResult {
    /// Original series
    pub observed: Vec<f64>,
    /// Trend component (NaN at window edges)
    pub trend: Vec<f64>,
    /// Repeating seasonal component
    pub seasonal: Vec<f64>,
    /// Residual component (NaN where trend is NaN)
    pub residual: Vec<f64>,
    /// Decomposition mode used
    pub mode: DecompositionMode,
    /// Seasonal period (supplied or detected)
    pub period: usize,
    /// 1 - Var(residual) / Var(trend + residual), in [0, 1]
    pub trend_strength: f64,
    /// 1 - Var(residual) / (Var(seasonal) + Var(residual)), in [0, 1]
    pub seasonal_strength: f64,
    /// Var(residual) / Var(observed), in [0, 1]
    pub noise_ratio: f64,
}

/// Seasonal decomposer with optional explicit period.
pub struct SeasonalDecomposer {
    mode: DecompositionMode,
    period: Option<usize>,
}

impl SeasonalDecomposer {
    /// Create a new decomposer.
    pub fn new(mode: DecompositionMode) -> Self {
        Self { mode, period: None }
    }

    /// Set an explicit seasonal period, skipping auto-detection.
    pub fn with_period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    /// Perform the decomposition.
    pub fn decompose<T: AsRef<[f64]>>(&self, data: T) -> Result<DecompositionResult> {
        let values = data.as_ref();
        if values.is_empty() {
            return Err(Error::EmptyData("cannot decompose an empty series".into()));
        }

        let period = match self.period {
            Some(p) => p,
            None => estimate_period(values),
        };
        if period < 2 {
            return Err(Error::InvalidValue(format!(
                "seasonal period must be at least 2, got {}",
                period
            )));
        }
        if values.len() < 2 * period {
            return Err(Error::InsufficientData(format!(
                "decomposition with period {} requires at least {} observations, got {}",
                period,
                2 * period,
                values.len()
            )));
        }

        if self.mode == DecompositionMode::Multiplicative
            && values.iter().any(|&v| v <= 0.0)
        {
            return Err(Error::InvalidInput(
                "multiplicative decomposition requires positive values".to_string(),
            ));
        }

        let trend = moving_average_trend(values, period);

        let detrended: Vec<f64> = values
            .iter()
            .zip(trend.iter())
            .map(|(&v, &t)| match self.mode {
                DecompositionMode::Additive => v - t,
                DecompositionMode::Multiplicative => {
                    if t.is_finite() && t != 0.0 {
                        v / t
                    } else {
                        f64::NAN
                    }
                }
            })
            .collect();

        let seasonal = seasonal_pattern(&detrended, period, self.mode);

        let residual: Vec<f64> = values
            .iter()
            .zip(trend.iter().zip(seasonal.iter()))
            .map(|(&v, (&t, &s))| match self.mode {
                DecompositionMode::Additive => v - t - s,
                DecompositionMode::Multiplicative => {
                    let denom = t * s;
                    if denom.is_finite() && denom != 0.0 {
                        v / denom
                    } else {
                        f64::NAN
                    }
                }
            })
            .collect();

        let var_residual = finite_variance(&residual);
        let var_seasonal = finite_variance(&seasonal);
        let var_observed = finite_variance(values);

        let seasonal_strength = if var_seasonal + var_residual == 0.0 {
            0.0
        } else {
            (1.0 - var_residual / (var_seasonal + var_residual)).clamp(0.0, 1.0)
        };

        let trend_plus_residual: Vec<f64> = trend
            .iter()
            .zip(residual.iter())
            .map(|(&t, &r)| t + r)
            .collect();
        let var_trend_residual = finite_variance(&trend_plus_residual);
        let trend_strength = if var_trend_residual == 0.0 {
            0.0
        } else {
            (1.0 - var_residual / var_trend_residual).clamp(0.0, 1.0)
        };

        let noise_ratio = if var_observed == 0.0 {
            0.0
        } else {
            (var_residual / var_observed).clamp(0.0, 1.0)
        };

        Ok(DecompositionResult {
            observed: values.to_vec(),
            trend,
            seasonal,
            residual,
            mode: self.mode,
            period,
            trend_strength,
            seasonal_strength,
            noise_ratio,
        })
    }
}

/// Estimate the seasonal period from the autocorrelation function.
///
/// Scans lags up to min(n/2, 40) for the first local maximum (a lag whose
/// autocorrelation exceeds both neighbors). Falls back to 12 when no local
/// maximum exists.
pub fn estimate_period<T: AsRef<[f64]>>(data: T) -> usize {
    let values = data.as_ref();
    let max_lag = std::cmp::min(values.len() / 2, 40);
    if max_lag < 2 {
        return DEFAULT_PERIOD;
    }

    let acf: Vec<f64> = (0..=max_lag)
        .map(|lag| autocorrelation(values, lag))
        .collect();

    for i in 1..max_lag {
        if acf[i] > acf[i - 1] && acf[i] > acf[i + 1] {
            return i;
        }
    }

    DEFAULT_PERIOD
}

/// Autocorrelation at a given lag, normalized by total variance.
fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    if lag >= values.len() {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;

    let mut numerator = 0.0;
    for i in 0..values.len() - lag {
        numerator += (values[i] - mean) * (values[i + lag] - mean);
    }

    let denominator: f64 = values.iter().map(|&v| (v - mean).powi(2)).sum();

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Centered moving-average trend with NaN at the uncovered edges.
///
/// Odd periods use a plain window of `period` points; even periods use the
/// classical 2 x period average with half weights at both window ends.
fn moving_average_trend(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let mut trend = vec![f64::NAN; n];

    for i in half..n.saturating_sub(half) {
        let t = if period % 2 == 1 {
            values[i - half..=i + half].iter().sum::<f64>() / period as f64
        } else {
            let mut sum = 0.5 * values[i - half] + 0.5 * values[i + half];
            sum += values[i - half + 1..i + half].iter().sum::<f64>();
            sum / period as f64
        };
        trend[i] = t;
    }

    trend
}

/// Average the detrended series per seasonal phase and tile the pattern.
fn seasonal_pattern(detrended: &[f64], period: usize, mode: DecompositionMode) -> Vec<f64> {
    let mut pattern = vec![0.0; period];
    let mut counts = vec![0usize; period];

    for (i, &v) in detrended.iter().enumerate() {
        if v.is_finite() {
            pattern[i % period] += v;
            counts[i % period] += 1;
        }
    }

    for (p, &c) in pattern.iter_mut().zip(counts.iter()) {
        if c > 0 {
            *p /= c as f64;
        } else if mode == DecompositionMode::Multiplicative {
            *p = 1.0;
        }
    }

    // Center the pattern: zero-mean for additive, unit-mean for multiplicative
    match mode {
        DecompositionMode::Additive => {
            let mean = pattern.iter().sum::<f64>() / period as f64;
            for p in &mut pattern {
                *p -= mean;
            }
        }
        DecompositionMode::Multiplicative => {
            let mean = pattern.iter().sum::<f64>() / period as f64;
            if mean > 0.0 {
                for p in &mut pattern {
                    *p /= mean;
                }
            }
        }
    }

    (0..detrended.len()).map(|i| pattern[i % period]).collect()
}

/// Population variance over the finite entries of a series.
fn finite_variance(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return 0.0;
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    finite.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / finite.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sinusoid(period: usize, cycles: usize) -> Vec<f64> {
        (0..period * cycles)
            .map(|i| (2.0 * PI * i as f64 / period as f64).sin())
            .collect()
    }

    #[test]
    fn test_estimate_period_exact_seven() {
        let values = sinusoid(7, 6);
        assert_eq!(estimate_period(&values), 7);
    }

    #[test]
    fn test_estimate_period_defaults_without_local_max() {
        // Monotone data has a monotonically decaying autocorrelation
        let values: Vec<f64> = (0..30).map(|i| i as f64).collect();
        assert_eq!(estimate_period(&values), 12);
    }

    #[test]
    fn test_pure_sinusoid_decomposes_to_seasonal() {
        let values = sinusoid(7, 6);
        let result = SeasonalDecomposer::new(DecompositionMode::Additive)
            .with_period(7)
            .decompose(&values)
            .unwrap();

        assert_eq!(result.period, 7);
        assert_eq!(result.trend.len(), values.len());

        // Zero noise: residual vanishes wherever the trend window covers
        for &r in result.residual.iter().filter(|r| r.is_finite()) {
            assert!(r.abs() < 1e-9, "residual {} not near zero", r);
        }
        assert!(result.seasonal_strength > 0.999);
        assert!(result.noise_ratio < 1e-9);
    }

    #[test]
    fn test_detected_period_used_when_not_supplied() {
        let values = sinusoid(7, 6);
        let result = SeasonalDecomposer::new(DecompositionMode::Additive)
            .decompose(&values)
            .unwrap();
        assert_eq!(result.period, 7);
    }

    #[test]
    fn test_trend_strength_on_trending_series() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                10.0 + 0.5 * i as f64 + (2.0 * PI * i as f64 / 12.0).sin()
            })
            .collect();
        let result = SeasonalDecomposer::new(DecompositionMode::Additive)
            .with_period(12)
            .decompose(&values)
            .unwrap();

        assert!(result.trend_strength > 0.9);
        assert!((0.0..=1.0).contains(&result.trend_strength));
        assert!((0.0..=1.0).contains(&result.seasonal_strength));
    }

    #[test]
    fn test_multiplicative_decomposition() {
        let values: Vec<f64> = (0..48)
            .map(|i| {
                (10.0 + 0.2 * i as f64)
                    * (1.0 + 0.3 * (2.0 * PI * i as f64 / 12.0).sin())
            })
            .collect();
        let result = SeasonalDecomposer::new(DecompositionMode::Multiplicative)
            .with_period(12)
            .decompose(&values)
            .unwrap();

        assert_eq!(result.mode, DecompositionMode::Multiplicative);
        // Residual hovers around 1 in multiplicative mode
        for &r in result.residual.iter().filter(|r| r.is_finite()) {
            assert!((r - 1.0).abs() < 0.25, "residual {} far from 1", r);
        }
    }

    #[test]
    fn test_multiplicative_rejects_non_positive() {
        let values = vec![1.0, 2.0, 0.0, 3.0, 1.0, 2.0, 1.0, 3.0];
        let result = SeasonalDecomposer::new(DecompositionMode::Multiplicative)
            .with_period(4)
            .decompose(&values);
        assert!(result.is_err());
    }

    #[test]
    fn test_too_short_for_period_is_error() {
        let values = vec![1.0; 10];
        let result = SeasonalDecomposer::new(DecompositionMode::Additive)
            .with_period(7)
            .decompose(&values);
        assert!(result.is_err());
    }

    #[test]
    fn test_constant_series_zero_strengths() {
        let values = vec![5.0; 24];
        let result = SeasonalDecomposer::new(DecompositionMode::Additive)
            .with_period(4)
            .decompose(&values)
            .unwrap();

        assert_eq!(result.seasonal_strength, 0.0);
        assert_eq!(result.trend_strength, 0.0);
        assert_eq!(result.noise_ratio, 0.0);
    }

    #[test]
    fn test_even_period_trend_window() {
        let values = sinusoid(12, 4);
        let result = SeasonalDecomposer::new(DecompositionMode::Additive)
            .with_period(12)
            .decompose(&values)
            .unwrap();

        // Edges outside the centered window are NaN
        assert!(result.trend[0].is_nan());
        assert!(result.trend[values.len() - 1].is_nan());
        assert!(result.trend[6].is_finite());
    }
}
