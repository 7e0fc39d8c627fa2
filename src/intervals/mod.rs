//! Confidence and prediction interval estimation
//!
//! Frequentist and bootstrap confidence intervals for a series mean, plus
//! prediction intervals around point forecasts given a residual-derived
//! standard error.

use crate::core::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Default number of bootstrap resamples.
pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 1000;

/// A two-sided interval at a given confidence level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
    /// Confidence level the interval was computed at (0 < level < 1)
    pub level: f64,
}

/// Prediction intervals for one point forecast across several confidence levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastIntervals {
    /// The point forecast the intervals are centered on
    pub forecast: f64,
    /// One interval per requested confidence level, in request order
    pub intervals: Vec<ConfidenceInterval>,
}

fn check_level(level: f64) -> Result<()> {
    if !(level > 0.0 && level < 1.0) {
        return Err(Error::InvalidValue(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }
    Ok(())
}

fn t_quantile(p: f64, df: usize) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| Error::Computation(format!("t-distribution: {}", e)))?;
    Ok(dist.inverse_cdf(p))
}

fn z_quantile(p: f64) -> Result<f64> {
    let dist = Normal::new(0.0, 1.0)
        .map_err(|e| Error::Computation(format!("normal distribution: {}", e)))?;
    Ok(dist.inverse_cdf(p))
}

/// Frequentist confidence interval for the mean of a series.
///
/// Uses the t-quantile at (1 + level) / 2 with n - 1 degrees of freedom and the
/// standard error of the mean. Requires at least 2 observations.
pub fn mean_confidence_interval<T: AsRef<[f64]>>(
    data: T,
    level: f64,
) -> Result<ConfidenceInterval> {
    let data = data.as_ref();
    check_level(level)?;
    let n = data.len();
    if n < 2 {
        return Err(Error::InsufficientData(
            "confidence interval requires at least 2 observations".into(),
        ));
    }

    let mean = data.iter().sum::<f64>() / n as f64;
    let variance =
        data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_err = (variance / n as f64).sqrt();

    let t = t_quantile((1.0 + level) / 2.0, n - 1)?;
    let margin = t * std_err;

    Ok(ConfidenceInterval {
        lower: mean - margin,
        upper: mean + margin,
        level,
    })
}

/// Bootstrap confidence interval for the mean of a series.
///
/// Draws `n_bootstrap` resamples of size n with replacement, computes the mean
/// of each, and takes the empirical (alpha/2, 1 - alpha/2) percentiles of the
/// resample-mean distribution. The random source is caller-supplied so results
/// reproduce exactly under a fixed seed.
///
/// # Example
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use tsdiag::intervals;
///
/// let data = vec![4.0, 5.0, 6.0, 5.5, 4.5];
/// let mut rng = StdRng::seed_from_u64(42);
/// let ci = intervals::bootstrap_confidence_interval(&data, 0.95, 1000, &mut rng).unwrap();
/// assert!(ci.lower <= ci.upper);
/// ```
pub fn bootstrap_confidence_interval<T: AsRef<[f64]>, R: Rng>(
    data: T,
    level: f64,
    n_bootstrap: usize,
    rng: &mut R,
) -> Result<ConfidenceInterval> {
    let data = data.as_ref();
    check_level(level)?;
    if data.is_empty() {
        return Err(Error::EmptyData("bootstrap requires data".into()));
    }
    if n_bootstrap == 0 {
        return Err(Error::InvalidValue(
            "number of bootstrap samples must be positive".into(),
        ));
    }

    let n = data.len();
    let mut means = Vec::with_capacity(n_bootstrap);
    for _ in 0..n_bootstrap {
        let mut sum = 0.0;
        for _ in 0..n {
            sum += data[rng.random_range(0..n)];
        }
        means.push(sum / n as f64);
    }

    means.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let alpha = 1.0 - level;
    Ok(ConfidenceInterval {
        lower: percentile(&means, alpha / 2.0),
        upper: percentile(&means, 1.0 - alpha / 2.0),
        level,
    })
}

/// Prediction interval around a single point forecast.
///
/// The margin is the z-quantile (or t-quantile when `df` is given) at
/// (1 + level) / 2 times the standard error.
pub fn prediction_interval(
    forecast: f64,
    std_error: f64,
    level: f64,
    df: Option<usize>,
) -> Result<ConfidenceInterval> {
    check_level(level)?;
    let p = (1.0 + level) / 2.0;
    let q = match df {
        Some(0) => {
            return Err(Error::InvalidValue(
                "degrees of freedom must be at least 1".into(),
            ))
        }
        Some(df) => t_quantile(p, df)?,
        None => z_quantile(p)?,
    };
    let margin = q * std_error;

    Ok(ConfidenceInterval {
        lower: forecast - margin,
        upper: forecast + margin,
        level,
    })
}

/// Batch prediction intervals for a list of point forecasts.
///
/// A single standard error is derived from the residuals series (sample
/// standard deviation) and applied at each requested confidence level to every
/// forecast.
pub fn prediction_intervals<T: AsRef<[f64]>, U: AsRef<[f64]>>(
    forecasts: T,
    residuals: U,
    levels: &[f64],
) -> Result<Vec<ForecastIntervals>> {
    let forecasts = forecasts.as_ref();
    let residuals = residuals.as_ref();
    for &level in levels {
        check_level(level)?;
    }
    if residuals.len() < 2 {
        return Err(Error::InsufficientData(
            "residual standard error requires at least 2 residuals".into(),
        ));
    }

    let n = residuals.len();
    let mean = residuals.iter().sum::<f64>() / n as f64;
    let std_error =
        (residuals.iter().map(|&r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt();

    forecasts
        .iter()
        .map(|&forecast| {
            let intervals = levels
                .iter()
                .map(|&level| prediction_interval(forecast, std_error, level, None))
                .collect::<Result<Vec<_>>>()?;
            Ok(ForecastIntervals {
                forecast,
                intervals,
            })
        })
        .collect()
}

/// Interpolated percentile of pre-sorted data, p in [0, 1].
pub(crate) fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return f64::NAN;
    }

    let n = sorted_data.len();
    let idx = p * (n - 1) as f64;
    let idx_floor = idx.floor() as usize;
    let idx_ceil = idx.ceil() as usize;

    if idx_floor == idx_ceil {
        return sorted_data[idx_floor];
    }

    let weight_ceil = idx - idx_floor as f64;
    let weight_floor = 1.0 - weight_ceil;

    sorted_data[idx_floor] * weight_floor + sorted_data[idx_ceil] * weight_ceil
}
