//! Point-forecast accuracy metrics
//!
//! This module evaluates a forecast series against the realized actuals and
//! returns the standard error metrics used in demand-forecast reporting.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Full set of point-forecast error metrics.
///
/// Metrics with an all-zero denominator (MAPE/WAPE/SMAPE on an all-zero actual
/// series) are reported as NaN rather than raising; callers must check for
/// non-finite values before aggregating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean absolute percentage error, over positions where actual != 0
    pub mape: f64,
    /// Weighted absolute percentage error
    pub wape: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean signed error (positive means systematic over-forecasting)
    pub bias: f64,
    /// Symmetric mean absolute percentage error
    pub smape: f64,
    /// Mean squared error
    pub mse: f64,
}

/// Compute all accuracy metrics for an index-aligned actual/forecast pair.
///
/// # Example
/// ```rust
/// use tsdiag::accuracy;
///
/// let actual = vec![100.0, 110.0, 90.0, 105.0];
/// let forecast = vec![95.0, 115.0, 85.0, 100.0];
/// let metrics = accuracy::evaluate_forecast(&actual, &forecast).unwrap();
/// assert!((metrics.mae - 5.0).abs() < 1e-12);
/// ```
pub fn evaluate_forecast<T: AsRef<[f64]>, U: AsRef<[f64]>>(
    actual: T,
    forecast: U,
) -> Result<ForecastAccuracy> {
    evaluate_forecast_impl(actual.as_ref(), forecast.as_ref())
}

fn evaluate_forecast_impl(actual: &[f64], forecast: &[f64]) -> Result<ForecastAccuracy> {
    if actual.is_empty() {
        return Err(Error::EmptyData(
            "accuracy metrics require at least one observation".into(),
        ));
    }
    if actual.len() != forecast.len() {
        return Err(Error::LengthMismatch {
            expected: actual.len(),
            actual: forecast.len(),
        });
    }

    let n = actual.len() as f64;

    let mut abs_err_sum = 0.0;
    let mut sq_err_sum = 0.0;
    let mut signed_err_sum = 0.0;
    let mut abs_actual_sum = 0.0;

    // Masked accumulators: MAPE skips zero actuals, SMAPE skips zero denominators
    let mut mape_sum = 0.0;
    let mut mape_count = 0usize;
    let mut smape_sum = 0.0;
    let mut smape_count = 0usize;

    for (&a, &f) in actual.iter().zip(forecast.iter()) {
        let err = a - f;
        abs_err_sum += err.abs();
        sq_err_sum += err * err;
        signed_err_sum += f - a;
        abs_actual_sum += a.abs();

        if a != 0.0 {
            mape_sum += err.abs() / a.abs();
            mape_count += 1;
        }

        let smape_denom = (a.abs() + f.abs()) / 2.0;
        if smape_denom != 0.0 {
            smape_sum += err.abs() / smape_denom;
            smape_count += 1;
        }
    }

    let mape = if mape_count > 0 {
        mape_sum / mape_count as f64 * 100.0
    } else {
        f64::NAN
    };

    let wape = if abs_actual_sum != 0.0 {
        abs_err_sum / abs_actual_sum * 100.0
    } else {
        f64::NAN
    };

    let smape = if smape_count > 0 {
        smape_sum / smape_count as f64 * 100.0
    } else {
        f64::NAN
    };

    let mse = sq_err_sum / n;

    Ok(ForecastAccuracy {
        mape,
        wape,
        mae: abs_err_sum / n,
        rmse: mse.sqrt(),
        bias: signed_err_sum / n,
        smape,
        mse,
    })
}
