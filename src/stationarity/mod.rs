//! Stationarity testing
//!
//! Augmented Dickey-Fuller and KPSS tests with a combined conservative
//! verdict. The two tests have opposite null hypotheses: ADF treats a unit
//! root as the null (small p-value means stationary), KPSS treats
//! stationarity as the null (large p-value means stationary).

use crate::core::error::{Error, Result};
use log::debug;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Significance threshold shared by both sub-tests.
const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// MacKinnon critical-value anchors for the ADF statistic (constant-only case),
/// plus a far anchor for interpolation toward the non-rejection region.
const ADF_ANCHORS: [(f64, f64); 4] = [(-3.43, 0.01), (-2.86, 0.05), (-2.57, 0.10), (0.0, 0.90)];

/// KPSS critical-value anchors (level-stationarity case).
const KPSS_ANCHORS: [(f64, f64); 3] = [(0.347, 0.10), (0.463, 0.05), (0.739, 0.01)];

/// Augmented Dickey-Fuller test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdfResult {
    /// t-statistic of the lagged-level coefficient
    pub statistic: f64,
    /// Interpolated p-value
    pub p_value: f64,
    /// Number of lagged differences included in the regression
    pub lags: usize,
    /// Whether the unit-root null is rejected (p < 0.05)
    pub is_stationary: bool,
}

/// KPSS test result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpssResult {
    /// KPSS statistic
    pub statistic: f64,
    /// Interpolated p-value, clamped to [0.01, 0.10]
    pub p_value: f64,
    /// Bandwidth used for the long-run variance estimate
    pub lags: usize,
    /// Whether the stationarity null stands (p > 0.05)
    pub is_stationary: bool,
}

/// Combined verdict from both tests.
///
/// The tests may legitimately disagree; `is_stationary` is true only when both
/// point the same way, a deliberately conservative merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationarityVerdict {
    /// ADF t-statistic
    pub adf_statistic: f64,
    /// ADF p-value
    pub adf_p_value: f64,
    /// ADF verdict (p < 0.05)
    pub adf_stationary: bool,
    /// KPSS statistic
    pub kpss_statistic: f64,
    /// KPSS p-value
    pub kpss_p_value: f64,
    /// KPSS verdict (p > 0.05)
    pub kpss_stationary: bool,
    /// True only when both tests agree the series is stationary
    pub is_stationary: bool,
}

/// Run both stationarity tests and merge the verdicts.
pub fn test_stationarity<T: AsRef<[f64]>>(data: T) -> Result<StationarityVerdict> {
    let values = data.as_ref();
    let adf = adf_test(values, None)?;
    let kpss = kpss_test(values)?;

    Ok(StationarityVerdict {
        adf_statistic: adf.statistic,
        adf_p_value: adf.p_value,
        adf_stationary: adf.is_stationary,
        kpss_statistic: kpss.statistic,
        kpss_p_value: kpss.p_value,
        kpss_stationary: kpss.is_stationary,
        is_stationary: adf.is_stationary && kpss.is_stationary,
    })
}

/// Augmented Dickey-Fuller test.
///
/// Fits dy_t = alpha + beta * y_{t-1} + sum(gamma_i * dy_{t-i}) by ordinary
/// least squares and reports the t-statistic of beta, with a p-value
/// interpolated over the MacKinnon critical values. Requires at least 10
/// observations.
pub fn adf_test<T: AsRef<[f64]>>(data: T, lags: Option<usize>) -> Result<AdfResult> {
    let values = data.as_ref();
    let n = values.len();
    if n < 10 {
        return Err(Error::InsufficientData(
            "ADF test requires at least 10 observations".into(),
        ));
    }

    // A constant series is trivially stationary; the regression is degenerate
    if is_constant(values) {
        return Ok(AdfResult {
            statistic: f64::NEG_INFINITY,
            p_value: 0.0,
            lags: 0,
            is_stationary: true,
        });
    }

    let max_lags = (n - 4) / 2;
    let lags = match lags {
        Some(l) => {
            if l > max_lags {
                return Err(Error::InvalidValue(format!(
                    "lag order {} leaves too few observations (max {})",
                    l, max_lags
                )));
            }
            l
        }
        None => (((n - 1) as f64).cbrt().floor() as usize).min(max_lags),
    };

    let delta: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let m = delta.len();
    let rows = m - lags;
    let cols = lags + 2;
    if rows <= cols {
        return Err(Error::InsufficientData(
            "too few observations for the ADF regression".into(),
        ));
    }

    // Design matrix: intercept, lagged level, lagged differences
    let x = DMatrix::from_fn(rows, cols, |r, c| {
        let i = r + lags;
        match c {
            0 => 1.0,
            1 => values[i],
            _ => delta[i - (c - 1)],
        }
    });
    let y = DVector::from_fn(rows, |r, _| delta[r + lags]);

    let xtx = x.transpose() * &x;
    let xtx_inv = match xtx.clone().try_inverse() {
        Some(inv) => inv,
        None => {
            debug!("ADF design matrix singular, falling back to pseudo-inverse");
            xtx.pseudo_inverse(1e-12)
                .map_err(|e| Error::Computation(format!("pseudo-inverse failed: {}", e)))?
        }
    };
    let beta = &xtx_inv * x.transpose() * &y;

    let fitted = &x * &beta;
    let ssr: f64 = (&y - &fitted).iter().map(|e| e * e).sum();
    let y_scale: f64 = y.iter().map(|v| v * v).sum();

    // A near-perfect fit (e.g. an exact deterministic trend) leaves no
    // residual variance to test against; report the non-rejection region
    // instead of dividing rounding noise by rounding noise
    let statistic = if y_scale == 0.0 || ssr <= y_scale * 1e-12 {
        debug!("degenerate ADF residual variance, reporting non-stationary");
        0.0
    } else {
        let sigma2 = ssr / (rows - cols) as f64;
        let se = (sigma2 * xtx_inv[(1, 1)]).sqrt();
        let t = beta[1] / se;
        if t.is_finite() {
            t
        } else {
            0.0
        }
    };

    let p_value = interpolate_p(statistic, &ADF_ANCHORS, 0.001, 0.99);

    Ok(AdfResult {
        statistic,
        p_value,
        lags,
        is_stationary: p_value < SIGNIFICANCE_LEVEL,
    })
}

/// KPSS test for level stationarity.
///
/// Uses demeaned residuals, their partial sums, and a Newey-West long-run
/// variance with Bartlett weights. Requires at least 10 observations.
pub fn kpss_test<T: AsRef<[f64]>>(data: T) -> Result<KpssResult> {
    let values = data.as_ref();
    let n = values.len();
    if n < 10 {
        return Err(Error::InsufficientData(
            "KPSS test requires at least 10 observations".into(),
        ));
    }

    if is_constant(values) {
        return Ok(KpssResult {
            statistic: 0.0,
            p_value: 0.10,
            lags: 0,
            is_stationary: true,
        });
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let residuals: Vec<f64> = values.iter().map(|&v| v - mean).collect();

    let mut partial_sums = Vec::with_capacity(n);
    let mut acc = 0.0;
    for &r in &residuals {
        acc += r;
        partial_sums.push(acc);
    }

    // Schwert bandwidth for the Bartlett kernel
    let lags = (4.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize;
    let lags = lags.min(n - 1);

    let mut long_run_var = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
    for lag in 1..=lags {
        let weight = 1.0 - lag as f64 / (lags + 1) as f64;
        let autocov: f64 = (lag..n)
            .map(|t| residuals[t] * residuals[t - lag])
            .sum::<f64>()
            / n as f64;
        long_run_var += 2.0 * weight * autocov;
    }
    if long_run_var <= 0.0 {
        // Negative-definite kernel estimates can occur on strongly
        // anti-correlated data; fall back to the plain variance
        debug!("non-positive long-run variance, using short-run variance");
        long_run_var = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
    }

    let sum_of_squares: f64 = partial_sums.iter().map(|s| s * s).sum();
    let statistic = sum_of_squares / (n as f64 * n as f64 * long_run_var);

    let p_value = interpolate_p(statistic, &KPSS_ANCHORS, 0.10, 0.01);

    Ok(KpssResult {
        statistic,
        p_value,
        lags,
        is_stationary: p_value > SIGNIFICANCE_LEVEL,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Piecewise-linear interpolation of a p-value over (statistic, p) anchors
/// sorted by statistic, clamped to `below` / `above` outside the anchor range.
fn interpolate_p(statistic: f64, anchors: &[(f64, f64)], below: f64, above: f64) -> f64 {
    if statistic <= anchors[0].0 {
        return below;
    }
    if statistic >= anchors[anchors.len() - 1].0 {
        return above;
    }
    for pair in anchors.windows(2) {
        let (s0, p0) = pair[0];
        let (s1, p1) = pair[1];
        if statistic <= s1 {
            let w = (statistic - s0) / (s1 - s0);
            return p0 + w * (p1 - p0);
        }
    }
    above
}
