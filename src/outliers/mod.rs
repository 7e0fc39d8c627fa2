//! Outlier detection
//!
//! Three detection strategies returning one boolean flag per input point:
//! z-score and IQR for univariate series, and a covariance-normalized distance
//! method for multivariate point sets.

use crate::core::error::{Error, Result};
use crate::intervals::percentile;
use log::debug;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Default z-score threshold.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// Default IQR fence multiplier.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Default expected anomaly fraction for distance-based detection.
pub const DEFAULT_CONTAMINATION: f64 = 0.1;

/// Flag points whose absolute z-score exceeds `threshold`.
///
/// A constant series (zero standard deviation) reports no outliers.
pub fn zscore_outliers<T: AsRef<[f64]>>(data: T, threshold: f64) -> Result<Vec<bool>> {
    let data = data.as_ref();
    if data.is_empty() {
        return Err(Error::EmptyData("outlier detection requires data".into()));
    }
    if threshold <= 0.0 {
        return Err(Error::InvalidValue(
            "z-score threshold must be positive".into(),
        ));
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let std = (data.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();

    if std == 0.0 {
        return Ok(vec![false; data.len()]);
    }

    Ok(data
        .iter()
        .map(|&x| ((x - mean) / std).abs() > threshold)
        .collect())
}

/// Flag points outside the Tukey fences [Q1 - k*IQR, Q3 + k*IQR].
///
/// A constant series (zero IQR) reports no outliers.
pub fn iqr_outliers<T: AsRef<[f64]>>(data: T, k: f64) -> Result<Vec<bool>> {
    let data = data.as_ref();
    if data.is_empty() {
        return Err(Error::EmptyData("outlier detection requires data".into()));
    }
    if k <= 0.0 {
        return Err(Error::InvalidValue("IQR multiplier must be positive".into()));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lower_fence = q1 - k * iqr;
    let upper_fence = q3 + k * iqr;

    Ok(data
        .iter()
        .map(|&x| x < lower_fence || x > upper_fence)
        .collect())
}

/// Flag multivariate points by covariance-normalized (Mahalanobis) distance.
///
/// Each row of `rows` is one observation vector; all rows must share one
/// dimension. The covariance matrix is inverted directly, falling back to an
/// SVD pseudo-inverse when singular. Points whose distance from the mean
/// exceeds the distance at the (1 - contamination) percentile of the distance
/// distribution are flagged.
///
/// For 1-D data this degenerates to a univariate distance on the same values
/// the z-score and IQR detectors already handle; callers reshaping a series to
/// single-feature rows get equivalent-but-redundant coverage.
pub fn mahalanobis_outliers(rows: &[Vec<f64>], contamination: f64) -> Result<Vec<bool>> {
    if rows.is_empty() {
        return Err(Error::EmptyData("outlier detection requires data".into()));
    }
    if !(contamination > 0.0 && contamination < 1.0) {
        return Err(Error::InvalidValue(format!(
            "contamination must be in (0, 1), got {}",
            contamination
        )));
    }

    let n = rows.len();
    let dim = rows[0].len();
    if dim == 0 {
        return Err(Error::EmptyData("points must have at least one feature".into()));
    }
    for (i, row) in rows.iter().enumerate() {
        if row.len() != dim {
            return Err(Error::DimensionMismatch(format!(
                "row {} has {} features, expected {}",
                i,
                row.len(),
                dim
            )));
        }
    }
    if n < 2 {
        return Err(Error::InsufficientData(
            "distance-based detection requires at least 2 points".into(),
        ));
    }

    // Column means
    let mut mean = vec![0.0; dim];
    for row in rows {
        for (m, &v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n as f64;
    }

    // Sample covariance (ddof = 1)
    let centered = DMatrix::from_fn(n, dim, |i, j| rows[i][j] - mean[j]);
    let cov = centered.transpose() * &centered / (n - 1) as f64;

    let inv = match cov.clone().try_inverse() {
        Some(inv) => inv,
        None => {
            debug!("covariance matrix singular, falling back to pseudo-inverse");
            cov.pseudo_inverse(1e-12)
                .map_err(|e| Error::Computation(format!("pseudo-inverse failed: {}", e)))?
        }
    };

    let distances: Vec<f64> = (0..n)
        .into_par_iter()
        .map(|i| {
            let diff = DVector::from_fn(dim, |j, _| rows[i][j] - mean[j]);
            let d2 = (diff.transpose() * &inv * &diff)[(0, 0)];
            d2.max(0.0).sqrt()
        })
        .collect();

    let mut sorted = distances.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let threshold = percentile(&sorted, 1.0 - contamination);

    Ok(distances.iter().map(|&d| d > threshold).collect())
}
