//! Numeric series type shared by all diagnostic components.

use crate::core::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An ordered sequence of finite real numbers, optionally paired with timestamps.
///
/// Every diagnostic operation in this crate works on the raw values; the
/// timestamp index is carried only for callers that want to keep results aligned
/// with their original time axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericSeries {
    values: Vec<f64>,
    timestamps: Option<Vec<DateTime<Utc>>>,
}

impl NumericSeries {
    /// Create a series from raw values.
    ///
    /// Rejects empty input and non-finite values (NaN, infinity).
    pub fn new(values: Vec<f64>) -> Result<Self> {
        Self::validate(&values)?;
        Ok(Self {
            values,
            timestamps: None,
        })
    }

    /// Create a series paired with a timestamp index of the same length.
    pub fn with_timestamps(values: Vec<f64>, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        Self::validate(&values)?;
        if timestamps.len() != values.len() {
            return Err(Error::LengthMismatch {
                expected: values.len(),
                actual: timestamps.len(),
            });
        }
        Ok(Self {
            values,
            timestamps: Some(timestamps),
        })
    }

    fn validate(values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(Error::EmptyData("series must contain at least one value".into()));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidValue(format!(
                "non-finite value at position {}",
                pos
            )));
        }
        Ok(())
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// A validated series is never empty, but clippy expects the pair.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The underlying values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The timestamp index, if one was supplied.
    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// Consume the series, returning the values.
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl AsRef<[f64]> for NumericSeries {
    fn as_ref(&self) -> &[f64] {
        &self.values
    }
}
