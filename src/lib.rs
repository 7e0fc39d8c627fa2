//! tsdiag - statistical diagnostics for demand-forecast evaluation
//!
//! Five stateless computation components over in-memory numeric series:
//! accuracy metrics for actual/forecast pairs, confidence and prediction
//! intervals, outlier detection, seasonal decomposition with period
//! auto-detection, and stationarity testing. The crate performs no I/O and
//! holds no state; every result is a plain serializable structure owned by
//! the caller.

// Core module with the shared error and series types
pub mod core;

// Diagnostic components
pub mod accuracy;
pub mod decomposition;
pub mod intervals;
pub mod outliers;
pub mod stationarity;

// Re-export core types
pub use crate::core::error::{Error, Result};
pub use crate::core::series::NumericSeries;

// Re-export the main result types
pub use accuracy::ForecastAccuracy;
pub use decomposition::{DecompositionMode, DecompositionResult, SeasonalDecomposer};
pub use intervals::{ConfidenceInterval, ForecastIntervals};
pub use stationarity::{AdfResult, KpssResult, StationarityVerdict};
