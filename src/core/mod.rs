// Core data structures shared by the diagnostic components
pub mod error;
pub mod series;

// Re-exports for convenience
pub use self::error::{Error, Result};
pub use self::series::NumericSeries;
