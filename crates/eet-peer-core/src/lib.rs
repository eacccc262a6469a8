pub mod analysis;
pub mod dataset;
pub mod error;
pub mod stats;
pub mod types;

#[cfg(feature = "charts")]
pub mod chart;

#[cfg(feature = "report")]
pub mod report;

pub use error::EetError;
pub use types::*;

/// Standard result type for all eet-peer operations
pub type EetResult<T> = Result<T, EetError>;
