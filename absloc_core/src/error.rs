// absloc_core/src/error.rs

use crate::types::RawId;
use thiserror::Error;

/// Failures raised by a correction filter. These are invariant violations:
/// a well-formed innovation always corrects successfully.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("innovation covariance is not positive definite")]
    NotPositiveDefinite,

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Everything that can abort the fusion of one absolute reading.
///
/// None of these are retried internally. The caller decides whether to try
/// again with a later reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FusionError {
    /// Only 3-channel position readings are supported. The 7-channel
    /// position+orientation variant lands here too.
    #[error("absolute reading of dimension {found} is not supported (expected 3)")]
    UnsupportedMeasurementDimension { found: usize },

    #[error("driver reports no per-channel variance and no constant uncertainty model is available")]
    MissingVarianceModel,

    #[error("insufficient calibration data: {0}")]
    InsufficientCalibrationData(String),

    #[error("raw reading {0} is not available from the driver")]
    UnknownRawId(RawId),

    #[error("driver failure: {0}")]
    Driver(String),

    #[error("filter correction failed: {0}")]
    Filter(#[from] FilterError),

    #[error("shared agent state lock is poisoned")]
    StatePoisoned,
}
