// absloc_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::estimation::CorrectionFilter;
pub use crate::raw::RawSource;
pub use crate::sensors::ProprioceptiveSensor;

// --- Core Data Structures (The "nouns" of the library) ---
pub use crate::config::{AbslocSensorConfig, SensorConfig};
pub use crate::error::{FilterError, FusionError};
pub use crate::estimation::{
    AgentEstimate, Expectation, Gaussian, Innovation, Measurement, SharedAgentState,
};
pub use crate::frames::{FrameAwareState, FrameId, PoseIndices, StateVariable};
pub use crate::raw::{BufferedRawSource, RawInfo, RawLayout, RawSample};
pub use crate::types::RawId;

// --- Algorithms and concrete implementations ---
pub use crate::calibration::calibrate;
pub use crate::estimation::filters::ExtendedKalmanFilter;
pub use crate::models::measurement::{AbsolutePositionModel, MeasurementShape};
pub use crate::sensors::{AbsoluteLocalizationSensor, FusionOutcome, SensorStatus};
