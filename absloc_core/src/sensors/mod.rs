// absloc_core/src/sensors/mod.rs

use nalgebra::Vector3;

use crate::config::SensorConfig;
use crate::error::FusionError;
use crate::estimation::SharedAgentState;
use crate::raw::RawInfo;
use crate::types::RawId;

pub mod absloc;

pub use absloc::{AbsoluteLocalizationSensor, FusionOutcome, SensorStatus};

/// The contract for a sensor that measures the agent itself rather than
/// the map: it produces raw samples, sits at a fixed lever arm, and fuses
/// one reading at a time into the shared agent state.
pub trait ProprioceptiveSensor {
    /// Mounting point of the sensor in the agent body frame.
    fn lever_arm(&self) -> &Vector3<f64>;

    fn config(&self) -> &SensorConfig;

    fn status(&self) -> SensorStatus;

    /// Readings the driver currently holds, oldest first.
    fn available_raws(&self) -> Vec<RawInfo>;

    /// Fuses reading `id`. Runs to completion or fails; there is no partial update.
    /// A driver that fails to release a calibrated reading afterwards is only
    /// logged, since the reading is fused by then.
    fn process(&mut self, id: RawId, agent: &SharedAgentState) -> Result<FusionOutcome, FusionError>;
}
