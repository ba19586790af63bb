// absloc_core/src/config.rs

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Behaviour switches of an absolute localization sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct SensorConfig {
    /// The sensor reports globally referenced coordinates (satellite
    /// positioning). When `false` the coordinates are relative to an
    /// arbitrary fixed origin of the sensor (motion capture).
    pub absolute: bool,
    /// Calibrate the first reading from the buffered readings before fusing it.
    pub use_for_init: bool,
}

/// Everything needed to build an absolute localization sensor, as it
/// appears in a configuration file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AbslocSensorConfig {
    #[serde(default)]
    pub absolute: bool,
    #[serde(default)]
    pub use_for_init: bool,
    /// Mounting point of the sensor in the agent body frame, in meters.
    #[serde(default)]
    pub lever_arm: [f64; 3],
}

impl AbslocSensorConfig {
    pub fn sensor_config(&self) -> SensorConfig {
        SensorConfig {
            absolute: self.absolute,
            use_for_init: self.use_for_init,
        }
    }

    pub fn lever_arm(&self) -> Vector3<f64> {
        Vector3::from(self.lever_arm)
    }
}
