// absloc_sim/src/simulation/core/config.rs

use absloc_core::config::AbslocSensorConfig;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub agent: Agent,

    #[serde(default)]
    pub sensor: Sensor,
}

// =========================================================================
// == Configuration Sub-Structs ==
// These map directly to the sections in a scenario.toml file.
// =========================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the pseudo-random number generator for determinism.
    pub seed: Option<u64>,
    /// Duration of the run in seconds.
    pub duration_seconds: f64,
    /// Rate at which the sensor produces readings.
    pub rate_hz: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            duration_seconds: 30.0,
            rate_hz: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Agent {
    /// True starting position in the world frame, meters.
    pub start: [f64; 3],
    /// Constant true velocity in the world frame, m/s. Also known to the estimator.
    pub velocity: [f64; 3],
    /// Constant heading, degrees.
    pub yaw_deg: f64,
    /// Diagonal of the initial state covariance.
    pub initial_covariance: f64,
    /// Position random-walk intensity added per second of prediction, m^2/s.
    pub process_noise: f64,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            start: [0.0; 3],
            velocity: [0.5, 0.0, 0.0],
            yaw_deg: 0.0,
            initial_covariance: 1.0,
            process_noise: 0.01,
        }
    }
}

impl Agent {
    pub fn start(&self) -> Vector3<f64> {
        Vector3::from(self.start)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::from(self.velocity)
    }

    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(0.0, 0.0, self.yaw_deg.to_radians())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Sensor {
    /// The sensor reports world coordinates rather than its own frame.
    pub absolute: bool,
    /// Calibrate the first reading from the driver buffer.
    #[serde(default)]
    pub use_for_init: bool,
    /// Mounting point in the agent body frame, meters.
    #[serde(default)]
    pub lever_arm: [f64; 3],
    /// True per-axis noise standard deviation, meters.
    pub noise_stddev: [f64; 3],
    /// Standard deviation the simulated driver reports with each reading.
    pub reported_stddev: [f64; 3],
    /// Reported deviation is scaled by a uniform factor in `[1, 1 + jitter)`.
    #[serde(default)]
    pub reported_stddev_jitter: f64,
    /// Position of the agent start in the sensor's own frame (relative sensors).
    #[serde(default)]
    pub frame_offset: [f64; 3],
    /// Whether the driver publishes a variance channel.
    #[serde(default = "default_true")]
    pub publishes_variance: bool,
    /// Number of readings the driver buffers.
    pub window: usize,
}

fn default_true() -> bool {
    true
}

impl Sensor {
    /// The part of the section the fusion library understands.
    pub fn absloc(&self) -> AbslocSensorConfig {
        AbslocSensorConfig {
            absolute: self.absolute,
            use_for_init: self.use_for_init,
            lever_arm: self.lever_arm,
        }
    }

    pub fn frame_offset(&self) -> Vector3<f64> {
        Vector3::from(self.frame_offset)
    }
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            absolute: true,
            use_for_init: false,
            lever_arm: [0.0; 3],
            noise_stddev: [0.5, 0.5, 1.0],
            reported_stddev: [0.5, 0.5, 1.0],
            reported_stddev_jitter: 0.0,
            frame_offset: [0.0; 3],
            publishes_variance: true,
            window: 20,
        }
    }
}
