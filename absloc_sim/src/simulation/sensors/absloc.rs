// absloc_sim/src/simulation/sensors/absloc.rs

use absloc_core::models::measurement::absolute_position::POSITION_CHANNELS;
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::SimError;
use crate::simulation::config::validate_noise;
use crate::simulation::core::config::Sensor;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::GroundTruth;

/// One synthesized driver reading, channels already in the driver's order.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticReading {
    pub timestamp: f64,
    pub values: Vec<f64>,
    pub variances: Option<Vec<f64>>,
}

/// Produces noisy absolute readings of the lever-arm point of the agent.
#[derive(Debug, Clone)]
pub struct SimulatedAbsloc {
    lever_arm: Vector3<f64>,
    /// Offset added to every reading: the sensor's own frame for relative
    /// sensors, nothing for absolute ones.
    frame_offset: Vector3<f64>,
    noise: [Normal<f64>; 3],
    reported_stddev: Vector3<f64>,
    jitter: f64,
    publishes_variance: bool,
}

impl SimulatedAbsloc {
    pub fn from_config(config: &Sensor) -> Result<Self, SimError> {
        validate_noise(config)?;
        let noise = [
            Normal::new(0.0, config.noise_stddev[0])?,
            Normal::new(0.0, config.noise_stddev[1])?,
            Normal::new(0.0, config.noise_stddev[2])?,
        ];
        let frame_offset = if config.absolute {
            Vector3::zeros()
        } else {
            config.frame_offset()
        };
        Ok(Self {
            lever_arm: Vector3::from(config.lever_arm),
            frame_offset,
            noise,
            reported_stddev: Vector3::from(config.reported_stddev),
            jitter: config.reported_stddev_jitter,
            publishes_variance: config.publishes_variance,
        })
    }

    /// The noiseless reading at time `t`, in agent-frame axis order.
    pub fn true_reading(&self, truth: &GroundTruth, t: f64) -> Vector3<f64> {
        truth.position_at(t) + truth.orientation * self.lever_arm + self.frame_offset
    }

    pub fn sample(&self, truth: &GroundTruth, t: f64, rng: &mut SimulationRng) -> SyntheticReading {
        let clean = self.true_reading(truth, t);
        let mut values = vec![0.0; 3];
        let mut variances = vec![0.0; 3];
        for axis in 0..3 {
            let channel = POSITION_CHANNELS[axis];
            values[channel] = clean[axis] + self.noise[axis].sample(&mut rng.0);
            let scale = 1.0 + self.jitter * rng.0.gen::<f64>();
            variances[channel] = self.reported_stddev[axis] * scale;
        }
        SyntheticReading {
            timestamp: t,
            values,
            variances: self.publishes_variance.then_some(variances),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::core::config::{Agent, Sensor};
    use approx::assert_abs_diff_eq;

    fn truth() -> GroundTruth {
        GroundTruth::from_config(&Agent {
            start: [1.0, 2.0, 3.0],
            velocity: [0.0; 3],
            yaw_deg: 90.0,
            ..Agent::default()
        })
    }

    #[test]
    fn channels_are_written_in_driver_order() {
        let sensor = SimulatedAbsloc::from_config(&Sensor {
            lever_arm: [1.0, 0.0, 0.0],
            noise_stddev: [0.0; 3],
            reported_stddev: [0.1, 0.2, 0.3],
            ..Sensor::default()
        })
        .unwrap();
        let mut rng = SimulationRng::new(Some(1));

        let reading = sensor.sample(&truth(), 0.0, &mut rng);

        // Agent-frame (1, 3, 3) once the lever arm is yawed onto +y.
        assert_abs_diff_eq!(reading.values[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(reading.values[1], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(reading.values[2], 3.0, epsilon = 1e-12);
        assert_eq!(reading.variances, Some(vec![0.2, 0.1, 0.3]));
    }

    #[test]
    fn relative_sensors_add_their_frame_offset() {
        let sensor = SimulatedAbsloc::from_config(&Sensor {
            absolute: false,
            frame_offset: [10.0, 0.0, 0.0],
            noise_stddev: [0.0; 3],
            ..Sensor::default()
        })
        .unwrap();
        assert_eq!(
            sensor.true_reading(&truth(), 0.0),
            Vector3::new(11.0, 2.0, 3.0)
        );
    }

    #[test]
    fn variance_channel_can_be_disabled() {
        let sensor = SimulatedAbsloc::from_config(&Sensor {
            publishes_variance: false,
            ..Sensor::default()
        })
        .unwrap();
        let mut rng = SimulationRng::new(Some(3));
        assert!(sensor.sample(&truth(), 0.0, &mut rng).variances.is_none());
    }

    #[test]
    fn negative_noise_is_rejected() {
        let result = SimulatedAbsloc::from_config(&Sensor {
            noise_stddev: [-1.0, 0.0, 0.0],
            ..Sensor::default()
        });
        assert!(matches!(result, Err(SimError::InvalidScenario(_))));
    }

    #[test]
    fn same_seed_same_stream() {
        let sensor = SimulatedAbsloc::from_config(&Sensor::default()).unwrap();
        let mut a = SimulationRng::new(Some(42));
        let mut b = SimulationRng::new(Some(42));
        for k in 0..5 {
            let t = k as f64 * 0.1;
            assert_eq!(sensor.sample(&truth(), t, &mut a), sensor.sample(&truth(), t, &mut b));
        }
    }
}
