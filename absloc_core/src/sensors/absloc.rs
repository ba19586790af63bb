// absloc_core/src/sensors/absloc.rs

//! Absolute localization sensors (satellite positioning, motion capture...).
//!
//! The first fused reading defines the frame: it sets the sensor origin and
//! the agent position directly. Every later reading becomes an EKF
//! correction of the agent pose through the lever-arm model.

use nalgebra::{Matrix3, Matrix4, Vector3};
use tracing::{debug, info, warn};

use crate::calibration::calibrate;
use crate::config::SensorConfig;
use crate::error::FusionError;
use crate::estimation::{AgentEstimate, Expectation, Innovation, Measurement, SharedAgentState};
use crate::models::measurement::{AbsolutePositionModel, MeasurementShape, PoseExpectation};
use crate::raw::{RawInfo, RawLayout, RawSample, RawSource};
use crate::sensors::ProprioceptiveSensor;
use crate::types::RawId;

/// Lifecycle of one sensor instance. There is no way back to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorStatus {
    /// No reading fused yet, the origin is unset.
    Uninitialized,
    /// Origin set, readings are fused as corrections.
    Operational,
}

/// What happened to one fused reading.
#[derive(Debug, Clone, PartialEq)]
pub enum FusionOutcome {
    /// The reading defined the frame origin and the agent position.
    Bootstrapped {
        origin: Vector3<f64>,
        position: Vector3<f64>,
        position_covariance: Matrix3<f64>,
    },
    /// The reading was submitted to the filter as a correction.
    Corrected {
        measurement: Measurement,
        expectation: Expectation,
        innovation: Innovation,
    },
}

/// An absolute position sensor bound to a driver.
#[derive(Debug)]
pub struct AbsoluteLocalizationSensor<S: RawSource> {
    source: S,
    layout: RawLayout,
    model: AbsolutePositionModel,
    config: SensorConfig,
    /// Offset between the sensor frame and the agent frame. Set once.
    origin: Option<Vector3<f64>>,
}

impl<S: RawSource> AbsoluteLocalizationSensor<S> {
    pub fn new(mut source: S, lever_arm: Vector3<f64>, config: SensorConfig) -> Self {
        let layout = source.configure();
        debug!(
            data_size = layout.data_size,
            variance_size = layout.variance_size,
            "configured absolute sensor driver"
        );
        Self {
            source,
            layout,
            model: AbsolutePositionModel::new(lever_arm),
            config,
            origin: None,
        }
    }

    pub fn origin(&self) -> Option<&Vector3<f64>> {
        self.origin.as_ref()
    }

    pub fn layout(&self) -> RawLayout {
        self.layout
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Runs the calibration estimator over the buffered readings up to `id`.
    fn calibrated_sample(&self, id: RawId) -> Result<RawSample, FusionError> {
        let mut window = Vec::new();
        for info in self.source.available() {
            window.push(self.source.observe(info.id)?);
            if info.id == id {
                break;
            }
        }
        calibrate(&window, id)
    }

    /// One full update cycle on a locked estimate.
    fn fuse(
        &mut self,
        sample: &RawSample,
        estimate: &mut AgentEstimate,
    ) -> Result<FusionOutcome, FusionError> {
        let origin = self.origin.unwrap_or_else(Vector3::zeros);
        let measurement = self
            .model
            .measurement(sample, &origin, self.layout.has_variance())?;
        let predicted = self.model.expect(
            &estimate.position(),
            &estimate.orientation(),
            &estimate.pose_covariance(),
        );

        match self.origin {
            None => Ok(self.bootstrap(measurement, &predicted, estimate)),
            Some(_) => Self::correct(measurement, predicted, estimate),
        }
    }

    /// Defines the frame from the first reading. In relative mode the origin
    /// is the reading minus the rotated lever arm, which is the reading itself
    /// for a sensor mounted at the body origin.
    fn bootstrap(
        &mut self,
        measurement: Measurement,
        predicted: &PoseExpectation,
        estimate: &mut AgentEstimate,
    ) -> FusionOutcome {
        let pose_cov = estimate.pose_covariance();
        let orientation_cov = Matrix4::from_fn(|r, c| pose_cov[(3 + r, 3 + c)]);
        let exp_q = &predicted.rotation_jacobian;

        // The orientation is not corrected yet; its uncertainty seen through
        // the lever arm goes into the position.
        let position_covariance = Matrix3::from_fn(|r, c| measurement.cov[(r, c)])
            + exp_q * orientation_cov * exp_q.transpose();

        let reading = Vector3::new(
            measurement.mean[0],
            measurement.mean[1],
            measurement.mean[2],
        );
        let tr = predicted.rotated_lever_arm;
        let (origin, position) = if self.config.absolute {
            (Vector3::zeros(), reading - tr)
        } else {
            (reading - tr, Vector3::zeros())
        };

        estimate.set_position(&position, &position_covariance);
        self.origin = Some(origin);

        info!(
            "agent origin: {:.16?} ; initial position: {:.16?} ; initial position variance: {:.16?}",
            origin.as_slice(),
            position.as_slice(),
            position_covariance.diagonal().as_slice()
        );

        FusionOutcome::Bootstrapped {
            origin,
            position,
            position_covariance,
        }
    }

    fn correct(
        measurement: Measurement,
        predicted: PoseExpectation,
        estimate: &mut AgentEstimate,
    ) -> Result<FusionOutcome, FusionError> {
        let innovation = Innovation::between(&measurement, &predicted.expectation);
        // z = y - h(x), so dz/dx = -dh/dx.
        let cross_jacobian = -&predicted.jacobian;

        // No gating: every well-formed innovation goes to the filter.
        estimate.correct_pose(&innovation, &cross_jacobian)?;

        debug!(innovation = ?innovation.mean().as_slice(), "absolute position correction");

        Ok(FusionOutcome::Corrected {
            measurement,
            expectation: predicted.expectation,
            innovation,
        })
    }
}

impl<S: RawSource> ProprioceptiveSensor for AbsoluteLocalizationSensor<S> {
    fn lever_arm(&self) -> &Vector3<f64> {
        &self.model.lever_arm
    }

    fn config(&self) -> &SensorConfig {
        &self.config
    }

    fn status(&self) -> SensorStatus {
        match self.origin {
            Some(_) => SensorStatus::Operational,
            None => SensorStatus::Uninitialized,
        }
    }

    fn available_raws(&self) -> Vec<RawInfo> {
        self.source.available()
    }

    fn process(&mut self, id: RawId, agent: &SharedAgentState) -> Result<FusionOutcome, FusionError> {
        MeasurementShape::from_dimension(self.layout.data_size)?;
        if !self.layout.has_variance() {
            return Err(FusionError::MissingVarianceModel);
        }

        let calibrating = self.config.use_for_init;
        let sample = if calibrating {
            self.calibrated_sample(id)?
        } else {
            self.source.fetch(id)?
        };
        MeasurementShape::from_dimension(sample.dim())?;

        let outcome = {
            let mut estimate = agent.lock()?;
            self.fuse(&sample, &mut estimate)?
        };

        if calibrating {
            // Only the first reading is calibrated. The driver still holds
            // the calibrated reading since it was only observed.
            self.config.use_for_init = false;
            if let Err(err) = self.source.release(id) {
                // The reading is already fused; only the driver slot leaks.
                warn!(%id, %err, "failed to release calibrated reading");
            }
        }

        Ok(outcome)
    }
}
