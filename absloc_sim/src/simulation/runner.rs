// absloc_sim/src/simulation/runner.rs

//! Drives one absolute sensor against a dead-reckoned agent estimate.
//!
//! Each tick the estimate is propagated with the known velocity, a new
//! reading is pushed into the driver buffer and the sensor processes it.

use absloc_core::frames::{standard_ins_state_layout, FrameAwareState};
use absloc_core::prelude::*;
use nalgebra::Vector4;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::simulation::core::config::ScenarioConfig;
use crate::simulation::core::prng::SimulationRng;
use crate::simulation::core::GroundTruth;
use crate::simulation::sensors::absloc::SimulatedAbsloc;

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub absolute: bool,
    /// Readings produced by the simulated driver.
    pub readings: usize,
    /// Readings fused as filter corrections.
    pub corrections: usize,
    /// Time of the reading that defined the origin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<[f64; 3]>,
    pub final_position: [f64; 3],
    pub final_position_stddev: [f64; 3],
    /// Distance between the estimate and the truth at the last tick, meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_error: Option<f64>,
    /// Root mean square position error over every tick after the bootstrap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rms_error: Option<f64>,
    /// Mean normalized innovation squared over the corrections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_nis: Option<f64>,
}

impl RunReport {
    pub fn to_toml(&self) -> Result<String, SimError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

pub struct Runner {
    config: ScenarioConfig,
    seed: Option<u64>,
    truth: GroundTruth,
    stream: SimulatedAbsloc,
    sensor: AbsoluteLocalizationSensor<BufferedRawSource>,
    agent: SharedAgentState,
    rng: SimulationRng,
}

impl Runner {
    /// Builds a run. `seed` overrides the scenario seed when given.
    pub fn new(config: ScenarioConfig, seed: Option<u64>) -> Result<Self, SimError> {
        let seed = seed.or(config.simulation.seed);
        let truth = GroundTruth::from_config(&config.agent);
        let stream = SimulatedAbsloc::from_config(&config.sensor)?;

        let layout = RawLayout {
            data_size: 3,
            variance_size: if config.sensor.publishes_variance { 3 } else { 0 },
        };
        let source = BufferedRawSource::new(layout, config.sensor.window);
        let absloc = config.sensor.absloc();
        let sensor = AbsoluteLocalizationSensor::new(source, absloc.lever_arm(), absloc.sensor_config());

        let mut state = FrameAwareState::new(
            standard_ins_state_layout(),
            config.agent.initial_covariance,
            0.0,
        );
        let pose = PoseIndices::from_state(&state)
            .ok_or_else(|| SimError::InvalidScenario("estimator state has no pose".to_string()))?;
        let q = truth.orientation;
        let coords = Vector4::new(q.w, q.i, q.j, q.k);
        for (k, &i) in pose.orientation().iter().enumerate() {
            state.vector[i] = coords[k];
        }
        let estimate = AgentEstimate::new(Box::new(ExtendedKalmanFilter::new(state)))
            .ok_or_else(|| SimError::InvalidScenario("estimator state has no pose".to_string()))?;

        Ok(Self {
            config,
            seed,
            truth,
            stream,
            sensor,
            agent: SharedAgentState::new(estimate),
            rng: SimulationRng::new(seed),
        })
    }

    /// A handle onto the estimate, shared with the sensor.
    pub fn agent(&self) -> &SharedAgentState {
        &self.agent
    }

    /// Propagates the position by `dt` with the known velocity.
    fn predict(&self, dt: f64) -> Result<(), SimError> {
        let mut estimate = self.agent.lock()?;
        let idx = estimate.pose_indices();
        let velocity = self.truth.velocity;
        let growth = self.config.agent.process_noise * dt;
        let state = estimate.filter_mut().state_mut();
        for (axis, &i) in idx.position().iter().enumerate() {
            state.vector[i] += velocity[axis] * dt;
            state.covariance[(i, i)] += growth;
        }
        state.last_update_timestamp += dt;
        Ok(())
    }

    pub fn run(mut self) -> Result<RunReport, SimError> {
        let dt = 1.0 / self.config.simulation.rate_hz;
        let ticks = (self.config.simulation.duration_seconds * self.config.simulation.rate_hz)
            .floor() as usize
            + 1;
        let calibrating = self.config.sensor.use_for_init;
        let window = self.config.sensor.window;
        info!(
            ticks,
            absolute = self.config.sensor.absolute,
            calibrating,
            seed = ?self.seed,
            "starting absolute localization run"
        );

        let mut corrections = 0;
        let mut nis_sum = 0.0;
        let mut nis_count = 0;
        let mut bootstrap_time = None;
        let mut squared_error_sum = 0.0;
        let mut error_count = 0;
        let mut last_error = None;

        for k in 0..ticks {
            let t = k as f64 * dt;
            if k > 0 {
                self.predict(dt)?;
            }

            let reading = self.stream.sample(&self.truth, t, &mut self.rng);
            let id = self
                .sensor
                .source_mut()
                .push(reading.timestamp, reading.values, reading.variances);

            let waiting = calibrating
                && self.sensor.status() == SensorStatus::Uninitialized
                && self.sensor.source().len() < window;
            if waiting {
                continue;
            }

            match self.sensor.process(id, &self.agent)? {
                FusionOutcome::Bootstrapped { .. } => {
                    bootstrap_time = Some(t);
                }
                FusionOutcome::Corrected { innovation, .. } => {
                    corrections += 1;
                    match normalized_innovation_squared(&innovation) {
                        Some(nis) => {
                            nis_sum += nis;
                            nis_count += 1;
                        }
                        None => warn!(%id, "innovation covariance is not positive definite"),
                    }
                }
            }

            if let Some(error) = self.position_error(t)? {
                debug!(t, error, "tick");
                squared_error_sum += error * error;
                error_count += 1;
                last_error = Some(error);
            }
        }

        let estimate = self.agent.snapshot()?;
        let position = estimate.position();
        let stddev = estimate.position_covariance().diagonal().map(f64::sqrt);
        let report = RunReport {
            seed: self.seed,
            absolute: self.config.sensor.absolute,
            readings: ticks,
            corrections,
            bootstrap_time,
            origin: self.sensor.origin().map(|o| [o.x, o.y, o.z]),
            final_position: [position.x, position.y, position.z],
            final_position_stddev: [stddev.x, stddev.y, stddev.z],
            final_error: last_error,
            rms_error: (error_count > 0).then(|| (squared_error_sum / error_count as f64).sqrt()),
            mean_nis: (nis_count > 0).then(|| nis_sum / nis_count as f64),
        };
        info!(
            corrections = report.corrections,
            final_error = ?report.final_error,
            rms_error = ?report.rms_error,
            "run complete"
        );
        Ok(report)
    }

    /// Distance to the truth expressed in the estimate's frame, once the
    /// sensor has defined that frame. A relative sensor's frame is shifted
    /// by its own offset minus the origin it picked.
    fn position_error(&self, t: f64) -> Result<Option<f64>, SimError> {
        let Some(origin) = self.sensor.origin() else {
            return Ok(None);
        };
        let estimated = self.agent.lock()?.position();
        let truth = self.truth.position_at(t);
        let expected = if self.config.sensor.absolute {
            truth
        } else {
            truth + self.config.sensor.frame_offset() - origin
        };
        Ok(Some((estimated - expected).norm()))
    }
}

/// `zᵀ S⁻¹ z`, or `None` when `S` cannot be factored.
fn normalized_innovation_squared(innovation: &Innovation) -> Option<f64> {
    let chol = innovation.cov().clone().cholesky()?;
    Some(innovation.mean().dot(&chol.solve(innovation.mean())))
}
