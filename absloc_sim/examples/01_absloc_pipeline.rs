// absloc_sim/examples/01_absloc_pipeline.rs

//! Wires an absolute localization sensor to an EKF by hand.
//!
//! This example demonstrates how to:
//! 1. Build the shared agent estimate around an `ExtendedKalmanFilter`.
//! 2. Bind a sensor to a buffered driver.
//! 3. Feed it readings: the first one bootstraps, the rest correct.
//!
//! To run this example:
//! `cargo run --example 01_absloc_pipeline`

use absloc_core::frames::standard_ins_state_layout;
use absloc_sim::prelude::*;
use absloc_sim::telemetry::init_tracing;
use nalgebra::Vector3;
use tracing::info;

fn main() -> Result<(), SimError> {
    init_tracing(false);

    // --- 1. The one estimate every sensor of the agent shares ---
    let state = FrameAwareState::new(standard_ins_state_layout(), 1.0, 0.0);
    let estimate = AgentEstimate::new(Box::new(ExtendedKalmanFilter::new(state)))
        .ok_or_else(|| SimError::InvalidScenario("INS layout has no pose".to_string()))?;
    let agent = SharedAgentState::new(estimate);

    // --- 2. A GPS receiver mounted 30 cm above the body origin ---
    let driver = BufferedRawSource::new(
        RawLayout {
            data_size: 3,
            variance_size: 3,
        },
        8,
    );
    let mut gps = AbsoluteLocalizationSensor::new(
        driver,
        Vector3::new(0.0, 0.0, 0.3),
        SensorConfig {
            absolute: true,
            use_for_init: false,
        },
    );

    // --- 3. Readings arrive as (y, x, z) with standard deviations ---
    let readings = [
        [4.0, 10.0, 0.3],
        [4.2, 10.1, 0.35],
        [3.9, 9.8, 0.28],
        [4.1, 10.05, 0.31],
    ];
    for (k, values) in readings.iter().enumerate() {
        let id = gps
            .source_mut()
            .push(k as f64 * 0.2, values.to_vec(), Some(vec![0.2, 0.2, 0.4]));
        match gps.process(id, &agent)? {
            FusionOutcome::Bootstrapped { position, .. } => {
                info!("bootstrapped at {:?}", position.as_slice());
            }
            FusionOutcome::Corrected { innovation, .. } => {
                info!("corrected, innovation {:?}", innovation.mean().as_slice());
            }
        }
    }

    let estimate = agent.snapshot()?;
    info!(
        "final position {:?}, variance {:?}",
        estimate.position().as_slice(),
        estimate.position_covariance().diagonal().as_slice()
    );
    Ok(())
}
