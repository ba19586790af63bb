// absloc_sim/src/simulation/config/mod.rs

//! Loading of scenario configuration from disk.
//!
//! Layers, lowest priority first: built-in defaults, the scenario TOML file,
//! then `ABSLOC_`-prefixed environment variables (`ABSLOC_SENSOR__WINDOW=50`).

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use tracing::info;

use crate::error::SimError;
pub use crate::simulation::core::config::{ScenarioConfig, Sensor};

/// Builds the layered figment for a scenario file.
pub fn scenario_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ScenarioConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ABSLOC_").split("__"))
}

/// Loads and validates a scenario.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    info!("Loading scenario from: {}", path.display());
    let config: ScenarioConfig = scenario_figment(path).extract()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ScenarioConfig) -> Result<(), SimError> {
    if config.simulation.rate_hz <= 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "rate_hz must be positive, got {}",
            config.simulation.rate_hz
        )));
    }
    if config.simulation.duration_seconds <= 0.0 {
        return Err(SimError::InvalidScenario(format!(
            "duration_seconds must be positive, got {}",
            config.simulation.duration_seconds
        )));
    }
    validate_noise(&config.sensor)?;
    if config.sensor.window == 0 {
        return Err(SimError::InvalidScenario(
            "sensor window must hold at least one reading".to_string(),
        ));
    }
    Ok(())
}

/// Standard deviations must be finite and non-negative.
pub fn validate_noise(sensor: &Sensor) -> Result<(), SimError> {
    let fields = [
        ("noise_stddev", sensor.noise_stddev.as_slice()),
        ("reported_stddev", sensor.reported_stddev.as_slice()),
        (
            "reported_stddev_jitter",
            std::slice::from_ref(&sensor.reported_stddev_jitter),
        ),
    ];
    for (name, values) in fields {
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(SimError::InvalidScenario(format!(
                "{name} must be finite and non-negative, got {bad}"
            )));
        }
    }
    Ok(())
}
