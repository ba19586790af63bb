// absloc_sim/src/error.rs

use absloc_core::error::FusionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to load scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("invalid noise model: {0}")]
    InvalidNoise(#[from] rand_distr::NormalError),

    #[error("fusion failed: {0}")]
    Fusion(#[from] FusionError),

    #[error("failed to render report: {0}")]
    Report(#[from] toml::ser::Error),
}
