// absloc_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the absloc_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;
pub mod telemetry;

use std::path::Path;

use crate::error::SimError;
use crate::simulation::config::load_scenario;
use crate::simulation::runner::{RunReport, Runner};

/// Loads a scenario file and runs it to completion.
pub fn run_scenario(path: &Path, seed: Option<u64>) -> Result<RunReport, SimError> {
    let config = load_scenario(path)?;
    Runner::new(config, seed)?.run()
}
