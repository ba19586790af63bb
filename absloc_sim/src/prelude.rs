// absloc_sim/src/prelude.rs

// Re-export the entire absloc_core prelude so you can easily access
// pure types like `SharedAgentState`, `RawSample`, `FusionOutcome`, etc.
pub use absloc_core::prelude::*;

// Re-export common simulation-specific types.
pub use crate::error::SimError;
pub use crate::simulation::config::{load_scenario, scenario_figment};
pub use crate::simulation::core::config::{Agent, ScenarioConfig, Sensor, Simulation};
pub use crate::simulation::core::prng::SimulationRng;
pub use crate::simulation::core::GroundTruth;
pub use crate::simulation::runner::{RunReport, Runner};
pub use crate::simulation::sensors::absloc::{SimulatedAbsloc, SyntheticReading};
