use clap::Parser;
use std::path::PathBuf;

/// Absloc: replays a simulated absolute positioning sensor through the EKF.
///
/// This struct defines the command-line arguments accepted by the simulator
/// binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/gps_walk.toml")]
    pub scenario: PathBuf,

    /// Seed for the noise generator. Overrides the scenario's seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Emit logs as newline-delimited JSON.
    #[arg(long, default_value_t = false)]
    pub log_json: bool,
}
