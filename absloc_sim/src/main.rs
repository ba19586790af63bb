// absloc_sim/src/main.rs

use std::process::ExitCode;

use absloc_sim::cli::Cli;
use absloc_sim::run_scenario;
use absloc_sim::telemetry::init_tracing;
use clap::Parser;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let report = match run_scenario(&cli.scenario, cli.seed) {
        Ok(report) => report,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match report.to_toml() {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
