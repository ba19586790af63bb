// absloc_sim/tests/scenarios.rs

use std::path::PathBuf;

use absloc_sim::prelude::*;
use absloc_sim::run_scenario;

fn scenario(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../assets/scenarios")
        .join(name)
}

#[test]
fn gps_walk_scenario_loads() {
    let config = load_scenario(&scenario("gps_walk.toml")).unwrap();
    assert!(config.sensor.absolute);
    assert!(config.sensor.use_for_init);
    assert_eq!(config.sensor.window, 25);
    assert_eq!(config.simulation.seed, Some(42));
}

#[test]
fn gps_walk_calibrates_then_tracks() {
    let report = run_scenario(&scenario("gps_walk.toml"), None).unwrap();

    assert_eq!(report.readings, 301);
    assert_eq!(report.corrections, 301 - 25);
    assert!((report.bootstrap_time.unwrap() - 4.8).abs() < 1e-9);
    assert_eq!(report.origin, Some([0.0; 3]));
    assert!(report.final_error.unwrap() < 6.0);
}

#[test]
fn mocap_static_holds_millimetre_scale() {
    let report = run_scenario(&scenario("mocap_static.toml"), None).unwrap();

    assert!(!report.absolute);
    assert_eq!(report.bootstrap_time, Some(0.0));
    assert_eq!(report.corrections, 1000);
    let origin = report.origin.unwrap();
    assert!((origin[0] - 2.5).abs() < 0.2);
    assert!((origin[1] + 1.0).abs() < 0.2);
    assert!(report.final_error.unwrap() < 0.2);
}

#[test]
fn missing_scenario_file_falls_back_to_defaults() {
    // figment treats a missing TOML file as an empty layer.
    let config = load_scenario(&scenario("does_not_exist.toml")).unwrap();
    assert_eq!(config, ScenarioConfig::default());
}
