// absloc_core/src/lib.rs

// This file defines the public modules of the library.
pub mod calibration;
pub mod config;
pub mod error;
pub mod estimation;
pub mod frames;
pub mod math;
pub mod models;
pub mod prelude;
pub mod raw;
pub mod sensors;
pub mod types;
