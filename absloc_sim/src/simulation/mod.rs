pub mod config;
pub mod core;
pub mod runner;
pub mod sensors;
