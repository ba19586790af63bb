// absloc_core/src/models/mod.rs

pub mod measurement;
