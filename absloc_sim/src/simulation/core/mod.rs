// absloc_sim/src/simulation/core/mod.rs

use nalgebra::{UnitQuaternion, Vector3};

use crate::simulation::core::config::Agent;

pub mod config;
pub mod prng;

/// The true motion of the simulated agent: constant velocity, constant heading.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruth {
    pub start: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl GroundTruth {
    pub fn from_config(agent: &Agent) -> Self {
        Self {
            start: agent.start(),
            velocity: agent.velocity(),
            orientation: agent.orientation(),
        }
    }

    pub fn position_at(&self, t: f64) -> Vector3<f64> {
        self.start + self.velocity * t
    }
}
