// absloc_core/src/estimation/mod.rs

use crate::error::FilterError;
use crate::frames::FrameAwareState;
use dyn_clone::DynClone;
use nalgebra::{DMatrix, DVector};

pub mod filters;
pub mod shared;

pub use shared::{AgentEstimate, SharedAgentState};

/// A mean vector with its covariance.
#[derive(Debug, Clone, PartialEq)]
pub struct Gaussian {
    pub mean: DVector<f64>,
    pub cov: DMatrix<f64>,
}

impl Gaussian {
    pub fn new(mean: DVector<f64>, cov: DMatrix<f64>) -> Self {
        debug_assert_eq!(mean.nrows(), cov.nrows());
        debug_assert_eq!(cov.nrows(), cov.ncols());
        Self { mean, cov }
    }

    pub fn dim(&self) -> usize {
        self.mean.nrows()
    }
}

/// The sensor reading predicted from the current pose estimate.
pub type Expectation = Gaussian;
/// The sensor reading actually observed, expressed in the agent frame.
pub type Measurement = Gaussian;

/// Residual between a measurement and its expectation.
#[derive(Debug, Clone, PartialEq)]
pub struct Innovation(pub Gaussian);

impl Innovation {
    /// `z = y - e`, `Z = Y + E`. Measurement noise and prediction
    /// uncertainty are independent.
    pub fn between(measurement: &Measurement, expectation: &Expectation) -> Self {
        Self(Gaussian::new(
            &measurement.mean - &expectation.mean,
            &measurement.cov + &expectation.cov,
        ))
    }

    pub fn mean(&self) -> &DVector<f64> {
        &self.0.mean
    }

    pub fn cov(&self) -> &DMatrix<f64> {
        &self.0.cov
    }

    pub fn dim(&self) -> usize {
        self.0.dim()
    }
}

/// The generic correction primitive of a filter owning the aggregate state.
///
/// `cross_jacobian` is `dz/dx` restricted to the columns listed in
/// `indices`; `innovation.cov()` already holds the full innovation covariance.
pub trait CorrectionFilter: DynClone + Send {
    fn state(&self) -> &FrameAwareState;

    fn state_mut(&mut self) -> &mut FrameAwareState;

    fn correct(
        &mut self,
        indices: &[usize],
        innovation: &Innovation,
        cross_jacobian: &DMatrix<f64>,
    ) -> Result<(), FilterError>;
}

dyn_clone::clone_trait_object!(CorrectionFilter);
