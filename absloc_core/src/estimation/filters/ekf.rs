// absloc_core/src/estimation/filters/ekf.rs

use crate::error::FilterError;
use crate::estimation::{CorrectionFilter, Innovation};
use crate::frames::FrameAwareState;
use nalgebra::DMatrix;

/// Extended Kalman Filter correction over a full state.
///
/// Only the correction half of the filter lives here. Prediction belongs to
/// whatever motion model drives the agent and edits the state through
/// [`CorrectionFilter::state_mut`].
#[derive(Debug, Clone)]
pub struct ExtendedKalmanFilter {
    /// The current state of the filter (x, P, t).
    state: FrameAwareState,
}

impl ExtendedKalmanFilter {
    pub fn new(initial_state: FrameAwareState) -> Self {
        // Ensure P has the correct dimensions.
        assert_eq!(initial_state.dim(), initial_state.covariance.nrows());
        assert_eq!(initial_state.dim(), initial_state.covariance.ncols());
        Self {
            state: initial_state,
        }
    }

    fn check_dimensions(
        &self,
        indices: &[usize],
        innovation: &Innovation,
        cross_jacobian: &DMatrix<f64>,
    ) -> Result<(), FilterError> {
        let n = innovation.dim();
        if cross_jacobian.nrows() != n {
            return Err(FilterError::DimensionMismatch {
                expected: n,
                found: cross_jacobian.nrows(),
            });
        }
        if cross_jacobian.ncols() != indices.len() {
            return Err(FilterError::DimensionMismatch {
                expected: indices.len(),
                found: cross_jacobian.ncols(),
            });
        }
        if innovation.cov().nrows() != n || innovation.cov().ncols() != n {
            return Err(FilterError::DimensionMismatch {
                expected: n,
                found: innovation.cov().nrows(),
            });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.state.dim()) {
            return Err(FilterError::DimensionMismatch {
                expected: self.state.dim(),
                found: bad + 1,
            });
        }
        Ok(())
    }
}

impl CorrectionFilter for ExtendedKalmanFilter {
    fn state(&self) -> &FrameAwareState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FrameAwareState {
        &mut self.state
    }

    fn correct(
        &mut self,
        indices: &[usize],
        innovation: &Innovation,
        cross_jacobian: &DMatrix<f64>,
    ) -> Result<(), FilterError> {
        self.check_dimensions(indices, innovation, cross_jacobian)?;

        let dim = self.state.dim();
        let p = &self.state.covariance;

        // P(:, rs) * INN_rs^T, the only part of P the sparse Jacobian touches.
        let p_cols = DMatrix::from_fn(dim, indices.len(), |r, c| p[(r, indices[c])]);
        let pjt = p_cols * cross_jacobian.transpose();

        let s_inv = innovation
            .cov()
            .clone()
            .cholesky()
            .ok_or(FilterError::NotPositiveDefinite)?
            .inverse();

        // The cross-Jacobian is dz/dx = -H, hence the sign.
        let k_gain = -(&pjt * s_inv);

        self.state.vector += &k_gain * innovation.mean();
        let updated = &self.state.covariance + &k_gain * pjt.transpose();
        self.state.covariance = (&updated + updated.transpose()) * 0.5;
        Ok(())
    }
}
