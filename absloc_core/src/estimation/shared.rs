// absloc_core/src/estimation/shared.rs

//! The single owner of the aggregate agent state.
//!
//! Sensors never keep a copy of the state. They hold a [`SharedAgentState`]
//! handle and the pose index set, and every mutation happens while the lock
//! is held, one update cycle at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use nalgebra::{DMatrix, Matrix3, Vector3, Vector4};

use crate::error::{FilterError, FusionError};
use crate::estimation::{CorrectionFilter, Innovation};
use crate::frames::PoseIndices;
use crate::math::project;

/// The filter together with the location of the agent pose inside its state.
#[derive(Clone)]
pub struct AgentEstimate {
    filter: Box<dyn CorrectionFilter>,
    pose: PoseIndices,
}

impl std::fmt::Debug for AgentEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentEstimate")
            .field("state", self.filter.state())
            .field("pose", &self.pose)
            .finish()
    }
}

impl AgentEstimate {
    /// Wraps a filter. Returns `None` if its state has no complete pose.
    pub fn new(filter: Box<dyn CorrectionFilter>) -> Option<Self> {
        let pose = PoseIndices::from_state(filter.state())?;
        Some(Self { filter, pose })
    }

    pub fn pose_indices(&self) -> PoseIndices {
        self.pose
    }

    pub fn filter(&self) -> &dyn CorrectionFilter {
        self.filter.as_ref()
    }

    pub fn filter_mut(&mut self) -> &mut dyn CorrectionFilter {
        self.filter.as_mut()
    }

    pub fn position(&self) -> Vector3<f64> {
        let x = &self.filter.state().vector;
        let idx = self.pose.position();
        Vector3::new(x[idx[0]], x[idx[1]], x[idx[2]])
    }

    /// Orientation quaternion coefficients `[w, x, y, z]` as stored.
    pub fn orientation(&self) -> Vector4<f64> {
        let x = &self.filter.state().vector;
        let idx = self.pose.orientation();
        Vector4::new(x[idx[0]], x[idx[1]], x[idx[2]], x[idx[3]])
    }

    /// Covariance over `[p, q]`, 7x7.
    pub fn pose_covariance(&self) -> DMatrix<f64> {
        let idx = self.pose.as_slice();
        project(&self.filter.state().covariance, idx, idx)
    }

    pub fn position_covariance(&self) -> Matrix3<f64> {
        let p = &self.filter.state().covariance;
        let idx = self.pose.position();
        Matrix3::from_fn(|r, c| p[(idx[r], idx[c])])
    }

    /// Overwrites the position and its covariance block directly.
    ///
    /// Correlations between position and the rest of the state are cleared:
    /// the position is being defined, not corrected.
    pub fn set_position(&mut self, position: &Vector3<f64>, covariance: &Matrix3<f64>) {
        let idx = self.pose.0;
        let state = self.filter.state_mut();
        let dim = state.dim();

        for r in 0..3 {
            state.vector[idx[r]] = position[r];
        }
        for &i in &idx[0..3] {
            for j in 0..dim {
                state.covariance[(i, j)] = 0.0;
                state.covariance[(j, i)] = 0.0;
            }
        }
        for r in 0..3 {
            for c in 0..3 {
                state.covariance[(idx[r], idx[c])] = covariance[(r, c)];
            }
        }
    }

    /// Runs the filter's correction over the pose components.
    pub fn correct_pose(
        &mut self,
        innovation: &Innovation,
        cross_jacobian: &DMatrix<f64>,
    ) -> Result<(), FilterError> {
        let indices = self.pose;
        self.filter
            .correct(indices.as_slice(), innovation, cross_jacobian)
    }
}

/// Clonable handle onto the one `AgentEstimate` shared by every sensor of an agent.
#[derive(Debug, Clone)]
pub struct SharedAgentState {
    inner: Arc<Mutex<AgentEstimate>>,
}

impl SharedAgentState {
    pub fn new(estimate: AgentEstimate) -> Self {
        Self {
            inner: Arc::new(Mutex::new(estimate)),
        }
    }

    /// Takes the state for one update cycle.
    pub fn lock(&self) -> Result<MutexGuard<'_, AgentEstimate>, FusionError> {
        self.inner.lock().map_err(|_| FusionError::StatePoisoned)
    }

    /// A copy of the current estimate, taken under the lock.
    pub fn snapshot(&self) -> Result<AgentEstimate, FusionError> {
        Ok(self.lock()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::filters::ExtendedKalmanFilter;
    use crate::frames::{standard_ins_state_layout, FrameAwareState, StateVariable};

    fn estimate() -> AgentEstimate {
        let state = FrameAwareState::new(standard_ins_state_layout(), 1.0, 0.0);
        AgentEstimate::new(Box::new(ExtendedKalmanFilter::new(state))).unwrap()
    }

    #[test]
    fn pose_accessors_read_through_indices() {
        let est = estimate();
        assert_eq!(est.position(), Vector3::zeros());
        assert_eq!(est.orientation(), Vector4::new(1.0, 0.0, 0.0, 0.0));
        assert_eq!(est.pose_covariance(), DMatrix::identity(7, 7));
    }

    #[test]
    fn set_position_clears_cross_covariance() {
        let mut est = estimate();
        est.filter_mut().state_mut().covariance[(1, 8)] = 0.4;
        est.filter_mut().state_mut().covariance[(8, 1)] = 0.4;

        let cov = Matrix3::from_diagonal(&Vector3::new(2.0, 3.0, 4.0));
        est.set_position(&Vector3::new(5.0, 6.0, 7.0), &cov);

        assert_eq!(est.position(), Vector3::new(5.0, 6.0, 7.0));
        assert_eq!(est.position_covariance(), cov);
        let p = &est.filter().state().covariance;
        assert_eq!(p[(1, 8)], 0.0);
        assert_eq!(p[(8, 1)], 0.0);
        assert_eq!(p[(8, 8)], 1.0);
    }

    #[test]
    fn filter_without_pose_is_rejected() {
        let state = FrameAwareState::new(vec![StateVariable::Vx(crate::frames::FrameId::World)], 1.0, 0.0);
        assert!(AgentEstimate::new(Box::new(ExtendedKalmanFilter::new(state))).is_none());
    }

    #[test]
    fn handles_share_one_estimate() {
        let shared = SharedAgentState::new(estimate());
        let other = shared.clone();
        other
            .lock()
            .unwrap()
            .set_position(&Vector3::new(1.0, 0.0, 0.0), &Matrix3::identity());
        assert_eq!(shared.snapshot().unwrap().position(), Vector3::new(1.0, 0.0, 0.0));
    }
}
