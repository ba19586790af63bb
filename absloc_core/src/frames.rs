// absloc_core/src/frames.rs

use nalgebra::{DMatrix, DVector};

pub mod layout;

pub use layout::{pose_state_layout, standard_ins_state_layout, PoseIndices};

/// Coordinate frames a state variable can be expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameId {
    /// The reference frame the agent pose is expressed in.
    World,
    /// The agent's own reference point.
    Body,
}

/// One scalar slot of a filter state, tagged with the frame it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateVariable {
    Px(FrameId),
    Py(FrameId),
    Pz(FrameId),
    Vx(FrameId),
    Vy(FrameId),
    Vz(FrameId),
    // Quaternion of the rotation from the first frame to the second.
    Qw(FrameId, FrameId),
    Qx(FrameId, FrameId),
    Qy(FrameId, FrameId),
    Qz(FrameId, FrameId),
    AccelBiasX(FrameId),
    AccelBiasY(FrameId),
    AccelBiasZ(FrameId),
    GyroBiasX(FrameId),
    GyroBiasY(FrameId),
    GyroBiasZ(FrameId),
}

/// A filter state: mean, covariance, and the layout naming each slot.
#[derive(Debug, Clone)]
pub struct FrameAwareState {
    pub layout: Vec<StateVariable>,
    pub vector: DVector<f64>,
    pub covariance: DMatrix<f64>,
    /// Time of the last prediction or correction, seconds.
    pub last_update_timestamp: f64,
}

impl FrameAwareState {
    /// Zero mean with an identity orientation, covariance `sigma2 * I`.
    pub fn new(layout: Vec<StateVariable>, sigma2: f64, timestamp: f64) -> Self {
        let n = layout.len();
        let mut vector = DVector::zeros(n);

        // A zero quaternion has no defined rotation; start from identity.
        for (slot, var) in vector.iter_mut().zip(&layout) {
            if let StateVariable::Qw(..) = var {
                *slot = 1.0;
            }
        }

        Self {
            layout,
            vector,
            covariance: DMatrix::identity(n, n) * sigma2,
            last_update_timestamp: timestamp,
        }
    }

    pub fn dim(&self) -> usize {
        self.layout.len()
    }

    pub fn find_idx(&self, var: &StateVariable) -> Option<usize> {
        self.layout.iter().position(|candidate| candidate == var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_at_identity_orientation() {
        let state = FrameAwareState::new(pose_state_layout(), 0.5, 0.0);
        assert_eq!(state.dim(), 7);
        assert_eq!(
            state.vector.as_slice(),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(state.covariance[(3, 3)], 0.5);
    }

    #[test]
    fn find_idx_respects_frames() {
        let state = FrameAwareState::new(standard_ins_state_layout(), 1.0, 0.0);
        assert_eq!(state.find_idx(&StateVariable::Vx(FrameId::World)), Some(7));
        assert_eq!(state.find_idx(&StateVariable::Vx(FrameId::Body)), None);
    }
}
