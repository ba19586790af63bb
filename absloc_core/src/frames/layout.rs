// absloc_core/src/frames/layout.rs
use crate::frames::{FrameAwareState, FrameId, StateVariable};

/// Number of state components an absolute position reading constrains:
/// position (3) and orientation quaternion (4).
pub const POSE_DIM: usize = 7;

/// The standard dimension of the 16-state INS state vector.
pub const STANDARD_INS_STATE_DIM: usize = 16;

fn pose_variables() -> [StateVariable; POSE_DIM] {
    let body = FrameId::Body;
    let world = FrameId::World;
    [
        StateVariable::Px(world),
        StateVariable::Py(world),
        StateVariable::Pz(world),
        // Quaternion stored scalar-first, matching `nalgebra::Quaternion::new(w, i, j, k)`.
        StateVariable::Qw(body, world),
        StateVariable::Qx(body, world),
        StateVariable::Qy(body, world),
        StateVariable::Qz(body, world),
    ]
}

/// The minimal layout: the agent pose and nothing else.
pub fn pose_state_layout() -> Vec<StateVariable> {
    pose_variables().to_vec()
}

/// Returns the standard 16-dimensional state vector layout used for
/// inertial navigation filters.
///
/// The state is composed of:
/// - Position (3) in World Frame, indices 0-2
/// - Orientation (4, Quaternion `w,x,y,z`) from Body to World, indices 3-6
/// - Velocity (3) in World Frame, indices 7-9
/// - Accelerometer Bias (3) in Body Frame, indices 10-12
/// - Gyroscope Bias (3) in Body Frame, indices 13-15
pub fn standard_ins_state_layout() -> Vec<StateVariable> {
    let body = FrameId::Body;
    let world = FrameId::World;

    let mut layout = pose_state_layout();
    layout.extend([
        StateVariable::Vx(world),
        StateVariable::Vy(world),
        StateVariable::Vz(world),
        StateVariable::AccelBiasX(body),
        StateVariable::AccelBiasY(body),
        StateVariable::AccelBiasZ(body),
        StateVariable::GyroBiasX(body),
        StateVariable::GyroBiasY(body),
        StateVariable::GyroBiasZ(body),
    ]);
    layout
}

/// The stable index set locating the agent pose inside a larger filter state.
///
/// Order is always `[px, py, pz, qw, qx, qy, qz]`, whatever the order of the
/// underlying layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoseIndices(pub [usize; POSE_DIM]);

impl PoseIndices {
    /// Resolves the pose variables against a state layout. Returns `None`
    /// when any of them is missing.
    pub fn from_state(state: &FrameAwareState) -> Option<Self> {
        let mut indices = [0usize; POSE_DIM];
        for (slot, var) in indices.iter_mut().zip(pose_variables().iter()) {
            *slot = state.find_idx(var)?;
        }
        Some(Self(indices))
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn position(&self) -> &[usize] {
        &self.0[0..3]
    }

    pub fn orientation(&self) -> &[usize] {
        &self.0[3..POSE_DIM]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ins_layout_keeps_pose_first() {
        let state = FrameAwareState::new(standard_ins_state_layout(), 1.0, 0.0);
        assert_eq!(state.dim(), STANDARD_INS_STATE_DIM);
        let indices = PoseIndices::from_state(&state).unwrap();
        assert_eq!(indices.as_slice(), &[0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn indices_follow_a_shuffled_layout() {
        let mut layout = standard_ins_state_layout();
        layout.rotate_left(7);
        let state = FrameAwareState::new(layout, 1.0, 0.0);
        let indices = PoseIndices::from_state(&state).unwrap();
        assert_eq!(indices.position(), &[9, 10, 11]);
        assert_eq!(indices.orientation(), &[12, 13, 14, 15]);
    }

    #[test]
    fn missing_pose_variables_yield_none() {
        let layout = vec![StateVariable::Vx(FrameId::World)];
        let state = FrameAwareState::new(layout, 1.0, 0.0);
        assert!(PoseIndices::from_state(&state).is_none());
    }
}
