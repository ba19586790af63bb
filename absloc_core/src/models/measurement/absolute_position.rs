// absloc_core/src/models/measurement/absolute_position.rs

use nalgebra::{DMatrix, DVector, Matrix3x4, Vector3, Vector4};

use crate::error::FusionError;
use crate::estimation::{Expectation, Gaussian, Measurement};
use crate::frames::layout::POSE_DIM;
use crate::math::{prod_jpjt, rotation};
use crate::raw::RawSample;

/// Raw channel feeding each position axis. The drivers publish the first two
/// position channels swapped relative to the agent frame.
pub const POSITION_CHANNELS: [usize; 3] = [1, 0, 2];

/// Everything the position model derives from the current pose estimate.
#[derive(Debug, Clone)]
pub struct PoseExpectation {
    pub expectation: Expectation,
    /// `d(expectation)/d[p, q]`, 3x7.
    pub jacobian: DMatrix<f64>,
    /// `d(rotate(q, T))/dq`, 3x4.
    pub rotation_jacobian: Matrix3x4<f64>,
    /// The lever arm expressed in the world frame.
    pub rotated_lever_arm: Vector3<f64>,
}

/// A position sensor mounted at `lever_arm` from the agent reference point.
///
/// `h(p, q) = p + rotate(q, T)`
#[derive(Debug, Clone, PartialEq)]
pub struct AbsolutePositionModel {
    pub lever_arm: Vector3<f64>,
}

impl AbsolutePositionModel {
    pub fn new(lever_arm: Vector3<f64>) -> Self {
        Self { lever_arm }
    }

    /// Predicts the reading from the pose `(p, q)` and its 7x7 covariance.
    pub fn expect(
        &self,
        position: &Vector3<f64>,
        orientation: &Vector4<f64>,
        pose_covariance: &DMatrix<f64>,
    ) -> PoseExpectation {
        let rotated_lever_arm = rotation::rotate(orientation, &self.lever_arm);
        let rotation_jacobian = rotation::rotate_by_dq(orientation, &self.lever_arm);

        let mut jacobian = DMatrix::zeros(3, POSE_DIM);
        jacobian
            .view_mut((0, 0), (3, 3))
            .copy_from(&DMatrix::identity(3, 3));
        jacobian.view_mut((0, 3), (3, 4)).copy_from(&rotation_jacobian);

        let mean = position + rotated_lever_arm;
        let expectation = Gaussian::new(
            DVector::from_column_slice(mean.as_slice()),
            prod_jpjt(&jacobian, pose_covariance),
        );

        PoseExpectation {
            expectation,
            jacobian,
            rotation_jacobian,
            rotated_lever_arm,
        }
    }

    /// Forms the measurement from a raw reading: channels remapped through
    /// [`POSITION_CHANNELS`], the frame origin removed, and the reported
    /// standard deviations squared onto the diagonal.
    pub fn measurement(
        &self,
        sample: &RawSample,
        origin: &Vector3<f64>,
        has_variance: bool,
    ) -> Result<Measurement, FusionError> {
        if sample.dim() != 3 {
            return Err(FusionError::UnsupportedMeasurementDimension {
                found: sample.dim(),
            });
        }
        let std_dev = match (&sample.variances, has_variance) {
            (Some(v), true) if v.len() == sample.dim() => v,
            // TODO: constant-uncertainty model for drivers without a variance channel
            _ => return Err(FusionError::MissingVarianceModel),
        };

        let mean = DVector::from_fn(3, |axis, _| {
            sample.values[POSITION_CHANNELS[axis]] - origin[axis]
        });
        let variances = DVector::from_fn(3, |axis, _| std_dev[POSITION_CHANNELS[axis]].powi(2));

        Ok(Gaussian::new(mean, DMatrix::from_diagonal(&variances)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawId;
    use approx::assert_abs_diff_eq;
    use nalgebra::UnitQuaternion;

    fn identity() -> Vector4<f64> {
        Vector4::new(1.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn expectation_adds_rotated_lever_arm() {
        let model = AbsolutePositionModel::new(Vector3::new(1.0, 0.0, 0.0));
        let yaw = UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_2);
        let q = Vector4::new(yaw.w, yaw.i, yaw.j, yaw.k);

        let out = model.expect(&Vector3::new(2.0, 3.0, 4.0), &q, &DMatrix::zeros(7, 7));

        assert_abs_diff_eq!(out.rotated_lever_arm, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(
            out.expectation.mean,
            DVector::from_vec(vec![2.0, 4.0, 4.0]),
            epsilon = 1e-12
        );
    }

    #[test]
    fn jacobian_is_identity_then_rotation_jacobian() {
        let model = AbsolutePositionModel::new(Vector3::new(0.3, -0.2, 0.5));
        let q = Vector4::new(0.9, 0.1, -0.3, 0.2);
        let out = model.expect(&Vector3::zeros(), &q, &DMatrix::identity(7, 7));

        assert_eq!(
            out.jacobian.view((0, 0), (3, 3)).into_owned(),
            DMatrix::identity(3, 3)
        );
        assert_eq!(
            out.jacobian.view((0, 3), (3, 4)).into_owned(),
            DMatrix::from_column_slice(3, 4, out.rotation_jacobian.as_slice())
        );
        // With P = I the covariance is J * J^T.
        assert_abs_diff_eq!(
            out.expectation.cov,
            &out.jacobian * out.jacobian.transpose(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn expectation_covariance_for_position_only_uncertainty() {
        let model = AbsolutePositionModel::new(Vector3::zeros());
        let mut cov = DMatrix::zeros(7, 7);
        cov[(0, 0)] = 0.5;
        cov[(2, 2)] = 2.0;
        cov[(4, 4)] = 9.0;
        let out = model.expect(&Vector3::zeros(), &identity(), &cov);
        assert_eq!(
            out.expectation.cov,
            DMatrix::from_diagonal(&DVector::from_vec(vec![0.5, 0.0, 2.0]))
        );
    }

    #[test]
    fn measurement_reorders_channels_and_squares_std_dev() {
        let model = AbsolutePositionModel::new(Vector3::zeros());
        let sample = RawSample::new(RawId(0), 0.0, vec![10.0, 20.0, 30.0])
            .with_variances(vec![0.1, 0.2, 0.3]);
        let origin = Vector3::new(1.0, 2.0, 3.0);

        let y = model.measurement(&sample, &origin, true).unwrap();

        assert_eq!(y.mean, DVector::from_vec(vec![19.0, 8.0, 27.0]));
        assert_abs_diff_eq!(y.cov[(0, 0)], 0.04, epsilon = 1e-15);
        assert_abs_diff_eq!(y.cov[(1, 1)], 0.01, epsilon = 1e-15);
        assert_abs_diff_eq!(y.cov[(2, 2)], 0.09, epsilon = 1e-15);
        assert_eq!(y.cov[(0, 1)], 0.0);
    }

    #[test]
    fn measurement_without_variance_fails() {
        let model = AbsolutePositionModel::new(Vector3::zeros());
        let sample = RawSample::new(RawId(0), 0.0, vec![1.0, 2.0, 3.0]);
        assert_eq!(
            model.measurement(&sample, &Vector3::zeros(), false),
            Err(FusionError::MissingVarianceModel)
        );
        let with_var = sample.with_variances(vec![1.0; 3]);
        assert_eq!(
            model.measurement(&with_var, &Vector3::zeros(), false),
            Err(FusionError::MissingVarianceModel)
        );
    }

    #[test]
    fn measurement_of_seven_channels_is_unsupported() {
        let model = AbsolutePositionModel::new(Vector3::zeros());
        let sample = RawSample::new(RawId(0), 0.0, vec![0.0; 7]).with_variances(vec![1.0; 7]);
        assert_eq!(
            model.measurement(&sample, &Vector3::zeros(), true),
            Err(FusionError::UnsupportedMeasurementDimension { found: 7 })
        );
    }
}
