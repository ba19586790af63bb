// absloc_core/src/math/rotation.rs

//! Quaternion rotation of 3-vectors and its Jacobian.
//!
//! Quaternions are passed as raw coefficients `[w, x, y, z]`. The rotation is
//! the homogeneous form `R(q) v`, which equals the unit-quaternion rotation
//! when `|q| = 1` and stays differentiable everywhere, so the Jacobian is
//! taken with respect to the unconstrained coefficients the filter stores.

use nalgebra::{Matrix3, Matrix3x4, Vector3, Vector4};

/// Rotation matrix of a (not necessarily normalized) quaternion `[w, x, y, z]`.
pub fn rotation_matrix(q: &Vector4<f64>) -> Matrix3<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    Matrix3::new(
        w * w + x * x - y * y - z * z,
        2.0 * (x * y - w * z),
        2.0 * (x * z + w * y),
        2.0 * (x * y + w * z),
        w * w - x * x + y * y - z * z,
        2.0 * (y * z - w * x),
        2.0 * (x * z - w * y),
        2.0 * (y * z + w * x),
        w * w - x * x - y * y + z * z,
    )
}

/// Rotates `v` by `q`.
pub fn rotate(q: &Vector4<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    rotation_matrix(q) * v
}

/// Jacobian of `rotate(q, v)` with respect to `q = [w, x, y, z]`.
pub fn rotate_by_dq(q: &Vector4<f64>, v: &Vector3<f64>) -> Matrix3x4<f64> {
    let (w, x, y, z) = (q[0], q[1], q[2], q[3]);
    let (a, b, c) = (v[0], v[1], v[2]);

    let d_w = Vector3::new(w * a - z * b + y * c, z * a + w * b - x * c, -y * a + x * b + w * c);
    let d_x = Vector3::new(x * a + y * b + z * c, y * a - x * b - w * c, z * a + w * b - x * c);
    let d_y = Vector3::new(-y * a + x * b + w * c, x * a + y * b + z * c, -w * a + z * b - y * c);
    let d_z = Vector3::new(-z * a - w * b + x * c, w * a - z * b + y * c, x * a + y * b + z * c);

    Matrix3x4::from_columns(&[d_w, d_x, d_y, d_z]) * 2.0
}
