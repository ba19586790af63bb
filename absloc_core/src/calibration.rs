// absloc_core/src/calibration.rs

//! Self-calibration of the first absolute reading from the readings the
//! driver buffered before fusion started.

use nalgebra::Vector3;
use tracing::{debug, warn};

use crate::error::FusionError;
use crate::raw::RawSample;
use crate::types::RawId;

/// Starting value of the per-axis minimum variance search.
const MIN_VARIANCE_SENTINEL: f64 = 1e3;

/// Number of position axes the estimator works on.
const AXES: usize = 3;

/// Derives one calibrated reading from the window of samples ending at `target`.
///
/// Per axis, the smallest reported variance in the window is the reference
/// precision. Samples whose variance on that axis is below twice that
/// reference are averaged, each weighted by its own variance. The result
/// carries the averaged values and the reference variances.
///
/// Samples after `target` in the window are ignored. Channels are used in
/// the driver's native order.
pub fn calibrate(window: &[RawSample], target: RawId) -> Result<RawSample, FusionError> {
    let end = window
        .iter()
        .position(|s| s.id == target)
        .ok_or_else(|| {
            FusionError::InsufficientCalibrationData(format!(
                "target reading {target} is not in the calibration window"
            ))
        })?;
    let span = &window[..=end];

    let mut min_var = Vector3::repeat(MIN_VARIANCE_SENTINEL);
    for sample in span {
        let var = axis_variances(sample)?;
        for axis in 0..AXES {
            min_var[axis] = min_var[axis].min(var[axis]);
        }
    }

    let mut weighted_sum = Vector3::<f64>::zeros();
    let mut weight_sum = Vector3::<f64>::zeros();
    for sample in span {
        let var = axis_variances(sample)?;
        for axis in 0..AXES {
            if var[axis] < 2.0 * min_var[axis] {
                weighted_sum[axis] += sample.values[axis] * var[axis];
                weight_sum[axis] += var[axis];
            } else {
                debug!(
                    id = %sample.id,
                    axis,
                    variance = var[axis],
                    "reading outside the calibration inlier band"
                );
            }
        }
    }

    let mut mean = Vector3::<f64>::zeros();
    for axis in 0..AXES {
        if weight_sum[axis] <= 0.0 {
            warn!(axis, "no usable calibration weight on axis");
            return Err(FusionError::InsufficientCalibrationData(format!(
                "no reading with positive variance on axis {axis}"
            )));
        }
        mean[axis] = weighted_sum[axis] / weight_sum[axis];
    }

    let last = &window[end];
    Ok(RawSample {
        id: last.id,
        timestamp: last.timestamp,
        values: mean.iter().copied().collect(),
        variances: Some(min_var.iter().copied().collect()),
    })
}

fn axis_variances(sample: &RawSample) -> Result<Vector3<f64>, FusionError> {
    let var = sample.variances.as_ref().ok_or_else(|| {
        FusionError::InsufficientCalibrationData(format!(
            "reading {} carries no variance",
            sample.id
        ))
    })?;
    if var.len() < AXES || sample.values.len() < AXES {
        return Err(FusionError::InsufficientCalibrationData(format!(
            "reading {} has fewer than {AXES} channels",
            sample.id
        )));
    }
    Ok(Vector3::new(var[0], var[1], var[2]))
}
