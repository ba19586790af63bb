// absloc_core/src/models/measurement/mod.rs

use crate::error::FusionError;

pub mod absolute_position;

pub use absolute_position::{AbsolutePositionModel, PoseExpectation};

/// The measurement shapes an absolute sensor can be fused with.
///
/// A new shape (position + orientation, for instance) is a new variant with
/// its own model, never a wider branch inside an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementShape {
    /// Three position channels.
    PositionOnly,
}

impl MeasurementShape {
    /// Maps a reading dimension to its shape. Anything but 3 is refused,
    /// including the 7-channel position + orientation layout.
    pub fn from_dimension(dim: usize) -> Result<Self, FusionError> {
        match dim {
            3 => Ok(Self::PositionOnly),
            found => Err(FusionError::UnsupportedMeasurementDimension { found }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_three_channels_are_supported() {
        assert_eq!(
            MeasurementShape::from_dimension(3),
            Ok(MeasurementShape::PositionOnly)
        );
        for dim in [0, 1, 2, 4, 6, 7] {
            assert_eq!(
                MeasurementShape::from_dimension(dim),
                Err(FusionError::UnsupportedMeasurementDimension { found: dim })
            );
        }
    }
}
