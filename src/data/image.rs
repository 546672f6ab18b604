//! `Image`
//!
//! Contains the in-memory image structures produced by the
//! importers and consumed by the writers and analyses.

mod calibration;
mod dimensions;

pub use calibration::{Calibration, MICRON};
pub use dimensions::{Dimensions, DimensionsError};

use ndarray::prelude::*;

/// Row-major grid of samples, shape `(height, width)`.
pub type SampleGrid = Array2<f32>;

/// Stack of equally sized frames, shape `(slices, height, width)`.
pub type ImageStack = Array3<f32>;

/// A single-plane 32-bit floating point image together with
/// its spatial calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedImage {
    pub title : String,
    pub data : SampleGrid,
    pub calibration : Calibration,
}

impl CalibratedImage {
    pub fn new(title : &str, data : SampleGrid, calibration : Calibration) -> Self {
        CalibratedImage {
            title : title.to_string(),
            data,
            calibration,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.data.ncols(), self.data.nrows())
    }

    /// Smallest and largest finite sample, `None` if there are none.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        min_max(self.data.view())
    }
}

/// Smallest and largest finite value of any array view.
pub fn min_max<D : Dimension>(data : ArrayView<f32, D>) -> Option<(f32, f32)> {
    data.iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_skips_nonfinite() {
        let image = CalibratedImage::new(
            "test",
            array![[1.0, f32::NAN], [-3.0, f32::INFINITY]],
            Calibration::uncalibrated(),
        );
        assert_eq!(image.min_max(), Some((-3.0, 1.0)));
        assert_eq!(image.dimensions(), Dimensions::new(2, 2));

        let empty = Array2::<f32>::zeros((0, 0));
        assert_eq!(min_max(empty.view()), None);
    }
}
