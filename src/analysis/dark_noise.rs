//! Dark-noise calibration: how the mean gray level of a
//! camera's dark frames grows with exposure time.
//!
//! The input is a stack whose slices were taken with the lens
//! capped at increasing exposures. The mean of each slice is
//! fit against its exposure with a straight line, whose
//! intercept is the readout offset and whose slope is the
//! dark current in gray levels per millisecond.

use std::path::Path;

use itertools::izip;
use log::{info, warn};
use ndarray::prelude::*;
use rayon::prelude::*;

use crate::{
    analysis::linear_fit::{fit_straight_line, LineFit},
    data::image::Dimensions,
    error::WsfError,
};

/// Exposure sequence (ms) used when fewer than two are given
pub const DEFAULT_EXPOSURES_MS : [f64; 10] = [
    4.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0, 2000.0, 5000.0
];

/// Column names of the results table
const TABLE_HEADER : [&str; 2] = ["exposure_ms", "mean_gray_level"];

/// Exposure times in milliseconds, sorted ascending
#[derive(Debug, Clone, PartialEq)]
pub struct Exposures(Vec<f64>);

impl Exposures {
    /// Builds the exposure list the way it is entered by hand:
    /// values are taken until the first negative one, then sorted.
    /// Fewer than two values fall back to `DEFAULT_EXPOSURES_MS`.
    ///
    /// ## Example
    ///
    /// ```
    /// use wsfkit::analysis::Exposures;
    ///
    /// let exposures = Exposures::from_entries([100.0, 10.0, 50.0, -1.0, 7.0]);
    /// assert_eq!(exposures.as_slice(), &[10.0, 50.0, 100.0]);
    ///
    /// let exposures = Exposures::from_entries([-1.0]);
    /// assert_eq!(exposures.len(), 10);
    /// ```
    pub fn from_entries<I : IntoIterator<Item = f64>>(entries : I) -> Self {
        let mut exposures : Vec<f64> = entries.into_iter()
            .take_while(|v| *v >= 0.0)
            .collect();
        if exposures.len() < 2 {
            info!("Fewer than two exposures given, using the default sequence");
            return Exposures::default();
        }
        exposures.sort_by(|a, b| a.total_cmp(b));
        Exposures(exposures)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Exposures {
    fn default() -> Self {
        Exposures(DEFAULT_EXPOSURES_MS.to_vec())
    }
}

/// Result of a dark-noise run
#[derive(Debug, Clone, PartialEq)]
pub struct DarkNoiseFit {
    pub exposures : Vec<f64>,
    /// Mean gray level of each slice used, same order as `exposures`
    pub levels : Vec<f64>,
    pub fit : LineFit,
}

/// Mean intensity of every slice of a `(slices, height, width)`
/// stack, in slice order. Slices are averaged in parallel.
pub fn slice_means(stack : ArrayView3<f32>) -> Vec<f64> {
    stack.axis_iter(Axis(0))
        .into_par_iter()
        .map(|slice| {
            let sum : f64 = slice.iter().map(|&v| v as f64).sum();
            sum / slice.len() as f64
        })
        .collect()
}

/// Fits the mean gray level of the first `exposures.len()` slices
/// of `stack` against the exposures.
///
/// ## Errors
///
/// * `WsfError::StackTooSmall` - fewer slices than exposures
/// * `WsfError::Dimensions` - slices with no pixels
/// * `WsfError::Fit` - the exposures are all equal
pub fn dark_noise(stack : ArrayView3<f32>, exposures : &Exposures) -> Result<DarkNoiseFit, WsfError> {
    let (slices, height, width) = stack.dim();
    Dimensions::new(width, height).require_nonempty()?;

    if slices < exposures.len() {
        return Err(WsfError::StackTooSmall { slices, exposures : exposures.len() });
    }
    if slices > exposures.len() {
        warn!(
            "Stack has {} slices but only {} exposures, ignoring the last {}",
            slices, exposures.len(), slices - exposures.len()
        );
    }

    let levels = slice_means(stack.slice(s![..exposures.len(), .., ..]));
    let fit = fit_straight_line(exposures.as_slice(), &levels)?;

    info!(
        "slope={} ; intercept={} ; rSquared={}",
        fit.slope, fit.intercept, fit.r_squared
    );

    Ok(DarkNoiseFit {
        exposures : exposures.as_slice().to_vec(),
        levels,
        fit,
    })
}

impl DarkNoiseFit {
    /// Gray level predicted by the fit at exposure `x`
    pub fn evaluate(&self, x : f64) -> f64 {
        self.fit.evaluate(x)
    }

    /// Writes the exposures and measured levels as a CSV table.
    pub fn write_table<P : AsRef<Path>>(&self, path : P) -> Result<(), WsfError> {
        let mut writer = csv::Writer::from_path(path.as_ref())?;
        writer.write_record(TABLE_HEADER)?;
        for (exposure, level) in izip!(&self.exposures, &self.levels) {
            writer.write_record(&[exposure.to_string(), level.to_string()])?;
        }
        writer.flush()?;
        info!("Wrote results table to {}", path.as_ref().display());
        Ok(())
    }
}

impl std::fmt::Display for DarkNoiseFit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "y = a+bx")?;
        writeln!(f, "a = {:.2}", self.fit.intercept)?;
        writeln!(f, "b = {:.2}", self.fit.slope)?;
        write!(f, "R squared = {:.3}", self.fit.r_squared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A stack whose slice `i` is uniformly `offset + rate * exposure_i`
    fn linear_stack(exposures : &[f64], offset : f64, rate : f64) -> Array3<f32> {
        let mut stack = Array3::<f32>::zeros((exposures.len(), 4, 6));
        for (mut slice, &e) in stack.outer_iter_mut().zip(exposures) {
            slice.fill((offset + rate * e) as f32);
        }
        stack
    }

    #[test]
    fn exposures_parsing() {
        let exposures = Exposures::from_entries([20.0, 5.0, 10.0, -1.0]);
        assert_eq!(exposures.as_slice(), &[5.0, 10.0, 20.0]);

        let exposures = Exposures::from_entries([20.0, -1.0, 5.0]);
        assert_eq!(exposures, Exposures::default());

        let exposures = Exposures::from_entries(Vec::new());
        assert_eq!(exposures.as_slice(), &DEFAULT_EXPOSURES_MS);
    }

    #[test]
    fn means_in_slice_order() {
        let stack = Array3::from_shape_fn((5, 3, 3), |(z, y, x)| (z * 10 + y + x) as f32);
        // mean of y + x over a 3 x 3 slice is 2
        assert_eq!(slice_means(stack.view()), vec![2.0, 12.0, 22.0, 32.0, 42.0]);
    }

    #[test]
    fn recovers_offset_and_rate() {
        let exposures = Exposures::default();
        let stack = linear_stack(exposures.as_slice(), 100.0, 0.5);
        let result = dark_noise(stack.view(), &exposures).unwrap();
        assert!((result.fit.slope - 0.5).abs() < 1e-6);
        assert!((result.fit.intercept - 100.0).abs() < 1e-3);
        assert!((result.fit.r_squared - 1.0).abs() < 1e-9);
        assert!((result.evaluate(1000.0) - 600.0).abs() < 1e-2);
        assert_eq!(result.levels.len(), 10);
    }

    #[test]
    fn extra_slices_are_ignored() {
        let exposures = Exposures::from_entries([1.0, 2.0, 3.0]);
        let mut stack = linear_stack(&[1.0, 2.0, 3.0, 4.0], 0.0, 2.0);
        stack.slice_mut(s![3, .., ..]).fill(1.0e6);
        let result = dark_noise(stack.view(), &exposures).unwrap();
        assert_eq!(result.levels, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn too_few_slices() {
        let exposures = Exposures::default();
        let stack = linear_stack(&[1.0, 2.0], 0.0, 1.0);
        match dark_noise(stack.view(), &exposures) {
            Err(WsfError::StackTooSmall { slices, exposures }) => {
                assert_eq!((slices, exposures), (2, 10));
            },
            other => panic!("Expected StackTooSmall, got {:?}", other),
        }
    }

    #[test]
    fn summary_text() {
        let result = DarkNoiseFit {
            exposures : vec![1.0, 2.0],
            levels : vec![3.0, 5.0],
            fit : LineFit { intercept : 1.0, slope : 2.0, r_squared : 1.0 },
        };
        assert_eq!(
            result.to_string(),
            "y = a+bx\na = 1.00\nb = 2.00\nR squared = 1.000"
        );
    }
}
