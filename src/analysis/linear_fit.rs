//! Ordinary least squares for `y = a + bx`.

use itertools::izip;

use crate::error::WsfError;

/// Parameters of a fitted straight line `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept : f64,
    pub slope : f64,
    /// `1 - SSE/SSD`: residual sum of squares over the total
    /// sum of squares about the mean of `y`
    pub r_squared : f64,
}

impl LineFit {
    pub fn evaluate(&self, x : f64) -> f64 {
        self.intercept + self.slope * x
    }
}

fn mean(values : &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fits a straight line through `(x, y)` pairs.
///
/// ## Errors
///
/// * `WsfError::Fit` - if `x` and `y` differ in length, there are
/// fewer than two points, or all `x` values are equal
///
/// ## Example
///
/// ```
/// use wsfkit::analysis::fit_straight_line;
///
/// let fit = fit_straight_line(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
/// assert_eq!((fit.intercept, fit.slope), (1.0, 2.0));
/// assert_eq!(fit.r_squared, 1.0);
/// ```
pub fn fit_straight_line(x : &[f64], y : &[f64]) -> Result<LineFit, WsfError> {
    if x.len() != y.len() {
        return Err(WsfError::Fit(
            format!("{} x values but {} y values", x.len(), y.len())
        ));
    }
    if x.len() < 2 {
        return Err(WsfError::Fit("At least two points are needed".to_string()));
    }

    let (mean_x, mean_y) = (mean(x), mean(y));
    let (sxx, sxy) = izip!(x, y).fold((0.0, 0.0), |(sxx, sxy), (&xi, &yi)| {
        let dx = xi - mean_x;
        (sxx + dx * dx, sxy + dx * (yi - mean_y))
    });
    if sxx == 0.0 {
        return Err(WsfError::Fit("All x values are equal".to_string()));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let (sse, ssd) = izip!(x, y).fold((0.0, 0.0), |(sse, ssd), (&xi, &yi)| {
        let residual = yi - (intercept + slope * xi);
        let deviation = yi - mean_y;
        (sse + residual * residual, ssd + deviation * deviation)
    });
    let r_squared = if ssd > 0.0 { 1.0 - sse / ssd } else { 1.0 };

    Ok(LineFit { intercept, slope, r_squared })
}
