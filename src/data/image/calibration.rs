//! Spatial calibration: the physical size of one sample
//! along each axis.

/// Unit label applied to every imported `.wsf` image.
/// The instrument only reports ranges in microns.
pub const MICRON : &str = "micron";

/// Physical units per sample along x and y.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub pixel_width : f64,
    pub pixel_height : f64,
    pub unit : String,
}

impl Calibration {
    /// Derives the calibration from the physical extent of each
    /// axis and the number of samples along it. The caller is
    /// responsible for making sure neither count is zero.
    pub fn from_extent(x_range : f64, y_range : f64, width : usize, height : usize) -> Self {
        Calibration {
            pixel_width : x_range / width as f64,
            pixel_height : y_range / height as f64,
            unit : MICRON.to_string(),
        }
    }

    /// One sample per unit, no physical meaning.
    pub fn uncalibrated() -> Self {
        Calibration {
            pixel_width : 1.0,
            pixel_height : 1.0,
            unit : "pixel".to_string(),
        }
    }

    /// `(pixel_width, pixel_height)`
    pub fn to_tuple(&self) -> (f64, f64) {
        (self.pixel_width, self.pixel_height)
    }

    pub fn is_calibrated(&self) -> bool {
        self.unit != "pixel"
    }
}

impl std::fmt::Display for Calibration {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "pixel_width={} pixel_height={} unit={}",
            self.pixel_width,
            self.pixel_height,
            self.unit,
        )
    }
}
