//! Measurements made on imported images and stacks.

mod dark_noise;
mod linear_fit;

pub use dark_noise::{dark_noise, slice_means, DarkNoiseFit, Exposures, DEFAULT_EXPOSURES_MS};
pub use linear_fit::{fit_straight_line, LineFit};
