//! Importer for `.wsf` scanning-probe instrument files.
//!
//! A `.wsf` file is a text export: free-text metadata lines
//! interleaved with tab-separated rows of samples. This crate
//! turns one into a spatially calibrated 32-bit float image,
//! writes it out as TIFF (or PNG/JPEG/text), and runs the
//! dark-noise calibration on TIFF stacks of dark frames.

use std::path::{Path, PathBuf};

mod data;
mod error;
mod file_data;
mod metadata;
mod wsf;
mod wsfreader;
mod utils;
pub mod analysis;
pub mod tiff;

pub use data::image::{
    CalibratedImage, Calibration, Dimensions, DimensionsError, ImageStack, SampleGrid, MICRON,
};
pub use error::WsfError;
pub use file_data::{image_prefix, Endian, FileType};
pub use metadata::{Metadata, MetadataField};
pub use utils::{output_dir, save_image, SaveFormat};
pub use wsf::{FieldValue, NumericKind, RequiredField, RequiredScalars, WsfData};
pub use wsfreader::WsfReader;

/// `parse_wsf(lines)` parses the lines of a `.wsf` file
/// already in memory.
///
/// ## Arguments
///
/// * `lines` - The file's lines, with or without trailing
/// line endings
///
/// ## Returns
///
/// * `Result<WsfData, WsfError>` - the metadata, the four
/// required scalars, the sample grid and its calibration
///
/// ## Example
///
/// ```
/// let lines = [
///     "Pixels in X = 2 samples",
///     "Lines in Y = 1 lines",
///     "X Range: 4.0 microns",
///     "Y Range: 2.0 microns",
///     "0.5\t1.5",
/// ];
/// let data = wsfkit::parse_wsf(&lines).unwrap();
/// assert_eq!(data.calibration.to_tuple(), (2.0, 2.0));
/// assert_eq!(data.grid.row(0).to_vec(), vec![0.5, 1.5]);
/// ```
pub fn parse_wsf<S : AsRef<str>>(lines : &[S]) -> Result<WsfData, WsfError> {
    wsf::parse(lines)
}

/// `open_wsf(filename)` opens a `.wsf` file, parses it,
/// and returns a `WsfReader` object.
///
/// ## Arguments
///
/// * `filename` - Path of the file to open
///
/// ## Example
///
/// ```rust, ignore
/// let reader = wsfkit::open_wsf("scan.wsf")?;
/// println!("{}", reader.calibration());
/// ```
pub fn open_wsf<P : AsRef<Path>>(filename : P) -> Result<WsfReader, WsfError> {
    WsfReader::open(filename)
}

/// `wsf_to_tiff(filename, save_path)` converts a `.wsf` file
/// to a calibrated 32-bit float `.tif` file.
///
/// ## Arguments
///
/// * `filename` - A string slice that holds the name of the file to open
/// * `save_path` - An optional string slice that holds the path
/// to save the converted file. If not specified, the file is saved
/// in the same directory as the original file, with the same name
/// but the extension `.tif`.
///
/// ## Returns
///
/// * `Result<PathBuf, WsfError>` - The path that was written
///
/// ## Example
///
/// ```rust, ignore
/// // Produces "scan.tif"
/// wsf_to_tiff("scan.wsf", None)?;
/// // Produces "other.tif"
/// wsf_to_tiff("scan.wsf", Some("other.tif"))?;
/// ```
pub fn wsf_to_tiff(filename : &str, save_path : Option<&str>) -> Result<PathBuf, WsfError> {
    let file_path = PathBuf::from(filename);

    let save_path : PathBuf = match save_path {
        Some(name) => PathBuf::from(name),
        None => file_path.with_extension("tif"),
    };

    let reader = WsfReader::open(&file_path)?;
    tiff::write_calibrated(&reader.into_image(), &save_path)?;
    Ok(save_path)
}

/// `dark_noise_from_file(path, exposures)` reads a TIFF stack of
/// dark frames and fits their mean gray level against exposure.
///
/// ## Arguments
///
/// * `path` - TIFF stack, one slice per exposure in ascending order
/// * `exposures` - Exposure of each slice in milliseconds
///
/// ## See also
///
/// * `analysis::dark_noise` for the in-memory version
pub fn dark_noise_from_file<P : AsRef<Path>>(
    path : P,
    exposures : &analysis::Exposures
) -> Result<analysis::DarkNoiseFit, WsfError> {
    let stack = tiff::read_stack(path)?;
    analysis::dark_noise(stack.view(), exposures)
}
