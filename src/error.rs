//! The crate-wide error type. Parsing, TIFF I/O and the
//! analysis code all report through `WsfError` so callers
//! only ever have to match on one enum.

use thiserror::Error;

use crate::data::image::DimensionsError;

/// Errors that can occur while importing a `.wsf` file,
/// reading or writing TIFF data, or running an analysis.
#[derive(Debug, Error)]
pub enum WsfError {
    /// One of the four required scalars is absent, not numeric,
    /// or zero where a sample count is expected.
    #[error("Error parsing metadata, this may not be a wsf file: `{field}` missing or invalid")]
    MissingMetadata { field : &'static str },

    /// Fewer qualifying data rows than the declared height.
    #[error("Incomplete sample grid: expected {expected} rows, found {found}")]
    IncompleteGrid { expected : usize, found : usize },

    /// A data row contained a token that is not a number.
    #[error("Malformed numeric token `{token}` on line {line}")]
    MalformedToken { line : usize, token : String },

    #[error("Wrong file type: {0}")]
    WrongFileType(String),

    #[error("DimensionsError: {0}")]
    Dimensions(#[from] DimensionsError),

    /// Valid I/O, but TIFF content this crate cannot handle.
    #[error("Unsupported or invalid TIFF: {0}")]
    Tiff(String),

    #[error("Stack size ({slices}) smaller than the number of exposures ({exposures})")]
    StackTooSmall { slices : usize, exposures : usize },

    #[error("Fit failed: {0}")]
    Fit(String),

    #[error("IOError: {0}")]
    Io(#[from] std::io::Error),

    #[error("Binary format error: {0}")]
    Binrw(#[from] binrw::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Timestamp formatting error: {0}")]
    Time(#[from] time::error::Format),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
