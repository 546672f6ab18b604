//! Importer for the `.wsf` text exports of AFMWorkshop
//! atomic force microscopes.
//!
//! A `.wsf` file interleaves free-text header lines with
//! tab-separated rows of height samples. The header declares
//! the number of samples along each axis and the physical size
//! of the scan, from which the spatial calibration follows.

mod fields;
mod parser;

pub use fields::{FieldValue, NumericKind, RequiredField};
pub use parser::{parse, RequiredScalars, WsfData};
