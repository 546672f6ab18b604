//! This module contains the implementation of the file data
//! information -- purely for naming and type checks, does not
//! know about images or calibration.

pub mod file_types;

pub use file_types::{FileType, Endian, image_prefix};
