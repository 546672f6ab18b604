//! This module contains the implementation of the TIFF
//! I/O -- reading grayscale stacks and writing calibrated
//! float images. It knows about samples and calibration,
//! but not about where the data came from.

mod ifd;
mod reader;
mod tags;
mod writer;

pub use tags::{FieldType, TiffTagID};
pub use ifd::{IfdEntry, IFDIterator, TiffHeader, IFD};
pub use reader::{read_image, read_stack, read_stack_from};
pub use writer::{write_calibrated, write_pages, write_stack};
