//! Writes 32-bit floating point TIFF files whose resolution
//! tags and ImageJ-style description carry the spatial
//! calibration, so the pixel size survives a round trip
//! through other imaging software.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use binrw::{BinWrite, Endian};
use log::{info, warn};
use ndarray::prelude::*;

use crate::{
    data::image::{min_max, Calibration, CalibratedImage},
    error::WsfError,
    tiff::{
        ifd::{IfdEntry, TiffHeader, IFD},
        tags::{FieldType, TiffTagID},
    },
};

/// Version string written into the image description
const IMAGEJ_VERSION : &str = "1.54f";
const HEADER_SIZE : u32 = 8;
const BYTES_PER_SAMPLE : u32 = 4;

/// `XResolution`/`YResolution` for a pixel size, as samples
/// per unit. Uses a denominator of 1 000 000, or 1 000 when
/// there are more than 1 000 samples per unit, so the
/// numerator stays within a `u32`.
fn resolution_rational(pixel_size : f64) -> Option<[u32; 2]> {
    if !pixel_size.is_finite() || pixel_size <= 0.0 {
        return None;
    }
    let scale_per_unit = 1.0 / pixel_size;
    let denominator = if scale_per_unit > 1000.0 { 1_000.0 } else { 1_000_000.0 };
    let numerator = (scale_per_unit * denominator).round();
    if numerator < 1.0 || numerator > u32::MAX as f64 {
        return None;
    }
    Some([numerator as u32, denominator as u32])
}

/// ImageJ reads the unit and display range from these lines
fn description(calibration : &Calibration, n_images : usize, range : Option<(f32, f32)>) -> Vec<u8> {
    let mut text = format!("ImageJ={}\n", IMAGEJ_VERSION);
    if n_images > 1 {
        text.push_str(&format!("images={}\nslices={}\n", n_images, n_images));
    }
    if calibration.is_calibrated() {
        text.push_str(&format!("unit={}\n", calibration.unit));
    }
    if let Some((lo, hi)) = range {
        text.push_str(&format!("min={}\nmax={}\n", lo, hi));
    }
    let mut bytes = text.into_bytes();
    bytes.push(0);
    bytes
}

fn too_large() -> WsfError {
    WsfError::Tiff("Image too large for classic TIFF".to_string())
}

/// Bytes of one page of `f32` samples. Classic TIFF offsets are
/// `u32`, so a page of 4 GiB or more cannot be stored.
fn page_data_len(width : usize, height : usize) -> Result<u32, WsfError> {
    (width as u64).checked_mul(height as u64)
        .and_then(|n| n.checked_mul(BYTES_PER_SAMPLE as u64))
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(too_large)
}

/// Size of the whole file `write_pages` produces, refused when
/// its last byte would not be addressable by a `u32` offset.
fn file_size(n_pages : usize, data_len : u32, desc_len : usize) -> Result<u32, WsfError> {
    let first_ifd = 2 + 12 * 15 + 4;
    let other_ifd = 2 + 12 * 14 + 4;
    let per_page = other_ifd + 16 + data_len as u64;
    (n_pages as u64).checked_sub(1)
        .and_then(|rest| rest.checked_mul(per_page))
        .and_then(|rest| rest.checked_add(HEADER_SIZE as u64 + first_ifd + 16 + data_len as u64))
        .and_then(|total| total.checked_add(desc_len as u64))
        .and_then(|total| u32::try_from(total).ok())
        .ok_or_else(too_large)
}

/// `start + len` as a `u32` file offset
fn offset_after(start : u32, len : u64) -> Result<u32, WsfError> {
    (start as u64).checked_add(len)
        .and_then(|end| u32::try_from(end).ok())
        .ok_or_else(too_large)
}

/// Writes every `(height, width)` plane of `pages` as one page
/// of a little-endian TIFF. The first page carries the description.
///
/// Layout per page: IFD, description (first page only, padded
/// to an even length), the two resolution rationals, then the
/// samples as a single strip.
///
/// ## Errors
///
/// * `WsfError::Tiff` - an empty image, or one too large for
/// the 32-bit offsets of a classic TIFF
pub fn write_pages<W : Write + Seek>(
    writer : &mut W,
    pages : ArrayView3<f32>,
    calibration : &Calibration,
) -> Result<(), WsfError> {
    let (n_pages, height, width) = pages.dim();
    if n_pages == 0 || height == 0 || width == 0 {
        return Err(WsfError::Tiff("Cannot write an empty image".to_string()));
    }

    // unit and resolution are stored together or not at all
    let uncalibrated = Calibration::uncalibrated();
    let (x_res, y_res, stored) = match (
        resolution_rational(calibration.pixel_width),
        resolution_rational(calibration.pixel_height),
    ) {
        (Some(x), Some(y)) => (x, y, calibration),
        _ => {
            warn!("Calibration {} cannot be stored, writing the image uncalibrated", calibration);
            ([1, 1], [1, 1], &uncalibrated)
        }
    };

    let mut desc = description(stored, n_pages, min_max(pages));
    let desc_count = desc.len() as u32;
    if desc.len() % 2 == 1 {
        desc.push(0);
    }

    let data_len = page_data_len(width, height)?;
    file_size(n_pages, data_len, desc.len())?;
    TiffHeader::little(HEADER_SIZE).write_options(writer, Endian::Little, ())?;

    let mut page_start = HEADER_SIZE;
    for (idx, page) in pages.outer_iter().enumerate() {
        let first = idx == 0;
        let n_tags : u64 = if first { 15 } else { 14 };
        let desc_offset = offset_after(page_start, 2 + 12 * n_tags + 4)?;
        let x_res_offset = offset_after(desc_offset, if first { desc.len() as u64 } else { 0 })?;
        let y_res_offset = offset_after(x_res_offset, 8)?;
        let data_offset = offset_after(y_res_offset, 8)?;
        let page_end = offset_after(data_offset, data_len as u64)?;
        let next_ifd = if idx + 1 < n_pages { page_end } else { 0 };

        let mut tags = vec![
            IfdEntry::long(TiffTagID::NewSubfileType, 0),
            IfdEntry::long(TiffTagID::ImageWidth, width as u32),
            IfdEntry::long(TiffTagID::ImageLength, height as u32),
            IfdEntry::short(TiffTagID::BitsPerSample, 32),
            IfdEntry::short(TiffTagID::Compression, 1),
            // BlackIsZero
            IfdEntry::short(TiffTagID::PhotometricInterpretation, 1),
        ];
        if first {
            tags.push(IfdEntry::pointer(
                TiffTagID::ImageDescription, FieldType::Ascii, desc_count, desc_offset
            ));
        }
        tags.extend([
            IfdEntry::long(TiffTagID::StripOffsets, data_offset),
            IfdEntry::short(TiffTagID::SamplesPerPixel, 1),
            IfdEntry::long(TiffTagID::RowsPerStrip, height as u32),
            IfdEntry::long(TiffTagID::StripByteCounts, data_len),
            IfdEntry::pointer(TiffTagID::XResolution, FieldType::Rational, 1, x_res_offset),
            IfdEntry::pointer(TiffTagID::YResolution, FieldType::Rational, 1, y_res_offset),
            // No absolute unit, the real one is in the description
            IfdEntry::short(TiffTagID::ResolutionUnit, 1),
            // IEEE floating point
            IfdEntry::short(TiffTagID::SampleFormat, 3),
        ]);

        IFD::new(tags, next_ifd).write_options(writer, Endian::Little, ())?;
        if first {
            writer.write_all(&desc)?;
        }
        x_res.write_options(writer, Endian::Little, ())?;
        y_res.write_options(writer, Endian::Little, ())?;

        let words : Vec<u32> = page.iter().map(|v| v.to_bits().to_le()).collect();
        writer.write_all(bytemuck::cast_slice(&words))?;

        page_start = page_end;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a calibrated image as a single-page float TIFF.
///
/// ## Arguments
///
/// * `image` - The image to save
/// * `path` - Where to write it. Existing files are overwritten.
///
/// ## Example
///
/// ```rust, ignore
/// let reader = wsfkit::open_wsf("scan.wsf")?;
/// wsfkit::tiff::write_calibrated(&reader.to_image(), "scan.tif")?;
/// ```
pub fn write_calibrated<P : AsRef<Path>>(image : &CalibratedImage, path : P) -> Result<(), WsfError> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    let pages = image.data.view().insert_axis(Axis(0));
    write_pages(&mut writer, pages, &image.calibration)?;
    info!("Wrote {} to {}", image.title, path.as_ref().display());
    Ok(())
}

/// Writes a stack of frames as a multi-page float TIFF.
pub fn write_stack<P : AsRef<Path>>(
    stack : ArrayView3<f32>,
    calibration : &Calibration,
    path : P
) -> Result<(), WsfError> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_pages(&mut writer, stack, calibration)?;
    info!("Wrote {} slices to {}", stack.len_of(Axis(0)), path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::tiff::reader::read_stack_from;

    #[test]
    fn rationals() {
        assert_eq!(resolution_rational(0.5), Some([2_000_000, 1_000_000]));
        assert_eq!(resolution_rational(0.0001), Some([10_000_000, 1_000]));
        assert_eq!(resolution_rational(0.0), None);
        assert_eq!(resolution_rational(f64::NAN), None);
    }

    #[test]
    fn description_lines() {
        let cal = Calibration::from_extent(3.0, 2.0, 3, 2);
        let desc = description(&cal, 1, Some((1.0, 6.0)));
        assert_eq!(desc, b"ImageJ=1.54f\nunit=micron\nmin=1\nmax=6\n\0".to_vec());

        let desc = description(&Calibration::uncalibrated(), 3, None);
        assert_eq!(desc, b"ImageJ=1.54f\nimages=3\nslices=3\n\0".to_vec());
    }

    #[test]
    fn stack_round_trip() {
        let stack = Array3::from_shape_fn((3, 4, 5), |(z, y, x)| (z * 100 + y * 10 + x) as f32 - 0.5);
        let mut cursor = Cursor::new(Vec::new());
        write_pages(&mut cursor, stack.view(), &Calibration::uncalibrated()).unwrap();

        cursor.set_position(0);
        let read = read_stack_from(&mut cursor).unwrap();
        assert_eq!(read, stack);
    }

    #[test]
    fn classic_tiff_size_limit() {
        assert_eq!(page_data_len(100, 100).unwrap(), 40_000);
        assert!(page_data_len(32768, 32768).is_err());
        assert!(page_data_len(usize::MAX, 2).is_err());

        // 1 MiB pages: about four thousand fit below 4 GiB
        let data_len = page_data_len(512, 512).unwrap();
        assert!(file_size(1, data_len, 40).is_ok());
        assert!(file_size(4000, data_len, 40).is_ok());
        assert!(file_size(4100, data_len, 40).is_err());

        assert_eq!(offset_after(8, 30).unwrap(), 38);
        assert!(offset_after(u32::MAX - 4, 8).is_err());
    }

    #[test]
    fn unstorable_calibration_is_written_uncalibrated() {
        let cal = Calibration { pixel_width : 0.0, pixel_height : 1.0, unit : "micron".to_string() };
        let image = Array3::from_elem((1, 2, 2), 1.0f32);
        let mut cursor = Cursor::new(Vec::new());
        write_pages(&mut cursor, image.view(), &cal).unwrap();
        let bytes = cursor.into_inner();
        assert!(!bytes.windows(5).any(|w| w == b"unit="));
        assert!(bytes.windows(12).any(|w| w == b"ImageJ=1.54f"));
    }

    #[test]
    fn empty_image_is_refused() {
        let stack = Array3::<f32>::zeros((1, 0, 5));
        let mut cursor = Cursor::new(Vec::new());
        assert!(write_pages(&mut cursor, stack.view(), &Calibration::uncalibrated()).is_err());
    }
}
