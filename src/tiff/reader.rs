//! Reads uncompressed grayscale TIFF files (single images or
//! multi-page stacks) into `f32` arrays.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use binrw::{BinRead, Endian};
use bytemuck::allocation::pod_collect_to_vec;
use log::debug;
use ndarray::prelude::*;

use crate::{
    data::image::{Calibration, CalibratedImage, Dimensions, ImageStack},
    error::WsfError,
    file_data::FileType,
    tiff::{
        ifd::{IFDIterator, TiffHeader, IFD, BIGTIFF_MAGIC, TIFF_MAGIC},
        tags::TiffTagID,
    },
};

/// How the samples of one page are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SampleType {
    U8,
    U16,
    U32,
    F32,
}

impl SampleType {
    fn bytes(&self) -> usize {
        match self {
            SampleType::U8 => 1,
            SampleType::U16 => 2,
            SampleType::U32 | SampleType::F32 => 4,
        }
    }
}

/// Everything needed to pull the samples of one page
struct Page {
    dimensions : Dimensions,
    sample_type : SampleType,
    strip_offsets : Vec<u64>,
    strip_byte_counts : Vec<u64>,
}

impl Page {
    fn from_ifd<R : Read + Seek>(ifd : &IFD, reader : &mut R, endian : Endian)
    -> Result<Self, WsfError> {
        let dimensions = ifd.dimensions(reader, endian)?;

        let compression = ifd.scalar(TiffTagID::Compression, reader, endian)?.unwrap_or(1);
        if compression != 1 {
            return Err(WsfError::Tiff(format!("Compression {} is not supported", compression)));
        }
        let samples_per_pixel = ifd.scalar(TiffTagID::SamplesPerPixel, reader, endian)?.unwrap_or(1);
        if samples_per_pixel != 1 {
            return Err(WsfError::Tiff(
                format!("{} samples per pixel, only grayscale is supported", samples_per_pixel)
            ));
        }

        let bits = ifd.scalar(TiffTagID::BitsPerSample, reader, endian)?.unwrap_or(1);
        let format = ifd.scalar(TiffTagID::SampleFormat, reader, endian)?.unwrap_or(1);
        let sample_type = match (bits, format) {
            (8, 1) => SampleType::U8,
            (16, 1) => SampleType::U16,
            (32, 1) => SampleType::U32,
            (32, 3) => SampleType::F32,
            _ => return Err(WsfError::Tiff(
                format!("{}-bit samples of format {} are not supported", bits, format)
            )),
        };

        let strip_offsets = ifd.require_tag(TiffTagID::StripOffsets)?.values(reader, endian)?;
        let strip_byte_counts = ifd.require_tag(TiffTagID::StripByteCounts)?.values(reader, endian)?;
        if strip_offsets.len() != strip_byte_counts.len() {
            return Err(WsfError::Tiff("Strip offsets and byte counts disagree".to_string()));
        }

        Ok(Page { dimensions, sample_type, strip_offsets, strip_byte_counts })
    }

    /// Reads every strip of the page and writes the decoded
    /// samples into `frame`, viewed as a 2d `(height, width)` array.
    fn load<R : Read + Seek>(&self, reader : &mut R, endian : Endian, frame : &mut ArrayViewMut2<f32>)
    -> Result<(), WsfError> {
        let expected = self.dimensions.num_samples() * self.sample_type.bytes();
        let mut data : Vec<u8> = Vec::with_capacity(expected);
        for (&offset, &count) in self.strip_offsets.iter().zip(self.strip_byte_counts.iter()) {
            let remaining = expected - data.len();
            let take = (count as usize).min(remaining);
            reader.seek(SeekFrom::Start(offset))?;
            let start = data.len();
            data.resize(start + take, 0);
            reader.read_exact(&mut data[start..])?;
            if data.len() == expected {
                break;
            }
        }
        if data.len() < expected {
            return Err(WsfError::Tiff(
                format!("Strips hold {} bytes, frame needs {}", data.len(), expected)
            ));
        }

        let samples = decode(&data, self.sample_type, endian);
        frame.iter_mut().zip(samples).for_each(|(px, v)| *px = v);
        Ok(())
    }
}

/// Converts raw sample bytes in the file's byte order into `f32`
fn decode(data : &[u8], sample_type : SampleType, endian : Endian) -> Vec<f32> {
    let little = endian == Endian::Little;
    match sample_type {
        SampleType::U8 => data.iter().map(|&v| v as f32).collect(),
        SampleType::U16 => pod_collect_to_vec::<u8, u16>(data).into_iter()
            .map(|v| (if little { u16::from_le(v) } else { u16::from_be(v) }) as f32)
            .collect(),
        SampleType::U32 => pod_collect_to_vec::<u8, u32>(data).into_iter()
            .map(|v| (if little { u32::from_le(v) } else { u32::from_be(v) }) as f32)
            .collect(),
        SampleType::F32 => pod_collect_to_vec::<u8, u32>(data).into_iter()
            .map(|v| f32::from_bits(if little { u32::from_le(v) } else { u32::from_be(v) }))
            .collect(),
    }
}

/// Reads the header and every image IFD. Reduced-resolution
/// pages (`NewSubfileType` bit 0) are skipped.
fn read_ifds<R : Read + Seek>(reader : &mut R) -> Result<(Endian, Vec<IFD>), WsfError> {
    let endian : Endian = FileType::discern_tiff(reader)
        .ok_or_else(|| WsfError::Tiff("Not a TIFF file".to_string()))?
        .into();

    reader.seek(SeekFrom::Start(0))?;
    let header = TiffHeader::read_options(reader, endian, ())?;
    match header.magic {
        TIFF_MAGIC => {},
        BIGTIFF_MAGIC => return Err(WsfError::Tiff("BigTIFF is not supported".to_string())),
        other => return Err(WsfError::Tiff(format!("Invalid TIFF magic number {}", other))),
    }

    let mut ifds = Vec::new();
    for ifd in IFDIterator::new(reader, endian, header.first_ifd) {
        ifds.push(ifd?);
    }
    let mut images = Vec::with_capacity(ifds.len());
    for ifd in ifds {
        let subfile = ifd.scalar(TiffTagID::NewSubfileType, reader, endian)?.unwrap_or(0);
        if subfile & 1 == 0 {
            images.push(ifd);
        }
    }
    if images.is_empty() {
        return Err(WsfError::Tiff("File contains no images".to_string()));
    }
    Ok((endian, images))
}

/// Reads all pages of a TIFF into a `(slices, height, width)` stack.
///
/// ## Arguments
///
/// * `reader` - A reader pointing anywhere in a TIFF file
///
/// ## Errors
///
/// * `WsfError::Tiff` - compressed, color, or otherwise unsupported data
/// * `WsfError::Dimensions` - pages of different sizes
pub fn read_stack_from<R : Read + Seek>(reader : &mut R) -> Result<ImageStack, WsfError> {
    let (endian, ifds) = read_ifds(reader)?;

    let pages = ifds.iter()
        .map(|ifd| Page::from_ifd(ifd, reader, endian))
        .collect::<Result<Vec<_>, _>>()?;

    let dims = Dimensions::consistent(pages.iter().map(|p| p.dimensions))?;
    dims.require_nonempty()?;

    let mut stack = Array3::<f32>::zeros((pages.len(), dims.ydim, dims.xdim));
    for (page, mut frame) in pages.iter().zip(stack.outer_iter_mut()) {
        page.load(reader, endian, &mut frame)?;
    }

    debug!("Read {} pages of {} x {}", pages.len(), dims.xdim, dims.ydim);
    Ok(stack)
}

/// Opens a TIFF file and reads it into a stack, see `read_stack_from`.
pub fn read_stack<P : AsRef<Path>>(path : P) -> Result<ImageStack, WsfError> {
    let file = File::open(path.as_ref())?;
    let mut reader = BufReader::new(file);
    read_stack_from(&mut reader)
}

/// Reads the spatial calibration of the first page: the pixel
/// size is the inverse of `XResolution`/`YResolution` and the
/// unit comes from an ImageJ-style `unit=` line in the image
/// description. Without a unit the image is uncalibrated.
fn read_calibration<R : Read + Seek>(ifd : &IFD, reader : &mut R, endian : Endian)
-> Result<Calibration, WsfError> {
    let unit = match ifd.get_tag(TiffTagID::ImageDescription) {
        Some(entry) => entry.ascii(reader, endian)?
            .lines()
            .find_map(|line| line.strip_prefix("unit=").map(str::to_string)),
        None => None,
    };
    let Some(unit) = unit else {
        return Ok(Calibration::uncalibrated());
    };

    let mut pixel_size = |tag : TiffTagID| -> Result<f64, WsfError> {
        match ifd.get_tag(tag) {
            Some(entry) => {
                let (num, den) = entry.rational(reader, endian)?;
                if num == 0 {
                    Ok(1.0)
                } else {
                    Ok(den as f64 / num as f64)
                }
            },
            None => Ok(1.0),
        }
    };

    Ok(Calibration {
        pixel_width : pixel_size(TiffTagID::XResolution)?,
        pixel_height : pixel_size(TiffTagID::YResolution)?,
        unit,
    })
}

/// Reads the first page of a TIFF file together with its calibration.
pub fn read_image<P : AsRef<Path>>(path : P) -> Result<CalibratedImage, WsfError> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let (endian, ifds) = read_ifds(&mut reader)?;

    let page = Page::from_ifd(&ifds[0], &mut reader, endian)?;
    page.dimensions.require_nonempty()?;
    let mut data = Array2::<f32>::zeros(page.dimensions.to_tuple());
    page.load(&mut reader, endian, &mut data.view_mut())?;

    let calibration = read_calibration(&ifds[0], &mut reader, endian)?;
    let title = path.file_name()
        .map(|n| crate::file_data::image_prefix(&n.to_string_lossy()).to_string())
        .unwrap_or_default();

    Ok(CalibratedImage::new(&title, data, calibration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use binrw::BinWrite;

    use crate::tiff::{ifd::IfdEntry, tags::FieldType};

    /// A big-endian 16-bit, two-page, 2 x 2 stack written by hand
    fn big_endian_stack() -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let header = TiffHeader { byte_order : *b"MM", magic : TIFF_MAGIC, first_ifd : 8 };
        header.write_options(&mut cursor, Endian::Big, ()).unwrap();

        let entries = |offset : u32| vec![
            IfdEntry { tag : 256, field_type : FieldType::Short as u16, count : 1, value : [0, 2, 0, 0] },
            IfdEntry { tag : 257, field_type : FieldType::Short as u16, count : 1, value : [0, 2, 0, 0] },
            IfdEntry { tag : 258, field_type : FieldType::Short as u16, count : 1, value : [0, 16, 0, 0] },
            IfdEntry { tag : 273, field_type : FieldType::Long as u16, count : 1, value : offset.to_be_bytes() },
            IfdEntry { tag : 279, field_type : FieldType::Long as u16, count : 1, value : 8u32.to_be_bytes() },
        ];
        // header(8) + ifd(66) + data(8) + ifd(66) + data(8)
        let first = IFD::new(entries(74), 82);
        first.write_options(&mut cursor, Endian::Big, ()).unwrap();
        for v in [1u16, 2, 3, 4] {
            cursor.write_all(&v.to_be_bytes()).unwrap();
        }
        let second = IFD::new(entries(148), 0);
        second.write_options(&mut cursor, Endian::Big, ()).unwrap();
        for v in [10u16, 20, 30, 40] {
            cursor.write_all(&v.to_be_bytes()).unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn reads_big_endian_stack() {
        let stack = read_stack_from(&mut Cursor::new(big_endian_stack())).unwrap();
        assert_eq!(stack.shape(), &[2, 2, 2]);
        assert_eq!(stack.slice(s![0, .., ..]), array![[1.0f32, 2.0], [3.0, 4.0]]);
        assert_eq!(stack.slice(s![1, .., ..]), array![[10.0f32, 20.0], [30.0, 40.0]]);
    }

    #[test]
    fn rejects_non_tiff() {
        let result = read_stack_from(&mut Cursor::new(b"PK\x03\x04".to_vec()));
        assert!(matches!(result, Err(WsfError::Tiff(_))));
    }

    #[test]
    fn decode_floats() {
        let bytes : Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_le_bytes()).collect();
        assert_eq!(decode(&bytes, SampleType::F32, Endian::Little), vec![1.5, -2.0]);
        let bytes : Vec<u8> = [1.5f32, -2.0].iter().flat_map(|v| v.to_be_bytes()).collect();
        assert_eq!(decode(&bytes, SampleType::F32, Endian::Big), vec![1.5, -2.0]);
    }
}
