//! Output plumbing shared by the binaries: where results
//! go and the formats an image can be saved in.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{GrayImage, ImageFormat};
use itertools::Itertools;
use log::{debug, info};
use time::{macros::format_description, OffsetDateTime};

use crate::{
    data::image::{CalibratedImage, DimensionsError},
    error::WsfError,
    tiff,
};

/// `YYYYMMDDHHMM` of the local time, or of UTC when the local
/// offset cannot be determined.
fn timestamp() -> Result<String, WsfError> {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    Ok(now.format(format_description!("[year][month][day][hour][minute]"))?)
}

/// Creates (or reuses) the directory results of a run are saved to.
///
/// ## Arguments
///
/// * `input_dir` - Directory of the input file; the output goes beside it
/// * `input_prefix` - Input file name without its extension
/// * `output_prefix` - Name of the operation, e.g. `DarkNoise`
/// * `no_date` - Omit the `_YYYYMMDDHHMM` suffix
///
/// ## Returns
///
/// `<input_dir>/<input_prefix>_<output_prefix>_Output[_YYYYMMDDHHMM]`
pub fn output_dir<P : AsRef<Path>>(
    input_dir : P,
    input_prefix : &str,
    output_prefix : &str,
    no_date : bool,
) -> Result<PathBuf, WsfError> {
    let mut name = format!("{}_{}_Output", input_prefix, output_prefix);
    if !no_date {
        name.push('_');
        name.push_str(&timestamp()?);
    }
    let dir = input_dir.as_ref().join(name);
    if dir.is_dir() {
        debug!("Reusing output directory {}", dir.display());
    } else {
        fs::create_dir_all(&dir)?;
        info!("Created output directory {}", dir.display());
    }
    Ok(dir)
}

/// Formats `save_image` can write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Tiff,
    Png,
    Jpeg,
    Txt,
}

impl SaveFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Tiff => "tif",
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Txt => "txt",
        }
    }
}

impl FromStr for SaveFormat {
    type Err = WsfError;

    fn from_str(s : &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tif" | "tiff" => Ok(SaveFormat::Tiff),
            "png" => Ok(SaveFormat::Png),
            "jpg" | "jpeg" => Ok(SaveFormat::Jpeg),
            "txt" => Ok(SaveFormat::Txt),
            _ => Err(WsfError::WrongFileType(format!("Unsupported save format `{}`", s))),
        }
    }
}

/// Maps the finite range of the image onto 0..=255.
/// Non-finite samples, and every sample of a flat image, map to 0.
fn to_gray8(image : &CalibratedImage) -> Result<GrayImage, WsfError> {
    let (lo, hi) = image.min_max().unwrap_or((0.0, 0.0));
    let span = hi - lo;
    let pixels : Vec<u8> = image.data.iter()
        .map(|&v| {
            if !v.is_finite() || span <= 0.0 {
                0
            } else {
                (((v - lo) / span) * 255.0).round() as u8
            }
        })
        .collect();
    let dims = image.dimensions();
    GrayImage::from_raw(dims.xdim as u32, dims.ydim as u32, pixels)
        .ok_or(WsfError::Dimensions(DimensionsError::EmptyDimension(dims)))
}

/// Saves `image` as `<dir>/<title>.<ext>` and returns the path.
///
/// TIFF keeps the samples and calibration, PNG and JPEG are 8-bit
/// renderings of the data range, TXT is one tab-separated line per row.
pub fn save_image<P : AsRef<Path>>(
    image : &CalibratedImage,
    format : SaveFormat,
    dir : P,
) -> Result<PathBuf, WsfError> {
    image.dimensions().require_nonempty()?;
    let path = dir.as_ref().join(format!("{}.{}", image.title, format.extension()));
    match format {
        SaveFormat::Tiff => tiff::write_calibrated(image, &path)?,
        SaveFormat::Png => to_gray8(image)?.save_with_format(&path, ImageFormat::Png)?,
        SaveFormat::Jpeg => to_gray8(image)?.save_with_format(&path, ImageFormat::Jpeg)?,
        SaveFormat::Txt => {
            let mut file = fs::File::create(&path)?;
            for row in image.data.rows() {
                writeln!(file, "{}", row.iter().join("\t"))?;
            }
        },
    }
    debug!("Saved {} as {}", image.title, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use ndarray::{array, Array2};

    use crate::data::image::Calibration;

    fn sample_image() -> CalibratedImage {
        CalibratedImage::new(
            "scan",
            array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.5]],
            Calibration::from_extent(3.0, 2.0, 3, 2),
        )
    }

    #[test]
    fn output_dir_names() {
        let tmp = TempDir::new().unwrap();
        let dir = output_dir(tmp.path(), "stack", "DarkNoise", true).unwrap();
        assert_eq!(dir, tmp.path().join("stack_DarkNoise_Output"));
        assert!(dir.is_dir());
        // existing directories are reused
        assert_eq!(output_dir(tmp.path(), "stack", "DarkNoise", true).unwrap(), dir);

        let dated = output_dir(tmp.path(), "stack", "DarkNoise", false).unwrap();
        let name = dated.file_name().unwrap().to_string_lossy().into_owned();
        let stamp = name.strip_prefix("stack_DarkNoise_Output_").unwrap();
        assert_eq!(stamp.len(), 12);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn timestamp_digits() {
        let stamp = timestamp().unwrap();
        assert_eq!(stamp.len(), 12);
        assert!(stamp.starts_with("20"));
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn formats_from_str() {
        assert_eq!("TIF".parse::<SaveFormat>().unwrap(), SaveFormat::Tiff);
        assert_eq!("jpeg".parse::<SaveFormat>().unwrap(), SaveFormat::Jpeg);
        assert_eq!(SaveFormat::Jpeg.extension(), "jpg");
        assert!("zip".parse::<SaveFormat>().is_err());
    }

    #[test]
    fn save_every_format() {
        let tmp = TempDir::new().unwrap();
        let scan = sample_image();
        for format in [SaveFormat::Tiff, SaveFormat::Png, SaveFormat::Jpeg, SaveFormat::Txt] {
            let path = save_image(&scan, format, tmp.path()).unwrap();
            assert_eq!(path, tmp.path().join(format!("scan.{}", format.extension())));
            assert!(path.is_file());
        }

        let text = fs::read_to_string(tmp.path().join("scan.txt")).unwrap();
        assert_eq!(text, "1\t2\t3\n4\t5\t6.5\n");

        let png = image::open(tmp.path().join("scan.png")).unwrap().to_luma8();
        assert_eq!(png.dimensions(), (3, 2));
        assert_eq!(png.get_pixel(0, 0).0, [0]);
        assert_eq!(png.get_pixel(2, 1).0, [255]);
    }

    #[test]
    fn flat_image_renders_black() {
        let flat = CalibratedImage::new(
            "flat", Array2::from_elem((2, 2), 7.0f32), Calibration::uncalibrated()
        );
        let gray = to_gray8(&flat).unwrap();
        assert!(gray.pixels().all(|p| p.0 == [0]));
    }
}
