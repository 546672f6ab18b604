/// The primary `WsfReader` object, which
/// opens `.wsf` files and holds the parsed
/// image and header.
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::{
    data::image::{Calibration, CalibratedImage, SampleGrid},
    error::WsfError,
    file_data::{image_prefix, FileType},
    metadata::Metadata,
    wsf::{self, RequiredScalars, WsfData},
};

/// A struct for reading a `.wsf` file,
/// holding its metadata, sample grid and
/// calibration once parsed.
pub struct WsfReader {
    _filename : PathBuf,
    _prefix : String,
    data : WsfData,
}

impl WsfReader {

    /// Opens and parses a file
    ///
    /// # Arguments
    ///
    /// * `filename` - Path of the file to open. Its name must end
    /// in `.wsf`, or have no three-character suffix at all.
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// let reader = WsfReader::open("scan.wsf")?;
    /// println!("{}", reader.calibration());
    /// ```
    pub fn open<P : AsRef<Path>>(filename : P) -> Result<Self, WsfError> {
        let path = filename.as_ref();
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| WsfError::WrongFileType(path.display().to_string()))?;

        match FileType::discern_filename(&name) {
            FileType::Wsf => {},
            FileType::Unsuffixed => warn!("{} has no suffix, parsing it as a wsf file", name),
            _ => return Err(WsfError::WrongFileType(name)),
        }

        let text = fs::read_to_string(path)?;
        let lines : Vec<&str> = text.lines().collect();
        debug!("Read {} lines from {}", lines.len(), path.display());

        Ok(WsfReader {
            _prefix : image_prefix(&name).to_string(),
            _filename : path.to_path_buf(),
            data : wsf::parse(&lines)?,
        })
    }

    /// Path the reader was opened from
    pub fn filename(&self) -> &Path {
        &self._filename
    }

    /// File name without its `.wsf` suffix
    pub fn prefix(&self) -> &str {
        &self._prefix
    }

    pub fn metadata(&self) -> &Metadata {
        &self.data.metadata
    }

    pub fn scalars(&self) -> &RequiredScalars {
        &self.data.scalars
    }

    pub fn calibration(&self) -> &Calibration {
        &self.data.calibration
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.data.grid
    }

    /// Title and text of the metadata report
    pub fn metadata_report(&self) -> (String, String) {
        (
            Metadata::report_title(self.prefix()),
            self.data.metadata.report(self.prefix()),
        )
    }

    /// Copies the grid and calibration into an image titled with the prefix
    pub fn to_image(&self) -> CalibratedImage {
        CalibratedImage::new(self.prefix(), self.data.grid.clone(), self.data.calibration.clone())
    }

    /// Consumes the reader, keeping only the image
    pub fn into_image(self) -> CalibratedImage {
        CalibratedImage::new(&self._prefix, self.data.grid, self.data.calibration)
    }
}
