//! Baseline TIFF tags used when reading grayscale stacks
//! and writing calibrated floating point images.

/// Numeric identifiers of the TIFF tags this crate reads or writes
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TiffTagID {
    NewSubfileType = 254,
    ImageWidth = 256,
    ImageLength = 257,
    BitsPerSample = 258,
    Compression = 259,
    PhotometricInterpretation = 262,
    ImageDescription = 270,
    StripOffsets = 273,
    SamplesPerPixel = 277,
    RowsPerStrip = 278,
    StripByteCounts = 279,
    XResolution = 282,
    YResolution = 283,
    ResolutionUnit = 296,
    SampleFormat = 339,
}

/// TIFF field types, from the `type` column of an IFD entry
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Byte = 1,
    Ascii = 2,
    Short = 3,
    Long = 4,
    Rational = 5,
}

impl TiffTagID {
    pub const ALL : [TiffTagID; 15] = [
        TiffTagID::NewSubfileType,
        TiffTagID::ImageWidth,
        TiffTagID::ImageLength,
        TiffTagID::BitsPerSample,
        TiffTagID::Compression,
        TiffTagID::PhotometricInterpretation,
        TiffTagID::ImageDescription,
        TiffTagID::StripOffsets,
        TiffTagID::SamplesPerPixel,
        TiffTagID::RowsPerStrip,
        TiffTagID::StripByteCounts,
        TiffTagID::XResolution,
        TiffTagID::YResolution,
        TiffTagID::ResolutionUnit,
        TiffTagID::SampleFormat,
    ];

    pub fn from_u16(value : u16) -> Option<Self> {
        TiffTagID::ALL.iter().copied().find(|tag| *tag as u16 == value)
    }
}

impl FieldType {
    pub fn from_u16(value : u16) -> Option<Self> {
        match value {
            1 => Some(FieldType::Byte),
            2 => Some(FieldType::Ascii),
            3 => Some(FieldType::Short),
            4 => Some(FieldType::Long),
            5 => Some(FieldType::Rational),
            _ => None,
        }
    }

    /// Bytes per single value of this type
    pub fn size(&self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii => 1,
            FieldType::Short => 2,
            FieldType::Long => 4,
            FieldType::Rational => 8,
        }
    }
}

impl std::fmt::Display for TiffTagID {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_ids_round_trip() {
        for tag in TiffTagID::ALL {
            assert_eq!(TiffTagID::from_u16(tag as u16), Some(tag));
        }
        assert_eq!(TiffTagID::from_u16(1), None);
        assert_eq!(TiffTagID::ImageWidth.to_string(), "ImageWidth");
    }

    #[test]
    fn tags_are_sorted() {
        assert!(TiffTagID::ALL.windows(2).all(|w| w[0] < w[1]));
    }
}
