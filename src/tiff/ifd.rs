//! Contains the Image File Directory (IFD) data structure
//! and the `IfdEntry` structure that holds each tag. Both
//! are read with whatever byte order the file declares and
//! always written little endian.

use std::collections::HashSet;
use std::fmt::Debug;
use std::iter::Iterator;
use binrw::{
    io::{Read, Seek, SeekFrom},
    BinRead, BinWrite, Endian,
};

use crate::{
    data::image::Dimensions,
    error::WsfError,
    tiff::tags::{FieldType, TiffTagID},
};

/// The 8 byte header at the start of every (non-Big) TIFF
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
pub struct TiffHeader {
    pub byte_order : [u8; 2],
    pub magic : u16,
    pub first_ifd : u32,
}

/// One 12 byte tag entry. `value` holds the value itself
/// when it fits in four bytes, otherwise an offset to it.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq)]
pub struct IfdEntry {
    pub tag : u16,
    pub field_type : u16,
    pub count : u32,
    pub value : [u8; 4],
}

/// Contains the IFD data, which is the
/// primary data structure for reading
/// tiff files.
#[derive(BinRead, BinWrite, Default, Clone, PartialEq)]
pub struct IFD {
    pub num_tags : u16,

    #[br(count = num_tags)]
    pub tags : Vec<IfdEntry>,

    pub next_ifd : u32,
}

pub const TIFF_MAGIC : u16 = 42;
pub const BIGTIFF_MAGIC : u16 = 43;

impl TiffHeader {
    pub fn little(first_ifd : u32) -> Self {
        TiffHeader {
            byte_order : *b"II",
            magic : TIFF_MAGIC,
            first_ifd,
        }
    }
}

fn u16_from(bytes : [u8; 2], endian : Endian) -> u16 {
    match endian {
        Endian::Little => u16::from_le_bytes(bytes),
        Endian::Big => u16::from_be_bytes(bytes),
    }
}

fn u32_from(bytes : [u8; 4], endian : Endian) -> u32 {
    match endian {
        Endian::Little => u32::from_le_bytes(bytes),
        Endian::Big => u32::from_be_bytes(bytes),
    }
}

impl IfdEntry {
    /// A single little-endian SHORT, left-justified in the value field
    pub fn short(tag : TiffTagID, value : u16) -> Self {
        let b = value.to_le_bytes();
        IfdEntry {
            tag : tag as u16,
            field_type : FieldType::Short as u16,
            count : 1,
            value : [b[0], b[1], 0, 0],
        }
    }

    /// A single little-endian LONG
    pub fn long(tag : TiffTagID, value : u32) -> Self {
        IfdEntry {
            tag : tag as u16,
            field_type : FieldType::Long as u16,
            count : 1,
            value : value.to_le_bytes(),
        }
    }

    /// An entry whose data lives elsewhere in the file
    pub fn pointer(tag : TiffTagID, field_type : FieldType, count : u32, offset : u32) -> Self {
        IfdEntry {
            tag : tag as u16,
            field_type : field_type as u16,
            count,
            value : offset.to_le_bytes(),
        }
    }

    pub fn tag_id(&self) -> Option<TiffTagID> {
        TiffTagID::from_u16(self.tag)
    }

    fn field(&self) -> Result<FieldType, WsfError> {
        FieldType::from_u16(self.field_type).ok_or_else(|| WsfError::Tiff(
            format!("Unsupported field type {} for tag {}", self.field_type, self.tag)
        ))
    }

    /// Reads the raw bytes of this entry's data, following
    /// the offset if it does not fit inline.
    /// Does not move the `Seek` position of the reader.
    fn raw_bytes<R : Read + Seek>(&self, reader : &mut R, endian : Endian)
    -> Result<Vec<u8>, WsfError> {
        let n_bytes = self.field()?.size() * self.count as usize;
        if n_bytes <= 4 {
            return Ok(self.value[..n_bytes].to_vec());
        }
        let cur_pos = reader.stream_position()?;
        reader.seek(SeekFrom::Start(u32_from(self.value, endian) as u64))?;
        let mut data = vec![0; n_bytes];
        let read = reader.read_exact(&mut data);
        reader.seek(SeekFrom::Start(cur_pos))?;
        read?;
        Ok(data)
    }

    /// Integer values of a BYTE, SHORT or LONG entry
    pub fn values<R : Read + Seek>(&self, reader : &mut R, endian : Endian)
    -> Result<Vec<u64>, WsfError> {
        let field = self.field()?;
        let data = self.raw_bytes(reader, endian)?;
        match field {
            FieldType::Byte => Ok(data.iter().map(|&b| b as u64).collect()),
            FieldType::Short => Ok(data.chunks_exact(2)
                .map(|c| u16_from([c[0], c[1]], endian) as u64)
                .collect()),
            FieldType::Long => Ok(data.chunks_exact(4)
                .map(|c| u32_from([c[0], c[1], c[2], c[3]], endian) as u64)
                .collect()),
            _ => Err(WsfError::Tiff(
                format!("Tag {} is not an integer tag", self.tag)
            )),
        }
    }

    /// First numerator/denominator pair of a RATIONAL entry
    pub fn rational<R : Read + Seek>(&self, reader : &mut R, endian : Endian)
    -> Result<(u32, u32), WsfError> {
        if self.field()? != FieldType::Rational || self.count == 0 {
            return Err(WsfError::Tiff(format!("Tag {} is not a rational", self.tag)));
        }
        let data = self.raw_bytes(reader, endian)?;
        Ok((
            u32_from([data[0], data[1], data[2], data[3]], endian),
            u32_from([data[4], data[5], data[6], data[7]], endian),
        ))
    }

    /// Text of an ASCII entry up to its first NUL
    pub fn ascii<R : Read + Seek>(&self, reader : &mut R, endian : Endian)
    -> Result<String, WsfError> {
        if self.field()? != FieldType::Ascii {
            return Err(WsfError::Tiff(format!("Tag {} is not ascii", self.tag)));
        }
        let data = self.raw_bytes(reader, endian)?;
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        Ok(String::from_utf8_lossy(&data[..end]).into_owned())
    }
}

impl IFD {
    pub fn new(tags : Vec<IfdEntry>, next_ifd : u32) -> Self {
        IFD {
            num_tags : tags.len() as u16,
            tags,
            next_ifd,
        }
    }

    /// Size in bytes of this IFD once written
    pub fn byte_size(&self) -> usize {
        2 + 12 * self.tags.len() + 4
    }

    pub fn get_tag(&self, tag_id : TiffTagID) -> Option<&IfdEntry> {
        self.tags.iter().find(|tag| tag.tag == tag_id as u16)
    }

    /// Returns an entry that must be present, or an error naming it
    pub fn require_tag(&self, tag_id : TiffTagID) -> Result<&IfdEntry, WsfError> {
        self.get_tag(tag_id)
            .ok_or_else(|| WsfError::Tiff(format!("Missing required tag {}", tag_id)))
    }

    /// First integer value of a tag, if the tag is present
    pub fn scalar<R : Read + Seek>(&self, tag_id : TiffTagID, reader : &mut R, endian : Endian)
    -> Result<Option<u64>, WsfError> {
        match self.get_tag(tag_id) {
            Some(entry) => Ok(entry.values(reader, endian)?.first().copied()),
            None => Ok(None),
        }
    }

    /// If `height` and `width` are both valid, returns
    /// a `Dimensions` object containing the dimensions
    /// of the frame this IFD corresponds to.
    pub fn dimensions<R : Read + Seek>(&self, reader : &mut R, endian : Endian)
    -> Result<Dimensions, WsfError> {
        let width = self.scalar(TiffTagID::ImageWidth, reader, endian)?;
        let height = self.scalar(TiffTagID::ImageLength, reader, endian)?;
        match (width, height) {
            (Some(w), Some(h)) => Ok(Dimensions::new(w as usize, h as usize)),
            _ => Err(WsfError::Tiff("IFD without image dimensions".to_string())),
        }
    }
}

/// Walks the chain of IFDs in a file, starting from
/// the offset given in the header.
pub struct IFDIterator<'reader, S> where S : Read + Seek {
    reader : &'reader mut S,
    endian : Endian,
    to_next : u32,
    visited : HashSet<u32>,
}

impl <'a, S> IFDIterator<'a, S> where S : Read + Seek {
    /// Creates a new `IFDIterator` object from an object that
    /// can read and seek and the location of the first IFD (so that
    /// it can parse it and find the subsequent IFDs).
    ///
    /// ## Arguments
    ///
    /// * `reader` - A reader that can read and seek
    /// * `endian` - Byte order of the file
    /// * `first_ifd` - The location of the first IFD in the file
    pub fn new(reader : &'a mut S, endian : Endian, first_ifd : u32) -> Self {
        IFDIterator {
            reader,
            endian,
            to_next : first_ifd,
            visited : HashSet::new(),
        }
    }
}

impl<'a, S> Iterator for IFDIterator<'a, S> where S : Read + Seek {
    type Item = Result<IFD, WsfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.to_next == 0 {
            return None
        }
        if !self.visited.insert(self.to_next) {
            self.to_next = 0;
            return Some(Err(WsfError::Tiff("IFD chain loops back on itself".to_string())));
        }

        let read = self.reader.seek(SeekFrom::Start(self.to_next as u64))
            .map_err(WsfError::from)
            .and_then(|_| IFD::read_options(self.reader, self.endian, ()).map_err(WsfError::from));

        match read {
            Ok(ifd) => {
                self.to_next = ifd.next_ifd;
                Some(Ok(ifd))
            },
            Err(err) => {
                self.to_next = 0;
                Some(Err(err))
            }
        }
    }
}

impl Debug for IFD {
    fn fmt(&self, f : &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "IFD: Num Tags: {}\nTags: {:?}\nNext IFD: {}",
            self.num_tags,
            self.tags,
            self.next_ifd,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use binrw::BinWrite;

    fn two_ifd_file() -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        TiffHeader::little(8).write_options(&mut cursor, Endian::Little, ()).unwrap();
        let first = IFD::new(vec![
            IfdEntry::long(TiffTagID::ImageWidth, 5),
            IfdEntry::short(TiffTagID::ImageLength, 3),
        ], 8 + 30);
        first.write_options(&mut cursor, Endian::Little, ()).unwrap();
        let second = IFD::new(vec![
            IfdEntry::long(TiffTagID::ImageWidth, 7),
            IfdEntry::long(TiffTagID::ImageLength, 2),
        ], 0);
        second.write_options(&mut cursor, Endian::Little, ()).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn walk_chain() {
        let mut reader = Cursor::new(two_ifd_file());
        let ifds : Vec<IFD> = IFDIterator::new(&mut reader, Endian::Little, 8)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(ifds.len(), 2);
        assert_eq!(ifds[0].byte_size(), 30);
        assert_eq!(ifds[0].dimensions(&mut reader, Endian::Little).unwrap(), Dimensions::new(5, 3));
        assert_eq!(ifds[1].dimensions(&mut reader, Endian::Little).unwrap(), Dimensions::new(7, 2));
    }

    #[test]
    fn looping_chain_is_an_error() {
        let mut bytes = two_ifd_file();
        // point the second IFD back at the first
        let len = bytes.len();
        bytes[len - 4..].copy_from_slice(&8u32.to_le_bytes());
        let mut reader = Cursor::new(bytes);
        let results : Vec<_> = IFDIterator::new(&mut reader, Endian::Little, 8).collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].is_err());
    }

    #[test]
    fn big_endian_values() {
        let entry = IfdEntry {
            tag : TiffTagID::BitsPerSample as u16,
            field_type : FieldType::Short as u16,
            count : 2,
            value : [0, 16, 0, 8],
        };
        let mut reader = Cursor::new(Vec::<u8>::new());
        assert_eq!(entry.values(&mut reader, Endian::Big).unwrap(), vec![16, 8]);
    }

    #[test]
    fn out_of_line_values() {
        let mut data = vec![0u8; 4];
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&200u32.to_le_bytes());
        let entry = IfdEntry::pointer(TiffTagID::StripOffsets, FieldType::Long, 2, 4);
        let mut reader = Cursor::new(data);
        assert_eq!(entry.values(&mut reader, Endian::Little).unwrap(), vec![100, 200]);
        assert_eq!(reader.position(), 0);

        let entry = IfdEntry::pointer(TiffTagID::XResolution, FieldType::Rational, 1, 4);
        assert_eq!(entry.rational(&mut reader, Endian::Little).unwrap(), (100, 200));
    }
}
