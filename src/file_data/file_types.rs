use std::io::Read;

/// What a file is, judged from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Wsf,
    Tiff,
    /// No three-character suffix at all
    Unsuffixed,
    Other,
}

/// Byte order declared at the start of a TIFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl FileType {
    /// Checks a file name against the known suffixes.
    /// A suffix only counts if it is exactly three characters
    /// long and preceded by a `.`, i.e. the fourth-from-last
    /// character of the name is the dot.
    ///
    /// ## Arguments
    ///
    /// * `name` - The file name (not the whole path)
    ///
    /// ## Example
    ///
    /// ```
    /// use wsfkit::FileType;
    ///
    /// assert_eq!(FileType::discern_filename("scan_01.wsf"), FileType::Wsf);
    /// assert_eq!(FileType::discern_filename("scan_01.txt"), FileType::Other);
    /// assert_eq!(FileType::discern_filename("scan_01"), FileType::Unsuffixed);
    /// ```
    pub fn discern_filename(name : &str) -> Self {
        match suffix(name) {
            Some("wsf") => FileType::Wsf,
            Some("tif") => FileType::Tiff,
            Some(_) => FileType::Other,
            None if name.ends_with(".tiff") => FileType::Tiff,
            None => FileType::Unsuffixed,
        }
    }

    /// Checks the endian of a TIFF file by examining the
    /// first two bytes of the file. "II" is little endian,
    /// "MM" is big endian.
    ///
    /// ## Arguments
    ///
    /// * `reader` - A reader pointing to the start of a file.
    ///
    /// ## Returns
    ///
    /// * `Some(Endian)` - If the endian is valid
    /// * `None` - If the endian is invalid or the file is too short
    pub fn discern_tiff<R : Read>(reader : &mut R) -> Option<Endian> {
        let mut endian: [u8; 2] = [0; 2];
        reader.read_exact(&mut endian).ok()?;
        match &endian {
            b"II" => Some(Endian::Little),
            b"MM" => Some(Endian::Big),
            _ => None
        }
    }
}

impl From<Endian> for binrw::Endian {
    fn from(endian : Endian) -> Self {
        match endian {
            Endian::Little => binrw::Endian::Little,
            Endian::Big => binrw::Endian::Big,
        }
    }
}

/// The three characters after the dot, if the name has a
/// four-character `.xxx` suffix.
fn suffix(name : &str) -> Option<&str> {
    let chars : Vec<(usize, char)> = name.char_indices().collect();
    if chars.len() < 4 {
        return None;
    }
    let (dot_idx, dot) = chars[chars.len() - 4];
    if dot != '.' {
        return None;
    }
    Some(&name[dot_idx + 1..])
}

/// Strips a four-character suffix (`.wsf`, `.tif`, ...) from
/// a file name, returning the whole name if there is none.
pub fn image_prefix(name : &str) -> &str {
    match suffix(name) {
        Some(ext) => &name[..name.len() - ext.len() - 1],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn filenames() {
        assert_eq!(FileType::discern_filename("a.wsf"), FileType::Wsf);
        assert_eq!(FileType::discern_filename("a.WSF"), FileType::Other);
        assert_eq!(FileType::discern_filename("stack.tif"), FileType::Tiff);
        assert_eq!(FileType::discern_filename("stack.tiff"), FileType::Tiff);
        assert_eq!(FileType::discern_filename("a.b.wsf"), FileType::Wsf);
        assert_eq!(FileType::discern_filename("wsf"), FileType::Unsuffixed);
        assert_eq!(FileType::discern_filename("data.wsfx"), FileType::Unsuffixed);
    }

    #[test]
    fn prefixes() {
        assert_eq!(image_prefix("scan_01.wsf"), "scan_01");
        assert_eq!(image_prefix("scan_01"), "scan_01");
        assert_eq!(image_prefix(".wsf"), "");
        assert_eq!(image_prefix("stack.tiff"), "stack.tiff");
    }

    #[test]
    fn tiff_magic() {
        assert_eq!(FileType::discern_tiff(&mut Cursor::new(b"II*\0")), Some(Endian::Little));
        assert_eq!(FileType::discern_tiff(&mut Cursor::new(b"MM\0*")), Some(Endian::Big));
        assert_eq!(FileType::discern_tiff(&mut Cursor::new(b"PK")), None);
        assert_eq!(FileType::discern_tiff(&mut Cursor::new(b"I")), None);
    }
}
