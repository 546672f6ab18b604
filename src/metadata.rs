//! The `Metadata` struct holds the human-readable header
//! lines of a `.wsf` file. Only four of these lines are
//! parsed for values (see `wsf::RequiredField`), the rest are
//! kept verbatim so they can be shown to the user.

/// Characters of the prefix kept in the report title
const TITLE_PREFIX_LEN : usize = 25;

/// A single labeled header line.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataField {
    pub label : String,
    pub value : String,
    /// The line as it appeared in the file, minus line endings
    pub line : String,
}

impl MetadataField {
    /// Splits a header line into `(label, value)`.
    ///
    /// The label ends at the first `:` or `=`. Lines with neither
    /// are split at the first tab or run of two or more spaces,
    /// and a line with no separator at all is all label.
    pub fn from_line(line : &str) -> Self {
        let (label, value) = match line.find(|c : char| c == ':' || c == '=') {
            Some(idx) => (&line[..idx], &line[idx + 1..]),
            None => split_at_gap(line),
        };
        MetadataField {
            label : label.trim().to_string(),
            value : value.trim().to_string(),
            line : line.to_string(),
        }
    }
}

fn split_at_gap(line : &str) -> (&str, &str) {
    let tab = line.find('\t');
    let spaces = line.find("  ");
    match (tab, spaces) {
        (Some(a), Some(b)) => line.split_at(a.min(b)),
        (Some(a), None) | (None, Some(a)) => line.split_at(a),
        (None, None) => (line, ""),
    }
}

/// The ordered collection of header lines from one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    fields : Vec<MetadataField>,
}

impl Metadata {
    pub fn new() -> Self {
        Metadata { fields : Vec::new() }
    }

    pub fn push_line(&mut self, line : &str) {
        self.fields.push(MetadataField::from_line(line));
    }

    pub fn fields(&self) -> &[MetadataField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First field whose label is exactly `label`
    pub fn get(&self, label : &str) -> Option<&MetadataField> {
        self.fields.iter().find(|f| f.label == label)
    }

    /// Title of the report for an image named `prefix`
    pub fn report_title(prefix : &str) -> String {
        let short : String = prefix.chars().take(TITLE_PREFIX_LEN).collect();
        format!("{} Metadata", short)
    }

    /// The text shown to the user: the file name, a blank
    /// line, then every header line in file order.
    pub fn report(&self, prefix : &str) -> String {
        let mut out = format!("File name: {}\n\n", prefix);
        for field in &self.fields {
            out.push_str(&field.line);
            out.push('\n');
        }
        out
    }
}
