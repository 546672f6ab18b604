//! The four header fields a `.wsf` file must declare, each
//! described by the label it is found under and where its
//! value sits on the line.

/// How a field's token is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

/// A header field required to reconstruct the sample grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    PixelsInX,
    LinesInY,
    XRange,
    YRange,
}

/// A parsed field value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(usize),
    Float(f64),
}

impl RequiredField {
    pub const ALL : [RequiredField; 4] = [
        RequiredField::PixelsInX,
        RequiredField::LinesInY,
        RequiredField::XRange,
        RequiredField::YRange,
    ];

    /// Case-sensitive text that marks a line as holding this field
    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::PixelsInX => "Pixels in X",
            RequiredField::LinesInY => "Lines in Y",
            RequiredField::XRange => "X Range",
            RequiredField::YRange => "Y Range",
        }
    }

    /// Zero-indexed position of the value among the line's tokens
    pub fn token_position(&self) -> usize {
        match self {
            RequiredField::PixelsInX | RequiredField::LinesInY => 3,
            RequiredField::XRange | RequiredField::YRange => 2,
        }
    }

    pub fn kind(&self) -> NumericKind {
        match self {
            RequiredField::PixelsInX | RequiredField::LinesInY => NumericKind::Integer,
            RequiredField::XRange | RequiredField::YRange => NumericKind::Float,
        }
    }

    pub fn matches(&self, line : &str) -> bool {
        line.contains(self.label())
    }

    /// Pulls this field's value out of a line already known to
    /// contain its label. `None` if the token is absent or does
    /// not parse as the field's kind.
    pub fn extract(&self, line : &str) -> Option<FieldValue> {
        let token = tokens(line).nth(self.token_position())?;
        match self.kind() {
            NumericKind::Integer => token.parse::<usize>().ok().map(FieldValue::Integer),
            NumericKind::Float => token.parse::<f64>().ok().map(FieldValue::Float),
        }
    }
}

/// Splits a header line on whitespace, `:` and `=`, dropping
/// empty pieces, so `Pixels in X: 256` and `Pixels in X = 256`
/// tokenize the same way.
pub fn tokens(line : &str) -> impl Iterator<Item = &str> {
    line.split(|c : char| c.is_whitespace() || c == ':' || c == '=')
        .filter(|t| !t.is_empty())
}

impl FieldValue {
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            FieldValue::Integer(v) => *v as f64,
            FieldValue::Float(v) => *v,
        }
    }
}

impl std::fmt::Display for RequiredField {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_by_position() {
        assert_eq!(
            RequiredField::PixelsInX.extract("Pixels in X = 3 samples"),
            Some(FieldValue::Integer(3))
        );
        assert_eq!(
            RequiredField::LinesInY.extract("Lines in Y: 512"),
            Some(FieldValue::Integer(512))
        );
        assert_eq!(
            RequiredField::XRange.extract("X Range   3.0 microns"),
            Some(FieldValue::Float(3.0))
        );
        assert_eq!(
            RequiredField::YRange.extract("Y Range: 40.5 um"),
            Some(FieldValue::Float(40.5))
        );
    }

    #[test]
    fn bad_tokens() {
        assert_eq!(RequiredField::PixelsInX.extract("Pixels in X = many"), None);
        assert_eq!(RequiredField::PixelsInX.extract("Pixels in X"), None);
        assert_eq!(RequiredField::LinesInY.extract("Lines in Y = 2.5"), None);
        assert_eq!(RequiredField::LinesInY.extract("Lines in Y = -2"), None);
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert!(RequiredField::XRange.matches("Scan X Range: 10"));
        assert!(!RequiredField::XRange.matches("x range: 10"));
    }
}
