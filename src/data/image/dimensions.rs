//! Code in this submodule deals strictly with attention to
//! image dimensions and the types of things that can go wrong
//! with `Dimensions`.
//!

/// `Dimensions` is a simple struct that holds the dimensions
/// of a frame
///
/// `xdim` is the width of the frame
/// `ydim` is the height of the frame
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Dimensions {
    pub xdim : usize,
    pub ydim : usize
}

#[derive(Debug, Clone, PartialEq)]
pub enum DimensionsError {
    NoConsistentDimensions,
    EmptyDimension(Dimensions),
}

impl Dimensions {
    pub fn new(xdim : usize, ydim : usize) -> Dimensions {
        Dimensions {
            xdim,
            ydim,
        }
    }

    /// Returns the dimensions as a tuple (y, x), which is
    /// the shape of the row-major array holding the frame.
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.ydim, self.xdim)
    }

    /// Number of samples in a frame of these dimensions
    pub fn num_samples(&self) -> usize {
        self.xdim * self.ydim
    }

    /// Errors if either axis is zero
    pub fn require_nonempty(&self) -> Result<(), DimensionsError> {
        if self.xdim == 0 || self.ydim == 0 {
            return Err(DimensionsError::EmptyDimension(*self));
        }
        Ok(())
    }

    /// Returns the first element's dimensions if every
    /// element of `dims` agrees, otherwise errors.
    pub fn consistent<I : IntoIterator<Item = Dimensions>>(dims : I)
    -> Result<Dimensions, DimensionsError> {
        let mut iter = dims.into_iter();
        let first = iter.next().ok_or(DimensionsError::NoConsistentDimensions)?;
        if iter.all(|d| d == first) {
            Ok(first)
        } else {
            Err(DimensionsError::NoConsistentDimensions)
        }
    }
}

impl std::error::Error for DimensionsError {}

impl std::fmt::Display for DimensionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DimensionsError::NoConsistentDimensions => {
                write!(f, "Requested data did not have consistent dimensions.")
            },
            DimensionsError::EmptyDimension(dims) => {
                write!(f, "Frame has an empty axis: ({}, {})", dims.xdim, dims.ydim)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistent_dimensions() {
        let dims = vec![Dimensions::new(4, 3); 5];
        assert_eq!(Dimensions::consistent(dims).unwrap(), Dimensions::new(4, 3));

        let dims = vec![Dimensions::new(4, 3), Dimensions::new(3, 4)];
        assert_eq!(
            Dimensions::consistent(dims),
            Err(DimensionsError::NoConsistentDimensions)
        );

        assert!(Dimensions::consistent(Vec::new()).is_err());
    }

    #[test]
    fn tuple_is_row_major() {
        let dims = Dimensions::new(7, 2);
        assert_eq!(dims.to_tuple(), (2, 7));
        assert_eq!(dims.num_samples(), 14);
        assert!(Dimensions::new(0, 2).require_nonempty().is_err());
    }
}
