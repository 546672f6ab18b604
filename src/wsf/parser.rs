//! Two passes over the lines of a `.wsf` file: the first
//! collects the header and the required fields, the second
//! picks out the tab-separated rows of sample values.

use log::{debug, warn};
use ndarray::prelude::*;

use crate::{
    data::image::{Calibration, Dimensions, SampleGrid},
    error::WsfError,
    metadata::Metadata,
    wsf::fields::{FieldValue, RequiredField},
};

/// The four header values needed to rebuild the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequiredScalars {
    pub width : usize,
    pub height : usize,
    pub x_range : f64,
    pub y_range : f64,
}

impl RequiredScalars {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn calibration(&self) -> Calibration {
        Calibration::from_extent(self.x_range, self.y_range, self.width, self.height)
    }
}

/// Everything recovered from one `.wsf` file.
#[derive(Debug, Clone, PartialEq)]
pub struct WsfData {
    pub metadata : Metadata,
    pub scalars : RequiredScalars,
    pub calibration : Calibration,
    pub grid : SampleGrid,
}

/// Parses the lines of a `.wsf` file.
///
/// ## Arguments
///
/// * `lines` - The lines of the file in order. Trailing `\r` and
/// `\n` characters are ignored, so either `str::lines` output or
/// raw lines with their endings can be passed.
///
/// ## Errors
///
/// * `WsfError::MissingMetadata` - one of the required fields is
/// absent, not a number, or a zero sample count
/// * `WsfError::MalformedToken` - a data row holds a non-numeric token
/// * `WsfError::IncompleteGrid` - fewer data rows than `Lines in Y`
///
/// ## Example
///
/// ```
/// let lines = [
///     "Pixels in X = 3 samples",
///     "Lines in Y = 2 samples",
///     "X Range   3.0 microns",
///     "Y Range   2.0 microns",
///     "1.0\t2.0\t3.0",
///     "4.0\t5.0\t6.0",
/// ];
/// let data = wsfkit::parse_wsf(&lines).unwrap();
/// assert_eq!(data.grid.shape(), &[2, 3]);
/// assert_eq!(data.calibration.to_tuple(), (1.0, 1.0));
/// ```
pub fn parse<S : AsRef<str>>(lines : &[S]) -> Result<WsfData, WsfError> {
    let (metadata, scalars) = scan_header(lines)?;
    let calibration = scalars.calibration();
    let grid = collect_grid(lines, scalars.dimensions())?;

    debug!(
        "Parsed {} x {} samples, {} metadata lines, {}",
        scalars.width, scalars.height, metadata.len(), calibration
    );

    Ok(WsfData { metadata, scalars, calibration, grid })
}

fn strip_line_ending(line : &str) -> &str {
    line.trim_end_matches(|c : char| c == '\r' || c == '\n')
}

/// First pass: header lines in order, and the first valid
/// occurrence of each required field.
fn scan_header<S : AsRef<str>>(lines : &[S]) -> Result<(Metadata, RequiredScalars), WsfError> {
    let mut metadata = Metadata::new();
    let mut found : [Option<Option<FieldValue>>; 4] = [None; 4];

    for (line_no, line) in lines.iter().enumerate() {
        let line = strip_line_ending(line.as_ref());

        if line.chars().next().is_some_and(|c| c.is_alphabetic()) {
            metadata.push_line(line);
        }

        for (slot, field) in found.iter_mut().zip(RequiredField::ALL.iter()) {
            if !field.matches(line) {
                continue;
            }
            if slot.is_none() {
                *slot = Some(field.extract(line));
            } else {
                debug!("Ignoring repeated `{}` on line {}", field, line_no + 1);
            }
        }
    }

    let value_of = |idx : usize| -> Result<FieldValue, WsfError> {
        found[idx].flatten().ok_or(WsfError::MissingMetadata {
            field : RequiredField::ALL[idx].label()
        })
    };

    let count_of = |idx : usize| -> Result<usize, WsfError> {
        value_of(idx)?.as_usize()
            .filter(|&n| n > 0)
            .ok_or(WsfError::MissingMetadata { field : RequiredField::ALL[idx].label() })
    };

    let scalars = RequiredScalars {
        width : count_of(0)?,
        height : count_of(1)?,
        x_range : value_of(2)?.as_f64(),
        y_range : value_of(3)?.as_f64(),
    };

    Ok((metadata, scalars))
}

/// Returns the parsed samples of `line` if it is a data row:
/// exactly `width` tab-separated tokens, the first of which
/// is a number. Any other token that fails to parse is an error.
fn parse_row(line : &str, line_no : usize, width : usize)
-> Result<Option<Vec<f32>>, WsfError> {
    if line.split('\t').count() != width {
        return Ok(None);
    }

    let mut tokens = line.split('\t');
    let first = match tokens.next().map(str::trim).map(str::parse::<f32>) {
        Some(Ok(v)) => v,
        _ => return Ok(None),
    };

    let mut row = Vec::with_capacity(width);
    row.push(first);
    for token in tokens {
        let token = token.trim();
        row.push(token.parse::<f32>().map_err(|_| WsfError::MalformedToken {
            line : line_no,
            token : token.to_string(),
        })?);
    }
    Ok(Some(row))
}

/// Second pass: collects the first `height` data rows, in file
/// order, then shapes them into the `(height, width)` grid. The
/// grid is only allocated once every declared row has been seen.
fn collect_grid<S : AsRef<str>>(lines : &[S], dims : Dimensions) -> Result<SampleGrid, WsfError> {
    dims.require_nonempty()?;

    let mut samples : Vec<f32> = Vec::new();
    let mut rows_found = 0;

    for (line_no, line) in lines.iter().enumerate() {
        let line = strip_line_ending(line.as_ref());
        let Some(row) = parse_row(line, line_no + 1, dims.xdim)? else {
            continue;
        };
        if rows_found < dims.ydim {
            samples.extend(row);
        }
        rows_found += 1;
    }

    if rows_found < dims.ydim {
        return Err(WsfError::IncompleteGrid { expected : dims.ydim, found : rows_found });
    }
    if rows_found > dims.ydim {
        warn!(
            "Found {} data rows but only {} declared, ignoring the last {}",
            rows_found, dims.ydim, rows_found - dims.ydim
        );
    }

    Array2::from_shape_vec(dims.to_tuple(), samples)
        .map_err(|_| WsfError::IncompleteGrid { expected : dims.ydim, found : rows_found })
}
