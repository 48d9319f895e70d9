//! Each data row of a sample file holds an image file name followed by the
//! end points of four marked lines:
//!
//! ```text
//! filename,h0x1,h0y1,h0x2,h0y2,h1x1,h1y1,h1x2,h1y2,v0x1,v0y1,v0x2,v0y2,v1x1,v1y1,v1x2,v1y2
//! ```
//!
//! The first row is a header and is skipped. Lines 0 and 1 are horizontal,
//! lines 2 and 3 vertical.

use std::{io::Read, path::Path};

use nalgebra::{Point2, RealField};

use crate::{CorrectionRequest, Line, Sensor};

const COLUMNS: usize = 17;

/// Errors reading a sample file.
#[derive(Debug)]
#[non_exhaustive]
pub enum SampleError {
    /// The file could not be read or is not valid CSV.
    Csv(csv::Error),
    /// A row does not have a file name and sixteen coordinates.
    ColumnCount {
        /// Line number in the file, starting at 1.
        row: u64,
        /// Number of columns found.
        found: usize,
    },
    /// A coordinate is not a number.
    Number {
        /// Line number in the file, starting at 1.
        row: u64,
        /// Column index, starting at 0 with the file name.
        column: usize,
        /// The offending field.
        value: String,
    },
}

impl std::fmt::Display for SampleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleError::Csv(e) => write!(f, "reading samples: {}", e),
            SampleError::ColumnCount { row, found } => write!(
                f,
                "row {}: expected {} columns, found {}",
                row, COLUMNS, found
            ),
            SampleError::Number { row, column, value } => {
                write!(f, "row {}, column {}: invalid number {:?}", row, column, value)
            }
        }
    }
}

impl std::error::Error for SampleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SampleError::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<csv::Error> for SampleError {
    fn from(e: csv::Error) -> Self {
        SampleError::Csv(e)
    }
}

/// One image and the lines marked on it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord<R: RealField> {
    /// Image file name, relative to the sample file.
    pub filename: String,
    /// Lines along the horizontal edges.
    pub horizontal: [Line<R>; 2],
    /// Lines along the vertical edges.
    pub vertical: [Line<R>; 2],
}

impl<R: RealField + Copy> SampleRecord<R> {
    /// Build the correction request for this image.
    pub fn request(&self, sensor: Sensor<R>) -> CorrectionRequest<R> {
        CorrectionRequest::new(self.horizontal, self.vertical, sensor)
    }
}

/// Read all records from a sample file.
pub fn read_samples_from_path<R, P>(path: P) -> Result<Vec<SampleRecord<R>>, SampleError>
where
    R: RealField + Copy,
    P: AsRef<Path>,
{
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_samples(file)
}

/// Read all records from `rdr`.
pub fn read_samples<R, Rd>(rdr: Rd) -> Result<Vec<SampleRecord<R>>, SampleError>
where
    R: RealField + Copy,
    Rd: Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let row = record.position().map_or(0, |pos| pos.line());
        if record.len() != COLUMNS {
            return Err(SampleError::ColumnCount {
                row,
                found: record.len(),
            });
        }

        let mut coords = [R::zero(); COLUMNS - 1];
        for (i, coord) in coords.iter_mut().enumerate() {
            let column = i + 1;
            let value = &record[column];
            let parsed: f64 = value.parse().map_err(|_| SampleError::Number {
                row,
                column,
                value: value.to_string(),
            })?;
            *coord = nalgebra::convert(parsed);
        }

        let line = |i: usize| {
            let c = &coords[4 * i..4 * i + 4];
            Line::new(Point2::new(c[0], c[1]), Point2::new(c[2], c[3]))
        };
        let sample = SampleRecord {
            filename: record[0].to_string(),
            horizontal: [line(0), line(1)],
            vertical: [line(2), line(3)],
        };
        log::debug!("row {}: {}", row, sample.filename);
        records.push(sample);
    }
    Ok(records)
}
