use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use thiserror::Error;

use super::model::{AxisRange, Bins, Extent, HistogramData, Record};

const COMMENT_MARKER: char = '#';
const BINS_MARKER: &str = "# Bins:";
const X_RANGE_MARKER: &str = "# X-range:";
const Y_RANGE_MARKER: &str = "# Y-range:";

/// A recognized preamble line whose values cannot be used.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetadataError {
    #[error("line {line}: expected two positive integers after '{marker}'")]
    InvalidBins { line: usize, marker: &'static str },

    #[error("line {line}: expected two numbers after '{marker}'")]
    InvalidRange { line: usize, marker: &'static str },

    #[error("line {line}: '{marker}' minimum {min} is not below maximum {max}")]
    EmptyRange {
        line: usize,
        marker: &'static str,
        min: f64,
        max: f64,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a histogram file written by the simulation.
///
/// Layout (comment lines may appear in any order and are all optional):
///
/// ```text
/// # Bins: 20 30
/// # X-range: -10 10
/// # Y-range: -10 20
/// -9.500000 -9.500000 0.731220
/// -8.500000 -9.500000 nan
/// ...
/// ```
pub fn load_file(path: &Path) -> Result<HistogramData> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let data = parse_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))?;

    log::info!(
        "Loaded {} records from {} (bins {}, x {}, y {})",
        data.len(),
        path.display(),
        data.bins,
        data.extent.x,
        data.extent.y
    );
    if data.skipped_lines > 0 {
        log::warn!(
            "{}: skipped {} malformed data line(s)",
            path.display(),
            data.skipped_lines
        );
    }
    Ok(data)
}

/// Parse histogram text in a single pass.
pub fn parse_reader<R: BufRead>(reader: R) -> Result<HistogramData> {
    let mut preamble = Preamble::default();
    let mut records = Vec::new();
    let mut skipped_lines = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", idx + 1))?;
        let line_no = idx + 1;

        if line.starts_with(COMMENT_MARKER) {
            preamble.accept(&line, line_no)?;
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(&line) {
            Some(record) => records.push(record),
            None => {
                log::debug!("line {line_no}: dropped malformed record '{line}'");
                skipped_lines += 1;
            }
        }
    }

    let (bins, extent) = preamble.finish();
    Ok(HistogramData {
        records,
        bins,
        extent,
        skipped_lines,
    })
}

// ---------------------------------------------------------------------------
// Preamble accumulator
// ---------------------------------------------------------------------------

/// First-seen metadata fields; anything never seen falls back to the defaults.
#[derive(Debug, Default)]
struct Preamble {
    bins: Option<Bins>,
    x_range: Option<AxisRange>,
    y_range: Option<AxisRange>,
}

impl Preamble {
    fn accept(&mut self, line: &str, line_no: usize) -> Result<(), MetadataError> {
        if let Some(rest) = line.strip_prefix(BINS_MARKER) {
            if self.bins.is_none() {
                self.bins = Some(parse_bins(rest, line_no)?);
            }
        } else if let Some(rest) = line.strip_prefix(X_RANGE_MARKER) {
            if self.x_range.is_none() {
                self.x_range = Some(parse_range(rest, line_no, X_RANGE_MARKER)?);
            }
        } else if let Some(rest) = line.strip_prefix(Y_RANGE_MARKER) {
            if self.y_range.is_none() {
                self.y_range = Some(parse_range(rest, line_no, Y_RANGE_MARKER)?);
            }
        }
        Ok(())
    }

    fn finish(self) -> (Bins, Extent) {
        let bins = self.bins.unwrap_or_default();
        let extent = Extent::new(
            self.x_range.unwrap_or(Extent::DEFAULT_X),
            self.y_range.unwrap_or(Extent::DEFAULT_Y),
        );
        (bins, extent)
    }
}

fn two_tokens(rest: &str) -> Option<(&str, &str)> {
    let mut tokens = rest.split_whitespace();
    Some((tokens.next()?, tokens.next()?))
}

fn parse_bins(rest: &str, line: usize) -> Result<Bins, MetadataError> {
    let invalid = MetadataError::InvalidBins {
        line,
        marker: BINS_MARKER,
    };
    let (bx, by) = two_tokens(rest).ok_or_else(|| invalid.clone())?;
    match (bx.parse::<usize>(), by.parse::<usize>()) {
        (Ok(x), Ok(y)) if x > 0 && y > 0 => Ok(Bins::new(x, y)),
        _ => Err(invalid),
    }
}

fn parse_range(rest: &str, line: usize, marker: &'static str) -> Result<AxisRange, MetadataError> {
    let (lo, hi) = two_tokens(rest).ok_or(MetadataError::InvalidRange { line, marker })?;
    let (min, max) = match (lo.parse::<f64>(), hi.parse::<f64>()) {
        (Ok(min), Ok(max)) => (min, max),
        _ => return Err(MetadataError::InvalidRange { line, marker }),
    };
    // Negated so NaN bounds are rejected too.
    if !(min < max) {
        return Err(MetadataError::EmptyRange {
            line,
            marker,
            min,
            max,
        });
    }
    Ok(AxisRange::new(min, max))
}

// ---------------------------------------------------------------------------
// Data records
// ---------------------------------------------------------------------------

/// Accept a line only when it is exactly three numbers.
fn parse_record(line: &str) -> Option<Record> {
    let mut tokens = line.split_whitespace();
    let x = tokens.next()?.parse::<f64>().ok()?;
    let y = tokens.next()?.parse::<f64>().ok()?;
    let value = tokens.next()?.parse::<f64>().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(Record::new(x, y, value))
}
