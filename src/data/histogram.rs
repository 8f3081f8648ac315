use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::Serialize;

use super::model::{Bins, Extent};

// ---------------------------------------------------------------------------
// MagnitudeHistogram – averages a scalar over a regular 2D binning
// ---------------------------------------------------------------------------

/// Running sums and counts of a magnitude per `(row, col)` bin.
///
/// Rows run along Y (ascending), columns along X (ascending), matching the
/// record order the loader expects.
#[derive(Debug, Clone)]
pub struct MagnitudeHistogram {
    bins: Bins,
    extent: Extent,
    cell_width: f64,
    cell_height: f64,
    sums: Array2<f64>,
    counts: Array2<u64>,
}

impl MagnitudeHistogram {
    /// Zero bin counts are raised to one.
    pub fn new(bins: Bins, extent: Extent) -> Self {
        let bins = Bins::new(bins.x.max(1), bins.y.max(1));
        MagnitudeHistogram {
            bins,
            extent,
            cell_width: extent.x.span() / bins.x as f64,
            cell_height: extent.y.span() / bins.y as f64,
            sums: Array2::zeros((bins.y, bins.x)),
            counts: Array2::zeros((bins.y, bins.x)),
        }
    }

    /// One bin per physical unit along each axis.
    pub fn unit_cells(extent: Extent) -> Self {
        let bins = Bins::new(
            (extent.x.span().ceil() as usize).max(1),
            (extent.y.span().ceil() as usize).max(1),
        );
        let mut hist = Self::new(bins, extent);
        hist.cell_width = 1.0;
        hist.cell_height = 1.0;
        hist
    }

    pub fn bins(&self) -> Bins {
        self.bins
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Add one sample. Samples outside the extent are ignored; returns whether
    /// the sample was binned.
    pub fn add_point(&mut self, x: f64, y: f64, magnitude: f64) -> bool {
        let Some((row, col)) = self.cell_of(x, y) else {
            return false;
        };
        self.sums[[row, col]] += magnitude;
        self.counts[[row, col]] += 1;
        true
    }

    /// Add many samples; returns how many were binned.
    pub fn add_points<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = (f64, f64, f64)>,
    {
        points
            .into_iter()
            .filter(|&(x, y, m)| self.add_point(x, y, m))
            .count()
    }

    fn cell_of(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.extent.x.contains(x) || !self.extent.y.contains(y) {
            return None;
        }
        // The top edge of the range belongs to the last bin.
        let row = (((y - self.extent.y.min) / self.cell_height) as usize).min(self.bins.y - 1);
        let col = (((x - self.extent.x.min) / self.cell_width) as usize).min(self.bins.x - 1);
        Some((row, col))
    }

    pub fn counts(&self) -> &Array2<u64> {
        &self.counts
    }

    /// Mean magnitude per bin; NaN for bins without samples.
    pub fn averages(&self) -> Array2<f64> {
        let mut out = Array2::from_elem(self.sums.dim(), f64::NAN);
        ndarray::Zip::from(&mut out)
            .and(&self.sums)
            .and(&self.counts)
            .for_each(|avg, &sum, &count| {
                if count > 0 {
                    *avg = sum / count as f64;
                }
            });
        out
    }

    /// Physical center of bin `(row, col)`.
    pub fn center(&self, row: usize, col: usize) -> (f64, f64) {
        (
            self.extent.x.min + (col as f64 + 0.5) * self.cell_width,
            self.extent.y.min + (row as f64 + 0.5) * self.cell_height,
        )
    }

    // -----------------------------------------------------------------------
    // Writers
    // -----------------------------------------------------------------------

    /// Write the commented text format read by [`crate::data::loader`].
    pub fn write_histogram<W: Write>(&self, mut out: W) -> Result<()> {
        let (xmin, xmax, ymin, ymax) = self.extent.as_tuple();
        writeln!(out, "# Magnitude Histogram Data")?;
        writeln!(out, "# Format: X Y Pressure Average")?;
        writeln!(out, "# Bins: {} {}", self.bins.x, self.bins.y)?;
        writeln!(out, "# X-range: {xmin} {xmax}")?;
        writeln!(out, "# Y-range: {ymin} {ymax}")?;

        let averages = self.averages();
        for (row, values) in averages.outer_iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                let (cx, cy) = self.center(row, col);
                writeln!(out, "{cx:.6} {cy:.6} {value:.6}")?;
            }
            // Blank line between rows, as gnuplot-style grid files do.
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Write one CSV row per bin with its sample count.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(out);
        let averages = self.averages();
        for ((row, col), &magnitude_average) in averages.indexed_iter() {
            let (x_center, y_center) = self.center(row, col);
            writer
                .serialize(CsvRow {
                    x_center,
                    y_center,
                    magnitude_average,
                    count: self.counts[[row, col]],
                })
                .with_context(|| format!("writing CSV row for bin ({row}, {col})"))?;
        }
        writer.flush().context("flushing CSV")?;
        Ok(())
    }

    pub fn save_histogram(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_histogram(BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))
    }

    pub fn save_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        self.write_csv(BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))
    }
}

#[derive(Debug, Serialize)]
struct CsvRow {
    x_center: f64,
    y_center: f64,
    magnitude_average: f64,
    count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AxisRange;

    fn square(bins: usize) -> MagnitudeHistogram {
        let extent = Extent::new(AxisRange::new(0.0, 2.0), AxisRange::new(0.0, 2.0));
        MagnitudeHistogram::new(Bins::new(bins, bins), extent)
    }

    #[test]
    fn averages_per_bin_and_nan_when_empty() {
        let mut hist = square(2);
        hist.add_point(0.2, 0.2, 1.0);
        hist.add_point(0.8, 0.4, 3.0);
        hist.add_point(1.5, 1.5, 10.0);

        let avg = hist.averages();
        assert_eq!(avg[[0, 0]], 2.0);
        assert_eq!(avg[[1, 1]], 10.0);
        assert!(avg[[0, 1]].is_nan());
        assert_eq!(hist.counts()[[0, 0]], 2);
    }

    #[test]
    fn out_of_range_points_are_ignored_and_max_edge_is_kept() {
        let mut hist = square(2);
        let binned = hist.add_points([(-0.1, 1.0, 1.0), (1.0, 2.5, 1.0), (2.0, 2.0, 4.0)]);
        assert_eq!(binned, 1);
        assert_eq!(hist.averages()[[1, 1]], 4.0);
    }

    #[test]
    fn unit_cells_bin_per_unit() {
        let hist = MagnitudeHistogram::unit_cells(Extent::default());
        assert_eq!(hist.bins(), Bins::new(20, 30));
        assert_eq!(hist.center(0, 0), (-9.5, -9.5));
    }

    #[test]
    fn histogram_text_has_preamble_and_row_breaks() {
        let mut hist = square(2);
        hist.add_point(0.5, 0.5, 1.25);
        let mut buf = Vec::new();
        hist.write_histogram(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[2], "# Bins: 2 2");
        assert_eq!(lines[3], "# X-range: 0 2");
        assert_eq!(lines[5], "0.500000 0.500000 1.250000");
        assert_eq!(lines[6], "1.500000 0.500000 NaN");
        assert_eq!(lines[7], "");
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn csv_has_header_and_counts() {
        let mut hist = square(1);
        hist.add_point(1.0, 1.0, 2.0);
        let mut buf = Vec::new();
        hist.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("x_center,y_center,magnitude_average,count"));
        assert_eq!(lines.next(), Some("1.0,1.0,2.0,1"));
    }
}
