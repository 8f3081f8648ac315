use ndarray::Array2;
use thiserror::Error;

use super::model::Record;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("no records to arrange into a grid")]
    Empty,

    #[error("{records} records do not fill a {ny}x{nx} grid of distinct coordinates")]
    ShapeMismatch { records: usize, nx: usize, ny: usize },
}

// ---------------------------------------------------------------------------
// Grid – records reshaped onto their distinct X/Y coordinates
// ---------------------------------------------------------------------------

/// Rectangular scalar field. `values[[row, col]]` sits at `(xs[col], ys[row])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub values: Array2<f64>,
}

impl Grid {
    /// Reshape record values, in file order, to `(distinct y, distinct x)`.
    ///
    /// The producer writes rows of constant Y with X ascending, Y rows
    /// ascending. Files written in another order still reshape but land in the
    /// wrong cells; see [`Grid::misplaced_records`].
    pub fn from_records(records: &[Record]) -> Result<Self, GridError> {
        if records.is_empty() {
            return Err(GridError::Empty);
        }
        let xs = distinct_sorted(records.iter().map(|r| r.x));
        let ys = distinct_sorted(records.iter().map(|r| r.y));

        let (nx, ny) = (xs.len(), ys.len());
        let mismatch = GridError::ShapeMismatch {
            records: records.len(),
            nx,
            ny,
        };
        if nx.checked_mul(ny) != Some(records.len()) {
            return Err(mismatch);
        }
        let values = Array2::from_shape_vec((ny, nx), records.iter().map(|r| r.value).collect())
            .map_err(|_| mismatch)?;

        Ok(Grid { xs, ys, values })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    /// Count records whose coordinates disagree with the cell they were
    /// reshaped into. Records beyond the grid's cell count are all misplaced.
    pub fn misplaced_records(&self, records: &[Record]) -> usize {
        let mismatched = records
            .iter()
            .zip(self.values.indexed_iter())
            .filter(|(r, ((row, col), _))| {
                self.xs.get(*col) != Some(&r.x) || self.ys.get(*row) != Some(&r.y)
            })
            .count();
        mismatched + records.len().saturating_sub(self.values.len())
    }

    /// Smallest and largest finite value, if any.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.values)
    }

    /// Copy of the field with every NaN cell set to the minimum finite value.
    ///
    /// A grid with no finite values at all comes back as zeros.
    pub fn filled(&self) -> Array2<f64> {
        let fill = match self.finite_range() {
            Some((min, _)) => min,
            None => {
                log::warn!("grid has no finite values; rendering it as zeros");
                0.0
            }
        };
        self.values.mapv(|v| if v.is_nan() { fill } else { v })
    }
}

/// Sorted distinct values, compared exactly.
pub fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// Smallest and largest finite value of a field.
pub fn finite_range(values: &Array2<f64>) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn rows(values: &[(f64, f64, f64)]) -> Vec<Record> {
        values.iter().map(|&(x, y, v)| Record::new(x, y, v)).collect()
    }

    #[test]
    fn two_by_two_cells_follow_sorted_coordinates() {
        let records = rows(&[
            (0.5, 0.5, 1.0),
            (1.5, 0.5, 2.0),
            (0.5, 1.5, 3.0),
            (1.5, 1.5, 4.0),
        ]);
        let grid = Grid::from_records(&records).unwrap();
        assert_eq!(grid.xs, vec![0.5, 1.5]);
        assert_eq!(grid.ys, vec![0.5, 1.5]);
        for r in &records {
            let col = grid.xs.iter().position(|&x| x == r.x).unwrap();
            let row = grid.ys.iter().position(|&y| y == r.y).unwrap();
            assert_eq!(grid.values[[row, col]], r.value);
        }
        assert_eq!(grid.misplaced_records(&records), 0);
    }

    #[test]
    fn non_rectangular_records_are_rejected() {
        let records = rows(&[(0.0, 0.0, 1.0), (1.0, 0.0, 2.0), (0.0, 1.0, 3.0)]);
        assert_eq!(
            Grid::from_records(&records),
            Err(GridError::ShapeMismatch {
                records: 3,
                nx: 2,
                ny: 2
            })
        );
    }

    #[test]
    fn empty_records_are_rejected() {
        assert_eq!(Grid::from_records(&[]), Err(GridError::Empty));
    }

    #[test]
    fn column_major_file_is_reported_as_misplaced() {
        let records = rows(&[
            (0.0, 0.0, 1.0),
            (0.0, 1.0, 2.0),
            (1.0, 0.0, 3.0),
            (1.0, 1.0, 4.0),
        ]);
        let grid = Grid::from_records(&records).unwrap();
        assert_eq!(grid.misplaced_records(&records), 2);
    }

    #[test]
    fn records_beyond_the_grid_count_as_misplaced() {
        let records = rows(&[(0.0, 0.0, 1.0), (1.0, 0.0, 2.0)]);
        let grid = Grid::from_records(&records).unwrap();
        let mut longer = records.clone();
        longer.extend(rows(&[(0.0, 1.0, 3.0), (1.0, 1.0, 4.0)]));
        assert_eq!(grid.misplaced_records(&longer), 2);
        assert_eq!(grid.misplaced_records(&records[..1]), 0);
    }

    #[test]
    fn nan_cell_takes_minimum_finite_value() {
        let records = rows(&[
            (0.0, 0.0, 5.0),
            (1.0, 0.0, f64::NAN),
            (0.0, 1.0, 2.5),
            (1.0, 1.0, 7.0),
        ]);
        let grid = Grid::from_records(&records).unwrap();
        assert_eq!(grid.finite_range(), Some((2.5, 7.0)));
        assert_eq!(grid.filled(), array![[5.0, 2.5], [2.5, 7.0]]);
    }

    #[test]
    fn all_nan_grid_fills_with_zero() {
        let records = rows(&[(0.0, 0.0, f64::NAN), (1.0, 0.0, f64::NAN)]);
        let grid = Grid::from_records(&records).unwrap();
        assert_eq!(grid.finite_range(), None);
        assert_eq!(grid.filled(), array![[0.0, 0.0]]);
    }

    #[test]
    fn distinct_values_are_sorted_and_unique() {
        let xs = distinct_sorted([3.0, -1.0, 3.0, 0.5, -1.0].into_iter());
        assert_eq!(xs, vec![-1.0, 0.5, 3.0]);
    }
}
