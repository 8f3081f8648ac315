use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ParseNameError;

// ---------------------------------------------------------------------------
// Interpolation modes
// ---------------------------------------------------------------------------

/// Resampling used when a grid is stretched to pixel resolution.
///
/// Kernel shapes follow the classic image-filter definitions used by
/// scientific plotting tools, so the modes keep their familiar look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Interpolation {
    /// Raw cells, no resampling kernel.
    None,
    Nearest,
    Bilinear,
    /// Cubic B-spline (smooths, does not pass through cell values).
    Bicubic,
    Spline16,
    Hanning,
    Hamming,
    /// Catmull-Rom cubic.
    Catrom,
    Gaussian,
}

impl Interpolation {
    /// Modes rendered side by side for comparison.
    pub const COMPARISON: [Interpolation; 6] = [
        Interpolation::None,
        Interpolation::Nearest,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
        Interpolation::Spline16,
        Interpolation::Hanning,
    ];

    pub const ALL: [Interpolation; 9] = [
        Interpolation::None,
        Interpolation::Nearest,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
        Interpolation::Spline16,
        Interpolation::Hanning,
        Interpolation::Hamming,
        Interpolation::Catrom,
        Interpolation::Gaussian,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::None => "none",
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Spline16 => "spline16",
            Interpolation::Hanning => "hanning",
            Interpolation::Hamming => "hamming",
            Interpolation::Catrom => "catrom",
            Interpolation::Gaussian => "gaussian",
        }
    }

    /// Human-readable title.
    pub fn label(&self) -> &'static str {
        match self {
            Interpolation::None => "No interpolation",
            Interpolation::Nearest => "Nearest neighbour",
            Interpolation::Bilinear => "Bilinear",
            Interpolation::Bicubic => "Bicubic",
            Interpolation::Spline16 => "Spline 16",
            Interpolation::Hanning => "Hanning",
            Interpolation::Hamming => "Hamming",
            Interpolation::Catrom => "Catmull-Rom",
            Interpolation::Gaussian => "Gaussian",
        }
    }

    /// Kernel support radius in source cells; `None` for cell replication.
    pub fn radius(&self) -> Option<f64> {
        match self {
            Interpolation::None | Interpolation::Nearest => None,
            Interpolation::Bilinear | Interpolation::Hanning | Interpolation::Hamming => Some(1.0),
            Interpolation::Bicubic
            | Interpolation::Spline16
            | Interpolation::Catrom
            | Interpolation::Gaussian => Some(2.0),
        }
    }

    /// Kernel weight at distance `x` (in source cells) from the sample point.
    pub fn weight(&self, x: f64) -> f64 {
        let x = x.abs();
        if self.radius().is_some_and(|r| x >= r) {
            return 0.0;
        }
        match self {
            Interpolation::None | Interpolation::Nearest => {
                if x < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Interpolation::Bilinear => 1.0 - x,
            Interpolation::Bicubic => {
                let p3 = |v: f64| if v <= 0.0 { 0.0 } else { v * v * v };
                (p3(2.0 - x) - 4.0 * p3(1.0 - x)) / 6.0
            }
            Interpolation::Spline16 => {
                if x < 1.0 {
                    ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
                } else {
                    let t = x - 1.0;
                    ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
                }
            }
            Interpolation::Hanning => 0.5 + 0.5 * (PI * x).cos(),
            Interpolation::Hamming => 0.54 + 0.46 * (PI * x).cos(),
            Interpolation::Catrom => {
                if x < 1.0 {
                    0.5 * (2.0 + x * x * (-5.0 + x * 3.0))
                } else {
                    0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)))
                }
            }
            Interpolation::Gaussian => (-2.0 * x * x).exp() * (2.0 / PI).sqrt(),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Interpolation::ALL
            .into_iter()
            .find(|mode| mode.name() == lower)
            .ok_or_else(|| ParseNameError::new("interpolation", s, &Interpolation::ALL))
    }
}

impl TryFrom<String> for Interpolation {
    type Error = ParseNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Interpolation> for String {
    fn from(mode: Interpolation) -> Self {
        mode.name().to_string()
    }
}

// ---------------------------------------------------------------------------
// Separable resampling
// ---------------------------------------------------------------------------

/// Source taps `(index, weight)` for every output position along one axis.
fn axis_taps(n_in: usize, n_out: usize, mode: Interpolation) -> Vec<Vec<(usize, f64)>> {
    let scale = n_in as f64 / n_out as f64;
    let last = n_in - 1;
    let nearest = |o: usize| (((o as f64 + 0.5) * scale) as usize).min(last);

    let Some(radius) = mode.radius() else {
        return (0..n_out).map(|o| vec![(nearest(o), 1.0)]).collect();
    };

    // Widen the kernel when shrinking so every source cell contributes.
    let stretch = scale.max(1.0);
    let support = radius * stretch;

    (0..n_out)
        .map(|o| {
            let center = (o as f64 + 0.5) * scale - 0.5;
            let first = (center - support).ceil() as isize;
            let end = (center + support).floor() as isize;

            let mut taps: Vec<(usize, f64)> = (first..=end)
                .filter_map(|i| {
                    let w = mode.weight((i as f64 - center) / stretch);
                    (w != 0.0).then(|| (i.clamp(0, last as isize) as usize, w))
                })
                .collect();
            let total: f64 = taps.iter().map(|&(_, w)| w).sum();
            if total.abs() < 1e-12 {
                taps = vec![(nearest(o), 1.0)];
            } else {
                taps.iter_mut().for_each(|(_, w)| *w /= total);
            }
            taps
        })
        .collect()
}

/// Resample `field` to `height × width` cells. Row 0 stays row 0.
pub fn resample(field: &Array2<f64>, width: usize, height: usize, mode: Interpolation) -> Array2<f64> {
    let (rows_in, cols_in) = field.dim();
    if rows_in == 0 || cols_in == 0 || width == 0 || height == 0 {
        return Array2::zeros((height, width));
    }
    let col_taps = axis_taps(cols_in, width, mode);
    let row_taps = axis_taps(rows_in, height, mode);

    let mut horizontal = Array2::<f64>::zeros((rows_in, width));
    for r in 0..rows_in {
        for (c, taps) in col_taps.iter().enumerate() {
            horizontal[[r, c]] = taps.iter().map(|&(i, w)| field[[r, i]] * w).sum();
        }
    }

    let mut out = Array2::<f64>::zeros((height, width));
    for (r, taps) in row_taps.iter().enumerate() {
        for c in 0..width {
            out[[r, c]] = taps.iter().map(|&(i, w)| horizontal[[i, c]] * w).sum();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn interpolating_kernels_are_one_at_zero_and_zero_at_integers() {
        for mode in [
            Interpolation::Bilinear,
            Interpolation::Spline16,
            Interpolation::Hanning,
            Interpolation::Catrom,
        ] {
            assert_abs_diff_eq!(mode.weight(0.0), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(mode.weight(1.0), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(mode.weight(2.0), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn bicubic_is_the_cubic_b_spline() {
        assert_abs_diff_eq!(Interpolation::Bicubic.weight(0.0), 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(Interpolation::Bicubic.weight(1.0), 1.0 / 6.0, epsilon = 1e-12);
        assert_eq!(Interpolation::Bicubic.weight(2.5), 0.0);
    }

    #[test]
    fn nearest_upscale_replicates_cells() {
        let field = array![[1.0, 2.0], [3.0, 4.0]];
        let out = resample(&field, 4, 4, Interpolation::Nearest);
        assert_eq!(
            out,
            array![
                [1.0, 1.0, 2.0, 2.0],
                [1.0, 1.0, 2.0, 2.0],
                [3.0, 3.0, 4.0, 4.0],
                [3.0, 3.0, 4.0, 4.0]
            ]
        );
        assert_eq!(resample(&field, 4, 4, Interpolation::None), out);
    }

    #[test]
    fn same_size_is_identity_for_interpolating_kernels() {
        let field = array![[1.0, 5.0, 2.0], [0.0, -3.0, 8.0]];
        for mode in [Interpolation::Bilinear, Interpolation::Spline16, Interpolation::Catrom] {
            let out = resample(&field, 3, 2, mode);
            for (a, b) in out.iter().zip(field.iter()) {
                assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn constant_field_stays_constant_in_every_mode() {
        let field = Array2::from_elem((3, 5), 2.5);
        for mode in Interpolation::ALL {
            let out = resample(&field, 17, 11, mode);
            assert_eq!(out.dim(), (11, 17));
            for v in out.iter() {
                assert_abs_diff_eq!(*v, 2.5, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn bilinear_upscale_blends_between_cells() {
        let field = array![[0.0, 10.0]];
        let out = resample(&field, 8, 1, Interpolation::Bilinear);
        assert_eq!(out[[0, 0]], 0.0);
        assert_eq!(out[[0, 7]], 10.0);
        for c in 1..8 {
            assert!(out[[0, c]] >= out[[0, c - 1]]);
        }
        assert!(out[[0, 3]] > 0.0 && out[[0, 3]] < 10.0);
    }

    #[test]
    fn modes_parse_from_tokens() {
        for mode in Interpolation::ALL {
            assert_eq!(mode.to_string().parse::<Interpolation>().unwrap(), mode);
        }
        assert_eq!("BiLinear".parse::<Interpolation>().unwrap(), Interpolation::Bilinear);
        assert!("lanczos".parse::<Interpolation>().is_err());
    }
}
