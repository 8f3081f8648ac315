use ndarray::{Array2, Axis};

/// Kernel half-width in standard deviations.
const TRUNCATE: f64 = 4.0;

/// Largest sigma, in grid cells, a kernel is built for; larger values are clamped.
pub const MAX_SIGMA: f64 = 1_000.0;

/// Normalized 1-D Gaussian weights for offsets `-radius..=radius`.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let sigma = sigma.min(MAX_SIGMA);
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    let weights: Vec<f64> = (0..=2 * radius)
        .map(|i| {
            let d = i as f64 - radius as f64;
            (-0.5 * d * d / (sigma * sigma)).exp()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Mirror an out-of-range index back into `0..n` (`d c b a | a b c d | d c b a`).
fn reflect(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period);
    if m < n as isize {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}

fn correlate_axis(field: &Array2<f64>, kernel: &[f64], axis: Axis) -> Array2<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array2::zeros(field.dim());
    for (src, mut dst) in field.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len();
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * src[reflect(i as isize + k as isize - radius, n)])
                .sum();
        }
    }
    out
}

/// Separable Gaussian blur with mirrored edges.
///
/// `sigma` is in grid cells; a non-positive or non-finite sigma returns the
/// field unchanged and one above [`MAX_SIGMA`] is clamped to it.
pub fn gaussian_filter(field: &Array2<f64>, sigma: f64) -> Array2<f64> {
    if !(sigma > 0.0 && sigma.is_finite()) || field.is_empty() {
        return field.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let rows_done = correlate_axis(field, &kernel, Axis(0));
    correlate_axis(&rows_done, &kernel, Axis(1))
}
