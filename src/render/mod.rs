//! Rendering: grid → pixels → chart → PNG.
//!
//! ```text
//!  Array2<f64> ──resample──▶ pixel field ──colormap──▶ heatmap bitmap
//!       │                                                  │
//!       └─gaussian_filter (smoothed variant)               ▼
//!                        plotters chart (title, axes, ticks, colorbar) ──▶ .png
//! ```

pub mod figure;
pub mod interpolation;
pub mod smooth;

pub use figure::{compose_row, render_panel, save_png, FigureStyle};
pub use interpolation::Interpolation;
pub use smooth::gaussian_filter;
