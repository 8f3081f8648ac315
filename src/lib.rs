//! Pressure-distribution heatmaps from 2D histogram files.
//!
//! The [`data`] layer reads (and, for simulations, writes) the commented
//! `x y value` histogram format and rebuilds the rectangular grid; [`render`]
//! turns a grid into PNG panels under different interpolation kernels.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod render;

pub use color::Colormap;
pub use config::RenderConfig;
pub use data::grid::{Grid, GridError};
pub use data::histogram::MagnitudeHistogram;
pub use data::loader::{load_file, parse_reader, MetadataError};
pub use data::model::{AxisRange, Bins, Extent, HistogramData, Record};
pub use error::ParseNameError;
pub use pipeline::{run, Outcome};
pub use render::Interpolation;
