/// Data layer: histogram files in, rectangular grids out.
///
/// Architecture:
/// ```text
///  simulation samples
///        │
///        ▼
///   ┌───────────┐
///   │ histogram │  bin + average → `# Bins:` text file (and CSV)
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → HistogramData (records, bins, extent)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   grid   │  reshape records → Grid, NaN fill for display
///   └──────────┘
/// ```

pub mod grid;
pub mod histogram;
pub mod loader;
pub mod model;
