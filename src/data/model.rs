use std::fmt;

// ---------------------------------------------------------------------------
// Record – one data line of a histogram file
// ---------------------------------------------------------------------------

/// A single `x y value` triple, kept in file order.
///
/// `value` is NaN for bins where no samples fell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Record {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Record { x, y, value }
    }
}

// ---------------------------------------------------------------------------
// Bins / AxisRange / Extent – preamble metadata
// ---------------------------------------------------------------------------

/// Declared bin counts along X and Y.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bins {
    pub x: usize,
    pub y: usize,
}

impl Bins {
    pub const DEFAULT: Bins = Bins { x: 100, y: 100 };

    pub fn new(x: usize, y: usize) -> Self {
        Bins { x, y }
    }
}

impl Default for Bins {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Bins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x, self.y)
    }
}

/// Inclusive `[min, max]` range of one physical axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn new(min: f64, max: f64) -> Self {
        AxisRange { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Physical placement of the grid: X and Y ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x: AxisRange,
    pub y: AxisRange,
}

impl Extent {
    pub const DEFAULT_X: AxisRange = AxisRange { min: -10.0, max: 10.0 };
    pub const DEFAULT_Y: AxisRange = AxisRange { min: -10.0, max: 20.0 };

    pub fn new(x: AxisRange, y: AxisRange) -> Self {
        Extent { x, y }
    }

    /// `(xmin, xmax, ymin, ymax)`
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.x.min, self.x.max, self.y.min, self.y.max)
    }

    /// Height over width of the physical area.
    pub fn aspect(&self) -> f64 {
        self.y.span() / self.x.span()
    }
}

impl Default for Extent {
    fn default() -> Self {
        Extent {
            x: Self::DEFAULT_X,
            y: Self::DEFAULT_Y,
        }
    }
}

// ---------------------------------------------------------------------------
// HistogramData – everything the loader recovers from one file
// ---------------------------------------------------------------------------

/// Parsed contents of a histogram file.
#[derive(Debug, Clone, Default)]
pub struct HistogramData {
    /// Accepted records in file order.
    pub records: Vec<Record>,
    /// Declared bin counts (or the default).
    pub bins: Bins,
    /// Declared axis ranges (or the defaults).
    pub extent: Extent,
    /// Non-blank, non-comment lines that were dropped as malformed.
    pub skipped_lines: usize,
}

impl HistogramData {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(|r| r.value)
    }
}
