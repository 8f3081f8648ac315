//! Render configuration.
//!
//! Every field has a default, so a config file only needs the keys it wants
//! to change, e.g.
//!
//! ```json
//! { "colormap": "inferno", "sigma": 1.5, "comparison": ["nearest", "bicubic"] }
//! ```
//!
//! Command-line flags are applied on top of whatever the file provides.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::Colormap;
use crate::render::interpolation::Interpolation;
use crate::render::smooth::MAX_SIGMA;

/// Upper bounds on the pixel settings; panels are allocated in memory.
pub const MAX_PANEL_PX: u32 = 4096;
pub const MAX_COLORBAR_PX: u32 = 512;
pub const MAX_MARGIN_PX: u32 = 512;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Colormap for every panel (default: viridis).
    pub colormap: Colormap,

    /// Gaussian standard deviation, in grid cells, for the smoothed map.
    pub sigma: f64,

    /// Longest side of a heatmap in pixels.
    pub panel_px: u32,

    /// Colorbar width in pixels.
    pub colorbar_px: u32,

    /// Blank border around each panel in pixels.
    pub margin_px: u32,

    /// Modes written as one comparison image each; empty skips the comparison.
    pub comparison: Vec<Interpolation>,

    /// Whether to write the original-vs-smoothed pair.
    pub smoothed: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            colormap: Colormap::Viridis,
            sigma: 1.0,
            panel_px: 600,
            colorbar_px: 24,
            margin_px: 40,
            comparison: Interpolation::COMPARISON.to_vec(),
            smoothed: true,
        }
    }
}

impl RenderConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RenderConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && (0.0..=MAX_SIGMA).contains(&self.sigma)) {
            bail!("sigma must be between 0 and {MAX_SIGMA}, got {}", self.sigma);
        }
        if !(2..=MAX_PANEL_PX).contains(&self.panel_px) {
            bail!("panel_px must be between 2 and {MAX_PANEL_PX}, got {}", self.panel_px);
        }
        if !(1..=MAX_COLORBAR_PX).contains(&self.colorbar_px) {
            bail!("colorbar_px must be between 1 and {MAX_COLORBAR_PX}, got {}", self.colorbar_px);
        }
        if self.margin_px > MAX_MARGIN_PX {
            bail!("margin_px must be at most {MAX_MARGIN_PX}, got {}", self.margin_px);
        }
        Ok(())
    }
}
