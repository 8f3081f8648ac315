use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::RenderConfig;
use crate::data::grid::Grid;
use crate::data::loader::load_file;
use crate::output::{output_dir, OutputPlan};
use crate::render::{
    compose_row, gaussian_filter, render_panel, save_png, FigureStyle, Interpolation,
};

/// What one run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The file had no usable records; nothing was rendered.
    NoData,
    /// Images written, in order.
    Rendered(Vec<PathBuf>),
}

/// Load `input`, rebuild its grid and write every image in the plan.
///
/// Open failures and non-rectangular record sets are errors; an empty record
/// set is not.
pub fn run(input: &Path, selected: Interpolation, config: &RenderConfig) -> Result<Outcome> {
    let data = load_file(input)?;
    if data.is_empty() {
        println!("No data found!");
        return Ok(Outcome::NoData);
    }

    let grid = Grid::from_records(&data.records)
        .with_context(|| format!("arranging records of {} into a grid", input.display()))?;
    let (ny, nx) = grid.shape();
    if (nx, ny) != (data.bins.x, data.bins.y) {
        log::warn!(
            "{}: preamble declares {} bins but records form a {nx}x{ny} grid",
            input.display(),
            data.bins
        );
    }
    let misplaced = grid.misplaced_records(&data.records);
    if misplaced > 0 {
        log::warn!(
            "{}: {misplaced} record(s) are not in row-major Y-then-X order and were drawn in other cells",
            input.display()
        );
    }

    let field = grid.filled();
    let style = FigureStyle::from_config(config);
    let plan = OutputPlan::new(input, selected, &config.comparison, config.smoothed);
    let mut written = Vec::with_capacity(plan.paths().len());

    let title = format!("Average Pressure Distribution\nInterpolation: {selected}");
    let panel = render_panel(&field, &data.extent, selected, &style, &title)?;
    save_png(&panel, &plan.selected)?;
    println!("Pressure map saved to: {}", plan.selected.display());
    written.push(plan.selected.clone());

    for (mode, path) in &plan.comparison {
        let panel = render_panel(&field, &data.extent, *mode, &style, mode.label())?;
        save_png(&panel, path)?;
        log::info!("{} panel saved to {}", mode.label(), path.display());
        written.push(path.clone());
    }
    if !plan.comparison.is_empty() {
        println!("Comparison plots saved to: {}", output_dir(input).display());
    }

    if let Some(path) = &plan.smoothed {
        let smoothed = gaussian_filter(&field, config.sigma);
        let smoothed_title = format!("Smoothed (Gaussian, σ={})", config.sigma);
        let bilinear = Interpolation::Bilinear;
        let pair = compose_row(&[
            render_panel(&field, &data.extent, bilinear, &style, "Original (bilinear)")?,
            render_panel(&smoothed, &data.extent, bilinear, &style, &smoothed_title)?,
        ]);
        save_png(&pair, path)?;
        println!("Smoothed plot saved to: {}", path.display());
        written.push(path.clone());
    }

    Ok(Outcome::Rendered(written))
}
