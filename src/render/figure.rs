use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use ndarray::Array2;
use plotters::backend::RGBPixel;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::interpolation::{resample, Interpolation};
use crate::color::Colormap;
use crate::config::RenderConfig;
use crate::data::grid::finite_range;
use crate::data::model::Extent;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FONT: &str = "sans-serif";
const TITLE_FONT_PX: f64 = 18.0;
const DESC_FONT_PX: f64 = 15.0;
const LABEL_FONT_PX: f64 = 12.0;
const TICKS: usize = 5;
const GRID_ALPHA: f64 = 0.3;

/// Height of the title band; room for two lines.
pub const TITLE_PX: u32 = 56;
/// Label area below and left of the heatmap (tick labels plus axis name).
pub const AXIS_LABEL_PX: u32 = 55;
/// Label area right of the colorbar.
pub const BAR_LABEL_PX: u32 = 80;

// ---------------------------------------------------------------------------
// Figure style
// ---------------------------------------------------------------------------

/// Pixel geometry and colouring shared by every panel of one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureStyle {
    pub colormap: Colormap,
    /// Longest side of the heatmap area.
    pub panel_px: u32,
    pub colorbar_px: u32,
    pub margin_px: u32,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl FigureStyle {
    pub fn from_config(config: &RenderConfig) -> Self {
        FigureStyle {
            colormap: config.colormap,
            panel_px: config.panel_px,
            colorbar_px: config.colorbar_px,
            margin_px: config.margin_px,
        }
    }

    /// Heatmap size in pixels, keeping one physical unit square.
    pub fn heatmap_size(&self, extent: &Extent) -> (u32, u32) {
        let aspect = extent.aspect();
        let long = self.panel_px.max(1) as f64;
        let (w, h) = if aspect <= 1.0 {
            (long, long * aspect)
        } else {
            (long / aspect, long)
        };
        ((w.round() as u32).max(1), (h.round() as u32).max(1))
    }

    /// Whole panel: title band, heatmap chart and colorbar chart.
    pub fn panel_size(&self, extent: &Extent) -> (u32, u32) {
        let (hw, hh) = self.heatmap_size(extent);
        let m = self.margin_px;
        let bar = self.gap_px() + self.colorbar_px.max(1) + BAR_LABEL_PX + m;
        (self.main_width(hw) + bar, TITLE_PX + m + hh + AXIS_LABEL_PX + m)
    }

    /// Width of the heatmap chart, label area and margins included.
    fn main_width(&self, heatmap_width: u32) -> u32 {
        self.margin_px + AXIS_LABEL_PX + heatmap_width + self.gap_px()
    }

    /// Half of the space between heatmap and colorbar.
    fn gap_px(&self) -> u32 {
        (self.margin_px / 2).max(1)
    }
}

// ---------------------------------------------------------------------------
// Rasterization
// ---------------------------------------------------------------------------

/// Colour a field at `width × height` pixels with the origin at the bottom:
/// field row 0 ends up as the last image row.
pub fn rasterize(
    field: &Array2<f64>,
    width: u32,
    height: u32,
    interpolation: Interpolation,
    colormap: Colormap,
    (vmin, vmax): (f64, f64),
) -> RgbImage {
    let sampled = resample(field, width as usize, height as usize, interpolation);
    RgbImage::from_fn(width, height, |x, y| {
        let row = (height - 1 - y) as usize;
        colormap.map(sampled[[row, x as usize]], vmin, vmax)
    })
}

/// One titled heatmap with labelled axes and a labelled colorbar on the right.
///
/// Lines of `title` are stacked and centered above the chart.
pub fn render_panel(
    field: &Array2<f64>,
    extent: &Extent,
    interpolation: Interpolation,
    style: &FigureStyle,
    title: &str,
) -> Result<RgbImage> {
    let (width, height) = style.panel_size(extent);
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    draw_panel(&mut buf, (width, height), field, extent, interpolation, style, title)
        .with_context(|| format!("drawing panel '{}'", title.replace('\n', " ")))?;
    RgbImage::from_raw(width, height, buf).context("panel buffer does not match its size")
}

fn draw_panel(
    buf: &mut [u8],
    (width, height): (u32, u32),
    field: &Array2<f64>,
    extent: &Extent,
    interpolation: Interpolation,
    style: &FigureStyle,
    title: &str,
) -> Result<()> {
    let root = BitMapBackend::<RGBPixel>::with_buffer_and_format(buf, (width, height))?
        .into_drawing_area();
    root.fill(&WHITE)?;

    let (title_area, body) = root.split_vertically(TITLE_PX);
    let lines: Vec<&str> = title.lines().collect();
    let step = TITLE_PX as i32 / (lines.len() as i32 + 1);
    let title_style = TextStyle::from((FONT, TITLE_FONT_PX).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    for (i, line) in lines.iter().enumerate() {
        title_area.draw_text(line, &title_style, (width as i32 / 2, step * (i as i32 + 1)))?;
    }

    let (hw, _) = style.heatmap_size(extent);
    let (main, bar_area) = body.split_horizontally(style.main_width(hw));
    let (m, gap) = (style.margin_px, style.gap_px());

    // Heatmap
    let (xmin, xmax, ymin, ymax) = extent.as_tuple();
    let limits = finite_range(field).unwrap_or((0.0, 0.0));
    let mut chart = ChartBuilder::on(&main)
        .margin_left(m)
        .margin_top(m)
        .margin_bottom(m)
        .margin_right(gap)
        .x_label_area_size(AXIS_LABEL_PX)
        .y_label_area_size(AXIS_LABEL_PX)
        .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
    let (pw, ph) = chart.plotting_area().dim_in_pixel();
    let heatmap = rasterize(field, pw, ph, interpolation, style.colormap, limits);
    chart.draw_series(std::iter::once(bitmap_element((xmin, ymax), heatmap)?))?;
    chart
        .configure_mesh()
        .x_labels(TICKS)
        .y_labels(TICKS)
        .x_label_formatter(&axis_label)
        .y_label_formatter(&axis_label)
        .x_desc("X (m)")
        .y_desc("Y (m)")
        .bold_line_style(BLACK.mix(GRID_ALPHA))
        .light_line_style(TRANSPARENT)
        .label_style((FONT, LABEL_FONT_PX))
        .axis_desc_style((FONT, DESC_FONT_PX))
        .draw()?;
    chart.plotting_area().draw(&Rectangle::new(
        [(xmin, ymin), (xmax, ymax)],
        BLACK.stroke_width(1),
    ))?;

    // Colorbar
    let (lo, hi) = colorbar_limits(limits);
    let mut bar = ChartBuilder::on(&bar_area)
        .margin_left(gap)
        .margin_top(m)
        .margin_bottom(m)
        .margin_right(m)
        .x_label_area_size(AXIS_LABEL_PX)
        .right_y_label_area_size(BAR_LABEL_PX)
        .build_cartesian_2d(0.0..1.0, lo..hi)?;
    let (bw, bh) = bar.plotting_area().dim_in_pixel();
    bar.draw_series(std::iter::once(bitmap_element(
        (0.0, hi),
        colorbar(bw, bh, style.colormap),
    )?))?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_labels(TICKS)
        .y_label_formatter(&value_label)
        .y_desc("Pressure (N/m)")
        .label_style((FONT, LABEL_FONT_PX))
        .axis_desc_style((FONT, DESC_FONT_PX))
        .draw()?;
    bar.plotting_area().draw(&Rectangle::new(
        [(0.0, lo), (1.0, hi)],
        BLACK.stroke_width(1),
    ))?;

    root.present()?;
    Ok(())
}

fn bitmap_element(
    upper_left: (f64, f64),
    image: RgbImage,
) -> Result<BitMapElement<'static, (f64, f64)>> {
    let size = image.dimensions();
    BitMapElement::with_owned_buffer(upper_left, size, image.into_raw())
        .context("bitmap buffer smaller than its size")
}

/// Value axis of the colorbar; a flat field gets a unit-wide range around its value.
fn colorbar_limits((vmin, vmax): (f64, f64)) -> (f64, f64) {
    if (vmax - vmin).abs() < f64::EPSILON {
        (vmin - 0.5, vmax + 0.5)
    } else {
        (vmin, vmax)
    }
}

fn axis_label(v: &f64) -> String {
    // `+ 0.0` turns -0 into 0.
    let rounded = (v * 100.0).round() / 100.0 + 0.0;
    format!("{rounded}")
}

fn value_label(v: &f64) -> String {
    let magnitude = v.abs();
    if magnitude != 0.0 && !(1e-2..1e4).contains(&magnitude) {
        format!("{v:.1e}")
    } else {
        axis_label(v)
    }
}

/// Vertical gradient, maximum at the top.
pub fn colorbar(width: u32, height: u32, colormap: Colormap) -> RgbImage {
    let denom = height.saturating_sub(1).max(1) as f64;
    RgbImage::from_fn(width, height, |_, y| colormap.at(1.0 - y as f64 / denom))
}

/// Lay panels out left to right, top-aligned.
pub fn compose_row(panels: &[RgbImage]) -> RgbImage {
    let width = panels.iter().map(|p| p.width()).sum::<u32>().max(1);
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(1);
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    let mut x = 0i64;
    for panel in panels {
        image::imageops::replace(&mut canvas, panel, x, 0);
        x += panel.width() as i64;
    }
    canvas
}

pub fn save_png(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::AxisRange;
    use ndarray::array;

    fn style(panel_px: u32) -> FigureStyle {
        FigureStyle {
            colormap: Colormap::Gray,
            panel_px,
            colorbar_px: 10,
            margin_px: 20,
        }
    }

    #[test]
    fn heatmap_keeps_physical_aspect() {
        let s = style(300);
        assert_eq!(s.heatmap_size(&Extent::default()), (200, 300));
        let wide = Extent::new(AxisRange::new(0.0, 4.0), AxisRange::new(0.0, 1.0));
        assert_eq!(s.heatmap_size(&wide), (300, 75));
    }

    #[test]
    fn origin_is_at_the_bottom() {
        let field = array![[0.0, 0.0], [1.0, 1.0]];
        let img = rasterize(&field, 2, 2, Interpolation::Nearest, Colormap::Gray, (0.0, 1.0));
        assert_eq!(*img.get_pixel(0, 0), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(1, 1), Rgb([0, 0, 0]));
    }

    fn is_white(p: &Rgb<u8>) -> bool {
        p.0 == [255, 255, 255]
    }

    #[test]
    fn panel_size_adds_title_labels_and_colorbar() {
        let s = style(200);
        let extent = Extent::new(AxisRange::new(0.0, 2.0), AxisRange::new(0.0, 2.0));
        let (w, h) = s.panel_size(&extent);
        assert_eq!(w, 20 + AXIS_LABEL_PX + 200 + 10 + 10 + 10 + BAR_LABEL_PX + 20);
        assert_eq!(h, TITLE_PX + 20 + 200 + AXIS_LABEL_PX + 20);
    }

    #[test]
    fn panel_has_heatmap_text_and_colorbar() {
        let field = array![[0.0, 1.0], [2.0, 3.0]];
        let extent = Extent::new(AxisRange::new(0.0, 2.0), AxisRange::new(0.0, 2.0));
        let s = style(200);
        let img = render_panel(&field, &extent, Interpolation::Nearest, &s, "Title\nsecond line")
            .unwrap();
        assert_eq!(img.dimensions(), s.panel_size(&extent));
        assert!(is_white(img.get_pixel(0, 0)));

        // Title glyphs in the top band, tick labels and axis name left of the heatmap.
        let inked = |xs: std::ops::Range<u32>, ys: std::ops::Range<u32>| {
            xs.flat_map(|x| ys.clone().map(move |y| (x, y)))
                .any(|(x, y)| !is_white(img.get_pixel(x, y)))
        };
        assert!(inked(0..img.width(), 0..TITLE_PX));
        assert!(inked(0..20 + AXIS_LABEL_PX, TITLE_PX..img.height()));

        // Heatmap: top-left cell is field row 1, column 0.
        let (left, top) = (20 + AXIS_LABEL_PX, TITLE_PX + 20);
        let expected = Colormap::Gray.map(2.0, 0.0, 3.0);
        let got = img.get_pixel(left + 4, top + 4);
        for c in 0..3 {
            assert!((got.0[c] as i32 - expected.0[c] as i32).abs() <= 2, "{got:?} vs {expected:?}");
        }

        // Colorbar: bright at the top, dark at the bottom.
        let bar_x = 20 + AXIS_LABEL_PX + 200 + 10 + 10 + 5;
        assert!(img.get_pixel(bar_x, top + 3).0[0] > 235);
        assert!(img.get_pixel(bar_x, top + 200 - 4).0[0] < 20);
    }

    #[test]
    fn flat_field_still_renders() {
        let field = Array2::from_elem((3, 3), 4.0);
        let img = render_panel(&field, &Extent::default(), Interpolation::Bilinear, &style(60), "")
            .unwrap();
        assert_eq!(img.dimensions(), style(60).panel_size(&Extent::default()));
    }

    #[test]
    fn tick_labels_are_trimmed() {
        assert_eq!(axis_label(&-10.0), "-10");
        assert_eq!(axis_label(&2.5), "2.5");
        assert_eq!(axis_label(&-0.0), "0");
        assert_eq!(value_label(&123456.0), "1.2e5");
        assert_eq!(value_label(&42.125), "42.13");
    }

    #[test]
    fn compose_row_places_panels_side_by_side() {
        let a = RgbImage::from_pixel(3, 2, Rgb([10, 10, 10]));
        let b = RgbImage::from_pixel(4, 5, Rgb([20, 20, 20]));
        let row = compose_row(&[a, b]);
        assert_eq!(row.dimensions(), (7, 5));
        assert_eq!(*row.get_pixel(0, 0), Rgb([10, 10, 10]));
        assert_eq!(*row.get_pixel(3, 4), Rgb([20, 20, 20]));
        assert_eq!(*row.get_pixel(0, 4), BACKGROUND);
    }
}
