use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use pressure_map::{run, Colormap, Interpolation, RenderConfig};

const AFTER_HELP: &str = "Interpolation methods: none, nearest, bilinear, bicubic, spline16, hanning \
(also hamming, catrom, gaussian)";

/// Render pressure-distribution heatmaps from a 2D histogram file.
#[derive(Parser, Debug)]
#[command(name = "pressure-map", version, after_help = AFTER_HELP)]
struct Args {
    /// Histogram data file written by the simulation
    data_file: PathBuf,

    /// Interpolation for the single map
    #[arg(default_value_t = Interpolation::Bilinear)]
    interpolation: Interpolation,

    /// Colormap: viridis, plasma, inferno, magma, jet, gray
    #[arg(long)]
    cmap: Option<Colormap>,

    /// Gaussian sigma (grid cells) for the smoothed map
    #[arg(long)]
    sigma: Option<f64>,

    /// JSON render configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not write the per-mode comparison images
    #[arg(long, default_value_t = false)]
    skip_comparison: bool,

    /// Do not write the original-vs-smoothed pair
    #[arg(long, default_value_t = false)]
    skip_smoothed: bool,
}

impl Args {
    fn render_config(&self) -> Result<RenderConfig> {
        let mut config = match &self.config {
            Some(path) => RenderConfig::load(path)?,
            None => RenderConfig::default(),
        };
        if let Some(cmap) = self.cmap {
            config.colormap = cmap;
        }
        if let Some(sigma) = self.sigma {
            config.sigma = sigma;
        }
        if self.skip_comparison {
            config.comparison.clear();
        }
        if self.skip_smoothed {
            config.smoothed = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // Usage problems exit with 1; --help and --version exit normally.
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return Ok(ExitCode::from(1));
        }
        Err(err) => err.exit(),
    };

    let config = args.render_config()?;
    log::debug!("render config: {config:?}");
    run(&args.data_file, args.interpolation, &config)?;
    Ok(ExitCode::SUCCESS)
}
