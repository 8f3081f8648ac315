use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use pressure_map::{AxisRange, Bins, Extent, MagnitudeHistogram};

/// Write a synthetic pressure histogram (`.dat` + `.csv`) for trying out the renderer.
#[derive(Parser, Debug)]
#[command(name = "generate_sample", version)]
struct Args {
    /// Output path without extension
    #[arg(long, default_value = "sample_pressure")]
    output: PathBuf,

    #[arg(long, default_value_t = 40)]
    bins_x: usize,

    #[arg(long, default_value_t = 60)]
    bins_y: usize,

    /// Number of random samples to bin
    #[arg(long, default_value_t = 20_000)]
    samples: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn gaussian(x: f64, y: f64, (mx, my, sigma, amplitude): (f64, f64, f64, f64)) -> f64 {
    let r2 = (x - mx).powi(2) + (y - my).powi(2);
    amplitude * (-r2 / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, range: AxisRange) -> f64 {
        range.min + self.next_f64() * range.span()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let extent = Extent::default();
    let mut hist = MagnitudeHistogram::new(Bins::new(args.bins_x, args.bins_y), extent);

    // Pressure blobs: (center x, center y, sigma, amplitude)
    let blobs = [
        (-4.0, -5.0, 2.5, 120.0),
        (3.0, 4.0, 3.5, 80.0),
        (0.0, 14.0, 2.0, 150.0),
    ];

    // Sampling is sparser near the top so a few bins stay empty.
    let mut binned = 0;
    for _ in 0..args.samples {
        let x = rng.uniform(extent.x);
        let y = rng.uniform(extent.y);
        if y > 17.0 && rng.next_f64() < 0.9 {
            continue;
        }
        let pressure: f64 = blobs.iter().map(|&b| gaussian(x, y, b)).sum::<f64>()
            + 5.0
            + rng.gauss(0.0, 2.0);
        if hist.add_point(x, y, pressure) {
            binned += 1;
        }
    }

    let dat_path = args.output.with_extension("dat");
    let csv_path = args.output.with_extension("csv");
    hist.save_histogram(&dat_path)?;
    hist.save_csv(&csv_path)?;

    let empty = hist.counts().iter().filter(|&&c| c == 0).count();
    println!(
        "Wrote {binned} samples into {} bins ({empty} empty) to {} and {}",
        hist.bins(),
        dat_path.display(),
        csv_path.display()
    );
    Ok(())
}
