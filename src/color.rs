use std::fmt;
use std::str::FromStr;

use image::Rgb;
use palette::{Mix, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::ParseNameError;

// ---------------------------------------------------------------------------
// Colormap stops
// ---------------------------------------------------------------------------

type Stop = (u8, u8, u8);

const VIRIDIS: &[Stop] = &[
    (0x44, 0x01, 0x54),
    (0x47, 0x2c, 0x7a),
    (0x3b, 0x51, 0x8b),
    (0x2c, 0x71, 0x8e),
    (0x21, 0x90, 0x8d),
    (0x27, 0xad, 0x81),
    (0x5c, 0xc8, 0x63),
    (0xaa, 0xdc, 0x32),
    (0xfd, 0xe7, 0x25),
];

const PLASMA: &[Stop] = &[
    (0x0d, 0x08, 0x87),
    (0x4c, 0x02, 0xa1),
    (0x7e, 0x03, 0xa8),
    (0xa9, 0x23, 0x95),
    (0xcc, 0x47, 0x78),
    (0xe5, 0x6b, 0x5d),
    (0xf8, 0x94, 0x41),
    (0xfd, 0xc3, 0x28),
    (0xf0, 0xf9, 0x21),
];

const INFERNO: &[Stop] = &[
    (0x00, 0x00, 0x04),
    (0x1f, 0x0c, 0x48),
    (0x55, 0x0f, 0x6d),
    (0x88, 0x22, 0x6a),
    (0xba, 0x36, 0x55),
    (0xe3, 0x59, 0x33),
    (0xf9, 0x8e, 0x09),
    (0xf9, 0xcb, 0x35),
    (0xfc, 0xff, 0xa4),
];

const MAGMA: &[Stop] = &[
    (0x00, 0x00, 0x04),
    (0x1c, 0x10, 0x44),
    (0x4f, 0x12, 0x7b),
    (0x81, 0x25, 0x81),
    (0xb5, 0x36, 0x7a),
    (0xe5, 0x50, 0x64),
    (0xfb, 0x87, 0x61),
    (0xfe, 0xc2, 0x87),
    (0xfc, 0xfd, 0xbf),
];

// Knees at t = 1/8, 3/8, 5/8, 7/8 fall on stops 1, 3, 5, 7.
const JET: &[Stop] = &[
    (0x00, 0x00, 0x80),
    (0x00, 0x00, 0xff),
    (0x00, 0x80, 0xff),
    (0x00, 0xff, 0xff),
    (0x80, 0xff, 0x80),
    (0xff, 0xff, 0x00),
    (0xff, 0x80, 0x00),
    (0xff, 0x00, 0x00),
    (0x80, 0x00, 0x00),
];

const GRAY: &[Stop] = &[(0x00, 0x00, 0x00), (0xff, 0xff, 0xff)];

// ---------------------------------------------------------------------------
// Colormap
// ---------------------------------------------------------------------------

/// Named sequential colormap for scalar fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Colormap {
    #[default]
    Viridis,
    Plasma,
    Inferno,
    Magma,
    Jet,
    Gray,
}

impl Colormap {
    pub const ALL: [Colormap; 6] = [
        Colormap::Viridis,
        Colormap::Plasma,
        Colormap::Inferno,
        Colormap::Magma,
        Colormap::Jet,
        Colormap::Gray,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Plasma => "plasma",
            Colormap::Inferno => "inferno",
            Colormap::Magma => "magma",
            Colormap::Jet => "jet",
            Colormap::Gray => "gray",
        }
    }

    fn stops(&self) -> &'static [Stop] {
        match self {
            Colormap::Viridis => VIRIDIS,
            Colormap::Plasma => PLASMA,
            Colormap::Inferno => INFERNO,
            Colormap::Magma => MAGMA,
            Colormap::Jet => JET,
            Colormap::Gray => GRAY,
        }
    }

    /// Colour at position `t` in `[0, 1]` (clamped).
    pub fn at(&self, t: f64) -> Rgb<u8> {
        let stops = self.stops();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let scaled = t * (stops.len() - 1) as f64;
        let lo = (scaled.floor() as usize).min(stops.len() - 1);
        let hi = (lo + 1).min(stops.len() - 1);
        let frac = (scaled - lo as f64) as f32;

        let a = stop_color(stops[lo]);
        let b = stop_color(stops[hi]);
        let mixed: Srgb<u8> = a.mix(b, frac).into_format();
        Rgb([mixed.red, mixed.green, mixed.blue])
    }

    /// Colour of `value` normalized against `[vmin, vmax]`.
    pub fn map(&self, value: f64, vmin: f64, vmax: f64) -> Rgb<u8> {
        let span = vmax - vmin;
        if span.abs() < f64::EPSILON {
            return self.at(0.0);
        }
        self.at((value - vmin) / span)
    }
}

fn stop_color((r, g, b): Stop) -> Srgb<f32> {
    Srgb::new(r, g, b).into_format()
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Colormap {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "plasma" => Ok(Colormap::Plasma),
            "inferno" => Ok(Colormap::Inferno),
            "magma" => Ok(Colormap::Magma),
            "jet" => Ok(Colormap::Jet),
            "gray" | "grey" | "grayscale" => Ok(Colormap::Gray),
            _ => Err(ParseNameError::new("colormap", s, &Colormap::ALL)),
        }
    }
}

impl TryFrom<String> for Colormap {
    type Error = ParseNameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Colormap> for String {
    fn from(cmap: Colormap) -> Self {
        cmap.name().to_string()
    }
}
