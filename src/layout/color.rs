//! Track coloring.
//!
//! Each track gets one color sampled from a [`ColorMap`] at its normalized
//! position: `index / (count - 1)`, or `0` when there is a single track.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::LayoutError;

/// Opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack from `0xRRGGBB`; the top byte is ignored.
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Pack into `0xRRGGBB`.
    pub const fn to_u32(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    fn lerp(self, other: Color, t: f64) -> Color {
        let channel = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Color::rgb(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// Renderers consume colors as CSS hex strings.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Continuous color scale over `[0, 1]`.
pub trait ColorMap {
    fn sample(&self, t: f64) -> Color;
}

impl<F> ColorMap for F
where
    F: Fn(f64) -> Color,
{
    fn sample(&self, t: f64) -> Color {
        self(t)
    }
}

/// Piecewise-linear color scale through positioned stops.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientColorMap {
    /// `(position, color)` with positions ascending in `[0, 1]`.
    stops: Vec<(f64, Color)>,
}

impl GradientColorMap {
    /// Gradient through evenly spaced colors.
    pub fn from_colors(colors: &[Color]) -> Result<Self, LayoutError> {
        match colors.len() {
            0 => Err(LayoutError::InvalidConfig(
                "a color map needs at least one color".to_string(),
            )),
            1 => Ok(Self {
                stops: vec![(0.0, colors[0])],
            }),
            n => Ok(Self {
                stops: colors
                    .iter()
                    .enumerate()
                    .map(|(i, &color)| (i as f64 / (n - 1) as f64, color))
                    .collect(),
            }),
        }
    }

    /// The classic "jet" scale: dark blue, blue, cyan, yellow, red, dark red.
    pub fn jet() -> Self {
        Self {
            stops: vec![
                (0.0, Color::rgb(0, 0, 128)),
                (0.125, Color::rgb(0, 0, 255)),
                (0.375, Color::rgb(0, 255, 255)),
                (0.625, Color::rgb(255, 255, 0)),
                (0.875, Color::rgb(255, 0, 0)),
                (1.0, Color::rgb(128, 0, 0)),
            ],
        }
    }
}

impl Default for GradientColorMap {
    fn default() -> Self {
        Self::jet()
    }
}

impl ColorMap for GradientColorMap {
    fn sample(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let upper = self
            .stops
            .iter()
            .position(|&(position, _)| position >= t)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return self.stops[0].1;
        }

        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        if p1 <= p0 {
            return c1;
        }
        c0.lerp(c1, (t - p0) / (p1 - p0))
    }
}

/// One color per track, in track order.
pub fn track_colors(track_count: usize, color_map: &dyn ColorMap) -> Vec<Color> {
    match track_count {
        0 => Vec::new(),
        1 => vec![color_map.sample(0.0)],
        n => (0..n)
            .map(|i| color_map.sample(i as f64 / (n - 1) as f64))
            .collect(),
    }
}
