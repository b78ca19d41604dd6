//! Per-series color identity.
//!
//! A (location, metric) pair keeps the color it was first given for as long
//! as the owning registry lives. Colors come from the D3 `schemeCategory10`
//! palette first, then from golden-angle hue steps so later series stay
//! distinguishable.

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// D3 `schemeCategory10`.
const PALETTE: [Rgb; 10] = [
    Rgb(0x1f, 0x77, 0xb4),
    Rgb(0xff, 0x7f, 0x0e),
    Rgb(0x2c, 0xa0, 0x2c),
    Rgb(0xd6, 0x27, 0x28),
    Rgb(0x94, 0x67, 0xbd),
    Rgb(0x8c, 0x56, 0x4b),
    Rgb(0xe3, 0x77, 0xc2),
    Rgb(0x7f, 0x7f, 0x7f),
    Rgb(0xbc, 0xbd, 0x22),
    Rgb(0x17, 0xbe, 0xcf),
];

const GOLDEN_ANGLE_DEGREES: f32 = 137.507_77;

/// An RGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| format!("expected #rrggbb, got {s:?}"))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| format!("bad color {s:?}: {e}"))
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Convert HSV to RGB.
///
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0-1)
/// * `v` - Value/brightness (0-1)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Rgb(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// The `index`-th color handed out by a registry.
pub fn nth_color(index: usize) -> Rgb {
    match PALETTE.get(index) {
        Some(color) => *color,
        None => {
            let step = (index - PALETTE.len()) as f32;
            hsv_to_rgb(step * GOLDEN_ANGLE_DEGREES, 0.65, 0.85)
        }
    }
}

/// Identity of a charted series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    pub location: String,
    pub metric: String,
}

impl SeriesKey {
    pub fn new(location: &str, metric: &str) -> Self {
        Self {
            location: location.to_string(),
            metric: metric.to_string(),
        }
    }
}

/// First-seen color assignment for series keys.
///
/// Owned by a single chart instance; two charts never share assignments.
#[derive(Debug, Default)]
pub struct ColorRegistry {
    assigned: HashMap<SeriesKey, Rgb>,
}

impl ColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The color for `key`, assigning the next free one on first sight.
    pub fn color_for(&mut self, key: &SeriesKey) -> Rgb {
        if let Some(color) = self.assigned.get(key) {
            return *color;
        }
        let color = nth_color(self.assigned.len());
        self.assigned.insert(key.clone(), color);
        color
    }

    /// The color already assigned to `key`, if any.
    pub fn get(&self, key: &SeriesKey) -> Option<Rgb> {
        self.assigned.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}
