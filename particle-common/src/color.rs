use crate::error::SimError;
use palette::{FromColor, Hsv, Srgb};
use rand::prelude::*;
use rand_distr::Beta;
use serde::{Serialize, Serializer};
use std::fmt;

/// An opaque sRGB colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, SimError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(SimError::InvalidConfiguration(format!("'{}' is not a #rrggbb colour", hex)));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| SimError::InvalidConfiguration(format!("'{}' is not a #rrggbb colour", hex)))
        };
        Ok(Color { r: channel(0..2)?, g: channel(2..4)?, b: channel(4..6)? })
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// Colours travel to renderers as hex strings.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Supplies the colour of particles spawned without one.
pub trait ColorPolicy: Send {
    fn next_color(&mut self) -> Color;
}

/// Always hands out the same colour. Useful for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedColor(pub Color);

impl ColorPolicy for FixedColor {
    fn next_color(&mut self) -> Color {
        self.0
    }
}

/// Random colours skewed toward high saturation and value:
/// hue ~ U(0, 1), saturation ~ Beta(3, 1), value ~ Beta(8, 1).
pub struct BetaHsvColors {
    rng: StdRng,
    saturation: Beta<f64>,
    value: Beta<f64>,
}

impl BetaHsvColors {
    /// Seeded generator; `None` draws a seed from the OS.
    pub fn new(seed: Option<u64>) -> Result<Self, SimError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let beta = |alpha: f64| {
            Beta::new(alpha, 1.0).map_err(|e| SimError::InvalidConfiguration(format!("beta({}, 1): {}", alpha, e)))
        };
        Ok(BetaHsvColors { rng, saturation: beta(3.0)?, value: beta(8.0)? })
    }
}

impl ColorPolicy for BetaHsvColors {
    fn next_color(&mut self) -> Color {
        let hue: f64 = self.rng.random();
        let saturation = self.saturation.sample(&mut self.rng);
        let value = self.value.sample(&mut self.rng);

        // Convert HSV to RGB
        let hsv = Hsv::new(hue as f32 * 360.0, saturation as f32, value as f32);
        let rgb: Srgb = Srgb::from_color(hsv);
        let rgb: Srgb<u8> = rgb.into_format();
        Color::rgb(rgb.red, rgb.green, rgb.blue)
    }
}
