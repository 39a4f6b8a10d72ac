//! RGBA colors and the distance metrics used by flood fill.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pixels darker than this (Rec.601 luma, 0-255 scale) are treated as line-art ink.
///
/// Flood fill refuses to start on ink and never spreads across it.
pub const INK_LUMINANCE_THRESHOLD: f32 = 50.0;

/// An 8-bit non-premultiplied RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba {
    /// Opaque white, the default canvas background.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a color from all four channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// The same color with alpha forced to 255.
    #[must_use]
    pub const fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// Whether the alpha channel is 255.
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Perceived brightness (Rec.601 luma) on a 0-255 scale. Alpha is ignored.
    #[must_use]
    pub fn luminance(self) -> f32 {
        0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b)
    }

    /// Whether this color counts as outline ink.
    #[must_use]
    pub fn is_ink(self) -> bool {
        self.luminance() < INK_LUMINANCE_THRESHOLD
    }

    /// Squared Euclidean distance over all four channels.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let v = u32::from(a.abs_diff(b));
            v * v
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b) + d(self.a, other.a)
    }

    /// Largest absolute difference over the RGB channels. Alpha is ignored.
    #[must_use]
    pub fn max_rgb_delta(self, other: Self) -> u8 {
        self.r
            .abs_diff(other.r)
            .max(self.g.abs_diff(other.g))
            .max(self.b.abs_diff(other.b))
    }

    /// Composite this color over an opaque background.
    ///
    /// The result is always opaque. Opaque colors are returned unchanged.
    #[must_use]
    pub fn over(self, background: Self) -> Self {
        if self.a == 255 {
            return self;
        }
        let a = u32::from(self.a);
        let mix = |fg: u8, bg: u8| {
            let v = (u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255;
            // v <= 255 by construction
            #[allow(clippy::cast_possible_truncation)]
            {
                v as u8
            }
        };
        Self::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    /// Channels as `[r, g, b, a]`.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Build a color from `[r, g, b, a]`.
    #[must_use]
    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<image::Rgba<u8>> for Rgba {
    fn from(px: image::Rgba<u8>) -> Self {
        Self::from_array(px.0)
    }
}

impl From<Rgba> for image::Rgba<u8> {
    fn from(c: Rgba) -> Self {
        image::Rgba(c.to_array())
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// Error returned when a hex color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{0}': expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError(String);

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ink_detection() {
        assert!(Rgba::rgb(10, 10, 10).is_ink());
        assert!(Rgba::BLACK.is_ink());
        assert!(!Rgba::rgb(200, 200, 200).is_ink());
        assert!(!Rgba::WHITE.is_ink());
    }

    #[test]
    fn test_distance_squared_uses_alpha() {
        let a = Rgba::new(0, 0, 0, 255);
        let b = Rgba::new(3, 4, 0, 255);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(a.distance_squared(Rgba::new(0, 0, 0, 245)), 100);
    }

    #[test]
    fn test_max_rgb_delta_ignores_alpha() {
        let a = Rgba::new(10, 20, 30, 255);
        let b = Rgba::new(15, 10, 30, 0);
        assert_eq!(a.max_rgb_delta(b), 10);
    }

    #[test]
    fn test_over_keeps_opaque_and_blends_translucent() {
        let red = Rgba::rgb(255, 0, 0);
        assert_eq!(red.over(Rgba::WHITE), red);
        assert_eq!(Rgba::TRANSPARENT.over(Rgba::WHITE), Rgba::WHITE);

        let half = Rgba::new(0, 0, 0, 128).over(Rgba::WHITE);
        assert!(half.is_opaque());
        assert_eq!(half.r, 127);
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!("#ff8000".parse::<Rgba>(), Ok(Rgba::rgb(255, 128, 0)));
        assert_eq!("00000080".parse::<Rgba>(), Ok(Rgba::new(0, 0, 0, 128)));
        assert!("#fff".parse::<Rgba>().is_err());
        assert!("#gg0000".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let c = Rgba::rgb(18, 52, 86);
        assert_eq!(c.to_string(), "#123456");
        assert_eq!(c.to_string().parse::<Rgba>(), Ok(c));
    }
}
