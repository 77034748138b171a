//! The two fixed visual states of a route segment

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build a color from a `0xRRGGBB` literal
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    /// CSS-style `#rrggbb` representation
    pub fn to_hex_string(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Stroke parameters applied to every line of a segment
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentStyle {
    pub color: Rgb,
    /// Stroke width in screen pixels
    pub weight: f32,
    /// Stroke opacity in `0.0..=1.0`
    pub opacity: f32,
}

impl SegmentStyle {
    /// Thin, semi-transparent blue
    pub const DEFAULT: Self = Self {
        color: Rgb::from_hex(0x0072bc),
        weight: 2.0,
        opacity: 0.8,
    };

    /// Thick, opaque gold
    pub const HIGHLIGHTED: Self = Self {
        color: Rgb::from_hex(0xffcc00),
        weight: 4.0,
        opacity: 1.0,
    };

    /// Alpha channel value for the stroke color
    pub fn alpha(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Which of the two presets a segment carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Default,
    Highlighted,
}

/// The pair of presets used by the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StylePresets {
    pub default: SegmentStyle,
    pub highlighted: SegmentStyle,
}

impl Default for StylePresets {
    fn default() -> Self {
        Self {
            default: SegmentStyle::DEFAULT,
            highlighted: SegmentStyle::HIGHLIGHTED,
        }
    }
}

impl StylePresets {
    #[inline]
    pub fn get(&self, kind: StyleKind) -> &SegmentStyle {
        match kind {
            StyleKind::Default => &self.default,
            StyleKind::Highlighted => &self.highlighted,
        }
    }
}
