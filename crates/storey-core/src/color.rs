//! Color handling for Storey meshes and materials.
//!
//! Floor-plan documents describe colors as packed 24-bit `0xRRGGBB` values or
//! `#rrggbb` strings. glTF materials want a linear-space RGBA factor. The
//! [`HexColor`] type bridges the two, delegating the sRGB transfer function to
//! the `color` crate.

use std::fmt;

use color::{AlphaColor, LinearSrgb, Srgb};
use serde::{Deserialize, Deserializer};

/// A packed 24-bit sRGB color (`0xRRGGBB`).
///
/// # Examples
///
/// ```
/// use storey_core::color::HexColor;
///
/// let grey = HexColor::parse("#d3d3d3").unwrap();
/// assert_eq!(grey.value(), 0xd3d3d3);
/// assert_eq!(grey.to_string(), "#d3d3d3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(u32);

impl HexColor {
    /// Opaque white, used as the base color factor of textured materials.
    pub const WHITE: HexColor = HexColor(0xffffff);

    /// Create a color from a packed value; bits above the low 24 are dropped.
    pub const fn new(value: u32) -> Self {
        Self(value & 0x00ff_ffff)
    }

    /// Parse a `#rrggbb` string.
    ///
    /// Returns `None` for anything that is not exactly six hex digits after
    /// a leading `#`. Surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.trim().strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self::new)
    }

    /// Interpret a JSON-style number as a packed color.
    ///
    /// Non-finite, negative and fractional values are rejected.
    pub fn from_number(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return None;
        }
        Some(Self::new(value as u32))
    }

    /// Returns the packed `0xRRGGBB` value.
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the 8-bit sRGB channels.
    pub fn channels(self) -> [u8; 3] {
        [
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        ]
    }

    /// Converts to a linear-space RGBA factor.
    ///
    /// Each channel goes through the standard sRGB-to-linear transfer
    /// function; `alpha` is passed through unchanged.
    pub fn to_linear_factor(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.channels();
        let srgb = AlphaColor::<Srgb>::new([
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            alpha,
        ]);
        srgb.convert::<LinearSrgb>().components
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => HexColor::from_number(n)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid packed color `{n}`"))),
            Repr::Text(s) => HexColor::parse(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`"))),
        }
    }
}
