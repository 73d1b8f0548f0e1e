//! Color type shared by the label taxonomy and the drawing surface.
//!
//! Colors are stored as 8-bit RGBA and written out as CSS hex strings
//! (`#RRGGBB` or `#RRGGBBAA`), which is what drawing surfaces and the
//! annotation file expect.

use std::fmt;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Fully opaque white.
    pub const WHITE: Rgba = Rgba::rgb(0xFF, 0xFF, 0xFF);

    /// Fully transparent black.
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    /// Create a color from all four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Same color with a different alpha channel.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Format as a CSS hex string. The alpha pair is only written when the
    /// color is not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Alpha as a 0.0-1.0 fraction.
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_output() {
        let c = Rgba::rgb(0x3B, 0x82, 0xF6);
        assert_eq!(c.to_hex(), "#3B82F6");
        assert_eq!(c.with_alpha(0x33).to_hex(), "#3B82F633");
        assert_eq!(Rgba::WHITE.to_string(), "#FFFFFF");
    }

    #[test]
    fn test_opacity() {
        assert!((Rgba::rgb(0xEF, 0x44, 0x44).with_alpha(0x33).opacity() - 0.2).abs() < 0.001);
        assert_eq!(Rgba::TRANSPARENT.opacity(), 0.0);
    }
}
