//! RGB color with the document text codec
//!
//! Colors are stored in documents as `"r,g,b"` decimal text. Decoding is
//! forgiving about whitespace around the components but strict about the
//! shape: exactly three components, each in 0..=255, anything else is
//! treated as "no color".

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Background color substituted for every box in high-contrast mode
    pub const HIGH_CONTRAST: Color = Color::new(255, 255, 240);

    /// Fallback box background when a kind defines no color of its own
    pub const LIGHT_GRAY: Color = Color::new(192, 192, 192);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse the `"r,g,b"` document form
    ///
    /// Returns `None` for blank input or anything that is not exactly
    /// three decimal components in range.
    pub fn decode(content: &str) -> Option<Self> {
        if content.trim().is_empty() {
            return None;
        }
        let parts: Vec<&str> = content.split(',').collect();
        if parts.len() != 3 {
            return None;
        }
        let component = |s: &str| s.trim().parse::<u8>().ok();
        Some(Self {
            r: component(parts[0])?,
            g: component(parts[1])?,
            b: component(parts[2])?,
        })
    }

    /// Render the `"r,g,b"` document form
    pub fn encode(&self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(Color::new(180, 255, 180).encode(), "180,255,180");
        assert_eq!(Color::new(0, 0, 0).encode(), "0,0,0");
    }

    #[test]
    fn test_decode_valid() {
        assert_eq!(Color::decode("180,255,180"), Some(Color::new(180, 255, 180)));
        assert_eq!(Color::decode(" 1 , 2 , 3 "), Some(Color::new(1, 2, 3)));
    }

    #[test]
    fn test_decode_rejects_bad_shapes() {
        assert_eq!(Color::decode(""), None);
        assert_eq!(Color::decode("   "), None);
        assert_eq!(Color::decode("1,2"), None);
        assert_eq!(Color::decode("1,2,3,4"), None);
        assert_eq!(Color::decode("1,2,256"), None);
        assert_eq!(Color::decode("1,2,-3"), None);
        assert_eq!(Color::decode("red,green,blue"), None);
    }

    #[test]
    fn test_round_trip() {
        let color = Color::new(64, 127, 255);
        assert_eq!(Color::decode(&color.encode()), Some(color));
    }
}
