//! RGB colors and the color tokens accepted in markup and style settings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    /// Create a color from its channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a color token: `#rgb`, `#rrggbb` or a CSS color name.
    ///
    /// Returns `None` for anything else; callers decide the fallback.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(hex) = token.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        Self::from_name(token)
    }

    /// Parse the hex digits of `#rgb` or `#rrggbb` (without the `#`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let mut channels = hex.chars().map(|c| {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    v * 17
                });
                Some(Self::rgb(
                    channels.next()?,
                    channels.next()?,
                    channels.next()?,
                ))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => None,
        }
    }

    /// Look up a CSS color name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, c)| *c)
    }

    /// Hex notation, `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels scaled to `0.0..=1.0`, as PDF color operators expect.
    pub fn to_unit_rgb(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse(&value).ok_or_else(|| format!("invalid color: {}", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::rgb(0x00, 0x00, 0x00)),
    ("silver", Color::rgb(0xc0, 0xc0, 0xc0)),
    ("gray", Color::rgb(0x80, 0x80, 0x80)),
    ("grey", Color::rgb(0x80, 0x80, 0x80)),
    ("white", Color::rgb(0xff, 0xff, 0xff)),
    ("maroon", Color::rgb(0x80, 0x00, 0x00)),
    ("red", Color::rgb(0xff, 0x00, 0x00)),
    ("purple", Color::rgb(0x80, 0x00, 0x80)),
    ("fuchsia", Color::rgb(0xff, 0x00, 0xff)),
    ("magenta", Color::rgb(0xff, 0x00, 0xff)),
    ("green", Color::rgb(0x00, 0x80, 0x00)),
    ("lime", Color::rgb(0x00, 0xff, 0x00)),
    ("olive", Color::rgb(0x80, 0x80, 0x00)),
    ("yellow", Color::rgb(0xff, 0xff, 0x00)),
    ("navy", Color::rgb(0x00, 0x00, 0x80)),
    ("blue", Color::rgb(0x00, 0x00, 0xff)),
    ("teal", Color::rgb(0x00, 0x80, 0x80)),
    ("aqua", Color::rgb(0x00, 0xff, 0xff)),
    ("cyan", Color::rgb(0x00, 0xff, 0xff)),
    ("orange", Color::rgb(0xff, 0xa5, 0x00)),
    ("pink", Color::rgb(0xff, 0xc0, 0xcb)),
    ("brown", Color::rgb(0xa5, 0x2a, 0x2a)),
    ("gold", Color::rgb(0xff, 0xd7, 0x00)),
    ("indigo", Color::rgb(0x4b, 0x00, 0x82)),
    ("violet", Color::rgb(0xee, 0x82, 0xee)),
    ("crimson", Color::rgb(0xdc, 0x14, 0x3c)),
    ("coral", Color::rgb(0xff, 0x7f, 0x50)),
    ("tomato", Color::rgb(0xff, 0x63, 0x47)),
    ("salmon", Color::rgb(0xfa, 0x80, 0x72)),
    ("turquoise", Color::rgb(0x40, 0xe0, 0xd0)),
    ("darkblue", Color::rgb(0x00, 0x00, 0x8b)),
    ("darkgreen", Color::rgb(0x00, 0x64, 0x00)),
    ("darkred", Color::rgb(0x8b, 0x00, 0x00)),
    ("darkgray", Color::rgb(0xa9, 0xa9, 0xa9)),
    ("lightgray", Color::rgb(0xd3, 0xd3, 0xd3)),
    ("steelblue", Color::rgb(0x46, 0x82, 0xb4)),
    ("slategray", Color::rgb(0x70, 0x80, 0x90)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse("#0d9488"), Some(Color::rgb(0x0d, 0x94, 0x88)));
        assert_eq!(Color::parse("#fff"), Some(Color::rgb(255, 255, 255)));
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#ggg"), None);
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(Color::parse("Red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("teal"), Some(Color::rgb(0, 0x80, 0x80)));
        assert_eq!(Color::parse("notacolor"), None);
    }

    #[test]
    fn test_hex_output() {
        assert_eq!(Color::rgb(0x1a, 0x1a, 0x1a).to_hex(), "#1a1a1a");
        let json = serde_json::to_string(&Color::rgb(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
    }
}
