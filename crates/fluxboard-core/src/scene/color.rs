//! Serializable color type shared by the scene model.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a `#rgb`, `#rrggbb` or `#rrggbbaa` hex string, falling back to
    /// black on malformed input. Scene payloads are only partially trusted,
    /// so this never fails.
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.trim().trim_start_matches('#');
        // Length checks below count bytes; multi-byte input must not reach
        // the slicing.
        if !hex.is_ascii() {
            return Self::black();
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                Self::new(r, g, b, 255)
            }
            6 | 8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                let a = if hex.len() == 8 {
                    u8::from_str_radix(&hex[6..8], 16).unwrap_or(255)
                } else {
                    255
                };
                Self::new(r, g, b, a)
            }
            _ => Self::black(),
        }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Apply an opacity multiplier to the alpha channel.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
        Self { a, ..self }
    }
}

/// Accepts either the channel struct or a CSS-style hex string, so
/// hand-edited scene files can write `"#3b82f6"`.
impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        fn opaque() -> u8 {
            255
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Channels {
                r: u8,
                g: u8,
                b: u8,
                #[serde(default = "opaque")]
                a: u8,
            },
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Hex(hex) => Rgba::from_hex(&hex),
            Repr::Channels { r, g, b, a } => Rgba::new(r, g, b, a),
        })
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Rgba::from_hex("#ffffff"), Rgba::white());
        assert_eq!(Rgba::from_hex("#000"), Rgba::black());
        assert_eq!(Rgba::from_hex("#11223344"), Rgba::new(17, 34, 51, 68));
    }

    #[test]
    fn test_malformed_hex_defaults_to_black() {
        assert_eq!(Rgba::from_hex("not-a-color"), Rgba::black());
        assert_eq!(Rgba::from_hex(""), Rgba::black());
        // Multi-byte input whose byte length looks valid must not panic.
        assert_eq!(Rgba::from_hex("€"), Rgba::black());
        assert_eq!(Rgba::from_hex("€€"), Rgba::black());
    }

    #[test]
    fn test_deserialize_accepts_channels_and_hex() {
        let channels: Rgba = serde_json::from_str(r#"{"r":59,"g":130,"b":246,"a":255}"#).unwrap();
        assert_eq!(channels, Rgba::new(59, 130, 246, 255));

        let no_alpha: Rgba = serde_json::from_str(r#"{"r":1,"g":2,"b":3}"#).unwrap();
        assert_eq!(no_alpha.a, 255);

        let hex: Rgba = serde_json::from_str("\"#3b82f6\"").unwrap();
        assert_eq!(hex, Rgba::new(59, 130, 246, 255));
    }

    #[test]
    fn test_peniko_roundtrip() {
        let color = Rgba::new(12, 34, 56, 200);
        let back: Rgba = Color::from(color).into();
        assert_eq!(color, back);
    }
}
