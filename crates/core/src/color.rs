//! Hex color parsing for element styles.

use std::fmt;

/// Fallback fill behind an element when neither it nor its slide has one.
pub const NEUTRAL_BACKGROUND: Color = Color::rgb(0xff, 0xff, 0xff);

/// Text color used when an element's color is missing or unparseable.
pub const DEFAULT_TEXT: Color = Color::rgb(0x33, 0x33, 0x33);

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Self::rgb(channels[0], channels[1], channels[2]))
            }
            6 => Some(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Some(Self {
                r: byte(&hex[0..2])?,
                g: byte(&hex[2..4])?,
                b: byte(&hex[4..6])?,
                a: byte(&hex[6..8])?,
            }),
            _ => None,
        }
    }

    /// Parse a color, logging and falling back when it is unusable.
    pub fn parse_or(input: &str, fallback: Color) -> Self {
        match Self::parse_hex(input) {
            Some(color) => color,
            None => {
                log::warn!("Unrecognized color {:?}, using {}", input, fallback);
                fallback
            }
        }
    }

    /// `RRGGBB` without a leading `#`, as DrawingML expects.
    pub fn to_rgb_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 0xff {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}
