// ABOUTME: Color representation and hex conversion utilities.
// ABOUTME: Colors are stored as 8-bit RGB and serialized as "#rrggbb" strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("Color must look like #rrggbb, got {0:?}")]
    InvalidFormat(String),

    #[error("Invalid hex digits in color {0:?}")]
    InvalidHex(String),
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normal mode green (#89b482)
    pub const SAGE: Self = Self::rgb(0x89, 0xb4, 0x82);

    /// Pane mode yellow (#d8a657)
    pub const OCHRE: Self = Self::rgb(0xd8, 0xa6, 0x57);

    /// Tab mode blue (#7daea3)
    pub const TEAL: Self = Self::rgb(0x7d, 0xae, 0xa3);

    /// Resize mode magenta (#d3869b)
    pub const ROSE: Self = Self::rgb(0xd3, 0x86, 0x9b);

    /// Session mode cyan-green (#a9b665)
    pub const OLIVE: Self = Self::rgb(0xa9, 0xb6, 0x65);

    /// Insert mode orange (#e78a4e)
    pub const ORANGE: Self = Self::rgb(0xe7, 0x8a, 0x4e);

    pub const WHITE: Self = Self::rgb(0xff, 0xff, 0xff);

    pub const GRAY: Self = Self::rgb(0x7c, 0x6f, 0x64);

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ColorError::InvalidFormat(s.to_string()))?;

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ColorError::InvalidHex(s.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
