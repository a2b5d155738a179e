//! Colour parsing and conversion.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Border colour used on light backgrounds.
pub const BORDER_DARK: u32 = 0xff41_4952;
/// Border colour used on dark backgrounds.
pub const BORDER_LIGHT: u32 = 0xffbb_bbbb;

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);

    /// Opaque colour from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Colour from components with alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Colour from a packed `0xAARRGGBB` value.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Packed `0xAARRGGBB` value.
    pub fn to_argb(self) -> u32 {
        u32::from(self.a) << 24 | u32::from(self.r) << 16 | u32::from(self.g) << 8 | u32::from(self.b)
    }

    /// RGB triple.
    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Copy with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Normalized RGBA.
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        )
    }

    /// `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// HSV value in percent.
    pub fn value_percent(self) -> f32 {
        f32::from(self.r.max(self.g).max(self.b)) / 255.0 * 100.0
    }

    /// Whether the colour is pure black, ignoring alpha.
    pub fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Border colour that contrasts with this background.
    pub fn contrasting_border(self) -> Colour {
        if self.value_percent() > 50.0 {
            Colour::from_argb(BORDER_DARK)
        } else {
            Colour::from_argb(BORDER_LIGHT)
        }
    }

    /// Parses `#rgb`, `#rrggbb`, `rgb(r,g,b)`, `rgba(r,g,b,a)` or a basic
    /// colour name.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::InvalidScene`] for anything else.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn parse(text: &str) -> Result<Self> {
        let s = text.trim().to_ascii_lowercase();
        let invalid = || ViewerError::InvalidScene(format!("invalid colour '{text}'"));

        if let Some(hex) = s.strip_prefix('#') {
            if !hex.is_ascii() {
                return Err(invalid());
            }
            let digit = |i: usize, n: usize| u8::from_str_radix(&hex[i..i + n], 16).map_err(|_| invalid());
            return match hex.len() {
                3 => Ok(Self::rgb(digit(0, 1)? * 17, digit(1, 1)? * 17, digit(2, 1)? * 17)),
                6 => Ok(Self::rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
                _ => Err(invalid()),
            };
        }

        let func = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(args) = func {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            let channel = |p: &str| p.parse::<u8>().map_err(|_| invalid());
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::rgb(channel(*r)?, channel(*g)?, channel(*b)?)),
                [r, g, b, a] => {
                    let alpha: f32 = a.parse().map_err(|_| invalid())?;
                    Ok(Self::rgba(
                        channel(*r)?,
                        channel(*g)?,
                        channel(*b)?,
                        (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
                    ))
                }
                _ => Err(invalid()),
            };
        }

        named(&s).ok_or_else(invalid)
    }
}

fn named(name: &str) -> Option<Colour> {
    let c = match name {
        "black" => Colour::BLACK,
        "white" => Colour::WHITE,
        "red" => Colour::rgb(255, 0, 0),
        "green" => Colour::rgb(0, 128, 0),
        "lime" => Colour::rgb(0, 255, 0),
        "blue" => Colour::rgb(0, 0, 255),
        "yellow" => Colour::rgb(255, 255, 0),
        "cyan" => Colour::rgb(0, 255, 255),
        "magenta" => Colour::rgb(255, 0, 255),
        "orange" => Colour::rgb(255, 165, 0),
        "grey" | "gray" => Colour::rgb(128, 128, 128),
        _ => return None,
    };
    Some(c)
}

impl From<[u8; 3]> for Colour {
    fn from(rgb: [u8; 3]) -> Self {
        Self::rgb(rgb[0], rgb[1], rgb[2])
    }
}
