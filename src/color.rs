//! Packed KML colors.
//!
//! KML writes colors as eight hex digits in `aabbggrr` order, the reverse of
//! the usual `rrggbbaa`. [`decode_color`] turns that into a CSS color plus a
//! separate opacity.

use std::fmt;

/// A display color: opaque RGB channels plus an opacity in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub opacity: f64,
}

impl DisplayColor {
    /// Opaque black, used whenever a packed color cannot be read.
    pub const BLACK: DisplayColor = DisplayColor::rgb(0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            opacity: 1.0,
        }
    }

    /// CSS `rgb(r,g,b)` form, without opacity.
    pub fn css(&self) -> String {
        format!("rgb({},{},{})", self.red, self.green, self.blue)
    }

    /// CSS `rgba(r,g,b,a)` form with `extra` multiplied into the opacity.
    pub fn css_with_opacity(&self, extra: f64) -> String {
        let alpha = (self.opacity * extra).clamp(0.0, 1.0);
        format!(
            "rgba({},{},{},{})",
            self.red,
            self.green,
            self.blue,
            round_to(alpha, 3)
        )
    }
}

impl fmt::Display for DisplayColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Decode a packed `aabbggrr` color.
///
/// Anything that is not exactly eight hex digits decodes to
/// [`DisplayColor::BLACK`], including a `#`-prefixed or padded form.
pub fn decode_color(hex: &str) -> DisplayColor {
    if hex.len() != 8 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return DisplayColor::BLACK;
    }

    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    let (alpha, blue, green, red) = (byte(0), byte(2), byte(4), byte(6));

    DisplayColor {
        red,
        green,
        blue,
        opacity: f64::from(alpha) / 255.0,
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
