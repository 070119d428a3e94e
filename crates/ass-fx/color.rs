//! Colour conversion and palette helpers for effect scripts
//!
//! [`Color`] converts between RGB, HSV, HSL, HTML and the ASS notations used
//! in override tags (`&HBBGGRR&`, `&HAA&`) and style lines (`&HAABBGGRR`).
//! Alpha follows ASS convention: `0` is opaque, `255` fully transparent.
//!
//! Random helpers take a caller-owned [`rand::Rng`] so effect output is
//! reproducible from a seed.
//!
//! # Example
//!
//! ```rust
//! use ass_fx::Color;
//!
//! let orange = Color::from_html("#FF8000")?;
//! assert_eq!(orange.to_ass(), "&H0080FF&");
//! assert_eq!(Color::from_ass("&H0080FF&")?, orange);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::fmt;

use rand::Rng;

use crate::utils::{FxError, Result};

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;

/// RGB colour with ASS transparency
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Transparency, `0` = opaque
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);
    pub const RED: Self = Self::from_rgb(255, 0, 0);
    pub const BLUE: Self = Self::from_rgb(0, 0, 255);

    /// Opaque colour from channels
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0 }
    }

    /// Same colour with a different transparency
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Opaque colour from `0xRRGGBB`
    #[must_use]
    pub const fn from_hex(hex: u32) -> Self {
        Self::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Colour from channels in `0.0..=1.0`
    #[must_use]
    pub fn from_rgb1(r: f64, g: f64, b: f64) -> Self {
        Self::from_rgb(unit_to_byte(r), unit_to_byte(g), unit_to_byte(b))
    }

    /// Parse `#RRGGBB` or `#RGB`
    ///
    /// # Errors
    ///
    /// Returns [`FxError::InvalidColor`] for any other shape.
    pub fn from_html(html: &str) -> Result<Self> {
        let trimmed = html.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FxError::invalid_color(html));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(FxError::invalid_color(html)),
        };
        u32::from_str_radix(&expanded, 16)
            .map(Self::from_hex)
            .map_err(|_| FxError::invalid_color(html))
    }

    /// Parse ASS notation
    ///
    /// Accepts `&HAABBGGRR`, `&HBBGGRR&` (with or without the closing `&`)
    /// and the plain decimal form used by SSA style lines.
    ///
    /// # Errors
    ///
    /// Returns [`FxError::InvalidColor`] if the value is not one of those forms.
    pub fn from_ass(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let body = trimmed
            .strip_prefix("&H")
            .or_else(|| trimmed.strip_prefix("&h"))
            .map(|rest| rest.trim_end_matches('&'));

        let packed = match body {
            Some(hex) if !hex.is_empty() && hex.len() <= 8 => u32::from_str_radix(hex, 16).ok(),
            Some(_) => None,
            None => trimmed.parse::<u32>().ok(),
        }
        .ok_or_else(|| FxError::invalid_color(value))?;

        let [r, g, b, a] = packed.to_le_bytes();
        Ok(Self { r, g, b, a })
    }

    /// Colour from hue (degrees), saturation and value (percent)
    #[must_use]
    pub fn from_hsv(h: u16, s: u8, v: u8) -> Self {
        let s = f64::from(s.min(100)) / 100.0;
        let v = f64::from(v.min(100)) / 100.0;
        let c = v * s;
        let (r, g, b) = hue_sector(h, c);
        let m = v - c;
        Self::from_rgb1(r + m, g + m, b + m)
    }

    /// Hue (degrees), saturation and value (percent)
    #[must_use]
    pub fn to_hsv(self) -> (u16, u8, u8) {
        let (max, min, hue) = self.hue_parts();
        let delta = max - min;
        let s = if max == 0.0 { 0.0 } else { delta / max };
        (hue, percent(s), percent(max))
    }

    /// Colour from hue (degrees), saturation and lightness (percent)
    #[must_use]
    pub fn from_hsl(h: u16, s: u8, l: u8) -> Self {
        let s = f64::from(s.min(100)) / 100.0;
        let l = f64::from(l.min(100)) / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let (r, g, b) = hue_sector(h, c);
        let m = l - c / 2.0;
        Self::from_rgb1(r + m, g + m, b + m)
    }

    /// Hue (degrees), saturation and lightness (percent)
    #[must_use]
    pub fn to_hsl(self) -> (u16, u8, u8) {
        let (max, min, hue) = self.hue_parts();
        let delta = max - min;
        let l = (max + min) / 2.0;
        let s = if delta == 0.0 {
            0.0
        } else {
            delta / (1.0 - (2.0 * l - 1.0).abs())
        };
        (hue, percent(s), percent(l))
    }

    fn hue_parts(self) -> (f64, f64, u16) {
        let (r, g, b) = self.to_rgb1();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let degrees = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        (max, min, (degrees.round() as u16) % 360)
    }

    /// Channels in `0.0..=1.0`
    #[must_use]
    pub fn to_rgb1(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }

    #[must_use]
    pub fn hue(self) -> u16 {
        self.to_hsv().0
    }

    /// Override tag colour, `&HBBGGRR&`
    #[must_use]
    pub fn to_ass(self) -> String {
        format!("&H{:02X}{:02X}{:02X}&", self.b, self.g, self.r)
    }

    /// Override tag alpha, `&HAA&`
    #[must_use]
    pub fn to_ass_alpha(self) -> String {
        format!("&H{:02X}&", self.a)
    }

    /// Style line colour, `&HAABBGGRR`
    #[must_use]
    pub fn to_ass_style(self) -> String {
        format!("&H{:02X}{:02X}{:02X}{:02X}", self.a, self.b, self.g, self.r)
    }

    /// `#rrggbb`
    #[must_use]
    pub fn to_html(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Luma-weighted grey
    #[must_use]
    pub fn grayscale(self) -> Self {
        let y = (77 * u32::from(self.r) + 151 * u32::from(self.g) + 28 * u32::from(self.b)) >> 8;
        let y = u8::try_from(y).unwrap_or(u8::MAX);
        Self::from_rgb(y, y, y).with_alpha(self.a)
    }

    #[must_use]
    pub const fn invert(self) -> Self {
        Self {
            r: !self.r,
            g: !self.g,
            b: !self.b,
            a: self.a,
        }
    }

    /// Opposite hue, same saturation and value
    #[must_use]
    pub fn complementary(self) -> Self {
        let (h, s, v) = self.to_hsv();
        Self::from_hsv((h + 180) % 360, s, v).with_alpha(self.a)
    }

    /// `n` neighbouring hues spread around this one, `separation` degrees apart
    #[must_use]
    pub fn analog(self, n: usize, separation: u16) -> Vec<Self> {
        let (h, s, v) = self.to_hsv();
        let mut below = Vec::new();
        let mut above = Vec::new();

        for step in 0..n {
            let distance = i32::from(separation) * (step / 2 + 1) as i32;
            let hue = if step % 2 == 0 {
                i32::from(h) - distance
            } else {
                i32::from(h) + distance
            };
            let hue = u16::try_from(hue.rem_euclid(360)).unwrap_or(0);
            let color = Self::from_hsv(hue, s, v);
            if step % 2 == 0 {
                below.insert(0, color);
            } else {
                above.push(color);
            }
        }
        below.extend(above);
        below
    }

    /// Raise HSL lightness by `amount` percent
    #[must_use]
    pub fn lighter(self, amount: u8) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l.saturating_add(amount).min(100)).with_alpha(self.a)
    }

    /// Lower HSL lightness by `amount` percent
    #[must_use]
    pub fn darker(self, amount: u8) -> Self {
        let (h, s, l) = self.to_hsl();
        Self::from_hsl(h, s, l.saturating_sub(amount)).with_alpha(self.a)
    }

    /// Linear RGB interpolation, `t = 0` is `self`, `t = 1` is `other`
    #[must_use]
    pub fn blend(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let (r, g, b) = self.to_rgb1();
        let (r2, g2, b2) = other.to_rgb1();
        Self::from_rgb1(r + t * (r2 - r), g + t * (g2 - g), b + t * (b2 - b))
    }

    #[must_use]
    pub fn mix(self, other: Self) -> Self {
        self.blend(other, 0.5)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ass())
    }
}

/// `n` colours evenly spaced along the piecewise-linear path through `stops`
///
/// ```rust
/// use ass_fx::{color::gradient, Color};
///
/// let ramp = gradient(3, &[Color::BLACK, Color::WHITE]);
/// assert_eq!(ramp[1], Color::from_rgb(128, 128, 128));
/// ```
#[must_use]
pub fn gradient(n: usize, stops: &[Color]) -> Vec<Color> {
    match (n, stops) {
        (0, _) | (_, []) => Vec::new(),
        (_, [only]) => vec![*only; n],
        (1, [first, ..]) => vec![*first],
        _ => {
            let segments = (stops.len() - 1) as f64;
            (0..n)
                .map(|i| {
                    let position = i as f64 / (n - 1) as f64 * segments;
                    let segment = (position.floor() as usize).min(stops.len() - 2);
                    let t = position - segment as f64;
                    stops[segment].blend(stops[segment + 1], t)
                })
                .collect()
        }
    }
}

/// `n` hues evenly spaced around the colour wheel
#[must_use]
pub fn rainbow(n: usize, s: u8, v: u8) -> Vec<Color> {
    (0..n)
        .map(|i| {
            let hue = (360.0 * i as f64 / n as f64).round() as u16 % 360;
            Color::from_hsv(hue, s, v)
        })
        .collect()
}

/// `n` hues stepped by the golden ratio, far apart for any prefix length
#[must_use]
pub fn distinguishable(n: usize, s: u8, v: u8) -> Vec<Color> {
    (0..n)
        .map(|i| {
            let hue = (360.0 * GOLDEN_RATIO_CONJUGATE * i as f64).rem_euclid(360.0);
            Color::from_hsv(hue.round() as u16 % 360, s, v)
        })
        .collect()
}

/// Random hue in degrees, golden-ratio scaled
pub fn random_hue<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    let hue = (360.0 * GOLDEN_RATIO_CONJUGATE * rng.random::<f64>()).rem_euclid(360.0);
    hue.round() as u16 % 360
}

/// Random colour with fixed saturation and value
pub fn random_hsv<R: Rng + ?Sized>(rng: &mut R, s: u8, v: u8) -> Color {
    Color::from_hsv(random_hue(rng), s, v)
}

fn hue_sector(h: u16, chroma: f64) -> (f64, f64, f64) {
    let h = f64::from(h % 360) / 60.0;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    match h as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    }
}

fn unit_to_byte(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn percent(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 100.0).round() as u8
}
