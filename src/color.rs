//! Color types, color-string parsing and color space conversions.
//!
//! Every aesthetic that ends up as a paint (color, fill, legend keys, color
//! bars) passes through [`Rgba`]. Strings coming from a plot specification are
//! resolved with [`Rgba::parse`], which accepts `rgb(r,g,b)`, `rgba(r,g,b,a)`,
//! `color(r,g,b,a)`, `#rrggbb` and a fixed table of named colors.

use crate::error::{Error, Result};
use std::fmt;

/// RGBA color with 8-bit components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255, 255 = fully opaque).
    pub a: u8,
}

/// Brightness factor used by [`Rgba::darker`] and [`Rgba::brighter`].
const BRIGHTNESS_FACTOR: f64 = 0.7;

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Light gray.
    pub const LIGHT_GRAY: Self = Self::rgb(192, 192, 192);
    /// Very light gray.
    pub const VERY_LIGHT_GRAY: Self = Self::rgb(210, 210, 210);
    /// Gray.
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    /// Opaque red.
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Light green.
    pub const LIGHT_GREEN: Self = Self::rgb(210, 255, 210);
    /// Opaque green.
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Dark green.
    pub const DARK_GREEN: Self = Self::rgb(0, 128, 0);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    /// Dark blue.
    pub const DARK_BLUE: Self = Self::rgb(0, 0, 128);
    /// Light blue.
    pub const LIGHT_BLUE: Self = Self::rgb(210, 210, 255);
    /// Yellow.
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    /// Light yellow.
    pub const LIGHT_YELLOW: Self = Self::rgb(255, 255, 128);
    /// Very light yellow.
    pub const VERY_LIGHT_YELLOW: Self = Self::rgb(255, 255, 210);
    /// Magenta.
    pub const MAGENTA: Self = Self::rgb(255, 0, 255);
    /// Light magenta.
    pub const LIGHT_MAGENTA: Self = Self::rgb(255, 210, 255);
    /// Dark magenta.
    pub const DARK_MAGENTA: Self = Self::rgb(128, 0, 128);
    /// Cyan.
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    /// Light cyan.
    pub const LIGHT_CYAN: Self = Self::rgb(210, 255, 255);
    /// Orange.
    pub const ORANGE: Self = Self::rgb(255, 192, 0);
    /// Pink.
    pub const PINK: Self = Self::rgb(255, 175, 175);
    /// Light pink.
    pub const LIGHT_PINK: Self = Self::rgb(255, 210, 210);

    /// Create a new RGBA color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color (alpha = 255).
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a color with modified alpha.
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Create a color with alpha given as opacity in `[0, 1]`.
    #[must_use]
    pub fn with_opacity(self, opacity: f64) -> Self {
        self.with_alpha(unit_to_channel(opacity))
    }

    /// Opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// Convert to array representation.
    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation between two colors, rounding each channel.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// A darker version of this color.
    #[must_use]
    pub fn darker(self) -> Self {
        let scale = |c: u8| (f64::from(c) * BRIGHTNESS_FACTOR) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// A brighter version of this color. Black becomes a dark gray.
    #[must_use]
    pub fn brighter(self) -> Self {
        let floor = (1.0 / (1.0 - BRIGHTNESS_FACTOR)) as u8;
        if self.r == 0 && self.g == 0 && self.b == 0 {
            return Self::new(floor, floor, floor, self.a);
        }
        let scale = |c: u8| {
            let c = if c > 0 && c < floor { floor } else { c };
            (f64::from(c) / BRIGHTNESS_FACTOR).min(255.0) as u8
        };
        Self::new(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// Relative luminance in `[0, 1]` (sRGB, alpha ignored).
    #[must_use]
    pub fn luminance(self) -> f64 {
        let linear = |c: u8| {
            let c = f64::from(c) / 255.0;
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * linear(self.r) + 0.7152 * linear(self.g) + 0.0722 * linear(self.b)
    }

    /// Contrast ratio between two colors, in `[1, 21]`.
    #[must_use]
    pub fn contrast_ratio(self, other: Self) -> f64 {
        let (a, b) = (self.luminance(), other.luminance());
        let (hi, lo) = if a > b { (a, b) } else { (b, a) };
        (hi + 0.05) / (lo + 0.05)
    }

    /// Build a color from hue (degrees), saturation and value in `[0, 1]`.
    #[must_use]
    pub fn from_hsv(h: f64, s: f64, v: f64) -> Self {
        let c = v * s;
        let (r, g, b) = hue_sector(h, c);
        let m = v - c;
        Self::rgb(
            unit_to_channel(r + m),
            unit_to_channel(g + m),
            unit_to_channel(b + m),
        )
    }

    /// Build a color from hue (degrees), saturation and lightness in `[0, 1]`.
    #[must_use]
    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        Hsla::hsl(h, s, l).to_rgba()
    }

    /// `#rrggbb` form, alpha dropped.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS color form: `rgb(r,g,b)`, or `rgba(r,g,b,a)` when not opaque.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("rgb({},{},{})", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{:.2})", self.r, self.g, self.b, self.opacity())
        }
    }

    /// Look up one of the named colors (case-insensitive, `_` and `-` interchangeable).
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase().replace('_', "-");
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == key)
            .map(|(_, c)| *c)
    }

    /// Parse a color string.
    ///
    /// Accepted forms: `rgb(r,g,b)`, `rgba(r,g,b,a)`, `color(r,g,b,a)`,
    /// `#rrggbb` and the names in [`NAMED_COLORS`]. Alpha in the functional
    /// forms is an opacity in `[0, 1]`, or a channel value when above 1.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let parsed = if trimmed.contains('(') {
            parse_functional(trimmed)
        } else if let Some(hex) = trimmed.strip_prefix('#') {
            parse_hex(hex)
        } else {
            Self::named(trimmed)
        };
        parsed.ok_or_else(|| Error::InvalidColor(text.to_string()))
    }

    /// Whether `text` is a color string [`Rgba::parse`] would accept.
    #[must_use]
    pub fn can_parse(text: &str) -> bool {
        Self::parse(text).is_ok()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl std::str::FromStr for Rgba {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Named colors accepted by [`Rgba::parse`].
pub const NAMED_COLORS: [(&str, Rgba); 23] = [
    ("white", Rgba::WHITE),
    ("black", Rgba::BLACK),
    ("light-gray", Rgba::LIGHT_GRAY),
    ("very-light-gray", Rgba::VERY_LIGHT_GRAY),
    ("gray", Rgba::GRAY),
    ("red", Rgba::RED),
    ("light-green", Rgba::LIGHT_GREEN),
    ("green", Rgba::GREEN),
    ("dark-green", Rgba::DARK_GREEN),
    ("blue", Rgba::BLUE),
    ("dark-blue", Rgba::DARK_BLUE),
    ("light-blue", Rgba::LIGHT_BLUE),
    ("yellow", Rgba::YELLOW),
    ("light-yellow", Rgba::LIGHT_YELLOW),
    ("very-light-yellow", Rgba::VERY_LIGHT_YELLOW),
    ("magenta", Rgba::MAGENTA),
    ("light-magenta", Rgba::LIGHT_MAGENTA),
    ("dark-magenta", Rgba::DARK_MAGENTA),
    ("cyan", Rgba::CYAN),
    ("light-cyan", Rgba::LIGHT_CYAN),
    ("orange", Rgba::ORANGE),
    ("pink", Rgba::PINK),
    ("light-pink", Rgba::LIGHT_PINK),
];

fn parse_functional(text: &str) -> Option<Rgba> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    if close < open || !text[close + 1..].trim().is_empty() {
        return None;
    }
    let name = text[..open].trim().to_ascii_lowercase();
    let args: Vec<&str> = text[open + 1..close].split(',').map(str::trim).collect();

    let expected = match name.as_str() {
        "rgb" => 3,
        "rgba" | "color" => 4,
        _ => return None,
    };
    if args.len() != expected {
        return None;
    }

    let channel = |s: &str| s.parse::<u8>().ok();
    let r = channel(args[0])?;
    let g = channel(args[1])?;
    let b = channel(args[2])?;
    let a = match args.get(3) {
        None => 255,
        Some(s) => {
            let v: f64 = s.parse().ok()?;
            if !(0.0..=255.0).contains(&v) {
                return None;
            }
            if v <= 1.0 {
                unit_to_channel(v)
            } else {
                v.round() as u8
            }
        }
    };
    Some(Rgba::new(r, g, b, a))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgba::rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn unit_to_channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// RGB components (before lightness offset) for a hue and chroma.
fn hue_sector(h: f64, c: f64) -> (f64, f64, f64) {
    let h = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    }
}

/// HSLA color with floating-point components.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsla {
    /// Hue (degrees, any value; reduced modulo 360).
    pub h: f64,
    /// Saturation (0.0-1.0).
    pub s: f64,
    /// Lightness (0.0-1.0).
    pub l: f64,
    /// Alpha (0.0-1.0).
    pub a: f64,
}

impl Hsla {
    /// Create a new HSLA color.
    #[must_use]
    pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
        Self { h, s, l, a }
    }

    /// Create an opaque HSL color (alpha = 1.0).
    #[must_use]
    pub const fn hsl(h: f64, s: f64, l: f64) -> Self {
        Self::new(h, s, l, 1.0)
    }

    /// Convert to RGBA, rounding each channel to the nearest integer.
    #[must_use]
    pub fn to_rgba(self) -> Rgba {
        let s = self.s.clamp(0.0, 1.0);
        let l = self.l.clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let (r, g, b) = hue_sector(self.h, c);
        let m = l - c / 2.0;
        Rgba::new(
            unit_to_channel(r + m),
            unit_to_channel(g + m),
            unit_to_channel(b + m),
            unit_to_channel(self.a),
        )
    }
}

impl From<Hsla> for Rgba {
    fn from(hsla: Hsla) -> Self {
        hsla.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_constants() {
        assert_eq!(Rgba::BLACK, Rgba::rgb(0, 0, 0));
        assert_eq!(Rgba::WHITE, Rgba::rgb(255, 255, 255));
        assert_eq!(Rgba::RED.r, 255);
        assert_eq!(Rgba::GREEN.g, 255);
        assert_eq!(Rgba::BLUE.b, 255);
    }

    #[test]
    fn test_parse_rgb() {
        assert_eq!(Rgba::parse("rgb(10,20,30)").unwrap(), Rgba::rgb(10, 20, 30));
        assert_eq!(Rgba::parse(" rgb( 1 , 2 , 3 ) ").unwrap(), Rgba::rgb(1, 2, 3));
    }

    #[test]
    fn test_parse_rgba_and_color() {
        assert_eq!(Rgba::parse("rgba(10,20,30,0.5)").unwrap(), Rgba::new(10, 20, 30, 128));
        assert_eq!(Rgba::parse("color(10,20,30,1)").unwrap(), Rgba::new(10, 20, 30, 255));
        assert_eq!(Rgba::parse("color(10,20,30,64)").unwrap(), Rgba::new(10, 20, 30, 64));
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgba::parse("#ff8000").unwrap(), Rgba::rgb(255, 128, 0));
        assert_eq!(Rgba::parse("#FF8000").unwrap(), Rgba::rgb(255, 128, 0));
        assert!(Rgba::parse("#ff80").is_err());
        assert!(Rgba::parse("#gg8000").is_err());
    }

    #[test]
    fn test_parse_named_case_insensitive() {
        assert_eq!(Rgba::parse("RED").unwrap(), Rgba::RED);
        assert_eq!(Rgba::parse("Dark-Green").unwrap(), Rgba::DARK_GREEN);
        assert_eq!(Rgba::parse("light_pink").unwrap(), Rgba::LIGHT_PINK);
        for (name, color) in NAMED_COLORS {
            assert_eq!(Rgba::parse(name).unwrap(), color, "{name}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "reddish", "rgb(1,2)", "rgb(1,2,3,4)", "hsl(1,2,3)", "rgb(300,0,0)", "rgba(1,2,3,-1)"] {
            let err = Rgba::parse(bad).expect_err(bad);
            assert!(err.to_string().contains("Error parsing color value"));
        }
    }

    #[test]
    fn test_to_css_and_hex() {
        assert_eq!(Rgba::rgb(1, 2, 3).to_css(), "rgb(1,2,3)");
        assert_eq!(Rgba::new(1, 2, 3, 0).to_css(), "rgba(1,2,3,0.00)");
        assert_eq!(Rgba::rgb(255, 0, 16).to_hex(), "#ff0010");
    }

    #[test]
    fn test_rgba_lerp() {
        let mid = Rgba::BLACK.lerp(Rgba::WHITE, 0.5);
        assert_eq!(mid, Rgba::rgb(128, 128, 128));
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, -0.5), Rgba::BLACK);
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 1.5), Rgba::WHITE);
    }

    #[test]
    fn test_darker_brighter() {
        assert_eq!(Rgba::rgb(100, 200, 50).darker(), Rgba::rgb(70, 140, 35));
        assert_eq!(Rgba::BLACK.brighter(), Rgba::rgb(3, 3, 3));
        assert_eq!(Rgba::rgb(70, 140, 250).brighter(), Rgba::rgb(100, 200, 255));
    }

    #[test]
    fn test_luminance_contrast() {
        assert!(Rgba::BLACK.luminance().abs() < 1e-12);
        assert!((Rgba::WHITE.luminance() - 1.0).abs() < 1e-12);
        assert!((Rgba::BLACK.contrast_ratio(Rgba::WHITE) - 21.0).abs() < 1e-9);
    }

    #[test]
    fn test_hsl_canonical_angles() {
        let hsl = |h| Hsla::hsl(h, 1.0, 0.5).to_rgba();
        assert_eq!(hsl(0.0), Rgba::rgb(255, 0, 0));
        assert_eq!(hsl(60.0), Rgba::rgb(255, 255, 0));
        assert_eq!(hsl(90.0), Rgba::rgb(128, 255, 0));
        assert_eq!(hsl(120.0), Rgba::rgb(0, 255, 0));
        assert_eq!(hsl(135.0), Rgba::rgb(0, 255, 64));
        assert_eq!(hsl(180.0), Rgba::rgb(0, 255, 255));
        assert_eq!(hsl(240.0), Rgba::rgb(0, 0, 255));
        assert_eq!(hsl(300.0), Rgba::rgb(255, 0, 255));
        assert_eq!(hsl(360.0), Rgba::rgb(255, 0, 0));
        assert_eq!(hsl(-60.0), Rgba::rgb(255, 0, 255));
    }

    #[test]
    fn test_hsla_gray_and_alpha() {
        let gray = Hsla::new(0.0, 0.0, 0.5, 0.5).to_rgba();
        assert_eq!(gray, Rgba::new(128, 128, 128, 128));
        let rgba: Rgba = Hsla::hsl(0.0, 1.0, 0.25).into();
        assert_eq!(rgba, Rgba::rgb(128, 0, 0));
    }

    #[test]
    fn test_from_hsv() {
        assert_eq!(Rgba::from_hsv(0.0, 1.0, 1.0), Rgba::RED);
        assert_eq!(Rgba::from_hsv(240.0, 1.0, 1.0), Rgba::BLUE);
        assert_eq!(Rgba::from_hsv(0.0, 0.0, 0.5), Rgba::rgb(128, 128, 128));
    }

    #[test]
    fn test_with_opacity() {
        assert_eq!(Rgba::RED.with_opacity(0.5).a, 128);
        assert_eq!(Rgba::RED.with_opacity(2.0).a, 255);
    }
}
