//! Color model for the renderer set
//!
//! Colors arrive from configuration as CSS-like strings (`#00ffcc`,
//! `rgb(0, 255, 204)`, a handful of names) and are parsed once at the
//! boundary into [`Rgb`]. Renderers that fade per element recombine the
//! parsed channels with a computed alpha instead of re-parsing strings.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

/// Default bar color (teal) used when a configured string cannot be parsed.
pub const DEFAULT_BAR_COLOR: Rgb = Rgb {
    r: 0x00,
    g: 0xff,
    b: 0xcc,
};

/// An opaque RGB triple in sRGB space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Creates a color from channel values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a CSS-like color string.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` (alpha
    /// discarded) and a small set of names. Returns `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("rgb") {
            return Self::parse_rgb_call(&lower);
        }
        Self::parse_named(&lower)
    }

    /// Parses with a logged fallback to the default teal.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            warn!("unrecognized color {:?}, falling back to default", s);
            DEFAULT_BAR_COLOR
        })
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            _ => None,
        }
    }

    fn parse_rgb_call(s: &str) -> Option<Self> {
        let open = s.find('(')?;
        let close = s.rfind(')')?;
        let mut parts = s[open + 1..close].split(',').map(str::trim);
        let r: u8 = parts.next()?.parse().ok()?;
        let g: u8 = parts.next()?.parse().ok()?;
        let b: u8 = parts.next()?.parse().ok()?;
        Some(Self::new(r, g, b))
    }

    fn parse_named(s: &str) -> Option<Self> {
        let (r, g, b) = match s {
            "black" => (0, 0, 0),
            "white" => (255, 255, 255),
            "red" => (255, 0, 0),
            "green" => (0, 128, 0),
            "lime" => (0, 255, 0),
            "blue" => (0, 0, 255),
            "yellow" => (255, 255, 0),
            "cyan" | "aqua" => (0, 255, 255),
            "magenta" | "fuchsia" => (255, 0, 255),
            "teal" => (0, 128, 128),
            "orange" => (255, 165, 0),
            "gray" | "grey" => (128, 128, 128),
            _ => return None,
        };
        Some(Self::new(r, g, b))
    }

    /// Converts to a tiny-skia color with the given alpha in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> tiny_skia::Color {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, a)
    }

    /// Converts to an opaque tiny-skia color.
    pub fn opaque(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, 255)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Primary color configuration: a flat color, or a function mapping
/// normalized intensity in `[0, 1]` to a color per element.
#[derive(Clone)]
pub enum BarColor {
    /// One color for every element
    Solid(Rgb),
    /// Per-element color derived from normalized intensity
    Map(Arc<dyn Fn(f32) -> Rgb + Send + Sync>),
}

impl BarColor {
    /// Parses a flat color string, falling back to the default teal.
    pub fn solid(s: &str) -> Self {
        Self::Solid(Rgb::parse_or_default(s))
    }

    /// Wraps an intensity-to-color function.
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(f32) -> Rgb + Send + Sync + 'static,
    {
        Self::Map(Arc::new(f))
    }

    /// Resolves the color for a normalized value.
    pub fn resolve(&self, value: f32) -> Rgb {
        match self {
            Self::Solid(c) => *c,
            Self::Map(f) => f(value.clamp(0.0, 1.0)),
        }
    }
}

impl fmt::Debug for BarColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            Self::Map(_) => f.write_str("Map(..)"),
        }
    }
}

impl Default for BarColor {
    fn default() -> Self {
        Self::Solid(DEFAULT_BAR_COLOR)
    }
}

/// Background configuration. `Transparent` means clear without filling so the
/// frame composites over whatever is behind the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Clear to fully transparent pixels
    Transparent,
    /// Fill the full surface before drawing
    Solid(Rgb),
}

impl Background {
    /// Parses a background string, honoring the `"transparent"` sentinel.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("transparent") {
            Self::Transparent
        } else {
            Self::Solid(Rgb::parse(s).unwrap_or_else(|| {
                warn!("unrecognized background {:?}, falling back to black", s);
                Rgb::new(0, 0, 0)
            }))
        }
    }

    /// The parsed fill color, if any.
    pub fn solid(&self) -> Option<Rgb> {
        match self {
            Self::Transparent => None,
            Self::Solid(c) => Some(*c),
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::Solid(Rgb::new(0, 0, 0))
    }
}

/// Immutable-per-frame styling parameters handed to every renderer.
#[derive(Debug, Clone)]
pub struct Style {
    /// Primary color (flat or intensity-mapped)
    pub bar_color: BarColor,
    /// Background fill or the transparent sentinel
    pub background: Background,
    /// Stroke width for line-style renderers
    pub line_width: f32,
    /// Duplicate the drawing reflected across the mid-axis
    pub mirror: bool,
}

impl Style {
    /// Line color for stroke-style renderers: the flat color, or the mapped
    /// color sampled at mid intensity.
    pub fn line_color(&self) -> Rgb {
        self.bar_color.resolve(0.5)
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            bar_color: BarColor::default(),
            background: Background::default(),
            line_width: 2.0,
            mirror: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#00ffcc"), Some(Rgb::new(0, 255, 204)));
        assert_eq!(Rgb::parse("#0fc"), Some(Rgb::new(0, 255, 204)));
        assert_eq!(Rgb::parse("#zzzzzz"), None);
    }

    #[test]
    fn test_parse_rgb_calls() {
        assert_eq!(Rgb::parse("rgb(0, 255, 204)"), Some(Rgb::new(0, 255, 204)));
        assert_eq!(
            Rgb::parse("rgba(10, 20, 30, 0.5)"),
            Some(Rgb::new(10, 20, 30))
        );
        assert_eq!(Rgb::parse("rgb(300, 0, 0)"), None);
    }

    #[test]
    fn test_parse_named_and_fallback() {
        assert_eq!(Rgb::parse("teal"), Some(Rgb::new(0, 128, 128)));
        assert_eq!(Rgb::parse("not-a-color"), None);
        assert_eq!(Rgb::parse_or_default("not-a-color"), DEFAULT_BAR_COLOR);
    }

    #[test]
    fn test_background_sentinel() {
        assert_eq!(Background::parse("transparent"), Background::Transparent);
        assert_eq!(
            Background::parse("#102030"),
            Background::Solid(Rgb::new(0x10, 0x20, 0x30))
        );
        assert_eq!(
            Background::parse("not-a-color"),
            Background::Solid(Rgb::new(0, 0, 0))
        );
    }

    #[test]
    fn test_bar_color_resolve() {
        let flat = BarColor::solid("#ff0000");
        assert_eq!(flat.resolve(0.9), Rgb::new(255, 0, 0));

        let mapped = BarColor::map(|v| Rgb::new((v * 255.0) as u8, 0, 0));
        assert_eq!(mapped.resolve(1.0), Rgb::new(255, 0, 0));
        assert_eq!(mapped.resolve(0.0), Rgb::new(0, 0, 0));
    }
}
