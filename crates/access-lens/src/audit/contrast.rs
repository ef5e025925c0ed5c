//! Color parsing and WCAG contrast math for inline styles.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Minimum ratio for normal-size text at level AA.
pub(crate) const AA_NORMAL_TEXT: f64 = 4.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Relative luminance as defined by WCAG 2.x.
    pub fn relative_luminance(self) -> f64 {
        let channel = |value: u8| {
            let v = f64::from(value) / 255.0;
            if v <= 0.04045 {
                v / 12.92
            } else {
                ((v + 0.055) / 1.055).powf(2.4)
            }
        };
        0.2126 * channel(self.0) + 0.7152 * channel(self.1) + 0.0722 * channel(self.2)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Contrast ratio between two colors, always >= 1.0.
pub fn contrast_ratio(foreground: Rgb, background: Rgb) -> f64 {
    let a = foreground.relative_luminance();
    let b = background.relative_luminance();
    let (lighter, darker) = if a > b { (a, b) } else { (b, a) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Parse a CSS color value: `#rgb`, `#rrggbb`, `rgb()`/`rgba()`, or a basic named color.
pub fn parse_color(value: &str) -> Option<Rgb> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        parse_hex(hex)
    } else if value.starts_with("rgb") {
        parse_rgb_function(&value)
    } else {
        named_color(&value)
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        3 => {
            let expand = |idx: usize| channel(&hex[idx..idx + 1].repeat(2));
            Some(Rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        6 => Some(Rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

fn parse_rgb_function(value: &str) -> Option<Rgb> {
    static RGB: OnceLock<Regex> = OnceLock::new();
    let pattern = RGB.get_or_init(|| {
        Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})").expect("valid regex")
    });
    let caps = pattern.captures(value)?;
    Some(Rgb(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    ))
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "white" => Rgb(255, 255, 255),
        "black" => Rgb(0, 0, 0),
        "red" => Rgb(255, 0, 0),
        "green" => Rgb(0, 128, 0),
        "blue" => Rgb(0, 0, 255),
        "yellow" => Rgb(255, 255, 0),
        "gray" | "grey" => Rgb(128, 128, 128),
        "silver" => Rgb(192, 192, 192),
        "lightgray" | "lightgrey" => Rgb(211, 211, 211),
        "navy" => Rgb(0, 0, 128),
        "orange" => Rgb(255, 165, 0),
        "purple" => Rgb(128, 0, 128),
        "teal" => Rgb(0, 128, 128),
        _ => return None,
    };
    Some(rgb)
}

/// Foreground/background pair declared in an inline `style` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InlineColors {
    pub foreground: Rgb,
    pub background: Rgb,
}

/// Extract `color` and `background`/`background-color` from a style attribute.
/// Returns `None` unless both resolve to concrete colors.
pub(crate) fn inline_colors(style: &str) -> Option<InlineColors> {
    let mut foreground = None;
    let mut background = None;

    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        match property.trim().to_ascii_lowercase().as_str() {
            "color" => foreground = parse_color(value),
            "background-color" | "background" => background = parse_color(value),
            _ => {}
        }
    }

    Some(InlineColors {
        foreground: foreground?,
        background: background?,
    })
}
