//! Valuation color gradient
//!
//! Maps a PEGY value onto one of three piecewise-linear color ramps and picks
//! a legible text color for the resulting background:
//!
//! | Region      | Range          | Ramp (dark → light)   |
//! |-------------|----------------|-----------------------|
//! | Undervalued | `0 <= v < 1`   | `#0b6623` → `#9ae6a4` |
//! | Fair value  | `1 <= v < 2`   | `#8a5a00` → `#ffd27a` |
//! | Expensive   | `v < 0, v >= 2`| `#7a1414` → `#f4a6a6` |
//!
//! The expensive ramp is driven by the distance to the nearest boundary
//! (0 or 2) over [`RED_DISTANCE_CAP`] units.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::PegyError;

/// Distance from the boundary at which the red ramp reaches its light end
pub const RED_DISTANCE_CAP: f64 = 6.0;

/// Luminance above which text is drawn black
pub const LUMINANCE_THRESHOLD: f64 = 160.0;

pub const GREEN_DARK: &str = "#0b6623";
pub const GREEN_LIGHT: &str = "#9ae6a4";
pub const AMBER_DARK: &str = "#8a5a00";
pub const AMBER_LIGHT: &str = "#ffd27a";
pub const RED_DARK: &str = "#7a1414";
pub const RED_LIGHT: &str = "#f4a6a6";

/// Parsed (dark, light) ends, in [`Region`] order
static RAMPS: LazyLock<Option<[(Rgb, Rgb); 3]>> = LazyLock::new(|| {
    let parse = |dark: &str, light: &str| Some((Rgb::from_hex(dark)?, Rgb::from_hex(light)?));
    Some([
        parse(GREEN_DARK, GREEN_LIGHT)?,
        parse(AMBER_DARK, AMBER_LIGHT)?,
        parse(RED_DARK, RED_LIGHT)?,
    ])
});

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse an HTML hex color such as `#0b6623` (the leading `#` is optional)
    ///
    /// Alpha, when present, is dropped.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let color = if hex.starts_with('#') {
            colorgrad::Color::from_html(hex)
        } else {
            colorgrad::Color::from_html(format!("#{hex}"))
        };
        color.ok().map(Self::from)
    }

    /// Lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Perceived luminance, 0..=255
    pub fn luminance(&self) -> f64 {
        0.299 * f64::from(self.r) + 0.587 * f64::from(self.g) + 0.114 * f64::from(self.b)
    }

    /// Per-channel linear interpolation towards `to`, `t` clamped to `[0, 1]`
    ///
    /// Channels are truncated, not rounded.
    pub fn lerp(self, to: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let a = f64::from(a);
            (a + (f64::from(b) - a) * t) as u8
        };
        Rgb::new(mix(self.r, to.r), mix(self.g, to.g), mix(self.b, to.b))
    }
}

impl From<colorgrad::Color> for Rgb {
    fn from(color: colorgrad::Color) -> Self {
        let [r, g, b, _] = color.to_rgba8();
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = PegyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| PegyError::Parse(format!("invalid hex color '{s}'")))
    }
}

/// Foreground color paired with a generated background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    /// Black on light backgrounds, white on dark ones
    pub fn for_background(background: Rgb) -> Self {
        if background.luminance() > LUMINANCE_THRESHOLD {
            Self::Black
        } else {
            Self::White
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }

    pub fn rgb(&self) -> Rgb {
        match self {
            Self::Black => Rgb::new(0, 0, 0),
            Self::White => Rgb::new(0xff, 0xff, 0xff),
        }
    }
}

/// Valuation band of a PEGY value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Undervalued,
    FairValue,
    Expensive,
}

impl Region {
    /// Band and interpolation parameter for `value`
    ///
    /// The parameter is not clamped here; [`Rgb::lerp`] clamps it.
    pub fn locate(value: f64) -> (Self, f64) {
        if (0.0..1.0).contains(&value) {
            (Self::Undervalued, value)
        } else if (1.0..2.0).contains(&value) {
            (Self::FairValue, value - 1.0)
        } else {
            let distance = if value < 0.0 { -value } else { value - 2.0 };
            (Self::Expensive, (distance / RED_DISTANCE_CAP).min(1.0))
        }
    }

    /// Dark and light ends of the band's ramp
    pub fn ramp(self) -> Option<(Rgb, Rgb)> {
        let ramps = RAMPS.as_ref()?;
        let index = match self {
            Self::Undervalued => 0,
            Self::FairValue => 1,
            Self::Expensive => 2,
        };
        Some(ramps[index])
    }
}

/// Coloring of one table cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CellStyle {
    /// No coloring
    #[default]
    Plain,
    Painted {
        background: Rgb,
        text: TextColor,
    },
}

impl CellStyle {
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }

    pub fn background(&self) -> Option<Rgb> {
        match self {
            Self::Plain => None,
            Self::Painted { background, .. } => Some(*background),
        }
    }

    pub fn text(&self) -> Option<TextColor> {
        match self {
            Self::Plain => None,
            Self::Painted { text, .. } => Some(*text),
        }
    }

    /// CSS declarations, empty for [`CellStyle::Plain`]
    pub fn to_css(&self) -> String {
        match self {
            Self::Plain => String::new(),
            Self::Painted { background, text } => {
                format!("background-color: {background}; color: {}", text.as_str())
            }
        }
    }
}

impl fmt::Display for CellStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Background color for a PEGY value, `None` for NaN or an unparseable palette
pub fn background_for(value: f64) -> Option<Rgb> {
    if value.is_nan() {
        return None;
    }
    let (region, t) = Region::locate(value);
    let (dark, light) = region.ramp()?;
    Some(dark.lerp(light, t))
}

/// Cell style for an optional PEGY value
pub fn style_for(value: Option<f64>) -> CellStyle {
    match value.and_then(background_for) {
        Some(background) => CellStyle::Painted {
            background,
            text: TextColor::for_background(background),
        },
        None => CellStyle::Plain,
    }
}

/// Cell style for a textual cell value; anything non-numeric stays plain
pub fn style_for_text(text: &str) -> CellStyle {
    style_for(text.trim().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bg(value: f64) -> Rgb {
        style_for(Some(value)).background().unwrap()
    }

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Rgb::from_hex("#0b6623"), Some(Rgb::new(0x0b, 0x66, 0x23)));
        assert_eq!(Rgb::from_hex("ffd27a"), Some(Rgb::new(0xff, 0xd2, 0x7a)));
        assert_eq!(rgb(RED_LIGHT).to_hex(), RED_LIGHT);
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#zzzzzz"), None);
        assert!("#ggg000".parse::<Rgb>().is_err());
    }

    fn rgb(hex: &str) -> Rgb {
        Rgb::from_hex(hex).unwrap()
    }

    #[test]
    fn test_ramps_parse_from_html() {
        assert_eq!(
            Region::Undervalued.ramp(),
            Some((Rgb::new(0x0b, 0x66, 0x23), Rgb::new(0x9a, 0xe6, 0xa4)))
        );
        assert_eq!(
            Region::FairValue.ramp(),
            Some((Rgb::new(0x8a, 0x5a, 0x00), Rgb::new(0xff, 0xd2, 0x7a)))
        );
        assert_eq!(
            Region::Expensive.ramp(),
            Some((Rgb::new(0x7a, 0x14, 0x14), Rgb::new(0xf4, 0xa6, 0xa6)))
        );
    }

    #[test]
    fn test_lerp_truncates() {
        // 0x8a + (0xff - 0x8a) * 0.5 = 196.5, 0x5a + (0xd2 - 0x5a) * 0.5 = 150
        let mid = rgb(AMBER_DARK).lerp(rgb(AMBER_LIGHT), 0.5);
        assert_eq!((mid.r, mid.g, mid.b), (196, 150, 61));
    }

    #[test]
    fn test_green_region() {
        assert_eq!(bg(0.0), rgb(GREEN_DARK));

        let near_one = bg(0.999);
        let light = rgb(GREEN_LIGHT);
        assert!(near_one.r.abs_diff(light.r) <= 1);
        assert!(near_one.g.abs_diff(light.g) <= 1);
        assert!(near_one.b.abs_diff(light.b) <= 1);
    }

    #[test]
    fn test_amber_region() {
        assert_eq!(bg(1.0), rgb(AMBER_DARK));
        assert_eq!(bg(1.5).to_hex(), "#c4963d");
    }

    #[test]
    fn test_red_region() {
        assert_eq!(bg(2.0), rgb(RED_DARK));
        assert_eq!(bg(5.0).to_hex(), "#b75d5d");
        assert_eq!(bg(8.0), rgb(RED_LIGHT));
        assert_eq!(bg(40.0), rgb(RED_LIGHT));
        assert_eq!(bg(f64::INFINITY), rgb(RED_LIGHT));
    }

    #[test]
    fn test_negative_values_use_red_ramp() {
        assert_eq!(bg(-3.0), bg(5.0));
        assert_eq!(bg(-0.01).to_hex(), RED_DARK);
        assert_eq!(Region::locate(-1.0).0, Region::Expensive);
    }

    #[test]
    fn test_absent_and_unparseable() {
        assert_eq!(style_for(None), CellStyle::Plain);
        assert_eq!(style_for(Some(f64::NAN)), CellStyle::Plain);
        assert_eq!(style_for_text("n/a"), CellStyle::Plain);
        assert_eq!(style_for_text(""), CellStyle::Plain);
        assert_eq!(style_for_text("abc").to_css(), "");
        assert_eq!(style_for_text(" 1.5 ").background().unwrap().to_hex(), "#c4963d");
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(TextColor::for_background(rgb(GREEN_DARK)), TextColor::White);
        assert_eq!(TextColor::for_background(rgb(RED_LIGHT)), TextColor::Black);
        // luminance 159.886 and 160.114
        assert_eq!(TextColor::for_background(Rgb::new(160, 160, 159)), TextColor::White);
        assert_eq!(TextColor::for_background(Rgb::new(160, 160, 161)), TextColor::Black);
    }

    #[test]
    fn test_css_output() {
        assert_eq!(
            style_for(Some(0.0)).to_css(),
            "background-color: #0b6623; color: white"
        );
        assert_eq!(
            style_for(Some(8.0)).to_string(),
            "background-color: #f4a6a6; color: black"
        );
    }

    #[test]
    fn test_reference_pegy_lands_in_red() {
        // 20 / (10 + 0.02) displayed with two decimals
        let shown = crate::metrics::round_to(20.0 / 10.02, 2);
        assert_eq!(Region::locate(shown).0, Region::Expensive);
        assert_eq!(bg(shown), rgb(RED_DARK));
    }
}
