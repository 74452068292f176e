//! Colors and layout constants for the safety overlay

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 24-bit RGB color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    pub const CYAN: Self = Self::rgb(0x00, 0xFF, 0xFF);
    pub const GREEN: Self = Self::rgb(0x22, 0xC5, 0x5E);
    pub const ORANGE: Self = Self::rgb(0xFF, 0xA5, 0x00);
    pub const RED: Self = Self::rgb(0xEF, 0x44, 0x44);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Error for color strings that are not `RRGGBB` / `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ParseColorError(String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

/// Severity class of an annotation value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Good,
    Moderate,
    Poor,
    Unknown,
}

impl Severity {
    /// Classify visibility labels and risk levels alike (case-insensitive).
    pub fn classify(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GOOD" | "LOW" | "SAFE" | "NONE" => Self::Good,
            "MODERATE" | "MEDIUM" | "WARNING" => Self::Moderate,
            "POOR" | "HIGH" | "CRITICAL" | "RISK" => Self::Poor,
            _ => Self::Unknown,
        }
    }
}

/// Overlay drawing style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Box stroke color
    pub stroke_color: Color,
    /// Box stroke width, pixels
    pub stroke_width: f32,
    /// Font family for text lines
    pub font_name: String,
    /// Font size, pixels
    pub font_size: u32,
    /// Left edge of the text stack
    pub text_x: f64,
    /// Baseline of the first text line
    pub text_y: f64,
    /// Distance between text baselines
    pub line_height: f64,
    /// Fixed label drawn as the third text line
    pub procedure_label: String,
    pub good_color: Color,
    pub moderate_color: Color,
    pub poor_color: Color,
    /// Color for values with no known severity
    pub neutral_color: Color,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke_color: Color::CYAN,
            stroke_width: 2.0,
            font_name: "Arial".to_string(),
            font_size: 24,
            text_x: 30.0,
            text_y: 40.0,
            line_height: 40.0,
            procedure_label: "Procedure: Laparoscopic Surgery".to_string(),
            good_color: Color::GREEN,
            moderate_color: Color::ORANGE,
            poor_color: Color::RED,
            neutral_color: Color::WHITE,
        }
    }
}

impl OverlayStyle {
    /// Smaller text for low-resolution surfaces
    #[must_use]
    pub fn compact() -> Self {
        Self {
            font_size: 14,
            text_x: 12.0,
            text_y: 20.0,
            line_height: 20.0,
            stroke_width: 1.0,
            ..Default::default()
        }
    }

    /// Color for an annotation value, neutral when unrecognized.
    pub fn color_for(&self, value: &str) -> Color {
        match Severity::classify(value) {
            Severity::Good => self.good_color,
            Severity::Moderate => self.moderate_color,
            Severity::Poor => self.poor_color,
            Severity::Unknown => self.neutral_color,
        }
    }

    /// CSS-style font shorthand, e.g. `24px Arial`
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size, self.font_name)
    }
}
