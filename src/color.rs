//! sRGB color values and hex conversions.
//!
//! Hex strings are exactly six hex digits with an optional leading `#`,
//! case-insensitive. Parsing never fails loudly: callers pick the fallback
//! they want, and the renderer and the picker deliberately use different
//! ones ([`RENDER_FALLBACK`] and [`PICKER_FALLBACK`]).

use palette::{Hsl, IntoColor, LinSrgb, Srgb};
use resvg::tiny_skia;
use serde::{Deserialize, Serialize};

/// Substituted by the renderer for malformed color strings.
pub const RENDER_FALLBACK: Rgb = Rgb::BLACK;

/// Substituted by the color picker for malformed color strings.
pub const PICKER_FALLBACK: Rgb = Rgb::WHITE;

// ============================================================================
// Rgb
// ============================================================================

/// An opaque 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb` (any case).
    ///
    /// Returns `None` for anything else, including 3- and 8-digit forms.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Parses a hex string, substituting `fallback` when it is malformed.
    pub fn from_hex_or(hex: &str, fallback: Rgb) -> Self {
        Self::from_hex(hex).unwrap_or_else(|| {
            tracing::debug!(input = hex, fallback = %fallback.to_hex(), "malformed hex color");
            fallback
        })
    }

    /// Formats as lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Builds a color from HSL components.
    ///
    /// `hue` is in degrees; `saturation` and `lightness` are in `0.0..=1.0`.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let hsl = Hsl::new(hue, saturation.clamp(0.0, 1.0), lightness.clamp(0.0, 1.0));
        let rgb: Srgb = hsl.into_color();
        Self::new(
            unit_to_u8(rgb.red),
            unit_to_u8(rgb.green),
            unit_to_u8(rgb.blue),
        )
    }

    /// Multiplies every channel by `factor`, rounding to the nearest integer.
    pub fn scaled(self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.max(0.0) } else { 0.0 };
        let scale = |c: u8| (c as f32 * factor).round().min(255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(&self) -> f32 {
        let linear: LinSrgb<f32> = Srgb::new(self.r, self.g, self.b)
            .into_format::<f32>()
            .into_linear();
        0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
    }

    /// Converts to a tiny-skia color with the given alpha (clamped to `0..=1`).
    pub fn to_skia(self, alpha: f32) -> tiny_skia::Color {
        let alpha = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        tiny_skia::Color::from_rgba(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        )
        .unwrap_or(tiny_skia::Color::TRANSPARENT)
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ============================================================================
// Free functions
// ============================================================================

/// Parses a hex color; `None` when malformed.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    Rgb::from_hex(hex)
}

/// Formats a color as lowercase `#rrggbb`.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    rgb.to_hex()
}

/// Darkens a hex color toward black.
///
/// Each channel is multiplied by `lightness / 100` and rounded. `100` is the
/// identity and `0` is always black. This is not an HSL lightness rotation.
/// Malformed input is treated as [`PICKER_FALLBACK`].
pub fn apply_lightness(hex: &str, lightness: f32) -> String {
    let lightness = if lightness.is_finite() {
        lightness.clamp(0.0, 100.0)
    } else {
        100.0
    };
    Rgb::from_hex_or(hex, PICKER_FALLBACK)
        .scaled(lightness / 100.0)
        .to_hex()
}

// ============================================================================
// Tests
// ============================================================================
