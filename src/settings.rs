//! The settings record consumed by the renderer.
//!
//! [`RenderSettings`] is what the control panel produces. It serializes to
//! camelCase JSON so the same document can travel between a frontend and
//! this crate:
//!
//! ```json
//! {
//!   "text": "Untamed",
//!   "color": "#34c759",
//!   "fontSize": 110,
//!   "fontStyle": "WILD_METAL",
//!   "position": "CENTER",
//!   "intensity": 95,
//!   "auraSize": 85,
//!   "textTransform": "uppercase",
//!   "letterSpacing": 2
//! }
//! ```
//!
//! Missing fields take their defaults.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// Allowed intensity, in percent.
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=250.0;
/// Allowed aura size, in percent.
pub const AURA_SIZE_RANGE: RangeInclusive<f32> = 20.0..=150.0;
/// Allowed letter spacing, in pixels.
pub const LETTER_SPACING_RANGE: RangeInclusive<f32> = -20.0..=100.0;
/// Font size used when a typed value cannot be parsed.
pub const FALLBACK_FONT_SIZE: u32 = 40;

/// Largest font size the renderer will draw, in pixels.
pub const MAX_FONT_SIZE: u32 = 4096;

/// CSS font stack used when a font identifier cannot be resolved.
pub const DEFAULT_FONT_STACK: &str = "\"Inter\", sans-serif";

// ============================================================================
// FontStyle
// ============================================================================

/// The family a [`FontStyle`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontGroup {
    /// Impact and aggressive display faces.
    Wild,
    /// Elegant, fluid scripts.
    Luxe,
    /// Scribbled handwriting.
    Raw,
    /// Blackletter.
    Gothic,
}

/// Symbolic font identifiers.
///
/// Each named variant maps to exactly one display family. [`FontStyle::Fallback`]
/// is what unknown identifiers deserialize to; it renders with
/// [`DEFAULT_FONT_STACK`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FontStyle {
    WildShade,
    #[default]
    WildMetal,
    WildBeast,
    WildImpact,
    WildMarker,
    WildRock,
    WildCreep,
    LuxeMonsieur,
    LuxePinyon,
    LuxeItalianno,
    LuxeDeco,
    LuxeVibes,
    LuxeParisienne,
    RawReenie,
    RawJustHand,
    RawGrace,
    RawZeyada,
    RawNanum,
    Gothic,
    Fallback,
}

impl FontStyle {
    /// Every named identifier, in declaration order.
    pub const ALL: [FontStyle; 19] = [
        Self::WildShade,
        Self::WildMetal,
        Self::WildBeast,
        Self::WildImpact,
        Self::WildMarker,
        Self::WildRock,
        Self::WildCreep,
        Self::LuxeMonsieur,
        Self::LuxePinyon,
        Self::LuxeItalianno,
        Self::LuxeDeco,
        Self::LuxeVibes,
        Self::LuxeParisienne,
        Self::RawReenie,
        Self::RawJustHand,
        Self::RawGrace,
        Self::RawZeyada,
        Self::RawNanum,
        Self::Gothic,
    ];

    /// The wire identifier, e.g. `"WILD_METAL"`.
    pub fn identifier(self) -> &'static str {
        match self {
            Self::WildShade => "WILD_SHADE",
            Self::WildMetal => "WILD_METAL",
            Self::WildBeast => "WILD_BEAST",
            Self::WildImpact => "WILD_IMPACT",
            Self::WildMarker => "WILD_MARKER",
            Self::WildRock => "WILD_ROCK",
            Self::WildCreep => "WILD_CREEP",
            Self::LuxeMonsieur => "LUXE_MONSIEUR",
            Self::LuxePinyon => "LUXE_PINYON",
            Self::LuxeItalianno => "LUXE_ITALIANNO",
            Self::LuxeDeco => "LUXE_DECO",
            Self::LuxeVibes => "LUXE_VIBES",
            Self::LuxeParisienne => "LUXE_PARISIENNE",
            Self::RawReenie => "RAW_REENIE",
            Self::RawJustHand => "RAW_JUST_HAND",
            Self::RawGrace => "RAW_GRACE",
            Self::RawZeyada => "RAW_ZEYADA",
            Self::RawNanum => "RAW_NANUM",
            Self::Gothic => "GOTHIC",
            Self::Fallback => "FALLBACK",
        }
    }

    /// The display family name, e.g. `"Metal Mania"`.
    pub fn family(self) -> &'static str {
        match self {
            Self::WildShade => "Bungee Shade",
            Self::WildMetal => "Metal Mania",
            Self::WildBeast => "Rubik Beastly",
            Self::WildImpact => "Syne",
            Self::WildMarker => "Permanent Marker",
            Self::WildRock => "Rock Salt",
            Self::WildCreep => "Creepster",
            Self::LuxeMonsieur => "Monsieur La Doulaise",
            Self::LuxePinyon => "Pinyon Script",
            Self::LuxeItalianno => "Italianno",
            Self::LuxeDeco => "Cinzel Decorative",
            Self::LuxeVibes => "Great Vibes",
            Self::LuxeParisienne => "Parisienne",
            Self::RawReenie => "Reenie Beanie",
            Self::RawJustHand => "Just Another Hand",
            Self::RawGrace => "Covered By Your Grace",
            Self::RawZeyada => "Zeyada",
            Self::RawNanum => "Nanum Pen Script",
            Self::Gothic => "UnifrakturMaguntia",
            Self::Fallback => "Inter",
        }
    }

    /// The generic CSS family appended after [`family`](Self::family).
    pub fn generic_family(self) -> &'static str {
        match self {
            Self::WildImpact | Self::Fallback => "sans-serif",
            Self::LuxeDeco => "serif",
            _ => "cursive",
        }
    }

    /// The CSS font-family stack, e.g. `"Metal Mania", cursive`.
    pub fn font_stack(self) -> String {
        match self {
            Self::Fallback => DEFAULT_FONT_STACK.to_string(),
            named => format!("\"{}\", {}", named.family(), named.generic_family()),
        }
    }

    /// The group this identifier belongs to. `None` for the fallback arm.
    pub fn group(self) -> Option<FontGroup> {
        match self {
            Self::WildShade
            | Self::WildMetal
            | Self::WildBeast
            | Self::WildImpact
            | Self::WildMarker
            | Self::WildRock
            | Self::WildCreep => Some(FontGroup::Wild),
            Self::LuxeMonsieur
            | Self::LuxePinyon
            | Self::LuxeItalianno
            | Self::LuxeDeco
            | Self::LuxeVibes
            | Self::LuxeParisienne => Some(FontGroup::Luxe),
            Self::RawReenie
            | Self::RawJustHand
            | Self::RawGrace
            | Self::RawZeyada
            | Self::RawNanum => Some(FontGroup::Raw),
            Self::Gothic => Some(FontGroup::Gothic),
            Self::Fallback => None,
        }
    }

    /// Resolves a wire identifier or a display family name.
    ///
    /// Anything unrecognized resolves to [`FontStyle::Fallback`].
    pub fn from_identifier(id: &str) -> Self {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|style| style.identifier() == id || style.family().eq_ignore_ascii_case(id))
            .unwrap_or_else(|| {
                tracing::debug!(identifier = id, "unknown font identifier, using default family");
                Self::Fallback
            })
    }
}

impl<'de> Deserialize<'de> for FontStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Ok(Self::from_identifier(&id))
    }
}

// ============================================================================
// Position / Transform / Mode
// ============================================================================

/// Where the text is anchored on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextPosition {
    #[default]
    Center,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Case folding applied to the text before drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// Which aura algorithm to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum AuraMode {
    /// White background, one color, 15 layers.
    #[default]
    Single,
    /// `backgroundColor` fill, then an outer and an inner color pass.
    Dual,
}

// ============================================================================
// RenderSettings
// ============================================================================

/// Everything the renderer needs to draw one avatar.
///
/// Colors are hex strings; malformed ones render as black.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    pub text: String,
    /// Primary glow color.
    pub color: String,
    /// Canvas fill in [`AuraMode::Dual`].
    pub background_color: String,
    pub outer_color: String,
    pub inner_color: String,
    pub font_size: u32,
    pub font_style: FontStyle,
    pub position: TextPosition,
    /// Aura opacity scale, in percent (0-250).
    pub intensity: f32,
    /// Aura radius scale, in percent (20-150).
    pub aura_size: f32,
    pub text_transform: TextTransform,
    /// Extra space between glyphs, in pixels (-20 to 100).
    pub letter_spacing: f32,
    pub aura_mode: AuraMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            text: "Untamed".to_string(),
            color: "#34c759".to_string(),
            background_color: "#ffffff".to_string(),
            outer_color: "#34c759".to_string(),
            inner_color: "#ffffff".to_string(),
            font_size: 110,
            font_style: FontStyle::WildMetal,
            position: TextPosition::Center,
            intensity: 95.0,
            aura_size: 85.0,
            text_transform: TextTransform::Uppercase,
            letter_spacing: 2.0,
            aura_mode: AuraMode::Single,
        }
    }
}

impl RenderSettings {
    /// Creates settings with the control panel defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_font_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_font_style(mut self, font_style: FontStyle) -> Self {
        self.font_style = font_style;
        self
    }

    pub fn with_position(mut self, position: TextPosition) -> Self {
        self.position = position;
        self
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn with_aura_size(mut self, aura_size: f32) -> Self {
        self.aura_size = aura_size;
        self
    }

    pub fn with_text_transform(mut self, text_transform: TextTransform) -> Self {
        self.text_transform = text_transform;
        self
    }

    pub fn with_letter_spacing(mut self, letter_spacing: f32) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    /// Switches to the dual aura with the given background, outer and inner colors.
    pub fn with_dual_aura(
        mut self,
        background: impl Into<String>,
        outer: impl Into<String>,
        inner: impl Into<String>,
    ) -> Self {
        self.aura_mode = AuraMode::Dual;
        self.background_color = background.into();
        self.outer_color = outer.into();
        self.inner_color = inner.into();
        self
    }

    /// Returns a copy with every numeric field forced into its range.
    ///
    /// Non-finite values take the field's default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        Self {
            font_size: self.font_size.clamp(1, MAX_FONT_SIZE),
            intensity: clamp_finite(self.intensity, INTENSITY_RANGE, defaults.intensity),
            aura_size: clamp_finite(self.aura_size, AURA_SIZE_RANGE, defaults.aura_size),
            letter_spacing: clamp_finite(
                self.letter_spacing,
                LETTER_SPACING_RANGE,
                0.0,
            ),
            ..self.clone()
        }
    }

    /// Serializes the settings to a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serializes the settings to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes settings from a JSON string.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

fn clamp_finite(value: f32, range: RangeInclusive<f32>, default: f32) -> f32 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        default
    }
}

/// Parses a typed font size, falling back to [`FALLBACK_FONT_SIZE`].
///
/// Leading digits are accepted (`"72px"` is 72). Zero, negatives and
/// unparseable input all fall back. Sizes above [`MAX_FONT_SIZE`] are capped.
pub fn parse_font_size(input: &str) -> u32 {
    let trimmed = input.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '+' || c == '-'))))
        .map_or(trimmed.len(), |(i, _)| i);

    match trimmed[..digits_end].parse::<i64>() {
        Ok(size) if size > 0 => u32::try_from(size)
            .map_or(MAX_FONT_SIZE, |size| size.min(MAX_FONT_SIZE)),
        _ => FALLBACK_FONT_SIZE,
    }
}

// ============================================================================
// Tests
// ============================================================================
