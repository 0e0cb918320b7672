//! Text layer: case folding, anchoring and the glyph draw.

use serde::{Deserialize, Serialize};

use super::svg::{self, FontLibrary, TextRun};
use super::{Backdrop, DrawState, LayerEffect, RenderContext, Shadow};
use crate::color::Rgb;
use crate::settings::{FontStyle, MAX_FONT_SIZE, RenderSettings, TextPosition, TextTransform};

/// Inset from the canvas edge for corner positions, as a fraction of size.
pub const PADDING_RATIO: f32 = 0.12;

/// Glyph fill opacity.
pub const TEXT_OPACITY: f32 = 0.99;

const DARK_SHADOW: Shadow = Shadow {
    color: Rgb::BLACK,
    alpha: 0.45,
    blur: 16.0,
};

const LIGHT_SHADOW: Shadow = Shadow {
    color: Rgb::BLACK,
    alpha: 0.1,
    blur: 8.0,
};

/// Applies a [`TextTransform`] to `text`.
///
/// `Capitalize` works per space-separated word: first character upper,
/// the rest lower. Runs of spaces are preserved.
pub fn apply_text_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        TextTransform::Capitalize => text
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" "),
    }
}

/// Horizontal alignment of the text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn svg_text_anchor(self) -> &'static str {
        match self {
            Self::Left => "start",
            Self::Center => "middle",
            Self::Right => "end",
        }
    }
}

/// Vertical alignment of the text relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
}

impl TextBaseline {
    pub fn svg_dominant_baseline(self) -> &'static str {
        match self {
            Self::Top => "text-before-edge",
            // Em-box middle, as a canvas `middle` baseline.
            Self::Middle => "central",
            Self::Bottom => "text-after-edge",
        }
    }
}

/// Anchor point and alignment for a position on a square canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextAnchor {
    pub x: f32,
    pub y: f32,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextAnchor {
    pub fn resolve(position: TextPosition, canvas_size: f32) -> Self {
        let padding = canvas_size * PADDING_RATIO;
        let far = canvas_size - padding;
        let (x, y, align, baseline) = match position {
            TextPosition::Center => (
                canvas_size / 2.0,
                canvas_size / 2.0,
                TextAlign::Center,
                TextBaseline::Middle,
            ),
            TextPosition::TopRight => (far, padding, TextAlign::Right, TextBaseline::Top),
            TextPosition::BottomLeft => (padding, far, TextAlign::Left, TextBaseline::Bottom),
            TextPosition::BottomRight => (far, far, TextAlign::Right, TextBaseline::Bottom),
        };
        Self {
            x,
            y,
            align,
            baseline,
        }
    }
}

/// Draws the (transformed) text in near-opaque white with a drop shadow.
///
/// # Required Properties
///
/// - [`Backdrop`] (optional): picks the heavier shadow on dark backgrounds.
///   Treated as light when absent.
#[derive(Debug, Clone)]
pub struct TextLayer {
    text: String,
    pub font_style: FontStyle,
    pub font_size: u32,
    pub letter_spacing: f32,
    pub position: TextPosition,
    fonts: FontLibrary,
}

impl TextLayer {
    /// Returns `None` when the transformed text is empty.
    pub fn from_settings(settings: &RenderSettings, fonts: &FontLibrary) -> Option<Self> {
        let text = apply_text_transform(&settings.text, settings.text_transform);
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text,
            font_style: settings.font_style,
            font_size: settings.font_size.clamp(1, MAX_FONT_SIZE),
            letter_spacing: settings.letter_spacing,
            position: settings.position,
            fonts: fonts.clone(),
        })
    }

    /// The text as it will be drawn.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// CSS-style font shorthand, e.g. `110px "Metal Mania", cursive`.
    pub fn font_spec(&self) -> String {
        format!("{}px {}", self.font_size, self.font_style.font_stack())
    }

    pub fn shadow_for(backdrop: Option<&Backdrop>) -> Shadow {
        match backdrop {
            Some(backdrop) if backdrop.is_dark() => DARK_SHADOW,
            _ => LIGHT_SHADOW,
        }
    }
}

impl LayerEffect for TextLayer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn transform(&self, ctx: &mut RenderContext) {
        let state = DrawState {
            letter_spacing: self.letter_spacing,
            shadow: Some(Self::shadow_for(ctx.get::<Backdrop>())),
        };
        let canvas_size = ctx.surface.width();
        let font_stack = self.font_style.font_stack();
        let run = TextRun {
            text: &self.text,
            font_stack: &font_stack,
            font_size: self.font_size,
            fill: Rgb::WHITE,
            fill_opacity: TEXT_OPACITY,
            anchor: TextAnchor::resolve(self.position, canvas_size as f32),
        };

        ctx.with_draw_state(state, |ctx| {
            let markup = svg::text_markup(canvas_size, &run, ctx.draw_state());
            if !svg::render_markup(&markup, &self.fonts, &mut ctx.surface) {
                tracing::warn!(font = %self.font_spec(), "text draw skipped");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::Pixmap;

    #[test]
    fn transforms() {
        assert_eq!(apply_text_transform("Hello World", TextTransform::Capitalize), "Hello World");
        assert_eq!(apply_text_transform("hELLO wORLD", TextTransform::Capitalize), "Hello World");
        assert_eq!(apply_text_transform("Hello World", TextTransform::Uppercase), "HELLO WORLD");
        assert_eq!(apply_text_transform("Hello World", TextTransform::Lowercase), "hello world");
        assert_eq!(apply_text_transform("Hello World", TextTransform::None), "Hello World");
        assert_eq!(apply_text_transform("a  b", TextTransform::Capitalize), "A  B");
        assert_eq!(apply_text_transform("", TextTransform::Capitalize), "");
    }

    #[test]
    fn anchors_use_twelve_percent_padding() {
        let br = TextAnchor::resolve(TextPosition::BottomRight, 1024.0);
        assert!((br.x - 901.12).abs() < 1e-3);
        assert!((br.y - 901.12).abs() < 1e-3);
        assert_eq!((br.align, br.baseline), (TextAlign::Right, TextBaseline::Bottom));

        let tr = TextAnchor::resolve(TextPosition::TopRight, 1000.0);
        assert_eq!((tr.x, tr.y), (880.0, 120.0));
        assert_eq!((tr.align, tr.baseline), (TextAlign::Right, TextBaseline::Top));

        let bl = TextAnchor::resolve(TextPosition::BottomLeft, 1000.0);
        assert_eq!((bl.x, bl.y), (120.0, 880.0));
        assert_eq!((bl.align, bl.baseline), (TextAlign::Left, TextBaseline::Bottom));

        let c = TextAnchor::resolve(TextPosition::Center, 1024.0);
        assert_eq!((c.x, c.y), (512.0, 512.0));
        assert_eq!((c.align, c.baseline), (TextAlign::Center, TextBaseline::Middle));
    }

    #[test]
    fn font_spec_combines_size_and_family() {
        let settings = RenderSettings::default()
            .with_font_size(110)
            .with_font_style(FontStyle::WildMetal);
        let layer = TextLayer::from_settings(&settings, &FontLibrary::empty()).unwrap();
        assert_eq!(layer.font_spec(), "110px \"Metal Mania\", cursive");

        let fallback = TextLayer::from_settings(
            &settings.with_font_style(FontStyle::Fallback),
            &FontLibrary::empty(),
        )
        .unwrap();
        assert_eq!(fallback.font_spec(), "110px \"Inter\", sans-serif");
    }

    #[test]
    fn baselines_map_to_svg() {
        assert_eq!(TextBaseline::Top.svg_dominant_baseline(), "text-before-edge");
        assert_eq!(TextBaseline::Middle.svg_dominant_baseline(), "central");
        assert_eq!(TextBaseline::Bottom.svg_dominant_baseline(), "text-after-edge");
        assert_eq!(TextAlign::Center.svg_text_anchor(), "middle");
    }

    #[test]
    fn oversized_font_is_capped() {
        let settings = RenderSettings::default().with_font_size(u32::MAX);
        let layer = TextLayer::from_settings(&settings, &FontLibrary::empty()).unwrap();
        assert_eq!(layer.font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn shadow_depends_on_backdrop() {
        let dark = Backdrop::new(Rgb::new(0x1d, 0x1d, 0x1f));
        let light = Backdrop::new(Rgb::WHITE);
        assert_eq!(TextLayer::shadow_for(Some(&dark)), DARK_SHADOW);
        assert_eq!(TextLayer::shadow_for(Some(&light)), LIGHT_SHADOW);
        assert_eq!(TextLayer::shadow_for(None), LIGHT_SHADOW);
    }

    #[test]
    fn draw_leaves_default_state() {
        let settings = RenderSettings::default().with_letter_spacing(40.0);
        let layer = TextLayer::from_settings(&settings, &FontLibrary::empty()).unwrap();
        let mut ctx = RenderContext::new(Pixmap::new(32, 32).unwrap());

        layer.apply(&mut ctx);
        assert_eq!(*ctx.draw_state(), DrawState::default());
    }

    #[test]
    fn whitespace_only_text_is_kept() {
        let settings = RenderSettings::default().with_text("  ");
        assert!(TextLayer::from_settings(&settings, &FontLibrary::empty()).is_some());
    }
}
