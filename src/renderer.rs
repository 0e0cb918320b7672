//! Render entry points.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::canvas::{AvatarCanvas, CANVAS_SIZE};
use crate::error::Result;
use crate::layer::{FontLibrary, LayerPipeline, RenderContext};
use crate::settings::RenderSettings;

// ============================================================================
// RendererOptions
// ============================================================================

/// How a renderer allocates canvases and finds fonts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RendererOptions {
    /// Side length of canvases created by [`AvatarRenderer::render`].
    pub canvas_size: u32,
    pub load_system_fonts: bool,
    /// Extra directories scanned for `.ttf`, `.otf` and `.ttc` files.
    pub font_dirs: Vec<PathBuf>,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            canvas_size: CANVAS_SIZE,
            load_system_fonts: true,
            font_dirs: Vec::new(),
        }
    }
}

impl RendererOptions {
    pub fn with_canvas_size(mut self, canvas_size: u32) -> Self {
        self.canvas_size = canvas_size;
        self
    }

    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads options from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

// ============================================================================
// AvatarRenderer
// ============================================================================

/// Maps [`RenderSettings`] to pixels.
///
/// Every draw repaints the whole canvas from scratch, so drawing the same
/// settings twice gives identical pixels and nothing from one draw (letter
/// spacing, shadow) carries into the next.
///
/// # Example
///
/// ```
/// use aura_renderer::{AvatarRenderer, FontLibrary, RenderSettings, RendererOptions};
///
/// let renderer = AvatarRenderer::with_fonts(
///     RendererOptions::default().with_canvas_size(64),
///     FontLibrary::empty(),
/// );
/// let canvas = renderer.render(&RenderSettings::default());
/// assert_eq!(canvas.size(), Some(64));
/// ```
#[derive(Debug, Clone)]
pub struct AvatarRenderer {
    options: RendererOptions,
    fonts: FontLibrary,
}

impl Default for AvatarRenderer {
    fn default() -> Self {
        Self::new(RendererOptions::default())
    }
}

impl AvatarRenderer {
    /// Creates a renderer, loading fonts as `options` describe.
    pub fn new(options: RendererOptions) -> Self {
        let fonts = FontLibrary::load(options.load_system_fonts, &options.font_dirs);
        Self::with_fonts(options, fonts)
    }

    /// Creates a renderer around an already-loaded font library.
    pub fn with_fonts(options: RendererOptions, fonts: FontLibrary) -> Self {
        Self { options, fonts }
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    /// Draws `settings` onto `canvas`, replacing its contents.
    ///
    /// Returns false and leaves the canvas alone when it has no surface.
    #[tracing::instrument(
        skip_all,
        fields(mode = ?settings.aura_mode, font = ?settings.font_style)
    )]
    pub fn draw(&self, settings: &RenderSettings, canvas: &mut AvatarCanvas) -> bool {
        let Some(surface) = canvas.take_surface() else {
            tracing::debug!("canvas has no surface, skipping draw");
            return false;
        };

        let pipeline = LayerPipeline::from_settings(settings, &self.fonts);
        tracing::trace!(layers = pipeline.aura.layer_count(), "drawing aura layers");

        let mut ctx = RenderContext::new(surface);
        pipeline.render(&mut ctx);
        canvas.attach(ctx.into_surface());
        true
    }

    /// Draws `settings` onto a fresh canvas of the configured size.
    pub fn render(&self, settings: &RenderSettings) -> AvatarCanvas {
        let mut canvas = AvatarCanvas::new(self.options.canvas_size);
        self.draw(settings, &mut canvas);
        canvas
    }
}

/// Renders with the default options and the system fonts.
///
/// The renderer behind this is built on first use and shared.
pub fn render(settings: &RenderSettings) -> AvatarCanvas {
    static DEFAULT: OnceLock<AvatarRenderer> = OnceLock::new();
    DEFAULT.get_or_init(AvatarRenderer::default).render(settings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::layer::{AuraLayer, BackgroundLayer, LayerEffect};
    use crate::settings::{AuraMode, TextPosition};
    use resvg::tiny_skia::Pixmap;

    const SMALL: u32 = 128;

    fn renderer(fonts: FontLibrary) -> AvatarRenderer {
        AvatarRenderer::with_fonts(RendererOptions::default().with_canvas_size(SMALL), fonts)
    }

    /// Sum of each channel's distance from white inside the aura.
    fn tint(canvas: &AvatarCanvas) -> u64 {
        let mut total = 0u64;
        for y in 32..96 {
            for x in 32..96 {
                let px = canvas.pixel(x, y).unwrap().0;
                total += px[..3].iter().map(|&c| u64::from(255 - c)).sum::<u64>();
            }
        }
        total
    }

    #[test]
    fn options_defaults_and_json() {
        let options = RendererOptions::default();
        assert_eq!(options.canvas_size, 1024);
        assert!(options.load_system_fonts);

        let json = r#"{"canvasSize": 256, "fontDirs": ["fonts"]}"#;
        let parsed = RendererOptions::from_json(json).unwrap();
        assert_eq!(parsed.canvas_size, 256);
        assert!(parsed.load_system_fonts);
        assert_eq!(parsed.font_dirs, vec![PathBuf::from("fonts")]);

        let json = options.to_json().unwrap();
        assert!(json.contains("\"loadSystemFonts\": true"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let renderer = renderer(FontLibrary::system());
        let settings = RenderSettings::default().with_dual_aura("#1d1d1f", "#ff2d55", "#ffffff");
        assert_eq!(renderer.render(&settings), renderer.render(&settings));
    }

    #[test]
    #[ignore = "needs system fonts to draw glyphs"]
    fn letter_spacing_does_not_leak_between_draws() {
        let fonts = FontLibrary::system();
        assert!(!fonts.is_empty(), "no system fonts installed");
        let renderer = renderer(fonts);
        let plain = RenderSettings::default().with_letter_spacing(0.0);
        let spaced = plain.clone().with_letter_spacing(40.0);
        let expected = renderer.render(&plain);
        assert_ne!(renderer.render(&spaced), expected);

        let mut canvas = AvatarCanvas::new(SMALL);
        assert!(renderer.draw(&spaced, &mut canvas));
        assert!(renderer.draw(&plain, &mut canvas));
        assert_eq!(canvas, expected);
    }

    #[test]
    fn oversized_font_does_not_panic() {
        let settings = RenderSettings::default().with_font_size(u32::MAX);
        let canvas = renderer(FontLibrary::system()).render(&settings);
        assert!(canvas.is_ready());
    }

    #[test]
    fn empty_text_is_background_and_aura_only() {
        let settings = RenderSettings::default().with_text("");
        let canvas = renderer(FontLibrary::system()).render(&settings);

        let mut ctx = RenderContext::new(Pixmap::new(SMALL, SMALL).unwrap());
        BackgroundLayer::from_settings(&settings).apply(&mut ctx);
        AuraLayer::from_settings(&settings).apply(&mut ctx);

        assert_eq!(canvas.data(), Some(ctx.into_surface().data()));
    }

    #[test]
    fn detached_canvas_is_a_no_op() {
        let mut canvas = AvatarCanvas::detached();
        assert!(!renderer(FontLibrary::empty()).draw(&RenderSettings::default(), &mut canvas));
        assert!(!canvas.is_ready());

        let zero = AvatarRenderer::with_fonts(
            RendererOptions::default().with_canvas_size(0),
            FontLibrary::empty(),
        );
        assert!(!zero.render(&RenderSettings::default()).is_ready());
    }

    #[test]
    fn intensity_deepens_the_aura() {
        let renderer = renderer(FontLibrary::empty());
        let base = RenderSettings::default().with_text("");
        let low = tint(&renderer.render(&base.clone().with_intensity(50.0)));
        let high = tint(&renderer.render(&base.with_intensity(150.0)));
        assert!(high > low, "{high} <= {low}");
    }

    #[test]
    fn single_mode_corners_stay_white() {
        let settings = RenderSettings::default().with_aura_size(20.0);
        let canvas = renderer(FontLibrary::empty()).render(&settings);
        assert_eq!(canvas.pixel(0, 0).unwrap().0, [255, 255, 255, 255]);
    }

    #[test]
    fn dual_mode_paints_background_color() {
        let settings = RenderSettings::default()
            .with_dual_aura("#1d1d1f", "#34c759", "#ffffff")
            .with_aura_size(20.0);
        let canvas = renderer(FontLibrary::empty()).render(&settings);
        let bg = Rgb::new(0x1d, 0x1d, 0x1f);
        assert_eq!(canvas.pixel(1, 1).unwrap().0, [bg.r, bg.g, bg.b, 255]);
    }

    #[test]
    #[ignore = "needs system fonts to draw glyphs"]
    fn bottom_right_text_ends_at_the_padding() {
        let fonts = FontLibrary::system();
        assert!(!fonts.is_empty(), "no system fonts installed");
        let renderer = AvatarRenderer::with_fonts(RendererOptions::default(), fonts);
        let settings = RenderSettings::default()
            .with_dual_aura("#000000", "#000000", "#000000")
            .with_intensity(0.0)
            .with_text("X")
            .with_font_size(100)
            .with_letter_spacing(0.0)
            .with_position(TextPosition::BottomRight);
        assert_eq!(settings.aura_mode, AuraMode::Dual);

        let canvas = renderer.render(&settings);
        let mut max = (0u32, 0u32);
        let mut lit = 0usize;
        for y in 0..1024 {
            for x in 0..1024 {
                if canvas.pixel(x, y).unwrap().0[0] > 200 {
                    lit += 1;
                    max = (max.0.max(x), max.1.max(y));
                }
            }
        }
        assert!(lit > 0, "glyph drew no pixels");

        // Anchor is (901.12, 901.12): right edge of the glyph near it,
        // bottom edge at or above it.
        assert!(max.0 <= 904 && max.0 >= 870, "right edge {}", max.0);
        assert!(max.1 <= 904 && max.1 >= 820, "bottom edge {}", max.1);
    }
}
