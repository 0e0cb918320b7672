//! Background fill layer.

use super::{Backdrop, LayerEffect, RenderContext};
use crate::color::{RENDER_FALLBACK, Rgb};
use crate::settings::{AuraMode, RenderSettings};

/// Fills the whole canvas with one opaque color.
///
/// # Emitted Properties
///
/// - [`Backdrop`]: the fill color and its luminance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundLayer {
    pub color: Rgb,
}

impl BackgroundLayer {
    pub fn new(color: Rgb) -> Self {
        Self { color }
    }

    /// Single mode always paints white; dual mode uses `backgroundColor`.
    pub fn from_settings(settings: &RenderSettings) -> Self {
        let color = match settings.aura_mode {
            AuraMode::Single => Rgb::WHITE,
            AuraMode::Dual => Rgb::from_hex_or(&settings.background_color, RENDER_FALLBACK),
        };
        Self::new(color)
    }
}

impl LayerEffect for BackgroundLayer {
    fn name(&self) -> &'static str {
        "background"
    }

    fn transform(&self, ctx: &mut RenderContext) {
        ctx.surface.fill(self.color.to_skia(1.0));
    }

    fn emit(&self, ctx: &mut RenderContext) {
        ctx.set(Backdrop::new(self.color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::Pixmap;

    #[test]
    fn single_mode_ignores_background_color() {
        let settings = RenderSettings {
            background_color: "#1d1d1f".into(),
            ..RenderSettings::default()
        };
        assert_eq!(BackgroundLayer::from_settings(&settings).color, Rgb::WHITE);
    }

    #[test]
    fn dual_mode_parses_with_black_fallback() {
        let settings = RenderSettings::default().with_dual_aura("#1d1d1f", "#ff0000", "#ffffff");
        assert_eq!(
            BackgroundLayer::from_settings(&settings).color,
            Rgb::new(0x1d, 0x1d, 0x1f)
        );

        let broken = RenderSettings::default().with_dual_aura("navy", "#ff0000", "#ffffff");
        assert_eq!(BackgroundLayer::from_settings(&broken).color, Rgb::BLACK);
    }

    #[test]
    fn fills_every_pixel_and_emits_backdrop() {
        let mut ctx = RenderContext::new(Pixmap::new(6, 6).unwrap());
        BackgroundLayer::new(Rgb::new(10, 20, 30)).apply(&mut ctx);

        for px in ctx.surface.pixels() {
            let c = px.demultiply();
            assert_eq!([c.red(), c.green(), c.blue(), c.alpha()], [10, 20, 30, 255]);
        }
        let backdrop = ctx.get::<Backdrop>().unwrap();
        assert_eq!(backdrop.color, Rgb::new(10, 20, 30));
        assert!(backdrop.is_dark());
    }
}
