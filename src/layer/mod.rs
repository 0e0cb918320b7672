//! The avatar render pipeline.
//!
//! A render pass runs a fixed sequence of layers over one surface:
//!
//! ```text
//! ┌────────────┐
//! │ Background │ ◄── emits Backdrop
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │    Aura    │ ◄── outer pass, then inner pass (dual mode)
//! └─────┬──────┘
//!       ▼
//! ┌────────────┐
//! │    Text    │ ◄── consumes Backdrop for its shadow
//! └────────────┘
//! ```
//!
//! Each layer implements [`LayerEffect`]. Layers talk to each other only
//! through typed properties on the [`RenderContext`], and any drawing state
//! a layer needs (letter spacing, shadow) is installed with
//! [`RenderContext::with_draw_state`] so it cannot outlive the draw.

pub mod aura;
pub mod background;
pub mod svg;
pub mod text;

pub use aura::{AuraLayer, AuraPass};
pub use background::BackgroundLayer;
pub use svg::FontLibrary;
pub use text::{TextAlign, TextAnchor, TextBaseline, TextLayer};

use crate::color::Rgb;
use crate::settings::RenderSettings;
use resvg::tiny_skia::Pixmap;
use std::any::{Any, TypeId};
use std::collections::HashMap;

// ============================================================================
// Render Context
// ============================================================================

/// State that flows through one render pass.
///
/// Owns the surface for the duration of the pass. Layers read properties
/// set by upstream layers and emit new ones for downstream layers.
pub struct RenderContext {
    /// The surface being drawn.
    pub surface: Pixmap,

    /// Typed property bag for inter-layer communication.
    properties: HashMap<TypeId, Box<dyn Any + Send + Sync>>,

    /// Drawing state scoped to a single draw call.
    draw_state: DrawState,
}

impl RenderContext {
    /// Creates a context around a surface, with default drawing state.
    pub fn new(surface: Pixmap) -> Self {
        Self {
            surface,
            properties: HashMap::new(),
            draw_state: DrawState::default(),
        }
    }

    /// Side length of the (square) surface.
    pub fn size(&self) -> f32 {
        self.surface.width() as f32
    }

    /// Center point of the surface.
    pub fn center(&self) -> (f32, f32) {
        (
            self.surface.width() as f32 / 2.0,
            self.surface.height() as f32 / 2.0,
        )
    }

    /// Sets a typed property that downstream layers can read.
    pub fn set<T: Any + Send + Sync>(&mut self, value: T) {
        self.properties.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Gets a typed property set by an upstream layer.
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.properties
            .get(&TypeId::of::<T>())
            .and_then(|b| b.downcast_ref())
    }

    /// The drawing state currently in effect.
    pub fn draw_state(&self) -> &DrawState {
        &self.draw_state
    }

    /// Runs `draw` with `state` installed, then restores the previous state.
    pub fn with_draw_state<R>(
        &mut self,
        state: DrawState,
        draw: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let previous = std::mem::replace(&mut self.draw_state, state);
        let out = draw(self);
        self.draw_state = previous;
        out
    }

    /// Releases the surface at the end of the pass.
    pub fn into_surface(self) -> Pixmap {
        self.surface
    }
}

// ============================================================================
// Drawing State
// ============================================================================

/// A soft drop shadow behind drawn glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    pub color: Rgb,
    pub alpha: f32,
    /// Blur extent in pixels, as in a canvas `shadowBlur`.
    pub blur: f32,
}

impl Shadow {
    /// Gaussian standard deviation equivalent to [`blur`](Self::blur).
    pub fn std_deviation(&self) -> f32 {
        (self.blur / 2.0).max(0.0)
    }
}

/// Drawing properties that apply to a single draw call.
///
/// The default is no extra spacing and no shadow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawState {
    pub letter_spacing: f32,
    pub shadow: Option<Shadow>,
}

// ============================================================================
// Common Properties
// ============================================================================

/// The background the rest of the image is drawn over.
///
/// Emitted by [`BackgroundLayer`]; consumed by [`TextLayer`] to pick a shadow
/// with enough contrast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backdrop {
    pub color: Rgb,
    pub luminance: f32,
}

impl Backdrop {
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            luminance: color.relative_luminance(),
        }
    }

    pub fn is_dark(&self) -> bool {
        self.luminance < 0.5
    }
}

// ============================================================================
// Layer Trait
// ============================================================================

/// A self-contained drawing step.
///
/// [`transform`](Self::transform) draws onto the context's surface;
/// [`emit`](Self::emit) runs afterwards and publishes properties for
/// downstream layers.
pub trait LayerEffect {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Draws this layer onto `ctx.surface`.
    fn transform(&self, ctx: &mut RenderContext);

    /// Emits properties for downstream layers. Emits nothing by default.
    fn emit(&self, _ctx: &mut RenderContext) {}

    /// Runs [`transform`](Self::transform) then [`emit`](Self::emit).
    fn apply(&self, ctx: &mut RenderContext) {
        tracing::trace!(layer = self.name(), "applying layer");
        self.transform(ctx);
        self.emit(ctx);
    }
}

// ============================================================================
// Layer Pipeline
// ============================================================================

/// The fixed layer sequence for one set of settings.
///
/// Built fresh for every render; nothing is cached between passes.
#[derive(Debug, Clone)]
pub struct LayerPipeline {
    pub background: BackgroundLayer,
    pub aura: AuraLayer,
    /// `None` when the text is empty.
    pub text: Option<TextLayer>,
}

impl LayerPipeline {
    /// Resolves settings into layers. Settings are sanitized first.
    pub fn from_settings(settings: &RenderSettings, fonts: &FontLibrary) -> Self {
        let settings = settings.sanitized();
        Self {
            background: BackgroundLayer::from_settings(&settings),
            aura: AuraLayer::from_settings(&settings),
            text: TextLayer::from_settings(&settings, fonts),
        }
    }

    /// Draws every layer in order onto the context.
    pub fn render(&self, ctx: &mut RenderContext) {
        self.background.apply(ctx);
        self.aura.apply(ctx);
        if let Some(text) = &self.text {
            text.apply(ctx);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn context(size: u32) -> RenderContext {
        RenderContext::new(Pixmap::new(size, size).unwrap())
    }

    #[test]
    fn properties_are_typed() {
        let mut ctx = context(4);
        assert!(ctx.get::<Backdrop>().is_none());

        ctx.set(Backdrop::new(Rgb::WHITE));
        assert!(ctx.get::<Backdrop>().is_some());
        assert_eq!(ctx.get::<Backdrop>().unwrap().color, Rgb::WHITE);
        assert!(ctx.get::<Shadow>().is_none());
    }

    #[test]
    fn draw_state_is_restored_after_scope() {
        let mut ctx = context(4);
        let scoped = DrawState {
            letter_spacing: 40.0,
            shadow: Some(Shadow {
                color: Rgb::BLACK,
                alpha: 0.1,
                blur: 8.0,
            }),
        };

        let seen = ctx.with_draw_state(scoped, |ctx| *ctx.draw_state());
        assert_eq!(seen, scoped);
        assert_eq!(*ctx.draw_state(), DrawState::default());
    }

    #[test]
    fn nested_draw_state_restores_outer() {
        let mut ctx = context(4);
        let outer = DrawState {
            letter_spacing: 5.0,
            shadow: None,
        };
        let inner = DrawState {
            letter_spacing: -3.0,
            shadow: None,
        };

        ctx.with_draw_state(outer, |ctx| {
            ctx.with_draw_state(inner, |ctx| {
                assert_eq!(ctx.draw_state().letter_spacing, -3.0);
            });
            assert_eq!(ctx.draw_state().letter_spacing, 5.0);
        });
        assert_eq!(ctx.draw_state().letter_spacing, 0.0);
    }

    #[test]
    fn backdrop_darkness() {
        assert!(Backdrop::new(Rgb::new(0x1d, 0x1d, 0x1f)).is_dark());
        assert!(!Backdrop::new(Rgb::WHITE).is_dark());
    }

    #[test]
    fn empty_text_has_no_text_layer() {
        let fonts = FontLibrary::empty();
        let settings = RenderSettings::default().with_text("");
        let pipeline = LayerPipeline::from_settings(&settings, &fonts);
        assert!(pipeline.text.is_none());

        let pipeline = LayerPipeline::from_settings(&RenderSettings::default(), &fonts);
        assert_eq!(pipeline.text.unwrap().text(), "UNTAMED");
    }

    #[test]
    fn shadow_std_deviation_is_half_blur() {
        let shadow = Shadow {
            color: Rgb::BLACK,
            alpha: 0.1,
            blur: 8.0,
        };
        assert_eq!(shadow.std_deviation(), 4.0);
    }
}
