//! Multi-layer radial glow.
//!
//! An aura is one or two [`AuraPass`]es. Each pass stacks `layer_count`
//! concentric radial gradients at the canvas center. Radii shrink linearly
//! with the layer index while opacity grows, so the stacked layers build a
//! soft, non-linear falloff instead of a hard disc.
//!
//! For layer `i` of a pass:
//!
//! ```text
//! base_radius = canvas_size * (aura_size / 200) * radius_multiplier
//! radius_i    = base_radius * (1 - i * radius_step)
//! opacity_i   = (intensity / 100) * (base_opacity + i * opacity_step) * opacity_multiplier
//! ```
//!
//! The gradient runs from `opacity_i` at the center, through
//! `0.2 * opacity_i` at 70%, to transparent at `radius_i * 1.8`.

use super::{LayerEffect, RenderContext};
use crate::color::{RENDER_FALLBACK, Rgb};
use crate::settings::{AuraMode, RenderSettings};
use resvg::tiny_skia::{
    FillRule, GradientStop, Paint, PathBuilder, Pixmap, Point, RadialGradient, SpreadMode,
    Transform,
};

/// Ratio between a layer's radius and the extent of its gradient disc.
pub const GLOW_EXTENT: f32 = 1.8;

/// Gradient position of the mid stop.
const MID_STOP: f32 = 0.7;

/// Opacity of the mid stop, relative to the center.
const MID_STOP_OPACITY: f32 = 0.2;

// ============================================================================
// AuraPass
// ============================================================================

/// Parameters for one color's stack of gradient layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuraPass {
    pub color: Rgb,
    pub layer_count: u32,
    pub radius_multiplier: f32,
    /// Fraction of the base radius removed per layer.
    pub radius_step: f32,
    pub base_opacity: f32,
    /// Opacity added per layer.
    pub opacity_step: f32,
    pub opacity_multiplier: f32,
}

impl AuraPass {
    /// The 15-layer pass used by [`AuraMode::Single`].
    pub fn single(color: Rgb) -> Self {
        Self {
            color,
            layer_count: 15,
            radius_multiplier: 1.0,
            radius_step: 0.035,
            base_opacity: 0.03,
            opacity_step: 0.015,
            opacity_multiplier: 1.0,
        }
    }

    /// The wide, faint first pass of [`AuraMode::Dual`].
    pub fn outer(color: Rgb) -> Self {
        Self::dual(color, 10, 1.2, 0.7)
    }

    /// The tight, strong second pass of [`AuraMode::Dual`].
    pub fn inner(color: Rgb) -> Self {
        Self::dual(color, 12, 0.6, 1.2)
    }

    fn dual(color: Rgb, layer_count: u32, radius_multiplier: f32, opacity_multiplier: f32) -> Self {
        Self {
            color,
            layer_count,
            radius_multiplier,
            radius_step: 0.5 / layer_count as f32,
            base_opacity: 0.03,
            opacity_step: 0.015,
            opacity_multiplier,
        }
    }

    /// Radius of layer 0 on a canvas of `canvas_size` pixels.
    pub fn base_radius(&self, canvas_size: f32, aura_size: f32) -> f32 {
        canvas_size * (aura_size / 200.0) * self.radius_multiplier
    }

    /// Radius of layer `index`; never negative.
    pub fn layer_radius(&self, base_radius: f32, index: u32) -> f32 {
        (base_radius * (1.0 - index as f32 * self.radius_step)).max(0.0)
    }

    /// Center opacity of layer `index`, clamped to `0..=1`.
    pub fn layer_opacity(&self, intensity: f32, index: u32) -> f32 {
        let opacity = (intensity / 100.0)
            * (self.base_opacity + index as f32 * self.opacity_step)
            * self.opacity_multiplier;
        opacity.clamp(0.0, 1.0)
    }
}

// ============================================================================
// AuraLayer
// ============================================================================

/// Draws every aura pass in order, outer before inner.
#[derive(Debug, Clone, PartialEq)]
pub struct AuraLayer {
    pub passes: Vec<AuraPass>,
    /// Radius scale, in percent.
    pub aura_size: f32,
    /// Opacity scale, in percent.
    pub intensity: f32,
}

impl AuraLayer {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        let parse = |hex: &str| Rgb::from_hex_or(hex, RENDER_FALLBACK);
        let passes = match settings.aura_mode {
            AuraMode::Single => vec![AuraPass::single(parse(&settings.color))],
            AuraMode::Dual => vec![
                AuraPass::outer(parse(&settings.outer_color)),
                AuraPass::inner(parse(&settings.inner_color)),
            ],
        };

        Self {
            passes,
            aura_size: settings.aura_size,
            intensity: settings.intensity,
        }
    }

    /// Total number of gradient layers drawn.
    pub fn layer_count(&self) -> u32 {
        self.passes.iter().map(|p| p.layer_count).sum()
    }

    /// Outermost extent of any glow, in pixels.
    pub fn extent(&self, canvas_size: f32) -> f32 {
        self.passes
            .iter()
            .map(|p| p.base_radius(canvas_size, self.aura_size) * GLOW_EXTENT)
            .fold(0.0, f32::max)
    }
}

impl LayerEffect for AuraLayer {
    fn name(&self) -> &'static str {
        "aura"
    }

    fn transform(&self, ctx: &mut RenderContext) {
        let size = ctx.size();
        let center = ctx.center();

        for pass in &self.passes {
            let base = pass.base_radius(size, self.aura_size);
            for i in 0..pass.layer_count {
                let radius = pass.layer_radius(base, i);
                let opacity = pass.layer_opacity(self.intensity, i);
                fill_glow(
                    &mut ctx.surface,
                    center,
                    radius * GLOW_EXTENT,
                    pass.color,
                    opacity,
                );
            }
        }
    }
}

/// Fills a disc of `extent` with a three-stop radial gradient.
///
/// Zero-extent or fully transparent layers draw nothing.
fn fill_glow(surface: &mut Pixmap, center: (f32, f32), extent: f32, color: Rgb, opacity: f32) {
    if !(extent > 0.0 && opacity > 0.0) {
        return;
    }

    let (cx, cy) = center;
    let stops = vec![
        GradientStop::new(0.0, color.to_skia(opacity)),
        GradientStop::new(MID_STOP, color.to_skia(opacity * MID_STOP_OPACITY)),
        GradientStop::new(1.0, color.to_skia(0.0)),
    ];
    let Some(shader) = RadialGradient::new(
        Point::from_xy(cx, cy),
        Point::from_xy(cx, cy),
        extent,
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    ) else {
        return;
    };
    let Some(disc) = PathBuilder::from_circle(cx, cy, extent) else {
        return;
    };

    let mut paint = Paint::default();
    paint.shader = shader;
    paint.anti_alias = true;
    surface.fill_path(&disc, &paint, FillRule::Winding, Transform::identity(), None);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_alpha_within(surface: &Pixmap, radius: f32) -> f64 {
        let (cx, cy) = (surface.width() as f32 / 2.0, surface.height() as f32 / 2.0);
        let mut total = 0u64;
        let mut count = 0u64;
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
                if (dx * dx + dy * dy).sqrt() <= radius {
                    total += surface.pixel(x, y).map_or(0, |p| p.alpha()) as u64;
                    count += 1;
                }
            }
        }
        total as f64 / count.max(1) as f64
    }

    fn aura_only(settings: &RenderSettings, size: u32) -> Pixmap {
        let mut ctx = RenderContext::new(Pixmap::new(size, size).unwrap());
        AuraLayer::from_settings(settings).apply(&mut ctx);
        ctx.into_surface()
    }

    #[test]
    fn single_pass_formulas() {
        let pass = AuraPass::single(Rgb::BLACK);
        let base = pass.base_radius(1024.0, 100.0);
        assert_eq!(base, 512.0);
        assert!((pass.layer_radius(base, 10) - 512.0 * 0.65).abs() < 1e-3);
        assert!((pass.layer_opacity(100.0, 0) - 0.03).abs() < 1e-6);
        assert!((pass.layer_opacity(200.0, 14) - 2.0 * (0.03 + 14.0 * 0.015)).abs() < 1e-6);
    }

    #[test]
    fn dual_pass_formulas() {
        let outer = AuraPass::outer(Rgb::BLACK);
        let inner = AuraPass::inner(Rgb::BLACK);
        assert_eq!(outer.layer_count, 10);
        assert_eq!(inner.layer_count, 12);
        assert!((outer.radius_step - 0.05).abs() < 1e-6);
        assert!((inner.radius_step - 0.5 / 12.0).abs() < 1e-6);

        assert!((outer.base_radius(1000.0, 100.0) - 600.0).abs() < 1e-3);
        assert!((inner.base_radius(1000.0, 100.0) - 300.0).abs() < 1e-3);
        assert!((outer.layer_opacity(100.0, 0) - 0.021).abs() < 1e-6);
        assert!((inner.layer_opacity(100.0, 0) - 0.036).abs() < 1e-6);
    }

    #[test]
    fn radius_shrinks_and_opacity_grows_per_layer() {
        for pass in [
            AuraPass::single(Rgb::WHITE),
            AuraPass::outer(Rgb::WHITE),
            AuraPass::inner(Rgb::WHITE),
        ] {
            let base = pass.base_radius(1024.0, 85.0);
            for i in 1..pass.layer_count {
                assert!(pass.layer_radius(base, i) < pass.layer_radius(base, i - 1));
                assert!(pass.layer_opacity(95.0, i) > pass.layer_opacity(95.0, i - 1));
            }
        }
    }

    #[test]
    fn out_of_range_values_degrade_quietly() {
        let pass = AuraPass {
            radius_step: 0.5,
            ..AuraPass::single(Rgb::WHITE)
        };
        assert_eq!(pass.layer_radius(100.0, 5), 0.0);
        assert_eq!(pass.layer_opacity(-50.0, 3), 0.0);
        assert_eq!(pass.layer_opacity(10_000.0, 3), 1.0);

        let mut surface = Pixmap::new(8, 8).unwrap();
        fill_glow(&mut surface, (4.0, 4.0), 0.0, Rgb::WHITE, 1.0);
        fill_glow(&mut surface, (4.0, 4.0), -3.0, Rgb::WHITE, 1.0);
        fill_glow(&mut surface, (4.0, 4.0), f32::NAN, Rgb::WHITE, 1.0);
        assert!(surface.pixels().iter().all(|p| p.alpha() == 0));
    }

    #[test]
    fn layer_counts_per_mode() {
        let single = AuraLayer::from_settings(&RenderSettings::default());
        assert_eq!(single.passes.len(), 1);
        assert_eq!(single.layer_count(), 15);

        let dual = AuraLayer::from_settings(
            &RenderSettings::default().with_dual_aura("#000000", "#ff2d55", "#5856d6"),
        );
        assert_eq!(dual.passes.len(), 2);
        assert_eq!(dual.layer_count(), 22);
        assert_eq!(dual.passes[0].color, Rgb::new(0xff, 0x2d, 0x55));
        assert_eq!(dual.passes[1].color, Rgb::new(0x58, 0x56, 0xd6));
    }

    #[test]
    fn malformed_aura_color_is_black() {
        let settings = RenderSettings::default().with_color("greenish");
        let layer = AuraLayer::from_settings(&settings);
        assert_eq!(layer.passes[0].color, Rgb::BLACK);
    }

    #[test]
    fn higher_intensity_raises_mean_alpha() {
        let size = 256;
        let low = RenderSettings::default().with_intensity(50.0);
        let high = RenderSettings::default().with_intensity(150.0);
        let radius = AuraLayer::from_settings(&low).extent(size as f32);

        let low_alpha = mean_alpha_within(&aura_only(&low, size), radius);
        let high_alpha = mean_alpha_within(&aura_only(&high, size), radius);
        assert!(low_alpha > 0.0);
        assert!(high_alpha > low_alpha, "{high_alpha} <= {low_alpha}");
    }

    #[test]
    fn higher_intensity_raises_mean_alpha_in_dual_mode() {
        let size = 256;
        let base = RenderSettings::default().with_dual_aura("#000000", "#ff2d55", "#5856d6");
        let low = base.clone().with_intensity(50.0);
        let high = base.with_intensity(150.0);
        let radius = AuraLayer::from_settings(&low).extent(size as f32);

        let low_alpha = mean_alpha_within(&aura_only(&low, size), radius);
        let high_alpha = mean_alpha_within(&aura_only(&high, size), radius);
        assert!(high_alpha > low_alpha);
    }

    #[test]
    fn glow_is_strongest_at_center() {
        // base radius 25.6, outermost extent ~46
        let surface = aura_only(&RenderSettings::default().with_aura_size(40.0), 128);
        let center = surface.pixel(64, 64).unwrap().alpha();
        let edge = surface.pixel(30, 64).unwrap().alpha();
        assert!(center > edge);
        assert_eq!(surface.pixel(0, 0).unwrap().alpha(), 0);
    }

    #[test]
    fn zero_intensity_draws_nothing() {
        let surface = aura_only(&RenderSettings::default().with_intensity(0.0), 64);
        assert!(surface.pixels().iter().all(|p| p.alpha() == 0));
    }
}
