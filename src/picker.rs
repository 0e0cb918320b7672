//! Hue-wheel color picker.
//!
//! [`HueWheel`] is a disc image built once per size: white at the center,
//! fully saturated at the rim, with hue encoded by angle. [`ColorPicker`]
//! samples it under a pointer (clamped onto the disc) and darkens the result
//! with a separately tracked lightness.

use std::f32::consts::PI;

use image::RgbaImage;
use resvg::tiny_skia::{
    Color, FillRule, GradientStop, Paint, PathBuilder, Pixmap, Point, RadialGradient, SpreadMode,
    Transform,
};
use serde::{Deserialize, Serialize};

use crate::canvas::pixmap_to_rgba_image;
use crate::color::{Rgb, apply_lightness};

/// Default side length of the wheel image, in pixels.
pub const WHEEL_SIZE: u32 = 200;

/// Angular width of each slice, in degrees.
const SLICE_DEGREES: f32 = 2.0;

/// Distance inside the rim at which clamped pointers are sampled.
pub const RIM_INSET: f32 = 1.5;

/// Straight segments used to approximate each slice's arc.
const ARC_SEGMENTS: u32 = 4;

// ============================================================================
// HueWheel
// ============================================================================

/// The precomputed polar color disc.
#[derive(Debug, Clone, PartialEq)]
pub struct HueWheel {
    pixmap: Pixmap,
}

impl HueWheel {
    /// Draws a wheel of `size`×`size`. `None` for a zero size.
    pub fn new(size: u32) -> Option<Self> {
        let mut pixmap = Pixmap::new(size, size)?;
        let radius = size as f32 / 2.0;
        let center = Point::from_xy(radius, radius);

        for degree in 0..360u16 {
            let hue = f32::from(degree);
            let Some(path) = slice_path(center, radius, hue) else {
                continue;
            };
            let Some(shader) = RadialGradient::new(
                center,
                center,
                radius,
                vec![
                    GradientStop::new(0.0, Color::WHITE),
                    GradientStop::new(1.0, Rgb::from_hsl(hue, 1.0, 0.5).to_skia(1.0)),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            ) else {
                continue;
            };
            let paint = Paint {
                shader,
                anti_alias: true,
                ..Paint::default()
            };
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }

        tracing::debug!(size, "built hue wheel");
        Some(Self { pixmap })
    }

    pub fn size(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn radius(&self) -> f32 {
        self.size() as f32 / 2.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.radius(), self.radius())
    }

    /// Pulls a point outside the disc onto its rim, keeping the angle.
    pub fn clamp_to_disc(&self, x: f32, y: f32) -> (f32, f32) {
        self.clamp_to_radius(x, y, self.radius())
    }

    fn clamp_to_radius(&self, x: f32, y: f32, limit: f32) -> (f32, f32) {
        let (cx, cy) = self.center();
        let (dx, dy) = (x - cx, y - cy);
        let distance = dx.hypot(dy);
        if distance <= limit || !distance.is_finite() {
            return (x, y);
        }
        let scale = limit.max(0.0) / distance;
        (cx + dx * scale, cy + dy * scale)
    }

    /// Reads the color at an image coordinate. `None` outside the image.
    pub fn color_at(&self, x: f32, y: f32) -> Option<Rgb> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let (px, py) = (x as u32, y as u32);
        if px >= self.pixmap.width() || py >= self.pixmap.height() {
            return None;
        }
        let pixel = self.pixmap.pixel(px, py)?.demultiply();
        Some(Rgb::new(pixel.red(), pixel.green(), pixel.blue()))
    }

    /// Clamps a pointer onto the disc, then reads the color under it.
    ///
    /// Points on or past the rim are read [`RIM_INSET`] pixels inside it,
    /// where the anti-aliased edge is still opaque.
    pub fn sample_at(&self, x: f32, y: f32) -> Rgb {
        let limit = self.radius() - RIM_INSET;
        let (x, y) = self.clamp_to_radius(sanitize(x), sanitize(y), limit);
        let last = self.size().saturating_sub(1) as f32;
        let px = x.floor().clamp(0.0, last);
        let py = y.floor().clamp(0.0, last);
        self.color_at(px, py).unwrap_or(Rgb::WHITE)
    }

    /// A straight-alpha copy of the wheel.
    pub fn to_rgba_image(&self) -> RgbaImage {
        pixmap_to_rgba_image(&self.pixmap)
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

fn slice_path(center: Point, radius: f32, start_degree: f32) -> Option<resvg::tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(center.x, center.y);
    for step in 0..=ARC_SEGMENTS {
        let degree = start_degree + SLICE_DEGREES * step as f32 / ARC_SEGMENTS as f32;
        let angle = degree * PI / 180.0;
        pb.line_to(center.x + radius * angle.cos(), center.y + radius * angle.sin());
    }
    pb.close();
    pb.finish()
}

// ============================================================================
// PickerState
// ============================================================================

/// Session state behind one picker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerState {
    /// Color sampled from the wheel, before lightness.
    pub hue_color: Rgb,
    /// Lightness percentage, 0-100.
    pub lightness: f32,
    /// Indicator position on the wheel, already clamped.
    pub indicator: (f32, f32),
}

impl PickerState {
    /// The color the picker reports: `hue_color` darkened by `lightness`.
    pub fn derived_color(&self) -> String {
        apply_lightness(&self.hue_color.to_hex(), self.lightness)
    }
}

// ============================================================================
// ColorPicker
// ============================================================================

/// A hue wheel plus the state a pointer drag and a lightness slider drive.
#[derive(Debug, Clone)]
pub struct ColorPicker {
    wheel: HueWheel,
    state: PickerState,
}

impl ColorPicker {
    /// Starts at the wheel center with full lightness.
    pub fn new(size: u32) -> Option<Self> {
        let wheel = HueWheel::new(size)?;
        let center = wheel.center();
        let state = PickerState {
            hue_color: wheel.sample_at(center.0, center.1),
            lightness: 100.0,
            indicator: center,
        };
        Some(Self { wheel, state })
    }

    /// Handles a pointer press or drag at `(x, y)`. Returns the new color.
    pub fn pointer(&mut self, x: f32, y: f32) -> String {
        let indicator = self.wheel.clamp_to_disc(sanitize(x), sanitize(y));
        self.state.hue_color = self.wheel.sample_at(indicator.0, indicator.1);
        self.state.indicator = indicator;
        tracing::trace!(?indicator, hue = %self.state.hue_color.to_hex(), "picker moved");
        self.color()
    }

    /// Handles a lightness slider change. Returns the new color.
    pub fn set_lightness(&mut self, lightness: f32) -> String {
        self.state.lightness = if lightness.is_finite() {
            lightness.clamp(0.0, 100.0)
        } else {
            100.0
        };
        self.color()
    }

    /// The current derived color.
    pub fn color(&self) -> String {
        self.state.derived_color()
    }

    /// Samples the wheel at a point without moving the indicator.
    pub fn sample_at(&self, x: f32, y: f32) -> String {
        self.wheel.sample_at(x, y).to_hex()
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn wheel(&self) -> &HueWheel {
        &self.wheel
    }
}

// ============================================================================
// Tests
// ============================================================================
