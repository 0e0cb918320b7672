//! aura-renderer: glowing text avatars on a square canvas.
//!
//! A [`RenderSettings`] record goes in, a 1024×1024 pixel surface comes
//! out. The image is a background fill, a stack of soft radial gradients
//! (the aura) and a line of text, always redrawn from scratch.
//!
//! ```
//! use aura_renderer::{AvatarRenderer, FontLibrary, RenderSettings, RendererOptions, TextPosition};
//!
//! let renderer = AvatarRenderer::with_fonts(RendererOptions::default(), FontLibrary::system());
//! let settings = RenderSettings::default()
//!     .with_text("void")
//!     .with_intensity(140.0)
//!     .with_position(TextPosition::BottomRight);
//!
//! let canvas = renderer.render(&settings);
//! assert_eq!(canvas.size(), Some(1024));
//! ```
//!
//! # Color picking
//!
//! [`ColorPicker`] samples a hue wheel under a pointer and darkens the
//! result with a lightness slider. Its output is a hex string that goes
//! straight into [`RenderSettings::color`] and friends.
//!
//! ```
//! use aura_renderer::{ColorPicker, WHEEL_SIZE};
//!
//! let mut picker = ColorPicker::new(WHEEL_SIZE).unwrap();
//! picker.pointer(500.0, 100.0); // outside the disc: clamped to the rim
//! let hex = picker.set_lightness(50.0);
//! assert_eq!(hex.len(), 7);
//! ```

mod canvas;
mod color;
mod error;
mod layer;
mod picker;
mod renderer;
mod settings;
mod surprise;

pub use canvas::{AvatarCanvas, CANVAS_SIZE, export_file_name};
pub use color::{PICKER_FALLBACK, RENDER_FALLBACK, Rgb, apply_lightness, hex_to_rgb, rgb_to_hex};
pub use error::{AuraError, Result};
pub use layer::{
    AuraLayer, AuraPass, Backdrop, BackgroundLayer, DrawState, FontLibrary, LayerEffect,
    LayerPipeline, RenderContext, Shadow, TextAlign, TextAnchor, TextBaseline, TextLayer,
};
pub use layer::text::{PADDING_RATIO, apply_text_transform};
pub use picker::{ColorPicker, HueWheel, PickerState, WHEEL_SIZE};
pub use renderer::{AvatarRenderer, RendererOptions, render};
pub use settings::{
    AURA_SIZE_RANGE, AuraMode, DEFAULT_FONT_STACK, FALLBACK_FONT_SIZE, FontGroup, FontStyle,
    INTENSITY_RANGE, LETTER_SPACING_RANGE, MAX_FONT_SIZE, RenderSettings, TextPosition,
    TextTransform, parse_font_size,
};
pub use surprise::{SURPRISE_COLORS, SURPRISE_TEXTS, surprise, surprise_from};
