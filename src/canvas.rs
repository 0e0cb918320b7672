//! The drawing surface and its PNG export.
//!
//! An [`AvatarCanvas`] is either attached, owning a square premultiplied
//! RGBA surface, or detached. Drawing onto a detached canvas is a no-op, so a
//! caller that renders before its surface exists can simply retry later.
//!
//! # Example
//!
//! ```no_run
//! use aura_renderer::{render, RenderSettings};
//!
//! let canvas = render(&RenderSettings::default());
//! canvas.save_png(aura_renderer::export_file_name(1_700_000_000_000))?;
//! # Ok::<(), aura_renderer::AuraError>(())
//! ```

use std::io::Cursor;
use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::Pixmap;

use crate::error::{AuraError, Result};

/// Side length of the avatar canvas, in pixels.
pub const CANVAS_SIZE: u32 = 1024;

// ============================================================================
// AvatarCanvas
// ============================================================================

/// A square raster surface that the renderer draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarCanvas {
    surface: Option<Pixmap>,
}

impl AvatarCanvas {
    /// Creates an attached, fully transparent canvas.
    ///
    /// A size of zero yields a detached canvas.
    pub fn new(size: u32) -> Self {
        Self {
            surface: Pixmap::new(size, size),
        }
    }

    /// Creates a canvas with no surface attached.
    pub fn detached() -> Self {
        Self { surface: None }
    }

    /// Returns true if a surface is attached.
    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    /// Side length in pixels, if attached.
    pub fn size(&self) -> Option<u32> {
        self.surface.as_ref().map(|s| s.width())
    }

    /// Detaches the surface so a render pass can own it.
    pub(crate) fn take_surface(&mut self) -> Option<Pixmap> {
        self.surface.take()
    }

    /// Re-attaches a surface after a render pass.
    pub(crate) fn attach(&mut self, surface: Pixmap) {
        self.surface = Some(surface);
    }

    /// Raw premultiplied RGBA bytes, if attached.
    pub fn data(&self) -> Option<&[u8]> {
        self.surface.as_ref().map(|s| s.data())
    }

    /// Reads one straight-alpha pixel. `None` when detached or out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        let surface = self.surface.as_ref()?;
        if x >= surface.width() || y >= surface.height() {
            return None;
        }
        let color = surface.pixel(x, y)?.demultiply();
        Some(Rgba([color.red(), color.green(), color.blue(), color.alpha()]))
    }

    /// Copies the surface into a straight-alpha [`RgbaImage`].
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        self.surface.as_ref().map(pixmap_to_rgba_image)
    }

    /// Encodes the surface as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let image = self.to_rgba_image().ok_or(AuraError::SurfaceDetached)?;
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Encodes the surface as PNG and writes it to `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = self.to_rgba_image().ok_or(AuraError::SurfaceDetached)?;
        image.save_with_format(path, ImageFormat::Png)?;
        tracing::debug!(path = %path.display(), "saved avatar png");
        Ok(())
    }
}

/// Suggested export file name for a timestamp in Unix milliseconds.
pub fn export_file_name(unix_millis: u128) -> String {
    format!("aura-art-{unix_millis}.png")
}

/// Converts a tiny-skia pixmap to a straight-alpha image.
pub(crate) fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    img
}

// ============================================================================
// Tests
// ============================================================================
