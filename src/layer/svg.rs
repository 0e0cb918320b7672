//! Text rasterization through resvg/usvg.
//!
//! A text run is written out as a single SVG `<text>` element and rendered
//! over the existing surface. usvg does the shaping, letter spacing, anchor
//! and baseline alignment, and the drop-shadow filter; tiny-skia composites
//! the result source-over.

use std::fmt;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, Options, Tree, fontdb};

use super::DrawState;
use super::text::TextAnchor;
use crate::color::Rgb;

// ============================================================================
// FontLibrary
// ============================================================================

/// A shared font database plus the selection rules used for text runs.
///
/// Selection tries the requested families in order, then generic
/// sans-serif, serif and monospace, then any loaded face. An empty library
/// renders no glyphs at all.
#[derive(Clone)]
pub struct FontLibrary {
    db: Arc<fontdb::Database>,
}

impl fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for FontLibrary {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontLibrary {
    /// A library with no faces.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// The system fonts, loaded once per process and shared.
    pub fn system() -> Self {
        static SYSTEM: OnceLock<Arc<fontdb::Database>> = OnceLock::new();
        let db = SYSTEM.get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts");
            Arc::new(db)
        });
        Self { db: Arc::clone(db) }
    }

    /// Builds a library from optional system fonts plus extra directories.
    ///
    /// Unreadable directories are skipped with a warning.
    pub fn load(system_fonts: bool, dirs: &[PathBuf]) -> Self {
        if dirs.is_empty() {
            return if system_fonts {
                Self::system()
            } else {
                Self::empty()
            };
        }

        let mut db = if system_fonts {
            Self::system().db.as_ref().clone()
        } else {
            fontdb::Database::new()
        };
        for dir in dirs {
            if !dir.is_dir() {
                tracing::warn!(dir = %dir.display(), "font directory not found");
                continue;
            }
            let before = db.len();
            db.load_fonts_dir(dir);
            tracing::debug!(
                dir = %dir.display(),
                added = db.len() - before,
                "loaded font directory"
            );
        }
        Self { db: Arc::new(db) }
    }

    /// Number of loaded faces.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    fn options(&self) -> Options<'static> {
        Options {
            fontdb: Arc::clone(&self.db),
            font_resolver: font_resolver(),
            ..Default::default()
        }
    }
}

fn font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, db| {
            let mut families: Vec<fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(name) => fontdb::Family::Name(name),
                })
                .collect();
            families.extend([
                fontdb::Family::SansSerif,
                fontdb::Family::Serif,
                fontdb::Family::Monospace,
            ]);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };
            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: stretch(font.stretch()),
                style,
            };

            db.query(&query)
                .or_else(|| db.faces().next().map(|face| face.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

fn stretch(stretch: usvg::FontStretch) -> fontdb::Stretch {
    match stretch {
        usvg::FontStretch::UltraCondensed => fontdb::Stretch::UltraCondensed,
        usvg::FontStretch::ExtraCondensed => fontdb::Stretch::ExtraCondensed,
        usvg::FontStretch::Condensed => fontdb::Stretch::Condensed,
        usvg::FontStretch::SemiCondensed => fontdb::Stretch::SemiCondensed,
        usvg::FontStretch::Normal => fontdb::Stretch::Normal,
        usvg::FontStretch::SemiExpanded => fontdb::Stretch::SemiExpanded,
        usvg::FontStretch::Expanded => fontdb::Stretch::Expanded,
        usvg::FontStretch::ExtraExpanded => fontdb::Stretch::ExtraExpanded,
        usvg::FontStretch::UltraExpanded => fontdb::Stretch::UltraExpanded,
    }
}

// ============================================================================
// Text markup
// ============================================================================

/// Everything needed to draw one line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// CSS font-family stack.
    pub font_stack: &'a str,
    pub font_size: u32,
    pub fill: Rgb,
    pub fill_opacity: f32,
    pub anchor: TextAnchor,
}

const SHADOW_FILTER_ID: &str = "glyph-shadow";

/// Builds an SVG document of `canvas_size` containing just this run.
///
/// Letter spacing and shadow come from `state`, so they exist only inside
/// this document.
pub fn text_markup(canvas_size: u32, run: &TextRun<'_>, state: &DrawState) -> String {
    let mut svg = String::with_capacity(512 + run.text.len());
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{s}" height="{s}" viewBox="0 0 {s} {s}">"#,
        s = canvas_size
    );

    if let Some(shadow) = state.shadow {
        let _ = write!(
            svg,
            concat!(
                r#"<defs><filter id="{id}" x="-50%" y="-50%" width="200%" height="200%">"#,
                r#"<feDropShadow dx="0" dy="0" stdDeviation="{sd}" flood-color="{color}" flood-opacity="{alpha}"/>"#,
                r#"</filter></defs>"#
            ),
            id = SHADOW_FILTER_ID,
            sd = shadow.std_deviation(),
            color = shadow.color.to_hex(),
            alpha = shadow.alpha.clamp(0.0, 1.0),
        );
    }

    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" letter-spacing="{spacing}" text-anchor="{align}" dominant-baseline="{baseline}" fill="{fill}" fill-opacity="{opacity}""#,
        x = run.anchor.x,
        y = run.anchor.y,
        family = escape_xml(run.font_stack),
        size = run.font_size,
        spacing = state.letter_spacing,
        align = run.anchor.align.svg_text_anchor(),
        baseline = run.anchor.baseline.svg_dominant_baseline(),
        fill = run.fill.to_hex(),
        opacity = run.fill_opacity.clamp(0.0, 1.0),
    );
    if state.shadow.is_some() {
        let _ = write!(svg, r#" filter="url(#{SHADOW_FILTER_ID})""#);
    }
    let _ = write!(svg, r#" xml:space="preserve">{}</text></svg>"#, escape_xml(run.text));

    svg
}

/// Parses `markup` and renders it over `surface`.
///
/// Returns false if the markup could not be parsed; the surface is then
/// left untouched.
pub fn render_markup(markup: &str, fonts: &FontLibrary, surface: &mut Pixmap) -> bool {
    let tree = match Tree::from_str(markup, &fonts.options()) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::debug!(%err, "text markup rejected");
            return false;
        }
    };

    resvg::render(&tree, Transform::identity(), &mut surface.as_mut());
    true
}

fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
