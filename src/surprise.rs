//! Seeded "surprise me" settings generator.
//!
//! The same seed always produces the same settings, so a shared seed is
//! enough to reproduce a look.

use crate::settings::{FontStyle, RenderSettings, TextPosition, TextTransform};

/// Accent colors the generator picks from.
pub const SURPRISE_COLORS: [&str; 9] = [
    "#000000", "#ff2d55", "#5856d6", "#34c759", "#ff9500", "#007aff", "#ff3b30", "#af52de",
    "#1d1d1f",
];

/// Words the generator picks from.
pub const SURPRISE_TEXTS: [&str; 10] = [
    "EGO", "RARE", "VOID", "PURE", "CHAOS", "GHOST", "SILK", "UNBORN", "SOLO", "RAW",
];

/// Deterministic xorshift32 generator.
#[derive(Debug, Clone)]
struct Rng32 {
    state: u32,
}

impl Rng32 {
    /// Seeds go through a splitmix64 finalizer so nearby seeds diverge.
    fn from_seed(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        let folded = (z ^ (z >> 32)) as u32;
        Self { state: folded | 1 }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        let index = (self.next_f32() * items.len() as f32) as usize;
        &items[index.min(items.len() - 1)]
    }
}

/// Generates settings from the defaults and a seed.
pub fn surprise(seed: u64) -> RenderSettings {
    surprise_from(&RenderSettings::default(), seed)
}

/// Generates settings from `base` and a seed.
///
/// Only the fields the generator owns change; background, aura mode and the
/// dual aura colors are kept from `base`.
pub fn surprise_from(base: &RenderSettings, seed: u64) -> RenderSettings {
    let mut rng = Rng32::from_seed(seed);

    let color = rng.pick(&SURPRISE_COLORS).to_string();
    let text = rng.pick(&SURPRISE_TEXTS).to_string();
    let font_style = *rng.pick(&FontStyle::ALL);

    let (font_size, letter_spacing, text_transform) = match font_style {
        FontStyle::WildShade | FontStyle::WildMetal => {
            let spacing = rng.range(-2.0, 6.0);
            let size = rng.range(120.0, 180.0);
            (size, spacing, TextTransform::Uppercase)
        }
        FontStyle::LuxeMonsieur | FontStyle::LuxePinyon => {
            (rng.range(70.0, 120.0), 0.0, TextTransform::None)
        }
        FontStyle::RawReenie | FontStyle::RawJustHand => {
            let size = rng.range(60.0, 100.0);
            let spacing = rng.range(2.0, 7.0);
            (size, spacing, TextTransform::None)
        }
        _ => (rng.range(80.0, 200.0), 0.0, TextTransform::None),
    };

    let intensity = rng.range(60.0, 180.0);
    let aura_size = rng.range(40.0, 140.0);
    let position = if rng.next_f32() > 0.5 {
        TextPosition::Center
    } else {
        *rng.pick(&[TextPosition::BottomLeft, TextPosition::TopRight])
    };

    tracing::debug!(seed, font = font_style.identifier(), %text, "generated surprise settings");

    RenderSettings {
        text,
        color,
        font_size: font_size.floor() as u32,
        font_style,
        position,
        intensity,
        aura_size,
        text_transform,
        letter_spacing: (letter_spacing * 10.0).round() / 10.0,
        ..base.clone()
    }
}
