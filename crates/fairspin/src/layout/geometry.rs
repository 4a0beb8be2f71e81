use super::display::{DisplaySet, compute_display_set};
use super::{DEFAULT_TEXT_COLOR, MAX_DIVIDER_COUNT, MIN_FONT_SIZE, SPINNING_DIVIDER_LIMIT};
use crate::participant::Participant;
use palette::Srgb;
use std::f64::consts::PI;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow {
    pub offset: f64,
    pub alpha: f64,
}

impl TextShadow {
    pub const FULL: Self = Self {
        offset: 2.0,
        alpha: 0.8,
    };
    pub const LIGHT: Self = Self {
        offset: 1.0,
        alpha: 0.6,
    };
}

/// Per-frame label geometry. Derived from the display count and wheel radius, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub radius_px: f64,
    pub font_size_px: f64,
    pub text_radius_px: f64,
    pub text_color: Srgb<u8>,
    pub max_text_width_px: f64,
    pub char_width_factor: f64,
    pub show_dividers: bool,
    pub shadow: TextShadow,
}

impl RenderConfig {
    pub fn with_text_color(mut self, color: Srgb<u8>) -> Self {
        self.text_color = color;
        self
    }
}

pub fn default_text_color() -> Srgb<u8> {
    Srgb::from_str(DEFAULT_TEXT_COLOR).unwrap_or(Srgb::new(0x33, 0x33, 0x33))
}

struct DensityTier {
    above: usize,
    font_min: f64,
    font_max: f64,
    font_divisor: f64,
    radius_factor: f64,
}

const fn tier(above: usize, font: (f64, f64, f64), radius_factor: f64) -> DensityTier {
    DensityTier {
        above,
        font_min: font.0,
        font_max: font.1,
        font_divisor: font.2,
        radius_factor,
    }
}

// Ordered densest first; the first tier whose `above` is exceeded applies.
const DENSITY_TIERS: [DensityTier; 9] = [
    tier(2000, (9.0, 13.0, 55.0), 0.76),
    tier(1000, (10.0, 14.0, 50.0), 0.75),
    tier(700, (11.0, 15.0, 45.0), 0.76),
    tier(500, (12.0, 16.0, 40.0), 0.74),
    tier(200, (13.0, 17.0, 35.0), 0.72),
    tier(100, (15.0, 19.0, 30.0), 0.70),
    tier(50, (17.0, 21.0, 24.0), 0.68),
    tier(20, (19.0, 23.0, 18.0), 0.65),
    tier(0, (21.0, 26.0, 14.0), 0.62),
];

fn density_tier(display_count: usize) -> &'static DensityTier {
    DENSITY_TIERS
        .iter()
        .find(|t| display_count > t.above)
        .unwrap_or(&DENSITY_TIERS[DENSITY_TIERS.len() - 1])
}

fn width_factor(display_count: usize) -> f64 {
    match display_count {
        n if n > 1000 => 0.55,
        n if n > 500 => 0.60,
        n if n > 200 => 0.65,
        n if n > 100 => 0.70,
        n if n > 50 => 0.75,
        _ => 0.80,
    }
}

fn spacing_offset(display_count: usize) -> f64 {
    match display_count {
        n if n > 500 => 2.0,
        n if n > 200 => 3.0,
        _ => 4.0,
    }
}

/// Pure function of its inputs, so identical calls yield identical configs.
pub fn compute_geometry(display_count: usize, canvas_radius: f64, is_spinning: bool) -> RenderConfig {
    let dense = display_count > 500;
    let tier = density_tier(display_count);

    let font_size = (canvas_radius / tier.font_divisor)
        .min(tier.font_max)
        .max(tier.font_min)
        .max(MIN_FONT_SIZE);

    // keep glyphs and their shadow clear of the rim
    let shadow_offset = if dense { 3.0 } else { 4.0 };
    let base_margin = if dense { 12.0 } else { 15.0 };
    let safe_margin = (font_size * 1.5 + shadow_offset + base_margin).max(if dense { 20.0 } else { 25.0 });
    let min_radius_factor = if dense { 0.4 } else { 0.45 };

    let text_radius = (canvas_radius * tier.radius_factor)
        .min(canvas_radius - safe_margin)
        .max(canvas_radius * min_radius_factor);

    let angle_per_item = if display_count == 0 {
        2.0 * PI
    } else {
        2.0 * PI / display_count as f64
    };
    let arc_length = text_radius * angle_per_item;
    let radial_multiplier = if dense { 0.65 } else { 0.70 };
    let threshold = if dense { 0.95 } else { 1.0 };
    let max_text_width =
        (arc_length * width_factor(display_count)).min(text_radius * radial_multiplier) * threshold;

    let show_dividers = display_count <= MAX_DIVIDER_COUNT
        && !(is_spinning && display_count > SPINNING_DIVIDER_LIMIT);

    let shadow = if is_spinning && display_count > SPINNING_DIVIDER_LIMIT {
        TextShadow::LIGHT
    } else {
        TextShadow::FULL
    };

    RenderConfig {
        radius_px: canvas_radius,
        font_size_px: font_size,
        text_radius_px: text_radius + spacing_offset(display_count),
        text_color: default_text_color(),
        max_text_width_px: max_text_width,
        char_width_factor: if dense { 0.85 } else { 0.90 },
        show_dividers,
        shadow,
    }
}

/// The layout engine with the persisted display settings bound in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    pub text_color: Srgb<u8>,
    pub max_display_cap: Option<usize>,
}

impl Default for LabelLayout {
    fn default() -> Self {
        Self {
            text_color: default_text_color(),
            max_display_cap: None,
        }
    }
}

impl LabelLayout {
    pub fn new(text_color: Srgb<u8>, max_display_cap: Option<usize>) -> Self {
        Self {
            text_color,
            max_display_cap,
        }
    }

    pub fn compute_display_set(&self, participants: &[Participant], is_spinning: bool) -> DisplaySet {
        compute_display_set(participants, self.max_display_cap, is_spinning)
    }

    pub fn compute_geometry(&self, display_count: usize, canvas_radius: f64, is_spinning: bool) -> RenderConfig {
        compute_geometry(display_count, canvas_radius, is_spinning).with_text_color(self.text_color)
    }
}
