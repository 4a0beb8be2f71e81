use std::time::Duration;

pub mod display;
pub mod geometry;
pub mod label;

pub use display::{DisplayItem, DisplaySet, compute_display_set, target_display_count};
pub use geometry::{LabelLayout, RenderConfig, TextShadow, compute_geometry};
pub use label::{TextMeasure, fit_label};

pub const BASE_CANVAS_SIZE: f64 = 600.0;
pub const MIN_FONT_SIZE: f64 = 9.0; // legibility floor at intrinsic scale
pub const MAX_DIVIDER_COUNT: usize = 50;
pub const SPINNING_DIVIDER_LIMIT: usize = 200;
pub const MIN_DISPLAY_COUNT: usize = 2; // room for both endpoints
pub const ELLIPSIS: &str = "...";
pub const DEFAULT_TEXT_COLOR: &str = "#333333";

/// Larger pools get a larger base canvas to offset density.
pub fn canvas_diameter(pool_size: usize) -> f64 {
    match pool_size {
        n if n > 2000 => 1000.0,
        n if n > 1000 => 900.0,
        n if n > 700 => 850.0,
        n if n > 500 => 750.0,
        n if n > 200 => 650.0,
        _ => BASE_CANVAS_SIZE,
    }
}

pub fn wheel_radius(pool_size: usize) -> f64 {
    let margin = if pool_size > 500 { 30.0 } else { 25.0 };
    canvas_diameter(pool_size) / 2.0 - margin
}

/// Debounce hint for hosts that repaint an idle wheel on every data change.
pub fn idle_redraw_delay(pool_size: usize) -> Duration {
    match pool_size {
        n if n > 1000 => Duration::from_millis(50),
        n if n > 500 => Duration::from_millis(30),
        _ => Duration::ZERO,
    }
}
