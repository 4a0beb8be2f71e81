use fairspin::MeasureError;
use thiserror::Error;

pub mod background;
pub mod sink;
pub mod surface;
pub mod text;
pub mod theme;
pub mod view;

pub use background::Background;
pub use sink::CanvasSink;
pub use surface::DprSurface;
pub use theme::WheelColors;
pub use view::{Scene, WheelRenderer};

pub const FONT_FAMILY: &str = "Sans";
pub const HUB_RADIUS_FACTOR: f64 = 0.15;
pub const RIM_WIDTH: f64 = 2.0;
pub const HUB_STROKE_WIDTH: f64 = 2.0;
pub const DIVIDER_WIDTH: f64 = 0.5;
pub const OUTER_RING_OFFSET: f64 = 5.0;
pub const OUTER_RING_WIDTH: f64 = 6.0;
pub const GOLD_RING_OFFSET: f64 = 8.0;
pub const GOLD_RING_WIDTH: f64 = 2.0;

pub const PLACEHOLDER_TEXT: &str = "Add participants to start";
pub const PLACEHOLDER_FONT_SIZE: f64 = 24.0;
pub const PLACEHOLDER_BORDER_WIDTH: f64 = 3.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error(transparent)]
    Measure(#[from] MeasureError),
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),
    #[error("Image error: {0}")]
    Image(#[from] cairo::IoError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
