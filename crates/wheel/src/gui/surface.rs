use cairo::{Context, Format, ImageSurface};

use super::RenderError;

/// Backing surface sized to the canvas times the device pixel ratio.
/// Only reallocated when that pixel size changes.
#[derive(Debug, Default)]
pub struct DprSurface {
    surface: Option<ImageSurface>,
    pixel_size: i32,
    allocations: u32,
}

impl DprSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pixel_size(logical_size: f64, dpr: f64) -> i32 {
        (logical_size * dpr.max(0.1)).round().max(1.0) as i32
    }

    /// Returns a context scaled to logical units, cleared to transparent.
    pub fn context(&mut self, logical_size: f64, dpr: f64) -> Result<Context, RenderError> {
        let size = Self::pixel_size(logical_size, dpr);
        let surface = match &self.surface {
            Some(surface) if self.pixel_size == size => surface.clone(),
            _ => {
                let surface = ImageSurface::create(Format::ARgb32, size, size)
                    .map_err(|e| RenderError::SurfaceUnavailable(e.to_string()))?;
                log::debug!("Allocated {}x{} surface (dpr {})", size, size, dpr);
                self.allocations += 1;
                self.pixel_size = size;
                self.surface = Some(surface.clone());
                surface
            }
        };

        let cr = Context::new(&surface)?;
        cr.set_operator(cairo::Operator::Clear);
        cr.paint()?;
        cr.set_operator(cairo::Operator::Over);
        cr.scale(size as f64 / logical_size, size as f64 / logical_size);
        Ok(cr)
    }

    pub fn surface(&self) -> Option<&ImageSurface> {
        self.surface.as_ref()
    }

    pub fn allocations(&self) -> u32 {
        self.allocations
    }
}
