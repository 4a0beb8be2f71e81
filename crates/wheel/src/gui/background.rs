use std::path::Path;

use cairo::{Context, ImageSurface};

use super::RenderError;

/// Optional photo painted inside the wheel face.
#[derive(Debug)]
pub enum Background {
    /// Not decoded yet; the layer is skipped.
    Pending,
    Ready(ImageSurface),
}

impl Background {
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let mut file = fs_err::File::open(path)?;
        let surface = ImageSurface::create_from_png(&mut file)?;
        log::debug!(
            "Loaded background {} ({}x{})",
            path.display(),
            surface.width(),
            surface.height()
        );
        Ok(Self::Ready(surface))
    }

    /// A failed load leaves the wheel without a background instead of failing the frame.
    pub fn load_or_pending(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Background image skipped: {}", e);
            Self::Pending
        })
    }

    pub fn surface(&self) -> Option<&ImageSurface> {
        match self {
            Self::Ready(surface) => Some(surface),
            Self::Pending => None,
        }
    }

    /// Paints the image scaled to cover the circle, clipped to it.
    pub fn paint(&self, cr: &Context, center: f64, radius: f64) -> Result<(), RenderError> {
        let Some(image) = self.surface() else {
            return Ok(());
        };
        let (w, h) = (f64::from(image.width()), f64::from(image.height()));
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }

        let diameter = radius * 2.0;
        let scale = (diameter / w).max(diameter / h);

        cr.save()?;
        cr.arc(center, center, radius, 0.0, std::f64::consts::TAU);
        cr.clip();
        cr.translate(center - w * scale / 2.0, center - h * scale / 2.0);
        cr.scale(scale, scale);
        cr.set_source_surface(image, 0.0, 0.0)?;
        cr.paint()?;
        cr.restore()?;
        Ok(())
    }
}
