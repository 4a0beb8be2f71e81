use std::time::Instant;

use cairo::ImageSurface;
use fairspin::WheelState;
use fairspin::driver::FrameSink;
use fairspin::layout::{DisplaySet, RenderConfig, canvas_diameter};

use super::RenderError;
use super::background::Background;
use super::surface::DprSurface;
use super::view::{Scene, WheelRenderer};

/// Draws every presented frame into an offscreen surface.
pub struct CanvasSink {
    renderer: WheelRenderer,
    surface: DprSurface,
    background: Option<Background>,
    dpr: f64,
    frames: u64,
}

impl CanvasSink {
    pub fn new(renderer: WheelRenderer, background: Option<Background>, dpr: f64) -> Self {
        Self {
            renderer,
            surface: DprSurface::new(),
            background,
            dpr,
            frames: 0,
        }
    }

    /// Surface holding the most recent frame.
    pub fn surface(&self) -> Option<&ImageSurface> {
        self.surface.surface()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for CanvasSink {
    type Error = RenderError;

    fn present(
        &mut self,
        state: &WheelState,
        display: &DisplaySet,
        config: &RenderConfig,
    ) -> Result<(), RenderError> {
        let started = Instant::now();
        let size = canvas_diameter(state.len());
        let cr = self.surface.context(size, self.dpr)?;

        let scene = Scene {
            state,
            display,
            config,
            background: self.background.as_ref(),
        };
        self.renderer.render(&cr, size, &scene)?;
        self.frames += 1;

        log::trace!(
            "Frame {} ({} labels) drawn in {:?}",
            self.frames,
            display.len(),
            started.elapsed()
        );
        Ok(())
    }
}
