use std::f64::consts::TAU;

use cairo::Context;
use fairspin::WheelState;
use fairspin::layout::{DisplaySet, RenderConfig, fit_label};
use palette::WithAlpha;
use pangocairo::pango::Layout;

use super::background::Background;
use super::text::{PangoMeasure, label_layout};
use super::theme::{WheelColors, set_source, set_source_u8};
use super::{
    DIVIDER_WIDTH, GOLD_RING_OFFSET, GOLD_RING_WIDTH, HUB_RADIUS_FACTOR,
    HUB_STROKE_WIDTH, OUTER_RING_OFFSET, OUTER_RING_WIDTH, PLACEHOLDER_BORDER_WIDTH,
    PLACEHOLDER_FONT_SIZE, PLACEHOLDER_TEXT, RIM_WIDTH, RenderError,
};

/// Everything one frame is drawn from.
pub struct Scene<'a> {
    pub state: &'a WheelState,
    pub display: &'a DisplaySet,
    pub config: &'a RenderConfig,
    pub background: Option<&'a Background>,
}

#[derive(Debug, Default, Clone)]
pub struct WheelRenderer {
    colors: WheelColors,
}

impl WheelRenderer {
    pub fn new(colors: WheelColors) -> Self {
        Self { colors }
    }

    /// Draws the wheel centred in a `canvas_size` square of logical units.
    pub fn render(&self, cr: &Context, canvas_size: f64, scene: &Scene) -> Result<(), RenderError> {
        let center = canvas_size / 2.0;
        let radius = scene.config.radius_px;

        if scene.state.is_empty() {
            return self.draw_placeholder(cr, center, radius);
        }

        self.draw_face(cr, center, radius)?;
        if let Some(background) = scene.background {
            background.paint(cr, center, radius)?;
        }

        let rotation = scene.state.rotation_degrees.to_radians();
        if scene.config.show_dividers {
            self.draw_dividers(cr, center, rotation, scene)?;
        }
        self.draw_labels(cr, center, rotation, scene)?;
        self.draw_chrome(cr, center, radius)
    }

    fn draw_placeholder(&self, cr: &Context, center: f64, radius: f64) -> Result<(), RenderError> {
        cr.arc(center, center, radius, 0.0, TAU);
        set_source(cr, self.colors.placeholder);
        cr.fill_preserve()?;
        set_source(cr, self.colors.placeholder_stroke);
        cr.set_line_width(PLACEHOLDER_BORDER_WIDTH);
        cr.stroke()?;

        let layout = label_layout(cr, PLACEHOLDER_FONT_SIZE);
        layout.set_text(PLACEHOLDER_TEXT);
        let (ink, _) = layout.pixel_extents();
        set_source(cr, self.colors.placeholder_text);
        cr.move_to(
            center - f64::from(ink.width()) / 2.0 - f64::from(ink.x()),
            center - f64::from(ink.height()) / 2.0 - f64::from(ink.y()),
        );
        pangocairo::functions::show_layout(cr, &layout);
        Ok(cr.status()?)
    }

    fn draw_face(&self, cr: &Context, center: f64, radius: f64) -> Result<(), RenderError> {
        cr.arc(center, center, radius, 0.0, TAU);
        set_source(cr, self.colors.face);
        cr.fill_preserve()?;
        set_source(cr, self.colors.rim);
        cr.set_line_width(RIM_WIDTH);
        cr.stroke()?;
        Ok(())
    }

    fn draw_dividers(
        &self,
        cr: &Context,
        center: f64,
        rotation: f64,
        scene: &Scene,
    ) -> Result<(), RenderError> {
        let radius = scene.config.radius_px;
        for slot in 0..scene.display.len() {
            let angle = rotation + slot as f64 * scene.display.angle_per_item;
            cr.move_to(center, center);
            cr.line_to(center + angle.cos() * radius, center + angle.sin() * radius);
        }
        set_source(cr, self.colors.divider);
        cr.set_line_width(DIVIDER_WIDTH);
        cr.stroke()?;
        Ok(())
    }

    fn draw_labels(
        &self,
        cr: &Context,
        center: f64,
        rotation: f64,
        scene: &Scene,
    ) -> Result<(), RenderError> {
        let config = scene.config;
        let layout = label_layout(cr, config.font_size_px);
        let measure = PangoMeasure(&layout);

        for (slot, item) in scene.display.iter().enumerate() {
            let text = match fit_label(&item.text, config, &measure) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Label #{} skipped: {}", item.participant_index, e);
                    continue;
                }
            };
            layout.set_text(&text);

            cr.save()?;
            cr.translate(center, center);
            cr.rotate(rotation + scene.display.mid_angle(slot));
            let drawn = self.draw_label(cr, &layout, config);
            cr.restore()?;
            if let Err(e) = drawn {
                log::warn!("Label #{} skipped: {}", item.participant_index, e);
            }
        }
        Ok(())
    }

    /// Draws `layout` with its shadow, ink box centred on (text_radius, 0) of the current frame.
    fn draw_label(&self, cr: &Context, layout: &Layout, config: &RenderConfig) -> Result<(), RenderError> {
        pangocairo::functions::update_layout(cr, layout);
        let (ink, _) = layout.pixel_extents();
        let x = config.text_radius_px - f64::from(ink.width()) / 2.0 - f64::from(ink.x());
        let y = -f64::from(ink.height()) / 2.0 - f64::from(ink.y());

        let shadow = config.shadow;
        set_source(cr, self.colors.shadow.with_alpha(shadow.alpha));
        cr.move_to(x + shadow.offset, y + shadow.offset);
        pangocairo::functions::show_layout(cr, layout);

        set_source_u8(cr, config.text_color, 1.0);
        cr.move_to(x, y);
        pangocairo::functions::show_layout(cr, layout);
        Ok(cr.status()?)
    }

    fn draw_chrome(&self, cr: &Context, center: f64, radius: f64) -> Result<(), RenderError> {
        // label drawing leaves a current point behind
        cr.new_path();
        cr.arc(center, center, radius * HUB_RADIUS_FACTOR, 0.0, TAU);
        set_source(cr, self.colors.hub);
        cr.fill_preserve()?;
        set_source(cr, self.colors.hub_stroke);
        cr.set_line_width(HUB_STROKE_WIDTH);
        cr.stroke()?;

        for (offset, width, color) in [
            (OUTER_RING_OFFSET, OUTER_RING_WIDTH, self.colors.outer_ring),
            (GOLD_RING_OFFSET, GOLD_RING_WIDTH, self.colors.gold_ring),
        ] {
            cr.new_sub_path();
            cr.arc(center, center, radius + offset, 0.0, TAU);
            set_source(cr, color);
            cr.set_line_width(width);
            cr.stroke()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use cairo::{Format, ImageSurface};
    use fairspin::Participant;
    use fairspin::layout::{LabelLayout, canvas_diameter, wheel_radius};

    fn pool(n: usize) -> WheelState {
        WheelState::new((0..n).map(|i| Participant::new(format!("Guest {i}"))).collect())
    }

    fn draw(state: &WheelState, spinning: bool) -> (ImageSurface, f64, f64) {
        let size = canvas_diameter(state.len());
        let surface = ImageSurface::create(Format::ARgb32, size as i32, size as i32).unwrap();
        let cr = Context::new(&surface).unwrap();
        let radius = draw_on(&cr, state, spinning);
        drop(cr);
        (surface, size / 2.0, radius)
    }

    fn draw_on(cr: &Context, state: &WheelState, spinning: bool) -> f64 {
        let layout = LabelLayout::default();
        let display = layout.compute_display_set(&state.participants, spinning);
        let radius = wheel_radius(state.len());
        let config = layout.compute_geometry(display.len(), radius, spinning);
        let scene = Scene {
            state,
            display: &display,
            config: &config,
            background: Some(&Background::Pending),
        };
        WheelRenderer::default()
            .render(cr, canvas_diameter(state.len()), &scene)
            .unwrap();
        radius
    }

    fn pixel(surface: &mut ImageSurface, x: f64, y: f64) -> (u8, u8, u8, u8) {
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let at = y as usize * stride + x as usize * 4;
        // native-endian ARGB32 on little-endian: b, g, r, a
        (data[at + 2], data[at + 1], data[at], data[at + 3])
    }

    fn assert_rgb(actual: (u8, u8, u8, u8), expected: (u8, u8, u8)) {
        let close = |a: u8, b: u8| a.abs_diff(b) <= 3;
        assert!(
            close(actual.0, expected.0) && close(actual.1, expected.1) && close(actual.2, expected.2),
            "{:?} != {:?}",
            actual,
            expected
        );
        assert_eq!(actual.3, 0xff);
    }

    #[test]
    fn test_empty_pool_draws_placeholder() {
        let (mut surface, center, radius) = draw(&pool(0), false);
        assert_rgb(pixel(&mut surface, center, center + radius * 0.6), (0xf8, 0xf9, 0xfa));
        // nothing outside the disc
        assert_eq!(pixel(&mut surface, 2.0, 2.0).3, 0);
    }

    #[test]
    fn test_chrome_rings_and_hub() {
        let (mut surface, center, radius) = draw(&pool(12), false);
        assert_rgb(pixel(&mut surface, center, center), (0xff, 0xff, 0xff));
        assert_rgb(
            pixel(&mut surface, center, center - radius - OUTER_RING_OFFSET),
            (0x49, 0x50, 0x57),
        );
        assert_rgb(
            pixel(&mut surface, center, center - radius - GOLD_RING_OFFSET),
            (0xff, 0xd7, 0x00),
        );
    }

    #[test]
    fn test_huge_spinning_pool_renders() {
        let (mut surface, center, _) = draw(&pool(3000), true);
        assert_rgb(pixel(&mut surface, center, center), (0xff, 0xff, 0xff));
    }

    #[test]
    fn test_huge_spinning_pool_fits_frame_budget() {
        let state = pool(3000);
        let size = canvas_diameter(state.len());
        let surface = ImageSurface::create(Format::ARgb32, size as i32, size as i32).unwrap();
        let cr = Context::new(&surface).unwrap();
        // first frame pays for font discovery
        draw_on(&cr, &state, true);

        let started = Instant::now();
        draw_on(&cr, &state, true);
        let elapsed = started.elapsed();
        assert!(elapsed < Duration::from_millis(250), "frame took {elapsed:?}");
    }

    #[test]
    fn test_hub_ignores_leftover_current_point() {
        let size = 600.0;
        let (center, radius) = (size / 2.0, 250.0);
        let mut surface = ImageSurface::create(Format::ARgb32, size as i32, size as i32).unwrap();
        let start = (center, center + radius * 0.7);
        {
            let cr = Context::new(&surface).unwrap();
            let renderer = WheelRenderer::default();
            renderer.draw_face(&cr, center, radius).unwrap();
            cr.move_to(start.0, start.1);
            renderer.draw_chrome(&cr, center, radius).unwrap();
        }

        // halfway between the dangling point and the hub's 3 o'clock edge
        let hub_edge = (center + radius * HUB_RADIUS_FACTOR, center);
        let mid = ((start.0 + hub_edge.0) / 2.0, (start.1 + hub_edge.1) / 2.0);
        assert_rgb(pixel(&mut surface, mid.0, mid.1), (0xff, 0xff, 0xff));
    }

    #[test]
    fn test_labels_leave_context_state_balanced() {
        let mut state = pool(6);
        state.participants[1] = Participant::new("محمد عبد الله");
        state.rotation_degrees = 37.0;
        let size = canvas_diameter(state.len());
        let surface = ImageSurface::create(Format::ARgb32, size as i32, size as i32).unwrap();
        let cr = Context::new(&surface).unwrap();
        draw_on(&cr, &state, false);

        let matrix = cr.matrix();
        assert_eq!((matrix.xx(), matrix.yx(), matrix.xy(), matrix.yy()), (1.0, 0.0, 0.0, 1.0));
        assert_eq!((matrix.x0(), matrix.y0()), (0.0, 0.0));
        assert!(cr.status().is_ok());
    }

    #[test]
    fn test_blank_label_is_skipped() {
        let mut state = pool(4);
        state.participants[2] = Participant::new("   ");
        let (mut surface, center, _) = draw(&state, false);
        assert_eq!(pixel(&mut surface, center, center).3, 0xff);
    }
}
