use cairo::Context;
use palette::{Srgb, Srgba};

/// Fixed chrome colours of the wheel. Label colour comes from the render config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelColors {
    pub face: Srgba<f64>,
    pub rim: Srgba<f64>,
    pub divider: Srgba<f64>,
    pub hub: Srgba<f64>,
    pub hub_stroke: Srgba<f64>,
    pub outer_ring: Srgba<f64>,
    pub gold_ring: Srgba<f64>,
    pub shadow: Srgba<f64>,
    pub placeholder: Srgba<f64>,
    pub placeholder_stroke: Srgba<f64>,
    pub placeholder_text: Srgba<f64>,
}

fn rgb(red: u8, green: u8, blue: u8, alpha: f64) -> Srgba<f64> {
    let c: Srgb<f64> = Srgb::new(red, green, blue).into_format();
    Srgba::new(c.red, c.green, c.blue, alpha)
}

impl Default for WheelColors {
    fn default() -> Self {
        Self {
            face: rgb(0xff, 0xff, 0xff, 1.0),
            rim: rgb(0xe0, 0xe0, 0xe0, 1.0),
            divider: rgb(200, 200, 200, 0.15),
            hub: rgb(0xff, 0xff, 0xff, 1.0),
            hub_stroke: rgb(0xde, 0xe2, 0xe6, 1.0),
            outer_ring: rgb(0x49, 0x50, 0x57, 1.0),
            gold_ring: rgb(0xff, 0xd7, 0x00, 1.0),
            shadow: rgb(0, 0, 0, 1.0),
            placeholder: rgb(0xf8, 0xf9, 0xfa, 1.0),
            placeholder_stroke: rgb(0xde, 0xe2, 0xe6, 1.0),
            placeholder_text: rgb(0x6c, 0x75, 0x7d, 1.0),
        }
    }
}

pub fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

pub fn set_source_u8(cr: &Context, color: Srgb<u8>, alpha: f64) {
    set_source(cr, rgb(color.red, color.green, color.blue, alpha));
}
