use cairo::Context;
use fairspin::MeasureError;
use fairspin::layout::TextMeasure;
use pangocairo::pango::{self, FontDescription, Layout, Weight};

use super::FONT_FAMILY;

/// A bold label layout bound to `cr`. Pango resolves the base direction from the text,
/// so right-to-left names are shaped and ordered the way they read.
pub fn label_layout(cr: &Context, font_size: f64) -> Layout {
    let layout = pangocairo::functions::create_layout(cr);
    let mut font = FontDescription::new();
    font.set_family(FONT_FAMILY);
    font.set_weight(Weight::Bold);
    font.set_absolute_size(font_size * f64::from(pango::SCALE));
    layout.set_font_description(Some(&font));
    layout
}

/// Measures shaped text with whatever font the layout carries. Overwrites its text.
pub struct PangoMeasure<'a>(pub &'a Layout);

impl TextMeasure for PangoMeasure<'_> {
    fn measure(&self, text: &str) -> Result<f64, MeasureError> {
        self.0.set_text(text);
        let (_, logical) = self.0.pixel_extents();
        Ok(f64::from(logical.width()))
    }
}
