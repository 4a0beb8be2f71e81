use super::ELLIPSIS;
use super::geometry::RenderConfig;
use crate::error::MeasureError;
use crate::participant::normalize_name;

const MIN_KEPT_CHARS: usize = 3;
const WORD_BREAK_FRACTION: f64 = 0.4;
const SHRINK_FACTOR: f64 = 0.9;
const MAX_SHRINK_PASSES: usize = 2;
const OVERFLOW_SLACK: f64 = 1.1;

/// Width of a run of text in the current font, in the same units as `RenderConfig`.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Result<f64, MeasureError>;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> Result<f64, MeasureError>,
{
    fn measure(&self, text: &str) -> Result<f64, MeasureError> {
        self(text)
    }
}

/// Fits a label into `max_text_width_px`, cutting with an ellipsis when it is too wide.
/// Returns `None` for text that is empty after normalization.
pub fn fit_label<M: TextMeasure + ?Sized>(
    text: &str,
    config: &RenderConfig,
    measure: &M,
) -> Result<Option<String>, MeasureError> {
    let text = normalize_name(text);
    if text.is_empty() {
        return Ok(None);
    }

    let available = config.max_text_width_px;
    let width = measure.measure(&text)?;
    if width <= available {
        return Ok(Some(text));
    }

    let chars: Vec<char> = text.chars().collect();
    let average = width / chars.len() as f64;
    if average <= 0.0 {
        return Ok(Some(text));
    }

    let mut max_chars = (available * config.char_width_factor / average).floor() as usize;
    if max_chars <= MIN_KEPT_CHARS || chars.len() <= max_chars {
        return Ok(Some(text));
    }

    let mut fitted = cut_at_word(&chars, max_chars);
    for _ in 0..MAX_SHRINK_PASSES {
        if measure.measure(&fitted)? <= available * OVERFLOW_SLACK {
            break;
        }
        let shorter = (max_chars as f64 * SHRINK_FACTOR).floor() as usize;
        if shorter <= MIN_KEPT_CHARS {
            break;
        }
        max_chars = shorter;
        fitted = cut_hard(&chars, max_chars);
    }

    Ok(Some(fitted))
}

/// Prefers the last interior space when it sits past 40% of the allowed length.
fn cut_at_word(chars: &[char], max_chars: usize) -> String {
    let head = &chars[..max_chars];
    match head.iter().rposition(|c| *c == ' ') {
        Some(space)
            if space as f64 > max_chars as f64 * WORD_BREAK_FRACTION && space > MIN_KEPT_CHARS =>
        {
            cut_hard(head, space)
        }
        _ => cut_hard(head, max_chars),
    }
}

fn cut_hard(chars: &[char], len: usize) -> String {
    let mut out: String = chars[..len].iter().collect();
    out.push_str(ELLIPSIS);
    out
}
