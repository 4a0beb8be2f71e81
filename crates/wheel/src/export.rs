use std::path::Path;

use cairo::ImageSurface;
use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG error: {0}")]
    Png(#[from] cairo::IoError),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}

pub fn write_png(surface: &ImageSurface, path: &Path) -> Result<(), ExportError> {
    let mut file = fs_err::File::create(path)?;
    surface.write_to_png(&mut file)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

/// Mono 32-bit float WAV.
pub fn write_wav(samples: &[f32], sample_rate: u32, path: &Path) -> Result<(), ExportError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    log::info!(
        "Wrote {} ({:.2}s of audio)",
        path.display(),
        samples.len() as f64 / f64::from(sample_rate)
    );
    Ok(())
}
