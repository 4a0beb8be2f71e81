use derive_more::Display;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::graph::AudioVoice;
use crate::error::AudioError;

pub const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;
const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<f64> = 8_000.0..=192_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("voice#{_0}")]
pub struct VoiceId(u64);

/// Mono render graph with its own sample clock.
///
/// Time only moves when [`AudioContext::render`] is called; voices scheduled "now"
/// start at the first frame of the next render.
#[derive(Debug)]
pub struct AudioContext {
    sample_rate: f64,
    frame: u64,
    next_id: u64,
    voices: Vec<(VoiceId, AudioVoice)>,
    noise_rng: ChaCha8Rng,
}

impl AudioContext {
    pub fn new(sample_rate: f64) -> Result<Self, AudioError> {
        Self::with_noise_rng(sample_rate, ChaCha8Rng::from_rng(&mut rand::rng()))
    }

    /// Context whose noise buffers are reproducible.
    pub fn with_seed(sample_rate: f64, seed: u64) -> Result<Self, AudioError> {
        Self::with_noise_rng(sample_rate, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_noise_rng(sample_rate: f64, noise_rng: ChaCha8Rng) -> Result<Self, AudioError> {
        if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        log::debug!("Audio context ready at {} Hz", sample_rate);
        Ok(Self {
            sample_rate,
            frame: 0,
            next_id: 0,
            voices: Vec::new(),
            noise_rng,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Seconds elapsed on the sample clock.
    pub fn current_time(&self) -> f64 {
        self.frame as f64 / self.sample_rate
    }

    pub fn noise_rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.noise_rng
    }

    pub fn schedule(&mut self, voice: AudioVoice) -> VoiceId {
        let id = VoiceId(self.next_id);
        self.next_id += 1;
        self.voices.push((id, voice));
        id
    }

    pub fn voice_mut(&mut self, id: VoiceId) -> Option<&mut AudioVoice> {
        self.voices
            .iter_mut()
            .find(|(voice_id, _)| *voice_id == id)
            .map(|(_, voice)| voice)
    }

    pub fn contains(&self, id: VoiceId) -> bool {
        self.voices.iter().any(|(voice_id, _)| *voice_id == id)
    }

    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    /// Renders the next `output.len()` frames and advances the clock.
    pub fn render(&mut self, output: &mut [f32]) {
        output.fill(0.0);
        let start = self.current_time();
        for (_, voice) in &mut self.voices {
            voice.process(output, start, self.sample_rate);
        }
        self.frame += output.len() as u64;

        let now = self.current_time();
        self.voices.retain(|(id, voice)| {
            let keep = !voice.is_finished(now);
            if !keep {
                log::trace!("Dropping finished {}", id);
            }
            keep
        });
    }
}
