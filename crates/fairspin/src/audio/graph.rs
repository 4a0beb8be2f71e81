//! Sources, layers and voices: the pieces the spin and win sounds are built from.
//!
//! A [`Layer`] is one source run through one filter and one automated gain, active
//! inside a `[start, stop)` window on the context clock. A [`AudioVoice`] mixes
//! any number of layers.

use std::f64::consts::TAU;

use rand::Rng;
use strum::Display;

use super::filter::{Biquad, FilterSpec};
use super::param::Param;

/// Gain a released layer decays to before it is stopped.
pub const SILENCE: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
}

impl Waveform {
    #[inline]
    fn sample(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Source {
    Oscillator {
        waveform: Waveform,
        frequency: Param,
        phase: f64,
    },
    Noise {
        buffer: Vec<f32>,
        position: usize,
        looping: bool,
    },
}

impl Source {
    pub fn oscillator(waveform: Waveform, frequency: Param) -> Self {
        Source::Oscillator {
            waveform,
            frequency,
            phase: 0.0,
        }
    }

    /// White noise of the given length and peak amplitude.
    pub fn noise<R: Rng>(
        rng: &mut R,
        seconds: f64,
        amplitude: f32,
        sample_rate: f64,
        looping: bool,
    ) -> Self {
        let len = (seconds * sample_rate).round().max(1.0) as usize;
        let buffer = (0..len)
            .map(|_| rng.random_range(-amplitude..=amplitude))
            .collect();
        Source::Noise {
            buffer,
            position: 0,
            looping,
        }
    }

    fn next(&mut self, time: f64, sample_rate: f64) -> f64 {
        match self {
            Source::Oscillator {
                waveform,
                frequency,
                phase,
            } => {
                let out = waveform.sample(*phase);
                *phase = (*phase + frequency.value_at(time) / sample_rate).fract();
                out
            }
            Source::Noise {
                buffer,
                position,
                looping,
            } => {
                if *position >= buffer.len() {
                    if !*looping || buffer.is_empty() {
                        return 0.0;
                    }
                    *position = 0;
                }
                let out = buffer[*position];
                *position += 1;
                f64::from(out)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Layer {
    source: Source,
    filter: Biquad,
    gain: Param,
    start: f64,
    stop: f64,
}

impl Layer {
    pub fn new(
        source: Source,
        filter: FilterSpec,
        gain: Param,
        start: f64,
        stop: f64,
        sample_rate: f64,
    ) -> Self {
        Self {
            source,
            filter: Biquad::new(filter, sample_rate),
            gain,
            start,
            stop,
        }
    }

    pub fn gain(&self) -> &Param {
        &self.gain
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn is_active(&self, time: f64) -> bool {
        time >= self.start && time < self.stop
    }

    fn sample(&mut self, time: f64, sample_rate: f64) -> f64 {
        if !self.is_active(time) {
            return 0.0;
        }
        let raw = self.source.next(time, sample_rate);
        self.filter.process(raw) * self.gain.value_at(time)
    }

    fn release(&mut self, now: f64, window: f64) {
        let end = now + window;
        self.gain.cancel_and_hold(now).exponential_ramp_to(SILENCE, end);
        self.stop = self.stop.min(end);
    }
}

#[derive(Debug, Clone, Default)]
pub struct AudioVoice {
    layers: Vec<Layer>,
}

impl AudioVoice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mixes this voice into `output`, whose first frame sits at `start_time`.
    pub fn process(&mut self, output: &mut [f32], start_time: f64, sample_rate: f64) {
        for (i, frame) in output.iter_mut().enumerate() {
            let time = start_time + i as f64 / sample_rate;
            let mixed: f64 = self
                .layers
                .iter_mut()
                .map(|layer| layer.sample(time, sample_rate))
                .sum();
            *frame += mixed as f32;
        }
    }

    /// Ramps every layer toward silence over `window` seconds and stops them there.
    pub fn release(&mut self, now: f64, window: f64) {
        for layer in &mut self.layers {
            layer.release(now, window);
        }
    }

    pub fn end_time(&self) -> f64 {
        self.layers.iter().map(Layer::stop).fold(0.0, f64::max)
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.layers.iter().all(|layer| layer.stop <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const RATE: f64 = 8_000.0;

    fn tone(start: f64, stop: f64) -> Layer {
        let mut gain = Param::new(0.0);
        gain.set_value_at(0.5, start);
        Layer::new(
            Source::oscillator(Waveform::Sine, Param::new(200.0)),
            FilterSpec::lowpass(2_000.0, 0.7),
            gain,
            start,
            stop,
            RATE,
        )
    }

    #[test]
    fn test_triangle_shape() {
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.25), 0.0);
    }

    #[test]
    fn test_layer_silent_outside_window() {
        let mut voice = AudioVoice::new();
        voice.push(tone(0.5, 1.0));

        let mut before = vec![0.0f32; 400];
        voice.process(&mut before, 0.0, RATE);
        assert!(before.iter().all(|s| *s == 0.0));

        let mut during = vec![0.0f32; 400];
        voice.process(&mut during, 0.5, RATE);
        assert!(during.iter().any(|s| s.abs() > 0.1));

        let mut after = vec![0.0f32; 400];
        voice.process(&mut after, 1.0, RATE);
        assert!(after.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_release_shortens_voice() {
        let mut voice = AudioVoice::new();
        voice.push(tone(0.0, 7.0));
        voice.push(tone(0.0, 7.0));
        assert_eq!(voice.end_time(), 7.0);

        voice.release(2.0, 0.3);
        assert!((voice.end_time() - 2.3).abs() < 1e-12);
        assert!(!voice.is_finished(2.2));
        assert!(voice.is_finished(2.3));
        for layer in voice.layers() {
            assert!((layer.gain().value_at(2.3) - SILENCE).abs() < 1e-12);
        }
    }

    #[test]
    fn test_one_shot_noise_runs_out() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut source = Source::noise(&mut rng, 0.01, 0.3, RATE, false);
        let samples: Vec<f64> = (0..160).map(|i| source.next(i as f64 / RATE, RATE)).collect();
        assert!(samples[..80].iter().all(|s| s.abs() <= 0.3));
        assert!(samples[80..].iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_looping_noise_repeats() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut source = Source::noise(&mut rng, 0.01, 0.5, RATE, true);
        let samples: Vec<f64> = (0..160).map(|i| source.next(i as f64 / RATE, RATE)).collect();
        assert_eq!(samples[..80], samples[80..]);
    }
}
