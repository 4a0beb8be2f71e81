//! The rumble that plays while the wheel turns.

use super::context::AudioContext;
use super::filter::FilterSpec;
use super::graph::{AudioVoice, Layer, SILENCE, Source, Waveform};
use super::param::Param;

/// Length of the spin sound; a little longer than the animation it covers.
pub const SPIN_VOICE_SECONDS: f64 = 7.0;
/// How long [`SpinAudioEngine::stop_spin_voice`](super::SpinAudioEngine::stop_spin_voice) takes to fade out.
pub const SPIN_RELEASE_SECONDS: f64 = 0.3;

struct ToneLayer {
    waveform: Waveform,
    from_hz: f64,
    to_hz: f64,
    filter: FilterSpec,
    gain: f64,
    hold_fraction: f64,
}

const TONES: [ToneLayer; 3] = [
    // low drone
    ToneLayer {
        waveform: Waveform::Sine,
        from_hz: 55.0,
        to_hz: 40.0,
        filter: FilterSpec::lowpass(150.0, 0.5),
        gain: 0.06,
        hold_fraction: 0.85,
    },
    // friction
    ToneLayer {
        waveform: Waveform::Triangle,
        from_hz: 110.0,
        to_hz: 75.0,
        filter: FilterSpec::lowpass(600.0, 1.0),
        gain: 0.02,
        hold_fraction: 0.8,
    },
    // body
    ToneLayer {
        waveform: Waveform::Sine,
        from_hz: 90.0,
        to_hz: 65.0,
        filter: FilterSpec::lowpass(350.0, 0.8),
        gain: 0.04,
        hold_fraction: 0.8,
    },
];

const NOISE_SECONDS: f64 = 0.1;
const NOISE_AMPLITUDE: f32 = 0.5;
const NOISE_FILTER: FilterSpec = FilterSpec::lowpass(800.0, 0.8);
const NOISE_GAIN: f64 = 0.01;
const NOISE_HOLD_FRACTION: f64 = 0.85;

fn plateau(level: f64, start: f64, hold_fraction: f64) -> Param {
    let end = start + SPIN_VOICE_SECONDS;
    let mut gain = Param::new(level);
    gain.set_value_at(level, start)
        .set_value_at(level, start + SPIN_VOICE_SECONDS * hold_fraction)
        .exponential_ramp_to(SILENCE, end);
    gain
}

pub fn build_spin_voice(ctx: &mut AudioContext) -> AudioVoice {
    let start = ctx.current_time();
    let end = start + SPIN_VOICE_SECONDS;
    let rate = ctx.sample_rate();
    let mut voice = AudioVoice::new();

    for tone in &TONES {
        let mut frequency = Param::new(tone.from_hz);
        frequency
            .set_value_at(tone.from_hz, start)
            .exponential_ramp_to(tone.to_hz, end);
        voice.push(Layer::new(
            Source::oscillator(tone.waveform, frequency),
            tone.filter,
            plateau(tone.gain, start, tone.hold_fraction),
            start,
            end,
            rate,
        ));
    }

    let noise = Source::noise(ctx.noise_rng(), NOISE_SECONDS, NOISE_AMPLITUDE, rate, true);
    voice.push(Layer::new(
        noise,
        NOISE_FILTER,
        plateau(NOISE_GAIN, start, NOISE_HOLD_FRACTION),
        start,
        end,
        rate,
    ));

    voice
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_spin_voice_layers() {
        let mut ctx = AudioContext::with_seed(8_000.0, 9).unwrap();
        let voice = build_spin_voice(&mut ctx);

        assert_eq!(voice.layers().len(), 4);
        assert_eq!(voice.end_time(), SPIN_VOICE_SECONDS);

        let drone = &voice.layers()[0];
        assert_abs_diff_eq!(drone.gain().value_at(5.0), 0.06);
        assert_abs_diff_eq!(drone.gain().value_at(5.95), 0.06);
        assert!(drone.gain().value_at(6.5) < 0.06);
        assert_abs_diff_eq!(drone.gain().value_at(7.0), SILENCE, epsilon = 1e-12);

        let friction = &voice.layers()[1];
        assert_abs_diff_eq!(friction.gain().value_at(5.6), 0.02);
        assert!(friction.gain().value_at(5.7) < 0.02);
    }

    #[test]
    fn test_spin_voice_is_audible() {
        let mut ctx = AudioContext::with_seed(8_000.0, 9).unwrap();
        let voice = build_spin_voice(&mut ctx);
        ctx.schedule(voice);

        let mut buf = vec![0.0f32; 8_000];
        ctx.render(&mut buf);
        let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.01, "peak {}", peak);
        assert!(peak < 0.5, "peak {}", peak);
    }
}
