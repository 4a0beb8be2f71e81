//! The short celebration played once a winner is shown.

use super::context::AudioContext;
use super::filter::FilterSpec;
use super::graph::{AudioVoice, Layer, Source, Waveform};
use super::param::Param;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency: f64,
    pub seconds: f64,
    pub volume: f64,
    pub harmony_volume: f64,
}

const fn note(frequency: f64, seconds: f64, volume: f64, harmony_volume: f64) -> Note {
    Note {
        frequency,
        seconds,
        volume,
        harmony_volume,
    }
}

/// C5 E5 G5 C6 A5 C6
pub const MELODY: [Note; 6] = [
    note(523.25, 0.18, 0.22, 0.18),
    note(659.25, 0.18, 0.22, 0.18),
    note(783.99, 0.18, 0.22, 0.18),
    note(1046.5, 0.45, 0.28, 0.20),
    note(880.0, 0.25, 0.22, 0.18),
    note(1046.5, 0.6, 0.32, 0.22),
];

const MELODY_FILTER: FilterSpec = FilterSpec::lowpass(2500.0, 1.2);
const HARMONY_FILTER: FilterSpec = FilterSpec::lowpass(1800.0, 1.1);
const NOTE_ATTACK: f64 = 0.05;
const NOTE_RELEASE: f64 = 0.1;

const FANFARE_FROM_HZ: f64 = 1318.51;
const FANFARE_TO_HZ: f64 = 1567.98;
const FANFARE_SWEEP: f64 = 0.3;
const FANFARE_SECONDS: f64 = 0.6;
const FANFARE_VOLUME: f64 = 0.28;
const FANFARE_FILTER: FilterSpec = FilterSpec::lowpass(3500.0, 1.8);

const SPARKLE_DELAY: f64 = 0.6;
const SPARKLE_SECONDS: f64 = 0.2;
const SPARKLE_AMPLITUDE: f32 = 0.3;
const SPARKLE_VOLUME: f64 = 0.1;
const SPARKLE_FILTER: FilterSpec = FilterSpec::bandpass(3000.0, 3.0);

pub fn melody_seconds() -> f64 {
    MELODY.iter().map(|n| n.seconds).sum()
}

fn note_envelope(volume: f64, start: f64, end: f64) -> Param {
    let mut gain = Param::new(0.0);
    gain.set_value_at(0.0, start)
        .linear_ramp_to(volume, start + NOTE_ATTACK)
        .set_value_at(volume, end - NOTE_RELEASE)
        .linear_ramp_to(0.0, end);
    gain
}

fn swell(volume: f64, start: f64, attack: f64, hold: f64, end: f64) -> Param {
    let mut gain = Param::new(0.0);
    gain.set_value_at(0.0, start)
        .linear_ramp_to(volume, start + attack)
        .set_value_at(volume, start + hold)
        .exponential_ramp_to(0.0, end);
    gain
}

pub fn build_win_voice(ctx: &mut AudioContext) -> AudioVoice {
    let start = ctx.current_time();
    let rate = ctx.sample_rate();
    let mut voice = AudioVoice::new();

    let mut at = start;
    for n in &MELODY {
        let end = at + n.seconds;
        voice.push(Layer::new(
            Source::oscillator(Waveform::Sine, Param::new(n.frequency)),
            MELODY_FILTER,
            note_envelope(n.volume, at, end),
            at,
            end,
            rate,
        ));
        voice.push(Layer::new(
            Source::oscillator(Waveform::Triangle, Param::new(n.frequency / 2.0)),
            HARMONY_FILTER,
            note_envelope(n.harmony_volume, at, end),
            at,
            end,
            rate,
        ));
        at = end;
    }

    let fanfare_end = at + FANFARE_SECONDS;
    let mut sweep = Param::new(FANFARE_FROM_HZ);
    sweep
        .set_value_at(FANFARE_FROM_HZ, at)
        .exponential_ramp_to(FANFARE_TO_HZ, at + FANFARE_SWEEP);
    voice.push(Layer::new(
        Source::oscillator(Waveform::Sine, sweep),
        FANFARE_FILTER,
        swell(FANFARE_VOLUME, at, NOTE_ATTACK, FANFARE_SWEEP, fanfare_end),
        at,
        fanfare_end,
        rate,
    ));

    let sparkle_start = start + SPARKLE_DELAY;
    let sparkle = Source::noise(ctx.noise_rng(), SPARKLE_SECONDS, SPARKLE_AMPLITUDE, rate, false);
    voice.push(Layer::new(
        sparkle,
        SPARKLE_FILTER,
        swell(
            SPARKLE_VOLUME,
            sparkle_start,
            0.1,
            0.15,
            sparkle_start + SPARKLE_SECONDS,
        ),
        sparkle_start,
        sparkle_start + SPARKLE_SECONDS,
        rate,
    ));

    voice
}
