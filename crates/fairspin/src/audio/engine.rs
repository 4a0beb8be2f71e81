use std::panic::{AssertUnwindSafe, catch_unwind};

use super::context::{AudioContext, DEFAULT_SAMPLE_RATE, VoiceId};
use super::spin::{SPIN_RELEASE_SECONDS, build_spin_voice};
use super::win::build_win_voice;
use crate::error::AudioError;

/// Handle to a voice started by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceHandle(VoiceId);

impl VoiceHandle {
    pub fn id(&self) -> VoiceId {
        self.0
    }
}

/// Spin and win sounds for the wheel.
///
/// Never fails once constructed: if the audio context could not be created, or the
/// engine is muted, every call is a silent no-op.
#[derive(Debug)]
pub struct SpinAudioEngine {
    context: Option<AudioContext>,
    muted: bool,
    spin_voice: Option<VoiceId>,
}

impl Default for SpinAudioEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

impl SpinAudioEngine {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_backend(|| AudioContext::new(sample_rate))
    }

    /// Builds the engine from a context factory. Errors and panics from `init` leave the
    /// engine in silent mode.
    pub fn with_backend<F>(init: F) -> Self
    where
        F: FnOnce() -> Result<AudioContext, AudioError>,
    {
        let context = match catch_unwind(AssertUnwindSafe(init)) {
            Ok(Ok(ctx)) => Some(ctx),
            Ok(Err(e)) => {
                log::warn!("Audio disabled: {}", e);
                None
            }
            Err(_) => {
                log::warn!("Audio disabled: backend panicked during initialization");
                None
            }
        };
        Self {
            context,
            muted: false,
            spin_voice: None,
        }
    }

    pub fn silent() -> Self {
        Self {
            context: None,
            muted: false,
            spin_voice: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.context.is_some()
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn sample_rate(&self) -> Option<f64> {
        self.context.as_ref().map(AudioContext::sample_rate)
    }

    pub fn current_time(&self) -> f64 {
        self.context
            .as_ref()
            .map(AudioContext::current_time)
            .unwrap_or_default()
    }

    pub fn active_voices(&self) -> usize {
        self.context
            .as_ref()
            .map(AudioContext::active_voices)
            .unwrap_or_default()
    }

    fn audible_context(&mut self) -> Option<&mut AudioContext> {
        if self.muted {
            return None;
        }
        self.context.as_mut()
    }

    /// Starts a fresh spin voice, fading out any earlier one.
    pub fn start_spin_voice(&mut self) -> Option<VoiceHandle> {
        if let Some(previous) = self.spin_voice.take() {
            self.release(previous);
        }
        let ctx = self.audible_context()?;
        let voice = build_spin_voice(ctx);
        let id = ctx.schedule(voice);
        log::debug!("Spin voice {} started at {:.3}s", id, ctx.current_time());
        self.spin_voice = Some(id);
        Some(VoiceHandle(id))
    }

    /// Fades the spin voice out over a short release. Stale handles are ignored.
    pub fn stop_spin_voice(&mut self, handle: VoiceHandle) {
        if self.spin_voice == Some(handle.0) {
            self.spin_voice = None;
        }
        self.release(handle.0);
    }

    fn release(&mut self, id: VoiceId) {
        let Some(ctx) = self.context.as_mut() else {
            return;
        };
        let now = ctx.current_time();
        if let Some(voice) = ctx.voice_mut(id) {
            voice.release(now, SPIN_RELEASE_SECONDS);
            log::debug!("Spin voice {} released at {:.3}s", id, now);
        }
    }

    pub fn play_win_voice(&mut self) -> Option<VoiceHandle> {
        let ctx = self.audible_context()?;
        let voice = build_win_voice(ctx);
        let id = ctx.schedule(voice);
        log::debug!("Win voice {} started at {:.3}s", id, ctx.current_time());
        Some(VoiceHandle(id))
    }

    /// Renders the next block of mono samples. Silent when unavailable or muted.
    pub fn render(&mut self, output: &mut [f32]) {
        match self.context.as_mut() {
            Some(ctx) => {
                ctx.render(output);
                if self.muted {
                    output.fill(0.0);
                }
            }
            None => output.fill(0.0),
        }
    }

    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let rate = self.sample_rate().unwrap_or(DEFAULT_SAMPLE_RATE);
        let mut out = vec![0.0; (seconds.max(0.0) * rate).round() as usize];
        self.render(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SpinAudioEngine {
        SpinAudioEngine::with_backend(|| AudioContext::with_seed(8_000.0, 5))
    }

    fn peak(samples: &[f32]) -> f32 {
        samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    #[test]
    fn test_failed_init_is_silent() {
        let mut audio =
            SpinAudioEngine::with_backend(|| Err(AudioError::Init("no device".to_string())));
        assert!(!audio.is_available());
        assert!(audio.start_spin_voice().is_none());
        assert!(audio.play_win_voice().is_none());

        let mut buf = vec![1.0f32; 64];
        audio.render(&mut buf);
        assert!(buf.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_panicking_init_is_silent() {
        let audio = SpinAudioEngine::with_backend(|| panic!("driver exploded"));
        assert!(!audio.is_available());
    }

    #[test]
    fn test_muted_engine_schedules_nothing() {
        let mut audio = engine();
        audio.set_muted(true);
        assert!(audio.start_spin_voice().is_none());
        assert!(audio.play_win_voice().is_none());
        assert_eq!(audio.active_voices(), 0);
    }

    #[test]
    fn test_stop_fades_spin_voice_quickly() {
        let mut audio = engine();
        let handle = audio.start_spin_voice().unwrap();
        let loud = audio.render_seconds(1.0);
        assert!(peak(&loud) > 0.01);

        audio.stop_spin_voice(handle);
        audio.render_seconds(0.35);
        assert_eq!(audio.active_voices(), 0);
        let after = audio.render_seconds(0.1);
        assert_eq!(peak(&after), 0.0);
    }

    #[test]
    fn test_new_spin_replaces_previous_voice() {
        let mut audio = engine();
        let first = audio.start_spin_voice().unwrap();
        audio.render_seconds(0.5);
        let second = audio.start_spin_voice().unwrap();
        assert_ne!(first, second);

        audio.render_seconds(0.35);
        assert_eq!(audio.active_voices(), 1);

        // stale handle does not touch the live voice
        audio.stop_spin_voice(first);
        audio.render_seconds(0.5);
        assert_eq!(audio.active_voices(), 1);
    }

    #[test]
    fn test_win_voice_plays_to_completion() {
        let mut audio = engine();
        audio.play_win_voice().unwrap();
        let samples = audio.render_seconds(2.5);
        assert!(peak(&samples) > 0.1);
        assert_eq!(audio.active_voices(), 0);
    }
}
