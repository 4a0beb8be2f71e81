//! The frame loop as an explicit state machine.
//!
//! The host calls [`AnimationDriver::tick`] once per display frame. Time comes from an
//! injected [`Clock`], so tests drive whole spins with a [`ManualClock`].

use std::cell::Cell;
use std::fmt::Display;
use std::rc::Rc;
use std::time::{Duration, Instant};

use async_channel::Sender;
use strum::Display as StrumDisplay;

use crate::audio::{SpinAudioEngine, VoiceHandle};
use crate::error::WheelError;
use crate::events::WheelEvent;
use crate::layout::{DisplaySet, LabelLayout, RenderConfig, wheel_radius};
use crate::participant::{Participant, WheelState};
use crate::rotation::{RotationSolver, SpinPlan};
use crate::select::{FairSelector, RandomSource, SecureRandom};

/// Pause between the wheel stopping and the win sound.
pub const WIN_VOICE_DELAY: Duration = Duration::from_millis(50);

pub trait Clock {
    fn now(&self) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.0.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Receives every frame the driver decides to draw.
pub trait FrameSink {
    type Error: Display;

    fn present(
        &mut self,
        state: &WheelState,
        display: &DisplaySet,
        config: &RenderConfig,
    ) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
pub enum Phase {
    #[default]
    Idle,
    Spinning,
    /// Stopped on a winner, waiting for dismissal.
    Settling,
}

/// Smallest rotation change worth committing to the wheel state, in degrees.
pub fn commit_threshold(pool_size: usize) -> f64 {
    match pool_size {
        0..=200 => 0.05,
        201..=1000 => 0.08,
        _ => 0.1,
    }
}

pub fn min_frame_interval(pool_size: usize) -> Duration {
    let ms = match pool_size {
        0..=200 => 8,
        201..=500 => 10,
        501..=1000 => 12,
        _ => 16,
    };
    Duration::from_millis(ms)
}

struct ActiveSpin {
    plan: SpinPlan,
    started_at: Duration,
    last_frame_at: Option<Duration>,
    voice: Option<VoiceHandle>,
}

pub struct AnimationDriver<C: Clock, S: FrameSink, R: RandomSource = SecureRandom> {
    state: WheelState,
    layout: LabelLayout,
    selector: FairSelector<R>,
    audio: SpinAudioEngine,
    clock: C,
    sink: S,
    events: Option<Sender<WheelEvent>>,
    phase: Phase,
    spin: Option<ActiveSpin>,
    win_voice_due: Option<Duration>,
    frames: u64,
}

impl<C: Clock, S: FrameSink, R: RandomSource> AnimationDriver<C, S, R> {
    pub fn new(
        mut state: WheelState,
        clock: C,
        sink: S,
        selector: FairSelector<R>,
        audio: SpinAudioEngine,
    ) -> Self {
        let phase = if state.selected_index.is_some() {
            Phase::Settling
        } else {
            Phase::Idle
        };
        state.is_spinning = false;

        Self {
            state,
            layout: LabelLayout::default(),
            selector,
            audio,
            clock,
            sink,
            events: None,
            phase,
            spin: None,
            win_voice_due: None,
            frames: 0,
        }
    }

    pub fn with_layout(mut self, layout: LabelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_events(mut self, tx: Sender<WheelEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn state(&self) -> &WheelState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn plan(&self) -> Option<&SpinPlan> {
        self.spin.as_ref().map(|s| &s.plan)
    }

    pub fn layout(&self) -> &LabelLayout {
        &self.layout
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn audio(&self) -> &SpinAudioEngine {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut SpinAudioEngine {
        &mut self.audio
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Frames handed to the sink so far.
    pub fn frames_presented(&self) -> u64 {
        self.frames
    }

    pub fn is_win_voice_pending(&self) -> bool {
        self.win_voice_due.is_some()
    }

    /// Starts a spin. Rejected with `EmptyPool` before any state change, and with
    /// `SpinInProgress` (state untouched) while a spin is running. A settled winner is
    /// dismissed first.
    pub fn request_spin(&mut self, declared_winner: Option<&str>) -> Result<SpinPlan, WheelError> {
        if self.state.is_empty() {
            return Err(WheelError::EmptyPool);
        }
        if self.phase == Phase::Spinning {
            log::debug!("Spin request ignored: already spinning");
            return Err(WheelError::SpinInProgress);
        }

        let count = self.state.len();
        let selection =
            self.selector
                .select_winner(count, declared_winner, &self.state.participants)?;
        let plan = RotationSolver::plan(
            selection.index,
            count,
            self.state.rotation_degrees,
            self.selector.rng_mut(),
        )?;

        if self.phase == Phase::Settling {
            self.state.selected_index = None;
        }
        self.win_voice_due = None;

        self.state.is_spinning = true;
        self.phase = Phase::Spinning;
        let voice = self.audio.start_spin_voice();
        self.spin = Some(ActiveSpin {
            plan,
            started_at: self.clock.now(),
            last_frame_at: None,
            voice,
        });

        log::info!(
            "Spin started over {} participants ({:?} winner #{})",
            count,
            selection.source,
            selection.index
        );
        self.emit(WheelEvent::SpinStarted);
        self.present();

        Ok(plan)
    }

    /// Advances the machine to the clock's current time.
    pub fn tick(&mut self) -> Phase {
        let now = self.clock.now();

        if self.win_voice_due.is_some_and(|due| now >= due) {
            self.win_voice_due = None;
            self.audio.play_win_voice();
        }

        if self.phase == Phase::Spinning {
            self.advance_spin(now);
        }
        self.phase
    }

    fn advance_spin(&mut self, now: Duration) {
        let pool = self.state.len();
        let Some(spin) = self.spin.as_mut() else {
            return;
        };

        let elapsed = now.saturating_sub(spin.started_at);
        if spin.plan.is_complete(elapsed) {
            self.settle(now);
            return;
        }

        let throttled = spin
            .last_frame_at
            .is_some_and(|last| now.saturating_sub(last) < min_frame_interval(pool));
        if throttled {
            return;
        }
        spin.last_frame_at = Some(now);

        let rotation = spin.plan.rotation_at(elapsed);
        if rotation - self.state.rotation_degrees > commit_threshold(pool) {
            self.state.rotation_degrees = rotation;
            self.present();
        }
    }

    fn settle(&mut self, now: Duration) {
        let Some(spin) = self.spin.take() else {
            return;
        };

        self.state.rotation_degrees = spin.plan.target_rotation;
        self.state.is_spinning = false;
        self.state.selected_index = Some(spin.plan.winner_index);
        self.phase = Phase::Settling;

        if let Some(voice) = spin.voice {
            self.audio.stop_spin_voice(voice);
        }
        self.emit(WheelEvent::SpinEnded);
        self.emit(WheelEvent::WinnersRefreshRequested);
        self.win_voice_due = Some(now + WIN_VOICE_DELAY);

        let index = spin.plan.winner_index;
        let name = self.state.participants[index].to_string();
        log::info!("Winner: {} (#{})", name, index);
        self.emit(WheelEvent::WinnerResolved { name, index });

        self.present();
    }

    /// Clears the settled winner and redraws.
    pub fn dismiss(&mut self) {
        if self.phase == Phase::Spinning {
            return;
        }
        self.state.selected_index = None;
        self.phase = Phase::Idle;
        self.present();
    }

    /// Stops the loop where it stands. Safe to call at any time, any number of times.
    pub fn abort(&mut self) {
        self.win_voice_due = None;
        let Some(spin) = self.spin.take() else {
            return;
        };

        if let Some(voice) = spin.voice {
            self.audio.stop_spin_voice(voice);
        }
        self.state.is_spinning = false;
        self.phase = Phase::Idle;
        log::info!(
            "Spin aborted at {:.2} deg (target was {:.2})",
            self.state.rotation_degrees,
            spin.plan.target_rotation
        );
        self.emit(WheelEvent::SpinEnded);
    }

    pub fn set_participants(&mut self, participants: Vec<Participant>) -> Result<(), WheelError> {
        if self.phase == Phase::Spinning {
            return Err(WheelError::SpinInProgress);
        }
        self.state.participants = participants;
        self.state.selected_index = None;
        self.phase = Phase::Idle;
        self.present();
        Ok(())
    }

    pub fn set_layout(&mut self, layout: LabelLayout) {
        self.layout = layout;
        self.present();
    }

    /// Draws the current state regardless of throttling.
    pub fn present(&mut self) {
        let spinning = self.state.is_spinning;
        let display = self
            .layout
            .compute_display_set(&self.state.participants, spinning);
        let config = self.layout.compute_geometry(
            display.len(),
            wheel_radius(self.state.len()),
            spinning,
        );

        match self.sink.present(&self.state, &display, &config) {
            Ok(()) => self.frames += 1,
            Err(e) => log::warn!("Frame skipped: {}", e),
        }
    }

    fn emit(&self, event: WheelEvent) {
        let Some(tx) = &self.events else {
            return;
        };
        log::debug!("Event: {}", event);
        if let Err(e) = tx.try_send(event) {
            log::debug!("Event dropped: {}", e);
        }
    }
}
