//! Fortune wheel core: fair winner selection, label layout for large pools, the spin
//! solver, procedural audio and the frame driver that ties them together.

pub mod audio;
pub mod driver;
pub mod error;
pub mod events;
pub mod layout;
pub mod participant;
pub mod rotation;
pub mod select;

pub use audio::SpinAudioEngine;
pub use driver::{AnimationDriver, Clock, FrameSink, ManualClock, Phase, SystemClock};
pub use error::{AudioError, MeasureError, WheelError};
pub use events::WheelEvent;
pub use layout::{DisplaySet, LabelLayout, RenderConfig};
pub use participant::{Participant, WheelState};
pub use rotation::{RotationSolver, SpinPlan};
pub use select::{FairSelector, RandomSource, SecureRandom, SeededRandom};
