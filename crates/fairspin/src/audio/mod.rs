//! Procedural spin and win sounds rendered in software.

mod context;
mod engine;
mod filter;
mod graph;
mod param;
mod spin;
mod win;

pub use context::{AudioContext, DEFAULT_SAMPLE_RATE, VoiceId};
pub use engine::{SpinAudioEngine, VoiceHandle};
pub use filter::{FilterKind, FilterSpec};
pub use graph::{AudioVoice, Layer, SILENCE, Source, Waveform};
pub use param::{EXP_FLOOR, Param};
pub use spin::{SPIN_RELEASE_SECONDS, SPIN_VOICE_SECONDS, build_spin_voice};
pub use win::{MELODY, Note, build_win_voice, melody_seconds};
