use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WheelError {
    #[error("No participants on the wheel")]
    EmptyPool,
    #[error("Declared winner '{0}' is not on the wheel")]
    DeclaredWinnerNotFound(String),
    #[error("A spin is already in progress")]
    SpinInProgress,
    #[error("Winner index {index} is outside a pool of {count}")]
    WinnerOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio subsystem failed to initialize: {0}")]
    Init(String),
    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(f64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Text measurement failed: {0}")]
pub struct MeasureError(pub String);
