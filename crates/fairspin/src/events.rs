use strum::Display;

/// Lifecycle signals for whoever hosts the wheel.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum WheelEvent {
    SpinStarted,
    SpinEnded,
    WinnerResolved { name: String, index: usize },
    /// The winners history should be reloaded from its store.
    WinnersRefreshRequested,
}
