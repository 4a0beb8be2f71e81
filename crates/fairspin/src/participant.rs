use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

/// A display name on the wheel. Identity is the position in the pool, not the text,
/// so duplicates are distinct entries.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Participant(String);

impl From<&str> for Participant {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn normalized(&self) -> String {
        normalize_name(&self.0)
    }
}

/// Trims and collapses every whitespace run to a single space.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reads a newline separated name list, dropping lines that are blank after normalization.
pub fn parse_name_list(raw: &str) -> Vec<Participant> {
    raw.lines()
        .map(normalize_name)
        .filter(|n| !n.is_empty())
        .map(Participant::new)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NameLines {
    pub line1: String,
    pub line2: String,
}

/// Splits a long name into two balanced lines for the winner announcement.
pub fn split_full_name(name: &str) -> NameLines {
    let normalized = normalize_name(name);
    let words: Vec<&str> = normalized.split(' ').filter(|w| !w.is_empty()).collect();

    let split_at = match words.len() {
        0 => return NameLines::default(),
        1..=3 => 1,
        n => n.div_ceil(2),
    };

    NameLines {
        line1: words[..split_at].join(" "),
        line2: words[split_at..].join(" "),
    }
}

/// The single mutable source of truth for the wheel.
#[derive(Debug, Clone, Default)]
pub struct WheelState {
    pub participants: Vec<Participant>,
    /// Unbounded, only ever grows during a spin.
    pub rotation_degrees: f64,
    pub is_spinning: bool,
    /// Set only after a spin has settled, cleared on dismissal.
    pub selected_index: Option<usize>,
}

impl WheelState {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn selected(&self) -> Option<&Participant> {
        self.selected_index.and_then(|i| self.participants.get(i))
    }
}
