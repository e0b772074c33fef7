use crate::player::track::QueuedTrack;

/// What the session is doing right now. The current track lives here and
/// only here; it is never inferred from the history tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing(QueuedTrack),
    Paused(QueuedTrack),
}

impl PlaybackState {
    pub fn current(&self) -> Option<&QueuedTrack> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Playing(track) | PlaybackState::Paused(track) => Some(track),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, PlaybackState::Paused(_))
    }
}

/// Named audio effects the engine can layer over the unmodified baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Tremolo + vibrato with lowered pitch.
    Warble,
    /// Sped-up tempo with raised pitch.
    Nightcore,
}
