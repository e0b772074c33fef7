use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlayerError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("no tracks found for \"{0}\"")]
    TrackNotFound(String),

    #[error("resolver returned no tracks")]
    NoTracksResolved,

    #[error("queue is empty")]
    EmptyQueue,

    #[error("no track at index {index}, length is {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("nothing is playing")]
    NothingPlaying,

    #[error("streaming engine unavailable: {0}")]
    Upstream(String),
}

/// How the command layer should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Recoverable, surfaced as a user-visible message, never retried.
    UserInput,
    /// External dependency failure; the caller decides whether to retry
    /// or disconnect. The session is left standing.
    Upstream,
}

impl PlayerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlayerError::Upstream(_) => ErrorCategory::Upstream,
            _ => ErrorCategory::UserInput,
        }
    }
}
