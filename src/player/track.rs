use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// Opaque playable unit handed back by the track resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub title: String,
    pub duration: Duration,
    pub artwork_url: Option<String>,
    /// Source locator understood by the streaming engine, never parsed here.
    pub source: String,
}

impl TrackDescriptor {
    pub fn new(title: impl Into<String>, duration: Duration, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration,
            artwork_url: None,
            source: source.into(),
        }
    }
}

/// Identity of a single enqueue operation.
///
/// All resume-offset bookkeeping is keyed by this id rather than by title:
/// two queued copies of the same track must not share offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A descriptor bound to its queue identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedTrack {
    pub id: EntryId,
    pub descriptor: TrackDescriptor,
}

impl QueuedTrack {
    pub fn new(descriptor: TrackDescriptor) -> Self {
        Self {
            id: EntryId::new(),
            descriptor,
        }
    }

    pub fn title(&self) -> &str {
        &self.descriptor.title
    }
}
