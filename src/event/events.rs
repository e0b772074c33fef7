use crate::player::GuildId;
use crate::player::track::QueuedTrack;

/// Notifications delivered to the render bridge after state changes.
///
/// The core only sends; whoever holds the receiving end re-renders from the
/// session's read-only surface.
#[derive(Debug, Clone)]
pub enum Event {
    /// The engine accepted a new current track for the guild.
    TrackStarted(GuildId, QueuedTrack),
    /// Playback ran out of queued tracks and the session went idle.
    QueueEnded(GuildId),
    /// Some mutating command against the guild succeeded.
    StateChanged(GuildId),
    /// The guild's session was torn down and forgotten.
    SessionClosed(GuildId),
}
