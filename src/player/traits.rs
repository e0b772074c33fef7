use std::time::Duration;

use async_trait::async_trait;

use crate::player::GuildId;
use crate::player::error::Result;
use crate::player::state::FilterKind;
use crate::player::track::TrackDescriptor;

/// Outcome of resolving a user query: playable descriptors plus an optional
/// start position the resolver extracted from the query (e.g. a `t=90`
/// timestamp in a link).
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    pub tracks: Vec<TrackDescriptor>,
    pub start_at: Option<Duration>,
}

/// Connection-state signal the engine reports alongside completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
    Error(String),
}

/// Turns search phrases, links and catalog ids into playable descriptors.
/// Query parsing (playlists, timestamps, soundboard ids) lives entirely
/// behind this trait.
#[async_trait]
pub trait TrackResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<Resolved>;
}

/// Per-guild handle to the streaming engine.
///
/// Exclusively owned by its session; every playback-affecting call is
/// mediated by session methods so queue/history/current stay consistent.
#[async_trait]
pub trait StreamConnection: Send + Sync {
    async fn play(&mut self, track: &TrackDescriptor, at: Duration) -> Result<()>;
    async fn stop(&mut self) -> Result<()>;
    async fn pause(&mut self) -> Result<()>;
    async fn resume(&mut self) -> Result<()>;
    async fn set_volume(&mut self, volume: u8) -> Result<()>;
    async fn apply_filter(&mut self, filter: Option<FilterKind>) -> Result<()>;
    async fn disconnect(&mut self) -> Result<()>;

    /// Elapsed position of the track currently loaded in the engine.
    fn position(&self) -> Duration;

    /// Listeners currently in the voice channel, excluding the bot itself.
    fn listener_count(&self) -> usize;
}

/// Establishes engine connections on first use of a guild.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self, guild_id: GuildId) -> Result<Box<dyn StreamConnection>>;
}
