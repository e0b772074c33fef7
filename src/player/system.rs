use std::sync::Arc;

use flume::Sender;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::event::Event;
use crate::player::GuildId;
use crate::player::commands::PlayerCommand;
use crate::player::config::PlayerConfig;
use crate::player::error::{PlayerError, Result};
use crate::player::monitor::IdleWatcher;
use crate::player::registry::SessionRegistry;
use crate::player::session::{EnqueueOptions, PlayerSession, SessionSnapshot};
use crate::player::state::FilterKind;
use crate::player::track::QueuedTrack;
use crate::player::traits::{ConnectionFactory, ConnectionState, TrackResolver};

/// Entry point for the hosting bot framework: resolves queries, routes each
/// command to the right guild's session and publishes change notifications.
///
/// Apart from `play`, which creates a session lazily, commands against a
/// guild with no session fail with `NothingPlaying`.
pub struct AudioService {
    registry: Arc<SessionRegistry>,
    resolver: Arc<dyn TrackResolver>,
    watcher: IdleWatcher,
    event_tx: Sender<Event>,
}

impl AudioService {
    pub fn new(
        event_tx: Sender<Event>,
        resolver: Arc<dyn TrackResolver>,
        factory: Arc<dyn ConnectionFactory>,
        config: PlayerConfig,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(
            factory,
            event_tx.clone(),
            config.clone(),
        ));
        let watcher = IdleWatcher::new(registry.clone(), config.idle_grace);
        Self {
            registry,
            resolver,
            watcher,
            event_tx,
        }
    }

    /// Resolve `query` and enqueue the result, connecting the guild's
    /// session first if it does not exist yet.
    pub async fn play(
        &self,
        guild_id: GuildId,
        query: &str,
        force_play: bool,
    ) -> Result<Vec<QueuedTrack>> {
        let resolved = self.resolver.resolve(query).await?;
        info!(
            guild = guild_id,
            query,
            count = resolved.tracks.len(),
            "tracks_resolved"
        );
        let session = self.registry.get_or_create(guild_id).await?;
        let batch = session
            .lock()
            .await
            .enqueue(
                resolved.tracks,
                EnqueueOptions {
                    force_play,
                    start_at: resolved.start_at,
                },
            )
            .await?;
        self.changed(guild_id);
        Ok(batch)
    }

    pub async fn skip(&self, guild_id: GuildId) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.skip().await?;
        self.changed(guild_id);
        Ok(())
    }

    pub async fn previous(&self, guild_id: GuildId) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.previous().await?;
        self.changed(guild_id);
        Ok(())
    }

    /// Clear the queue and stop the current track. The session itself stays
    /// connected; `disconnect` is the one that tears it down.
    pub async fn stop(&self, guild_id: GuildId) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.stop_all().await?;
        self.changed(guild_id);
        Ok(())
    }

    pub async fn jump_to(&self, guild_id: GuildId, index: usize, from_history: bool) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.jump_to(index, from_history).await?;
        self.changed(guild_id);
        Ok(())
    }

    pub async fn toggle_pause(&self, guild_id: GuildId) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.toggle_pause().await?;
        self.changed(guild_id);
        Ok(())
    }

    pub async fn set_volume(&self, guild_id: GuildId, volume: u8) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.set_volume(volume).await?;
        self.changed(guild_id);
        Ok(())
    }

    pub async fn toggle_filter(&self, guild_id: GuildId, kind: FilterKind) -> Result<()> {
        let session = self.session(guild_id).await?;
        session.lock().await.toggle_filter(kind).await?;
        self.changed(guild_id);
        Ok(())
    }

    /// Explicit disconnect: tear down and forget the guild's session.
    /// Returns whether one existed.
    pub async fn disconnect(&self, guild_id: GuildId) -> bool {
        self.watcher.cancel(guild_id).await;
        self.registry.remove(guild_id).await
    }

    /// Completion signal from the streaming engine. Signals for unknown
    /// guilds or idle sessions are absorbed, they are expected duplicates.
    pub async fn on_track_end(&self, guild_id: GuildId) -> Result<()> {
        let Some(session) = self.registry.get(guild_id).await else {
            debug!(guild = guild_id, "track_end_for_unknown_guild");
            return Ok(());
        };
        session.lock().await.track_finished().await?;
        self.changed(guild_id);
        Ok(())
    }

    /// Connection-state signal from the engine. A hard disconnect tears the
    /// session down; a transient error is logged and surfaced through the
    /// command that observes it, the session stays up for the caller to
    /// decide.
    pub async fn on_connection_state_changed(&self, guild_id: GuildId, state: ConnectionState) {
        match state {
            ConnectionState::Connected => {
                debug!(guild = guild_id, "engine_connected");
            }
            ConnectionState::Disconnected => {
                info!(guild = guild_id, "engine_disconnected");
                self.watcher.cancel(guild_id).await;
                self.registry.remove(guild_id).await;
            }
            ConnectionState::Error(message) => {
                warn!(guild = guild_id, error = message.as_str(), "engine_error");
            }
        }
    }

    /// Occupancy trigger from the hosting framework, drives the idle
    /// disconnect policy.
    pub async fn on_listener_count_changed(&self, guild_id: GuildId, listeners: usize) {
        self.watcher
            .on_listener_count_changed(guild_id, listeners)
            .await;
    }

    /// Single-entry dispatcher for hosts that route commands as data.
    pub async fn handle_command(&self, guild_id: GuildId, command: PlayerCommand) -> Result<()> {
        match command {
            PlayerCommand::Play { query, force_play } => self
                .play(guild_id, &query, force_play)
                .await
                .map(|_| ()),
            PlayerCommand::Skip => self.skip(guild_id).await,
            PlayerCommand::Previous => self.previous(guild_id).await,
            PlayerCommand::Stop => self.stop(guild_id).await,
            PlayerCommand::JumpTo {
                index,
                from_history,
            } => self.jump_to(guild_id, index, from_history).await,
            PlayerCommand::TogglePause => self.toggle_pause(guild_id).await,
            PlayerCommand::SetVolume(volume) => self.set_volume(guild_id, volume).await,
            PlayerCommand::ToggleFilter(kind) => self.toggle_filter(guild_id, kind).await,
            PlayerCommand::Disconnect => {
                self.disconnect(guild_id).await;
                Ok(())
            }
        }
    }

    // --- read-only surface for the render bridge ---

    pub async fn snapshot(&self, guild_id: GuildId) -> Option<SessionSnapshot> {
        let session = self.registry.get(guild_id).await?;
        let snapshot = session.lock().await.snapshot();
        Some(snapshot)
    }

    pub async fn queue_page(
        &self,
        guild_id: GuildId,
        offset: usize,
        limit: usize,
    ) -> Vec<QueuedTrack> {
        match self.registry.get(guild_id).await {
            Some(session) => session.lock().await.queue_page(offset, limit),
            None => Vec::new(),
        }
    }

    pub async fn history_page(
        &self,
        guild_id: GuildId,
        offset: usize,
        limit: usize,
    ) -> Vec<QueuedTrack> {
        match self.registry.get(guild_id).await {
            Some(session) => session.lock().await.history_page(offset, limit),
            None => Vec::new(),
        }
    }

    pub async fn has_session(&self, guild_id: GuildId) -> bool {
        self.registry.contains(guild_id).await
    }

    async fn session(&self, guild_id: GuildId) -> Result<Arc<Mutex<PlayerSession>>> {
        self.registry
            .get(guild_id)
            .await
            .ok_or(PlayerError::NothingPlaying)
    }

    fn changed(&self, guild_id: GuildId) {
        let _ = self.event_tx.send(Event::StateChanged(guild_id));
    }
}
