use std::collections::HashMap;
use std::sync::Arc;

use flume::Sender;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::event::Event;
use crate::player::GuildId;
use crate::player::config::PlayerConfig;
use crate::player::error::Result;
use crate::player::session::PlayerSession;
use crate::player::traits::ConnectionFactory;

/// Owns every live session, exactly one per guild.
///
/// Creation and removal are serialized on the map lock; each session is
/// handed out behind its own mutex, which callers hold for the duration of
/// a whole mutating operation.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<GuildId, Arc<Mutex<PlayerSession>>>>,
    factory: Arc<dyn ConnectionFactory>,
    event_tx: Sender<Event>,
    config: PlayerConfig,
}

impl SessionRegistry {
    pub fn new(
        factory: Arc<dyn ConnectionFactory>,
        event_tx: Sender<Event>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            factory,
            event_tx,
            config,
        }
    }

    pub async fn get(&self, guild_id: GuildId) -> Option<Arc<Mutex<PlayerSession>>> {
        self.sessions.lock().await.get(&guild_id).cloned()
    }

    /// Session for the guild, connecting a new one if none exists. The map
    /// lock is held across connection setup, so concurrent callers end up
    /// sharing a single session.
    pub async fn get_or_create(&self, guild_id: GuildId) -> Result<Arc<Mutex<PlayerSession>>> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(&guild_id) {
            return Ok(session.clone());
        }
        let conn = self.factory.connect(guild_id).await?;
        info!(guild = guild_id, "session_created");
        let session = Arc::new(Mutex::new(PlayerSession::new(
            guild_id,
            conn,
            self.event_tx.clone(),
            &self.config,
        )));
        sessions.insert(guild_id, session.clone());
        Ok(session)
    }

    /// Tear down and forget the guild's session. Idle timeout and explicit
    /// stop can race here, so removing an already-removed guild is a no-op.
    /// Returns whether a session existed.
    pub async fn remove(&self, guild_id: GuildId) -> bool {
        let session = self.sessions.lock().await.remove(&guild_id);
        let Some(session) = session else {
            debug!(guild = guild_id, "remove_without_session");
            return false;
        };
        if let Err(err) = session.lock().await.teardown().await {
            warn!(guild = guild_id, error = %err, "session_teardown_failed");
        }
        info!(guild = guild_id, "session_closed");
        let _ = self.event_tx.send(Event::SessionClosed(guild_id));
        true
    }

    pub async fn contains(&self, guild_id: GuildId) -> bool {
        self.sessions.lock().await.contains_key(&guild_id)
    }
}
