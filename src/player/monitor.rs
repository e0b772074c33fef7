use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::player::GuildId;
use crate::player::registry::SessionRegistry;
use crate::util::task::TaskManager;

/// Debounced idle disconnect.
///
/// When a guild's voice channel empties, a grace timer starts; occupancy is
/// re-checked through the live connection once it elapses, so a listener who
/// rejoins in the meantime keeps the session alive. A rejoin trigger also
/// aborts the pending timer outright.
pub struct IdleWatcher {
    registry: Arc<SessionRegistry>,
    tasks: Mutex<TaskManager>,
    grace: Duration,
}

impl IdleWatcher {
    pub fn new(registry: Arc<SessionRegistry>, grace: Duration) -> Self {
        Self {
            registry,
            tasks: Mutex::new(TaskManager::new()),
            grace,
        }
    }

    /// Listener-count trigger from the hosting framework. `listeners`
    /// counts everyone in the channel except the bot.
    pub async fn on_listener_count_changed(&self, guild_id: GuildId, listeners: usize) {
        if listeners > 0 {
            self.tasks.lock().await.abort(guild_id);
            return;
        }

        debug!(guild = guild_id, grace_ms = self.grace.as_millis() as u64, "idle_grace_started");
        let registry = self.registry.clone();
        let grace = self.grace;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            // act on fresh occupancy, not on the stale trigger
            let Some(session) = registry.get(guild_id).await else {
                return;
            };
            let listeners = session.lock().await.listener_count();
            if listeners == 0 {
                info!(guild = guild_id, "idle_disconnect");
                registry.remove(guild_id).await;
            }
        });
        self.tasks.lock().await.spawn(guild_id, handle);
    }

    /// Drop any pending teardown for the guild.
    pub async fn cancel(&self, guild_id: GuildId) {
        self.tasks.lock().await.abort(guild_id);
    }
}
