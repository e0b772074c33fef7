use std::time::Duration;

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// How long an empty voice channel is tolerated before the session is
    /// torn down. Occupancy is re-checked once the grace period elapses.
    pub idle_grace: Duration,
    /// Oldest history entries are dropped past this many.
    pub history_limit: usize,
    pub default_volume: u8,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            idle_grace: Duration::from_secs(30),
            history_limit: 100,
            default_volume: 100,
        }
    }
}
