use std::collections::HashMap;

use tokio::task::JoinHandle;

use crate::player::GuildId;

/// Guild-keyed store of cancellable background tasks. Spawning for a key
/// aborts whatever was scheduled under it before.
#[derive(Default)]
pub struct TaskManager {
    tasks: HashMap<GuildId, JoinHandle<()>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    pub fn spawn(&mut self, key: GuildId, task: JoinHandle<()>) {
        if let Some(handle) = self.tasks.insert(key, task) {
            handle.abort();
        }
    }

    pub fn abort(&mut self, key: GuildId) {
        if let Some(handle) = self.tasks.remove(&key) {
            handle.abort();
        }
    }

    pub fn abort_all(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, key: GuildId) -> bool {
        self.tasks
            .get(&key)
            .is_some_and(|handle| !handle.is_finished())
    }
}
