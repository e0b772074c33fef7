#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;

use jukebox::event::Event;
use jukebox::player::GuildId;
use jukebox::player::config::PlayerConfig;
use jukebox::player::error::{PlayerError, Result};
use jukebox::player::state::FilterKind;
use jukebox::player::system::AudioService;
use jukebox::player::track::TrackDescriptor;
use jukebox::player::traits::{ConnectionFactory, Resolved, StreamConnection, TrackResolver};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Play(String, Duration),
    Stop,
    Pause,
    Resume,
    Volume(u8),
    Filter(Option<FilterKind>),
    Disconnect,
}

/// Observable state of one guild's fake engine connection.
#[derive(Default)]
pub struct Engine {
    calls: StdMutex<Vec<EngineCall>>,
    position: StdMutex<Duration>,
    listeners: AtomicUsize,
}

impl Engine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_position(&self, at: Duration) {
        *self.position.lock().unwrap() = at;
    }

    pub fn set_listeners(&self, count: usize) {
        self.listeners.store(count, Ordering::SeqCst);
    }
}

pub struct FakeConnection(pub Arc<Engine>);

#[async_trait]
impl StreamConnection for FakeConnection {
    async fn play(&mut self, track: &TrackDescriptor, at: Duration) -> Result<()> {
        self.0
            .calls
            .lock()
            .unwrap()
            .push(EngineCall::Play(track.title.clone(), at));
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.0.calls.lock().unwrap().push(EngineCall::Stop);
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.0.calls.lock().unwrap().push(EngineCall::Pause);
        Ok(())
    }

    async fn resume(&mut self) -> Result<()> {
        self.0.calls.lock().unwrap().push(EngineCall::Resume);
        Ok(())
    }

    async fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.0.calls.lock().unwrap().push(EngineCall::Volume(volume));
        Ok(())
    }

    async fn apply_filter(&mut self, filter: Option<FilterKind>) -> Result<()> {
        self.0.calls.lock().unwrap().push(EngineCall::Filter(filter));
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.0.calls.lock().unwrap().push(EngineCall::Disconnect);
        Ok(())
    }

    fn position(&self) -> Duration {
        *self.0.position.lock().unwrap()
    }

    fn listener_count(&self) -> usize {
        self.0.listeners.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeFactory {
    engines: StdMutex<HashMap<GuildId, Arc<Engine>>>,
    connects: AtomicUsize,
    fail: AtomicBool,
}

impl FakeFactory {
    /// Engine state for the guild, created on first access so tests can
    /// stage positions/listeners before the service ever connects.
    pub fn engine(&self, guild_id: GuildId) -> Arc<Engine> {
        self.engines
            .lock()
            .unwrap()
            .entry(guild_id)
            .or_default()
            .clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn fail_connects(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionFactory for FakeFactory {
    async fn connect(&self, guild_id: GuildId) -> Result<Box<dyn StreamConnection>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PlayerError::Upstream("engine node is down".into()));
        }
        // widen the race window for concurrent-creation tests
        tokio::task::yield_now().await;
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection(self.engine(guild_id))))
    }
}

/// Resolves "a,b,c" into one track per name. An "@<ms>" suffix becomes the
/// scheduled start offset; the query "missing" resolves to nothing.
#[derive(Default)]
pub struct FakeResolver;

#[async_trait]
impl TrackResolver for FakeResolver {
    async fn resolve(&self, query: &str) -> Result<Resolved> {
        let (names, start_at) = match query.rsplit_once('@') {
            Some((names, ms)) => (
                names,
                Some(Duration::from_millis(ms.parse().unwrap_or(0))),
            ),
            None => (query, None),
        };
        if names == "missing" {
            return Err(PlayerError::TrackNotFound(query.to_string()));
        }
        let tracks = names
            .split(',')
            .map(|name| {
                let name = name.trim();
                TrackDescriptor::new(name, Duration::from_secs(200), format!("source://{name}"))
            })
            .collect();
        Ok(Resolved { tracks, start_at })
    }
}

pub fn service(
    config: PlayerConfig,
) -> (Arc<AudioService>, Arc<FakeFactory>, flume::Receiver<Event>) {
    let (event_tx, event_rx) = flume::unbounded();
    let factory = Arc::new(FakeFactory::default());
    let service = AudioService::new(event_tx, Arc::new(FakeResolver), factory.clone(), config);
    (Arc::new(service), factory, event_rx)
}
