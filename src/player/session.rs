use std::collections::HashMap;
use std::time::Duration;

use flume::Sender;
use tracing::{debug, info};

use crate::event::Event;
use crate::player::GuildId;
use crate::player::config::PlayerConfig;
use crate::player::error::{PlayerError, Result};
use crate::player::queue::TrackQueue;
use crate::player::state::{FilterKind, PlaybackState};
use crate::player::track::{EntryId, QueuedTrack, TrackDescriptor};
use crate::player::traits::StreamConnection;

/// How an enqueue should enter the queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnqueueOptions {
    /// Pre-empt the current track instead of waiting in line.
    pub force_play: bool,
    /// Start position requested at enqueue time (an explicit seek).
    pub start_at: Option<Duration>,
}

/// Read-only view of one session for the render bridge.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub guild_id: GuildId,
    pub current: Option<QueuedTrack>,
    pub paused: bool,
    pub volume: u8,
    pub filters_applied: bool,
    pub queue_len: usize,
    pub history_len: usize,
}

/// Playback state machine for one guild: current track, queue, history and
/// resume bookkeeping, backed by an exclusively owned engine connection.
///
/// Mutating methods must run under the session lock handed out by the
/// registry and hold it across engine awaits, so concurrent commands never
/// observe a half-applied transition.
pub struct PlayerSession {
    guild_id: GuildId,
    state: PlaybackState,
    queue: TrackQueue,
    history: TrackQueue,
    /// Explicit seek recorded at enqueue time, keyed by entry.
    start_offsets: HashMap<EntryId, Duration>,
    /// Where a track was cut off by skip/stop/pre-emption, keyed by entry.
    interrupt_offsets: HashMap<EntryId, Duration>,
    volume: u8,
    filters_applied: bool,
    history_limit: usize,
    conn: Box<dyn StreamConnection>,
    event_tx: Sender<Event>,
}

impl PlayerSession {
    pub fn new(
        guild_id: GuildId,
        conn: Box<dyn StreamConnection>,
        event_tx: Sender<Event>,
        config: &PlayerConfig,
    ) -> Self {
        Self {
            guild_id,
            state: PlaybackState::Idle,
            queue: TrackQueue::new(),
            history: TrackQueue::new(),
            start_offsets: HashMap::new(),
            interrupt_offsets: HashMap::new(),
            volume: config.default_volume,
            filters_applied: false,
            history_limit: config.history_limit,
            conn,
            event_tx,
        }
    }

    /// Add `descriptors` to the queue and start playback if nothing holds
    /// it back: an idle session starts its queue head, a force-play batch
    /// pre-empts the current track outright.
    ///
    /// Returns the queued entries with their assigned ids.
    pub async fn enqueue(
        &mut self,
        descriptors: Vec<TrackDescriptor>,
        opts: EnqueueOptions,
    ) -> Result<Vec<QueuedTrack>> {
        if descriptors.is_empty() {
            return Err(PlayerError::NoTracksResolved);
        }
        let batch: Vec<QueuedTrack> = descriptors.into_iter().map(QueuedTrack::new).collect();
        if let Some(start) = opts.start_at {
            for entry in &batch {
                self.start_offsets.insert(entry.id, start);
            }
        }
        debug!(
            guild = self.guild_id,
            count = batch.len(),
            force = opts.force_play,
            "tracks_enqueued"
        );

        if opts.force_play {
            self.force_play(batch.clone()).await?;
        } else {
            for entry in batch.iter().cloned() {
                self.queue.push_back(entry);
            }
            if self.state.is_idle() {
                self.advance().await?;
            }
        }
        Ok(batch)
    }

    /// Completion signal from the engine. Duplicate signals while idle are
    /// absorbed, the engine delivers them more than once on some backends.
    pub async fn track_finished(&mut self) -> Result<()> {
        let Some(finished) = self.take_current() else {
            debug!(guild = self.guild_id, "track_end_while_idle_ignored");
            return Ok(());
        };
        // finished cleanly, nothing left to resume
        self.interrupt_offsets.remove(&finished.id);
        self.push_history(finished);

        if self.queue.is_empty() {
            info!(guild = self.guild_id, "queue_exhausted");
            let _ = self.event_tx.send(Event::QueueEnded(self.guild_id));
            return Ok(());
        }
        self.advance().await
    }

    /// Cut the current track off and move on. Unlike a natural finish the
    /// interrupted offset is kept, so `previous` resumes mid-track.
    pub async fn skip(&mut self) -> Result<()> {
        let Some(current) = self.take_current() else {
            return Ok(());
        };
        self.interrupt_offsets.insert(current.id, self.conn.position());
        self.push_history(current);

        if self.queue.is_empty() {
            self.conn.stop().await?;
            let _ = self.event_tx.send(Event::QueueEnded(self.guild_id));
            return Ok(());
        }
        self.advance().await
    }

    /// Rewind to the most recent history entry. The pre-empted current track
    /// goes back to the *front* of the queue, not into history: undoing is
    /// rewinding, not finishing.
    pub async fn previous(&mut self) -> Result<()> {
        let Some(track) = self.history.pop_back() else {
            debug!(guild = self.guild_id, "previous_with_empty_history");
            return Ok(());
        };
        if let Some(current) = self.take_current() {
            self.interrupt_offsets.insert(current.id, self.conn.position());
            self.queue.push_front(current);
        }
        self.start(track).await
    }

    /// Pull the track at `index` out of the queue or the history and
    /// force-play it, preserving its recorded offsets.
    pub async fn jump_to(&mut self, index: usize, from_history: bool) -> Result<()> {
        let track = if from_history {
            self.history.remove_at(index)?
        } else {
            self.queue.remove_at(index)?
        };
        self.force_play(vec![track]).await
    }

    /// Discard every pending track and stop the current one. The only
    /// destructive operation: skipped and rewound tracks survive, these
    /// do not.
    pub async fn stop_all(&mut self) -> Result<()> {
        for dropped in self.queue.clear() {
            self.start_offsets.remove(&dropped.id);
            self.interrupt_offsets.remove(&dropped.id);
        }
        if let Some(current) = self.take_current() {
            self.interrupt_offsets.insert(current.id, self.conn.position());
            self.push_history(current);
            self.conn.stop().await?;
        }
        info!(guild = self.guild_id, "playback_stopped");
        Ok(())
    }

    pub async fn toggle_pause(&mut self) -> Result<()> {
        if self.state.is_idle() {
            return Err(PlayerError::NothingPlaying);
        }
        if self.state.is_paused() {
            self.conn.resume().await?;
        } else {
            self.conn.pause().await?;
        }
        // flip only once the engine call went through
        self.state = match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Playing(track) => PlaybackState::Paused(track),
            PlaybackState::Paused(track) => PlaybackState::Playing(track),
            PlaybackState::Idle => PlaybackState::Idle,
        };
        Ok(())
    }

    pub async fn set_volume(&mut self, volume: u8) -> Result<()> {
        let volume = volume.min(100);
        self.conn.set_volume(volume).await?;
        self.volume = volume;
        Ok(())
    }

    /// Toggle a named effect on the engine. Filters stay on until toggled
    /// off or the session is torn down.
    pub async fn toggle_filter(&mut self, kind: FilterKind) -> Result<()> {
        if self.state.is_idle() {
            return Err(PlayerError::NothingPlaying);
        }
        if self.filters_applied {
            self.conn.apply_filter(None).await?;
            self.filters_applied = false;
        } else {
            self.conn.apply_filter(Some(kind)).await?;
            self.filters_applied = true;
        }
        Ok(())
    }

    /// Stop everything, reset the engine to its unfiltered baseline and
    /// release the connection. The registry calls this when the session is
    /// removed.
    pub async fn teardown(&mut self) -> Result<()> {
        self.stop_all().await?;
        if self.filters_applied {
            self.conn.apply_filter(None).await?;
            self.filters_applied = false;
        }
        self.conn.disconnect().await
    }

    // --- read-only surface for the bridge and the idle watcher ---

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn current(&self) -> Option<&QueuedTrack> {
        self.state.current()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn queue_page(&self, offset: usize, limit: usize) -> Vec<QueuedTrack> {
        self.queue.page(offset, limit).cloned().collect()
    }

    pub fn history_page(&self, offset: usize, limit: usize) -> Vec<QueuedTrack> {
        self.history.page(offset, limit).cloned().collect()
    }

    pub fn listener_count(&self) -> usize {
        self.conn.listener_count()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            guild_id: self.guild_id,
            current: self.state.current().cloned(),
            paused: self.state.is_paused(),
            volume: self.volume,
            filters_applied: self.filters_applied,
            queue_len: self.queue.len(),
            history_len: self.history.len(),
        }
    }

    // --- internals ---

    /// Put `batch` ahead of everything and play its first entry now. A
    /// pre-empted current track is re-queued directly behind the batch with
    /// its elapsed position recorded, it was interrupted, not finished.
    async fn force_play(&mut self, batch: Vec<QueuedTrack>) -> Result<()> {
        let rest = batch.len().saturating_sub(1);
        for (i, entry) in batch.into_iter().enumerate() {
            self.queue.insert(i, entry);
        }
        let next = self.queue.pop_front()?;
        if let Some(current) = self.take_current() {
            self.interrupt_offsets.insert(current.id, self.conn.position());
            self.queue.insert(rest, current);
        }
        self.start(next).await
    }

    async fn advance(&mut self) -> Result<()> {
        let next = self.queue.pop_front()?;
        self.start(next).await
    }

    /// Hand `track` to the engine at its effective resume offset and make
    /// it current. Starting always un-pauses.
    async fn start(&mut self, track: QueuedTrack) -> Result<()> {
        let at = self.resume_offset(track.id);
        self.conn.play(&track.descriptor, at).await?;
        info!(
            guild = self.guild_id,
            title = track.title(),
            at_ms = at.as_millis() as u64,
            "track_started"
        );
        self.state = PlaybackState::Playing(track.clone());
        let _ = self.event_tx.send(Event::TrackStarted(self.guild_id, track));
        Ok(())
    }

    /// Scheduled seek vs. interrupted position, whichever is further in.
    fn resume_offset(&self, id: EntryId) -> Duration {
        let scheduled = self.start_offsets.get(&id).copied().unwrap_or_default();
        let interrupted = self.interrupt_offsets.get(&id).copied().unwrap_or_default();
        scheduled.max(interrupted)
    }

    fn take_current(&mut self) -> Option<QueuedTrack> {
        match std::mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Playing(track) | PlaybackState::Paused(track) => Some(track),
            PlaybackState::Idle => None,
        }
    }

    fn push_history(&mut self, track: QueuedTrack) {
        self.history.push_back(track);
        self.history.trim_oldest(self.history_limit);
    }
}
