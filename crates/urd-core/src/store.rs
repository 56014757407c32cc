//! The store: streams, the session log, and the operations that keep them
//! consistent.
//!
//! Every operation comes in two forms. The `*_at` form takes the sampled
//! instant explicitly; the plain form samples [`clock::now`] once and
//! delegates. A single sample per operation keeps all deltas computed inside
//! one operation consistent with each other.

use std::cmp::Reverse;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::session::Session;
use crate::stream::Stream;
use crate::types::StreamId;

/// Aggregate root owning all streams and the wall-clock session log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Store {
    /// Streams in display order.
    #[serde(default)]
    pub(crate) streams: Vec<Stream>,

    /// Append-only, non-overlapping log; at most the last entry is open.
    #[serde(default)]
    pub(crate) sessions: Vec<Session>,

    /// Streams that were running at the last stop-all, for continue-all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) last_active: Vec<StreamId>,

    /// Banked seconds of streams that have since been deleted.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub(crate) deleted_seconds: i64,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams in display order.
    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// IDs remembered by the last [`Store::stop_all`].
    pub fn last_active(&self) -> &[StreamId] {
        &self.last_active
    }

    /// Banked seconds of deleted streams.
    pub const fn deleted_seconds(&self) -> i64 {
        self.deleted_seconds
    }

    /// Looks up a stream by ID.
    pub fn stream(&self, id: &StreamId) -> Option<&Stream> {
        self.streams.iter().find(|s| &s.id == id)
    }

    fn position(&self, id: &StreamId) -> Option<usize> {
        self.streams.iter().position(|s| &s.id == id)
    }

    /// Whether any stream is currently accruing time.
    pub fn has_active(&self) -> bool {
        self.streams.iter().any(Stream::is_active)
    }

    pub fn active_count(&self) -> usize {
        self.streams.iter().filter(|s| s.active).count()
    }

    // ========== Mutations ==========

    /// Adds a stream at `position`, clamped to `[0, len]`.
    pub fn add_stream(&mut self, name: impl Into<String>, position: isize) -> StreamId {
        self.add_stream_at(name, position, clock::now())
    }

    /// Adds a stream at `position`, clamped to `[0, len]`, created at `now`.
    ///
    /// Negative positions insert at the front, positions past the end append.
    pub fn add_stream_at(
        &mut self,
        name: impl Into<String>,
        position: isize,
        now: DateTime<Utc>,
    ) -> StreamId {
        let id = self.fresh_id();
        let index = usize::try_from(position).map_or(0, |p| p.min(self.streams.len()));
        self.streams.insert(index, Stream::new(id.clone(), name, now));
        tracing::debug!(stream = %id, index, "added stream");
        id
    }

    fn fresh_id(&self) -> StreamId {
        loop {
            let id = StreamId::generate();
            if self.position(&id).is_none() {
                return id;
            }
        }
    }

    /// Removes a stream. See [`Store::delete_stream_at`].
    pub fn delete_stream(&mut self, id: &StreamId) -> Option<Stream> {
        self.delete_stream_at(id, clock::now())
    }

    /// Removes a stream, returning it, or `None` if no stream has this ID.
    ///
    /// An active stream is flushed first, and the open session is closed if
    /// it was the last active stream. The removed stream's banked time stays
    /// counted in [`Store::deleted_seconds`].
    pub fn delete_stream_at(&mut self, id: &StreamId, now: DateTime<Utc>) -> Option<Stream> {
        let index = self.position(id)?;
        let had_active = self.has_active();

        let mut stream = self.streams.remove(index);
        stream.deactivate(now);
        self.deleted_seconds += stream.seconds;
        self.last_active.retain(|other| other != id);

        self.track_session(had_active, now);
        tracing::debug!(stream = %id, seconds = stream.seconds, "deleted stream");
        Some(stream)
    }

    /// Flips a stream between active and inactive.
    pub fn toggle_stream(&mut self, id: &StreamId) -> Option<bool> {
        self.toggle_stream_at(id, clock::now())
    }

    /// Flips a stream between active and inactive at `now`.
    ///
    /// Returns the new active flag, or `None` if no stream has this ID.
    pub fn toggle_stream_at(&mut self, id: &StreamId, now: DateTime<Utc>) -> Option<bool> {
        let index = self.position(id)?;
        let had_active = self.has_active();

        let stream = &mut self.streams[index];
        if stream.active {
            stream.deactivate(now);
        } else {
            stream.activate(now);
        }
        let active = stream.active;

        self.track_session(had_active, now);
        Some(active)
    }

    /// Stops every active stream. See [`Store::stop_all_at`].
    pub fn stop_all(&mut self) -> usize {
        self.stop_all_at(clock::now())
    }

    /// Stops every active stream at `now` and remembers which ones ran.
    ///
    /// The remembered set replaces any previous one, even when nothing was
    /// active. The open session is closed once for the whole batch. Returns
    /// the number of streams stopped.
    pub fn stop_all_at(&mut self, now: DateTime<Utc>) -> usize {
        let had_active = self.has_active();
        self.last_active.clear();

        for stream in self.streams.iter_mut().filter(|s| s.active) {
            self.last_active.push(stream.id.clone());
            stream.deactivate(now);
        }

        if had_active {
            self.close_current_session(now);
        }
        self.last_active.len()
    }

    /// Resumes the streams remembered by the last stop-all.
    pub fn continue_all(&mut self) -> usize {
        self.continue_all_at(clock::now())
    }

    /// Resumes the streams remembered by the last stop-all at `now`, then
    /// forgets them.
    ///
    /// Streams that are already running or no longer exist are skipped.
    /// Returns the number of streams resumed.
    pub fn continue_all_at(&mut self, now: DateTime<Utc>) -> usize {
        if self.last_active.is_empty() {
            return 0;
        }
        let had_active = self.has_active();

        let mut resumed = 0;
        for stream in &mut self.streams {
            if !stream.active && self.last_active.contains(&stream.id) {
                stream.activate(now);
                resumed += 1;
            }
        }
        self.last_active.clear();

        self.track_session(had_active, now);
        resumed
    }

    /// Banks running time of active streams. See [`Store::checkpoint_at`].
    pub fn checkpoint(&mut self) -> usize {
        self.checkpoint_at(clock::now())
    }

    /// Banks the running time of every active stream and restarts its period
    /// at `now`. Streams stay active and no session boundary is created.
    ///
    /// Returns the number of streams checkpointed.
    pub fn checkpoint_at(&mut self, now: DateTime<Utc>) -> usize {
        let mut flushed = 0;
        for stream in self.streams.iter_mut().filter(|s| s.active) {
            stream.checkpoint(now);
            flushed += 1;
        }
        flushed
    }

    /// Orders streams for display. See [`Store::sort_streams_at`].
    pub fn sort_streams(&mut self) {
        self.sort_streams_at(clock::now());
    }

    /// Stable sort: active streams first, then by elapsed time descending.
    pub fn sort_streams_at(&mut self, now: DateTime<Utc>) {
        self.streams.sort_by_key(|s| (!s.active, Reverse(s.elapsed_at(now))));
    }

    // ========== Wall clock ==========

    /// De-duplicated tracked time across all sessions.
    pub fn total_wall_clock(&self) -> TimeDelta {
        self.total_wall_clock_at(clock::now())
    }

    /// De-duplicated tracked time as of `now`; an open session counts up to
    /// `now`.
    pub fn total_wall_clock_at(&self, now: DateTime<Utc>) -> TimeDelta {
        TimeDelta::seconds(self.sessions.iter().map(|s| s.seconds_at(now)).sum())
    }

    /// Banked seconds of every stream, deleted streams included. Running
    /// periods are not counted.
    pub(crate) fn banked_seconds(&self) -> i64 {
        let live: i64 = self.streams.iter().map(|s| s.seconds).sum();
        live + self.deleted_seconds
    }

    /// Wall clock of closed sessions only.
    ///
    /// A session closes only once no stream is active, so every closed
    /// second has already been banked by some stream.
    pub(crate) fn closed_wall_clock(&self) -> i64 {
        self.sessions
            .iter()
            .filter_map(|s| s.end.map(|end| clock::seconds_between(s.start, end)))
            .sum()
    }

    fn track_session(&mut self, had_active: bool, now: DateTime<Utc>) {
        match (had_active, self.has_active()) {
            (false, true) => self.sessions.push(Session::open(now)),
            (true, false) => self.close_current_session(now),
            _ => {}
        }
    }

    fn close_current_session(&mut self, now: DateTime<Utc>) {
        if let Some(session) = self.sessions.iter_mut().rev().find(|s| s.is_open()) {
            session.end = Some(now);
        }
    }

    /// Fixes state a hand-edited or interrupted file can leave behind.
    pub(crate) fn repair_at(&mut self, now: DateTime<Utc>) {
        for stream in &mut self.streams {
            match (stream.active, stream.started_at) {
                (true, None) => {
                    tracing::warn!(
                        stream = %stream.id,
                        "active stream has no start time, restarting it now"
                    );
                    stream.started_at = Some(now);
                }
                (false, Some(_)) => {
                    tracing::warn!(
                        stream = %stream.id,
                        "inactive stream has a start time, clearing it"
                    );
                    stream.started_at = None;
                }
                _ => {}
            }
        }

        // Keep at most the newest open session, and only while something runs.
        let has_active = self.has_active();
        let open = self.sessions.iter().filter(|s| s.is_open()).count();
        let excess = open.saturating_sub(usize::from(has_active));
        for session in self.sessions.iter_mut().filter(|s| s.is_open()).take(excess) {
            tracing::warn!(start = %session.start, "closing dangling open session");
            session.end = Some(session.start);
        }
        if has_active && open == 0 {
            tracing::warn!("active streams without an open session, opening one now");
            self.sessions.push(Session::open(now));
        }
    }
}
