//! Streams - named units of tracked work.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::types::StreamId;

/// A named unit of work whose active time is tracked independently.
///
/// `seconds` only holds time banked from previous active periods. The running
/// period is derived from `started_at`, which is present exactly when the
/// stream is active.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stream {
    pub(crate) id: StreamId,

    pub(crate) name: String,

    /// Banked seconds from finished active periods.
    #[serde(default)]
    pub(crate) seconds: i64,

    #[serde(default)]
    pub(crate) active: bool,

    /// Start of the current active period.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) started_at: Option<DateTime<Utc>>,

    pub(crate) created_at: DateTime<Utc>,
}

impl Stream {
    /// Creates an inactive stream with no recorded time.
    pub fn new(id: StreamId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            seconds: 0,
            active: false,
            started_at: None,
            created_at,
        }
    }

    pub const fn id(&self) -> &StreamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seconds banked from previous active periods.
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Total time for this stream: banked seconds plus the running period.
    pub fn elapsed(&self) -> TimeDelta {
        self.elapsed_at(clock::now())
    }

    /// Total time for this stream as of `now`, in whole seconds.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> TimeDelta {
        TimeDelta::seconds(self.seconds + self.running_seconds(now))
    }

    /// Seconds accrued in the current active period, zero when inactive.
    fn running_seconds(&self, now: DateTime<Utc>) -> i64 {
        match (self.active, self.started_at) {
            (true, Some(started)) => clock::seconds_between(started, now),
            _ => 0,
        }
    }

    /// Marks the stream active from `now`. No-op if already active.
    pub(crate) fn activate(&mut self, now: DateTime<Utc>) {
        if self.active {
            return;
        }
        self.active = true;
        self.started_at = Some(now);
    }

    /// Banks the running period into `seconds` and marks the stream inactive.
    pub(crate) fn deactivate(&mut self, now: DateTime<Utc>) {
        self.flush(now);
        self.active = false;
        self.started_at = None;
    }

    /// Banks the running period and restarts it at `now`, leaving the stream
    /// active. Elapsed time is unchanged.
    pub(crate) fn checkpoint(&mut self, now: DateTime<Utc>) {
        if !self.active {
            return;
        }
        self.flush(now);
        self.started_at = Some(now);
    }

    fn flush(&mut self, now: DateTime<Utc>) {
        self.seconds += self.running_seconds(now);
    }
}
