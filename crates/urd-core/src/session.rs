//! Wall-clock sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;

/// A contiguous interval during which at least one stream was active.
///
/// A session without `end` is still open. Sessions form an append-only log
/// and never overlap, so summing their durations gives the de-duplicated
/// tracked time no matter how many streams ran at once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub(crate) start: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) end: Option<DateTime<Utc>>,
}

impl Session {
    pub(crate) const fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub const fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Whole seconds covered by this session; an open session runs up to `now`.
    pub fn seconds_at(&self, now: DateTime<Utc>) -> i64 {
        clock::seconds_between(self.start, self.end.unwrap_or(now))
    }
}
