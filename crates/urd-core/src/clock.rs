//! Wall-clock sampling.

use chrono::{DateTime, SubsecRound, Utc};

/// Returns the current instant truncated to whole seconds.
///
/// Operations sample this once and pass the value down, so every stamped
/// instant is a whole second and the delta between two of them is exact.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Whole seconds from `from` to `to`, rounded down. A clock that moved
/// backwards yields zero.
pub(crate) fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds().max(0)
}
