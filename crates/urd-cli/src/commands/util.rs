//! Shared utilities for CLI commands.

use anyhow::{Result, bail};
use chrono::TimeDelta;

use urd_core::{Store, StreamId};

/// Width of the name column in listings, in characters.
pub const NAME_WIDTH: usize = 20;

/// Formats a duration as hours, minutes, and seconds, e.g. `1h 02m 15s`.
///
/// Hours are not wrapped into days. Negative durations format as zero.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}h {minutes:02}m {seconds:02}s")
}

/// Shortens a name to fit the listing column.
pub fn display_name(name: &str) -> String {
    // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
    if name.chars().count() > NAME_WIDTH {
        format!("{}...", name.chars().take(NAME_WIDTH - 3).collect::<String>())
    } else {
        name.to_string()
    }
}

/// `1 stream`, `2 streams`.
pub fn streams_count(n: usize) -> String {
    if n == 1 {
        "1 stream".to_string()
    } else {
        format!("{n} streams")
    }
}

/// Resolves a stream selector against the store's current order.
///
/// Tries, in order: an exact stream ID, a 1-based list position, and a
/// stream name that matches exactly one stream.
pub fn resolve_stream(store: &Store, selector: &str) -> Result<StreamId> {
    let streams = store.streams();

    if let Some(stream) = streams.iter().find(|s| s.id().as_str() == selector) {
        return Ok(stream.id().clone());
    }

    if let Some(stream) = selector
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| streams.get(index))
    {
        return Ok(stream.id().clone());
    }

    let mut named = streams.iter().filter(|s| s.name() == selector);
    match (named.next(), named.next()) {
        (Some(stream), None) => Ok(stream.id().clone()),
        (Some(_), Some(_)) => bail!("stream name is ambiguous: {selector} (use its ID)"),
        (None, _) => bail!("stream not found: {selector}"),
    }
}
