//! List command for showing streams with elapsed time.
//!
//! Streams are shown in display order (running first, then longest), each
//! with its share of the de-duplicated wall clock.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use urd_core::{Store, clock};

use super::util::{NAME_WIDTH, display_name, format_duration};
use crate::{Config, StoreHandle};

// ========== Listing Data ==========

/// One stream row.
#[derive(Debug, Clone, Serialize)]
pub struct StreamEntry {
    /// 1-based position, usable as a stream selector.
    pub position: usize,
    pub id: String,
    pub name: String,
    pub active: bool,
    pub elapsed_secs: i64,
}

/// Everything the listing shows.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub streams: Vec<StreamEntry>,
    pub wall_clock_secs: i64,
    /// Sum of per-stream elapsed time; exceeds the wall clock when streams
    /// overlapped.
    pub total_secs: i64,
}

impl Listing {
    fn has_active(&self) -> bool {
        self.streams.iter().any(|s| s.active)
    }
}

/// Builds the listing as of `now`, in display order.
pub fn build_listing(store: &Store, now: DateTime<Utc>) -> Listing {
    let mut sorted = store.clone();
    sorted.sort_streams_at(now);

    let streams: Vec<StreamEntry> = sorted
        .streams()
        .iter()
        .enumerate()
        .map(|(index, stream)| StreamEntry {
            position: index + 1,
            id: stream.id().to_string(),
            name: stream.name().to_string(),
            active: stream.is_active(),
            elapsed_secs: stream.elapsed_at(now).num_seconds(),
        })
        .collect();

    Listing {
        total_secs: streams.iter().map(|s| s.elapsed_secs).sum(),
        wall_clock_secs: sorted.total_wall_clock_at(now).num_seconds(),
        streams,
    }
}

// ========== Human-Readable Output ==========

/// Formats the listing for the terminal.
#[allow(clippy::cast_precision_loss)]
pub fn format_listing(listing: &Listing) -> String {
    let mut output = String::new();

    writeln!(output, "urd - Time Tracker").unwrap();
    writeln!(output).unwrap();

    if listing.streams.is_empty() {
        writeln!(output, "No streams. Run 'urd add <name>' to add one.").unwrap();
    }

    for entry in &listing.streams {
        let elapsed = format_duration(chrono::TimeDelta::seconds(entry.elapsed_secs));
        write!(
            output,
            "{}. {:<width$}  {}",
            entry.position,
            display_name(&entry.name),
            elapsed,
            width = NAME_WIDTH
        )
        .unwrap();

        if listing.wall_clock_secs > 0 {
            let pct = entry.elapsed_secs as f64 / listing.wall_clock_secs as f64 * 100.0;
            write!(output, "  {pct:>5.1}%").unwrap();
        }
        if entry.active {
            write!(output, "  ●").unwrap();
        }
        writeln!(output).unwrap();
    }

    if listing.wall_clock_secs > 0 || listing.has_active() {
        let wall_clock = format_duration(chrono::TimeDelta::seconds(listing.wall_clock_secs));
        let total = format_duration(chrono::TimeDelta::seconds(listing.total_secs));
        writeln!(output).unwrap();
        writeln!(output, "Wall clock: {wall_clock}").unwrap();
        writeln!(output, "Total:      {total}").unwrap();
    }

    output
}

// ========== Public Interface ==========

/// Runs the list command.
pub fn run<W: Write>(writer: &mut W, config: &Config, json: bool) -> Result<()> {
    let handle = StoreHandle::open_shared(config)?;
    let listing = build_listing(handle.store(), clock::now());

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&listing)?)?;
    } else {
        write!(writer, "{}", format_listing(&listing))?;
    }

    Ok(())
}
