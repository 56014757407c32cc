//! Status command for summarizing the tracking state.

use std::io::Write;

use anyhow::Result;

use urd_core::{Stream, clock};

use super::util::{format_duration, streams_count};
use crate::{Config, StoreHandle};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let handle = StoreHandle::open_shared(config)?;
    let store = handle.store();
    let now = clock::now();

    writeln!(writer, "Time tracker status")?;
    writeln!(writer, "Store: {}", handle.path().display())?;

    if store.streams().is_empty() {
        writeln!(writer, "No streams recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "Streams: {} ({} running)",
        store.streams().len(),
        store.active_count()
    )?;

    let running: Vec<&str> = store
        .streams()
        .iter()
        .filter(|s| s.is_active())
        .map(Stream::name)
        .collect();
    if !running.is_empty() {
        writeln!(writer, "Running: {}", running.join(", "))?;
    }

    writeln!(
        writer,
        "Wall clock: {}",
        format_duration(store.total_wall_clock_at(now))
    )?;

    if !store.last_active().is_empty() {
        writeln!(
            writer,
            "Paused: {} (run 'urd continue' to resume)",
            streams_count(store.last_active().len())
        )?;
    }

    Ok(())
}
