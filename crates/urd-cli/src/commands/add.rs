//! Add command for creating streams.

use std::io::Write;

use anyhow::{Result, bail};

use urd_core::clock;

use crate::{Config, StoreHandle};

/// Creates a stream named `name` at `position` (appended when `None`).
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    name: &str,
    position: Option<isize>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        bail!("stream name cannot be empty");
    }

    let mut handle = StoreHandle::open_exclusive(config)?;
    let now = clock::now();
    let store = handle.store_mut();
    store.sort_streams_at(now);
    let id = store.add_stream_at(name, position.unwrap_or(isize::MAX), now);
    store.sort_streams_at(now);
    handle.commit()?;

    writeln!(writer, "Added {name} ({id})")?;
    Ok(())
}
