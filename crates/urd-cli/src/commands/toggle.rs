//! Toggle command for starting and stopping a single stream.

use std::io::Write;

use anyhow::{Result, bail};

use urd_core::clock;

use super::util::{format_duration, resolve_stream};
use crate::{Config, StoreHandle};

pub fn run<W: Write>(writer: &mut W, config: &Config, selector: &str) -> Result<()> {
    let mut handle = StoreHandle::open_exclusive(config)?;
    let now = clock::now();
    let store = handle.store_mut();
    store.sort_streams_at(now);

    let id = resolve_stream(store, selector)?;
    let Some(active) = store.toggle_stream_at(&id, now) else {
        bail!("stream not found: {selector}");
    };
    store.sort_streams_at(now);

    let message = match store.stream(&id) {
        Some(stream) if active => format!("Started {}", stream.name()),
        Some(stream) => format!(
            "Stopped {} at {}",
            stream.name(),
            format_duration(stream.elapsed_at(now))
        ),
        None => bail!("stream not found: {selector}"),
    };
    handle.commit()?;

    writeln!(writer, "{message}")?;
    Ok(())
}
