//! Delete command for removing streams.
//!
//! Streams with recorded time are only removed when confirmed with `--yes`.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::TimeDelta;

use urd_core::clock;

use super::util::{format_duration, resolve_stream};
use crate::{Config, StoreHandle};

pub fn run<W: Write>(writer: &mut W, config: &Config, selector: &str, yes: bool) -> Result<()> {
    let mut handle = StoreHandle::open_exclusive(config)?;
    let now = clock::now();
    handle.store_mut().sort_streams_at(now);

    let id = resolve_stream(handle.store(), selector)?;
    let Some(stream) = handle.store().stream(&id) else {
        bail!("stream not found: {selector}");
    };
    let name = stream.name().to_string();
    let elapsed = stream.elapsed_at(now);

    if elapsed > TimeDelta::zero() && !yes {
        bail!(
            "stream \"{name}\" has recorded time ({}); pass --yes to delete it",
            format_duration(elapsed)
        );
    }

    let store = handle.store_mut();
    store.delete_stream_at(&id, now);
    store.sort_streams_at(now);
    handle.commit()?;

    writeln!(writer, "Deleted {name}")?;
    Ok(())
}
