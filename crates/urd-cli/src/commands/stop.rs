//! Stop command for pausing every running stream.

use std::io::Write;

use anyhow::Result;

use urd_core::clock;

use super::util::streams_count;
use crate::{Config, StoreHandle};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut handle = StoreHandle::open_exclusive(config)?;
    let now = clock::now();
    let store = handle.store_mut();
    let stopped = store.stop_all_at(now);
    store.sort_streams_at(now);
    handle.commit()?;

    if stopped == 0 {
        writeln!(writer, "No streams running.")?;
    } else {
        writeln!(
            writer,
            "Stopped {} (run 'urd continue' to resume)",
            streams_count(stopped)
        )?;
    }
    Ok(())
}
