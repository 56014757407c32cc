//! Checkpoint command for banking running time without stopping.
//!
//! Meant for periodic use (e.g. from cron) so that the time recorded on disk
//! stays close to the truth while streams run for a long time.

use std::io::Write;

use anyhow::Result;

use urd_core::clock;

use super::util::streams_count;
use crate::{Config, StoreHandle};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut handle = StoreHandle::open_exclusive(config)?;
    let flushed = handle.store_mut().checkpoint_at(clock::now());
    if flushed > 0 {
        handle.commit()?;
    }

    writeln!(writer, "Checkpointed {}", streams_count(flushed))?;
    Ok(())
}
