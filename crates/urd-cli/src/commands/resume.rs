//! Continue command for resuming the streams paused by `stop`.

use std::io::Write;

use anyhow::Result;

use urd_core::clock;

use super::util::streams_count;
use crate::{Config, StoreHandle};

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let mut handle = StoreHandle::open_exclusive(config)?;
    let now = clock::now();
    let store = handle.store_mut();
    let resumed = store.continue_all_at(now);
    store.sort_streams_at(now);
    handle.commit()?;

    if resumed == 0 {
        writeln!(writer, "Nothing to continue.")?;
    } else {
        writeln!(writer, "Continued {}", streams_count(resumed))?;
    }
    Ok(())
}
