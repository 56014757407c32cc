//! CLI subcommand implementations.

pub mod add;
pub mod checkpoint;
pub mod delete;
pub mod list;
pub mod resume;
pub mod status;
pub mod stop;
pub mod toggle;
pub mod util;
