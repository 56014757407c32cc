//! urd CLI library.
//!
//! This crate provides the command-line interface over the `urd-core` engine.

mod cli;
pub mod commands;
mod config;
mod storage;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use storage::StoreHandle;
