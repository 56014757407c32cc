//! Core engine for the urd time tracker.
//!
//! This crate contains the tracking model and its persistence:
//! - Streams: named units of work that accrue time while active
//! - Sessions: the wall-clock log that merges overlapping active periods
//! - Store: the aggregate that owns both and saves them atomically as JSON

pub mod clock;
mod persist;
mod session;
mod store;
mod stream;
mod types;

pub use persist::StoreError;
pub use session::Session;
pub use store::Store;
pub use stream::Stream;
pub use types::{StreamId, ValidationError};
