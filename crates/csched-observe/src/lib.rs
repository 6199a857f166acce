//! Logging setup shared by the scheduler binary.
//!
//! All crates log through `tracing`; this crate only installs the global subscriber.

mod logger;
pub use logger::*;
