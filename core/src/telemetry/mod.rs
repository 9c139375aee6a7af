//! telemetry/mod.rs
//! Transfer telemetry: counters, stage timers and the immutable report.
//!
//! Notes:
//! - Counters are plain integers owned by the running conversion.
//! - The report is built once at the end and never mutated afterwards.
//! - Reports serialize to JSON for the command line.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
