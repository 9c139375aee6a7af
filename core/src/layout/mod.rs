//! layout/mod.rs
//! Kernelspace framestore layout: format registry, segment table and the
//! codecs for its metadata pseudo-files.
//!
//! Notes:
//! - One arena (`fdata`) holds every frame at a fixed stride per segment.
//! - Five fixed-capacity arrays describe the segments; a sixth, flat array
//!   holds the real payload length of every frame slot.
//! - Both marshalling directions derive offsets with the same prefix sums.

pub mod types;
pub mod table;
pub mod encode;
pub mod decode;

pub use types::*;
pub use table::*;
pub use encode::*;
pub use decode::*;
