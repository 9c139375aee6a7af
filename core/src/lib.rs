//! framestore-core
//!
//! Marshalling between a userspace tree of captured video segments and the
//! flat framestore arena a camera driver exposes through debugfs.
//! Pure Rust, no FFI.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Wire layout and raw access
pub mod layout;
pub mod store;

// Reporting
pub mod diagnostics;
pub mod telemetry;

// Conversions
pub mod codec;
pub mod capture;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::codec::{CodecConfig, FramestoreCodec};
    pub use crate::diagnostics::{CollectingDiagnostics, Diagnostics, TracingDiagnostics, Warning};
    pub use crate::layout::{PixelFormat, SegmentTable};
    pub use crate::store::{DebugfsStore, MemoryStore, RawIo};
    pub use crate::telemetry::TransferReport;
    pub use crate::types::{FramestoreError, Result};
}
