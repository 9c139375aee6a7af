//! codec/mod.rs
//! Bidirectional marshalling between a userspace segment tree and the
//! kernelspace framestore.
//!
//! - `export_to_device`: tree -> arena + metadata (fails loudly, never truncates)
//! - `import_from_device`: arena + metadata -> fresh tree (reconciles sizes,
//!   reports recoverable findings through `Diagnostics`)
//!
//! Both directions address frames with the same fixed-stride offsets
//! derived in `layout::SegmentTable`.

pub mod naming;
pub mod scan;
pub mod export;
pub mod import;

pub use naming::*;
pub use scan::*;

use std::path::Path;

use crate::diagnostics::{Diagnostics, TracingDiagnostics};
use crate::layout::{decode_table, SegmentTable};
use crate::store::{read_blobs, RawIo};
use crate::types::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodecConfig {
    /// Arena capacity to enforce on export. `None` uses the store's own capacity.
    pub arena_capacity: Option<u64>,

    /// Treat an oversized declared size on a fixed-size frame as fatal
    /// instead of warning and reading the exact slot size.
    pub strict_raw_sizes: bool,
}

impl CodecConfig {
    pub fn new(arena_capacity: Option<u64>, strict_raw_sizes: bool) -> Self {
        Self { arena_capacity, strict_raw_sizes }
    }

    pub fn strict() -> Self {
        Self { strict_raw_sizes: true, ..Default::default() }
    }
}

/// Hook run on a frame file right after import writes it.
pub type FrameHook = Box<dyn Fn(&Path) -> Result<()>>;

/// Converter bound to one framestore.
///
/// Holds the store exclusively for its lifetime; one conversion at a time.
pub struct FramestoreCodec<S: RawIo, D: Diagnostics> {
    store: S,
    diagnostics: D,
    config: CodecConfig,
    raw_post: Option<FrameHook>,
}

impl<S: RawIo> FramestoreCodec<S, TracingDiagnostics> {
    /// Codec that reports warnings as `tracing` events only.
    pub fn with_tracing(store: S) -> Self {
        Self::new(store, TracingDiagnostics)
    }
}

impl<S: RawIo, D: Diagnostics> FramestoreCodec<S, D> {
    pub fn new(store: S, diagnostics: D) -> Self {
        Self::with_config(store, diagnostics, CodecConfig::default())
    }

    pub fn with_config(store: S, diagnostics: D, config: CodecConfig) -> Self {
        Self { store, diagnostics, config, raw_post: None }
    }

    /// Run `hook` on every raw-planar frame file import writes.
    pub fn with_raw_post(mut self, hook: impl Fn(&Path) -> Result<()> + 'static) -> Self {
        self.raw_post = Some(Box::new(hook));
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn diagnostics(&self) -> &D {
        &self.diagnostics
    }

    pub fn into_inner(self) -> (S, D) {
        (self.store, self.diagnostics)
    }

    /// Capacity enforced on export.
    pub fn arena_capacity(&self) -> u64 {
        self.config
            .arena_capacity
            .unwrap_or_else(|| self.store.arena_capacity())
    }

    /// Read and decode the six metadata files without touching the arena.
    pub fn read_table(&mut self) -> Result<SegmentTable> {
        let blobs = read_blobs(&mut self.store)?;
        Ok(decode_table(&blobs)?)
    }
}
