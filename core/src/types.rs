use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::capture::CaptureError;
use crate::layout::LayoutError;
use crate::utils::fmt_bytes;

/// Unified framestore error covering I/O, layout, precondition and integrity failures.
/// - Every variant is fatal: the operation aborts without rollback.
/// - Recoverable conditions are reported through `Diagnostics`, never through this type.
#[derive(Debug, Error)]
pub enum FramestoreError {
    /// I/O error against the userspace tree or the kernelspace pseudo-files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Metadata arrays could not be encoded or decoded.
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Userspace tree does not have the expected shape.
    #[error("precondition failed at {path}: {reason}")]
    Precondition { path: PathBuf, reason: String },

    /// Export would address bytes beyond the end of the arena.
    #[error("arena overflow: {required} bytes required, capacity is {capacity}")]
    ArenaOverflow { required: u64, capacity: u64 },

    /// A compressed frame claims more bytes than its slot holds.
    #[error("segment {segment} frame {frame}: declared size {declared} exceeds slot capacity {capacity}")]
    FrameTooLarge {
        segment: usize,
        frame: usize,
        declared: u32,
        capacity: u32,
    },

    /// A compressed payload does not start with the SOI signature.
    #[error("segment {segment} frame {frame}: bad signature {}, expected {}", fmt_bytes(have), fmt_bytes(need))]
    MagicMismatch {
        segment: usize,
        frame: usize,
        have: Vec<u8>,
        need: Vec<u8>,
    },

    /// External capture tooling failed.
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),
}

impl FramestoreError {
    pub fn precondition(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FramestoreError::Precondition {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = FramestoreError> = std::result::Result<T, E>;
