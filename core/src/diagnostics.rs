//! diagnostics.rs
//! Non-fatal findings raised while importing from the device.
//!
//! A warning means the data looks suspicious but a safe degraded action
//! exists; the operation continues. Fatal conditions are `FramestoreError`.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;

/// Recoverable condition, tied to the frame it was raised for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A fixed-size frame declares more bytes than its slot; the slot size is read instead.
    OversizedRawFrame {
        segment: usize,
        frame: usize,
        declared: u32,
        capacity: u32,
    },
    /// A compressed frame declares zero bytes; no file is written for its index.
    EmptyCompressedFrame { segment: usize, frame: usize },
}

impl Warning {
    pub fn segment(&self) -> usize {
        match self {
            Warning::OversizedRawFrame { segment, .. } => *segment,
            Warning::EmptyCompressedFrame { segment, .. } => *segment,
        }
    }

    pub fn frame(&self) -> usize {
        match self {
            Warning::OversizedRawFrame { frame, .. } => *frame,
            Warning::EmptyCompressedFrame { frame, .. } => *frame,
        }
    }

    /// True for the zero-length compressed case, which leaves a gap in the frame numbering.
    pub fn is_hole(&self) -> bool {
        matches!(self, Warning::EmptyCompressedFrame { .. })
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::OversizedRawFrame { segment, frame, declared, capacity } => write!(
                f,
                "frame too large: segment {} frame {} declares {} bytes, slot holds {}",
                segment, frame, declared, capacity
            ),
            Warning::EmptyCompressedFrame { segment, frame } => {
                write!(f, "empty frame: segment {} frame {} skipped", segment, frame)
            }
        }
    }
}

/// Sink for warnings.
pub trait Diagnostics {
    fn warn(&self, warning: Warning);
}

impl<T: Diagnostics + ?Sized> Diagnostics for &T {
    fn warn(&self, warning: Warning) {
        (**self).warn(warning)
    }
}

/// Emits every warning as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, warning: Warning) {
        tracing::warn!(
            segment = warning.segment(),
            frame = warning.frame(),
            hole = warning.is_hole(),
            "{}",
            warning
        );
    }
}

/// Keeps every warning for later inspection, and logs it too.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        match self.warnings.lock() {
            Ok(w) => w.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.warnings().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warn(&self, warning: Warning) {
        TracingDiagnostics.warn(warning.clone());
        match self.warnings.lock() {
            Ok(mut w) => w.push(warning),
            Err(poisoned) => poisoned.into_inner().push(warning),
        }
    }
}
