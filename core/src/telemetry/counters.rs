//! telemetry/counters.rs
//! Mutable counters used during a conversion.
//!
//! Summary: Collects segment, frame and byte counts during export/import.
//! Converted into an immutable `TransferReport` at the end.
use std::ops::AddAssign;

use serde::Serialize;

/// Deterministic counters collected during one conversion.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferCounters {
    pub segments: u64,
    pub frames_written: u64,
    pub frames_skipped: u64,
    pub bytes_payload: u64,
    pub bytes_reserved: u64,
    pub warnings: u64,
}

impl TransferCounters {
    /// Record one segment and the arena bytes its slots reserve.
    pub fn add_segment(&mut self, slot_bytes: u64) {
        self.segments += 1;
        self.bytes_reserved += slot_bytes;
    }

    /// Record one frame moved across, with its real payload length.
    pub fn add_frame(&mut self, payload_len: usize) {
        self.frames_written += 1;
        self.bytes_payload += payload_len as u64;
    }

    /// Record a frame slot that produced no output file.
    pub fn add_skipped(&mut self) {
        self.frames_skipped += 1;
    }

    pub fn add_warning(&mut self) {
        self.warnings += 1;
    }

    /// Share of reserved arena bytes actually holding payload.
    pub fn fill_ratio(&self) -> f64 {
        if self.bytes_reserved == 0 {
            return 0.0;
        }
        (self.bytes_payload as f64 / self.bytes_reserved as f64).min(1.0)
    }

    pub fn merge(&mut self, other: &TransferCounters) {
        self.segments += other.segments;
        self.frames_written += other.frames_written;
        self.frames_skipped += other.frames_skipped;
        self.bytes_payload += other.bytes_payload;
        self.bytes_reserved += other.bytes_reserved;
        self.warnings += other.warnings;
    }
}

impl AddAssign for TransferCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
