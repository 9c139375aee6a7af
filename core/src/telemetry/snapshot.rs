//! telemetry/snapshot.rs
//! Immutable summary of one export or import.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diagnostics::Warning;
use crate::telemetry::counters::TransferCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Userspace tree to kernelspace arena.
    Export,
    /// Kernelspace arena to userspace tree.
    Import,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReport {
    pub direction: Direction,
    pub root: PathBuf,
    pub started_at: DateTime<Utc>,
    pub segments: u64,
    pub frames_written: u64,
    pub frames_skipped: u64,
    pub bytes_payload: u64,
    pub bytes_reserved: u64,
    pub fill_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
    pub warnings: Vec<Warning>,
}

impl TransferReport {
    pub fn from(
        direction: Direction,
        root: PathBuf,
        started_at: DateTime<Utc>,
        counters: &TransferCounters,
        timer: &TelemetryTimer,
        warnings: Vec<Warning>,
    ) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_payload as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            direction,
            root,
            started_at,
            segments: counters.segments,
            frames_written: counters.frames_written,
            frames_skipped: counters.frames_skipped,
            bytes_payload: counters.bytes_payload,
            bytes_reserved: counters.bytes_reserved,
            fill_ratio: counters.fill_ratio(),
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
            warnings,
        }
    }

    /// Internal consistency: payload never exceeds reservation, stages fit in elapsed time.
    pub fn sanity_check(&self) -> bool {
        self.bytes_payload <= self.bytes_reserved
            && self.fill_ratio <= 1.0
            && self.stage_times.total() <= self.elapsed
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
