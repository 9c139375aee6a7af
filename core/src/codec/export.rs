//! codec/export.rs
//! Userspace tree -> kernelspace framestore.

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info};

use crate::codec::scan::{scan_tree, ScannedSegment};
use crate::codec::FramestoreCodec;
use crate::diagnostics::Diagnostics;
use crate::layout::{encode_table, PixelFormat, SegmentTable};
use crate::store::{write_blobs, RawIo};
use crate::telemetry::{Direction, Stage, TelemetryTimer, TransferCounters, TransferReport};
use crate::types::{FramestoreError, Result};
use crate::utils::{fmt_bytes, head};

/// Format recorded for a segment with no frame files.
pub const EMPTY_SEGMENT_FORMAT: PixelFormat = PixelFormat::Compressed;

/// Build the segment table a scanned tree would produce, using the file
/// lengths seen at scan time.
///
/// Fails on any frame that does not fit its slot.
pub fn plan_table(segments: &[ScannedSegment]) -> Result<SegmentTable> {
    let mut table = SegmentTable::new();
    for seg in segments {
        let format = seg.format.unwrap_or(EMPTY_SEGMENT_FORMAT);
        table.push_segment(format, seg.frames.len())?;
        for frame in &seg.frames {
            let len = check_fits(seg.index, frame.index, format, frame.len)?;
            table.push_frame_size(len);
        }
    }
    Ok(table)
}

fn check_fits(segment: usize, frame: usize, format: PixelFormat, len: u64) -> Result<u32> {
    let capacity = format.capacity();
    if len > capacity as u64 {
        return Err(FramestoreError::FrameTooLarge {
            segment,
            frame,
            declared: u32::try_from(len).unwrap_or(u32::MAX),
            capacity,
        });
    }
    Ok(len as u32)
}

impl<S: RawIo, D: Diagnostics> FramestoreCodec<S, D> {
    /// Overwrite the arena and all metadata files with the contents of `source`.
    ///
    /// No rollback: a failure after the first arena write leaves the
    /// framestore in a mixed state. Metadata is written only after every
    /// frame has been placed.
    pub fn export_to_device(&mut self, source: &Path) -> Result<TransferReport> {
        let started_at = Utc::now();
        let mut timer = TelemetryTimer::new();
        let mut counters = TransferCounters::default();

        let segments = timer.time(Stage::Scan, || scan_tree(source))?;
        let mut table = plan_table(&segments)?;

        let capacity = self.arena_capacity();
        let required = table.required_arena_bytes()?;
        if required > capacity {
            return Err(FramestoreError::ArenaOverflow { required, capacity });
        }
        info!(
            source = %source.display(),
            segments = segments.len(),
            frames = table.total_frames(),
            required,
            capacity,
            "exporting to framestore"
        );

        let mut addressed = 0u64;
        for seg in &segments {
            let view = table.segment(seg.index)?;
            counters.add_segment(view.slot_bytes());
            info!(
                segment = view.index,
                format = %view.format,
                frames = view.frame_count,
                data_offset = view.data_offset,
                size_offset = view.size_offset,
                "segment"
            );

            for frame in &seg.frames {
                addressed += view.format.capacity() as u64;
                if addressed > capacity {
                    return Err(FramestoreError::ArenaOverflow { required: addressed, capacity });
                }

                let data = timer.time(Stage::Read, || fs::read(&frame.path))?;
                // Re-checked: the file may have changed since the scan.
                let len = check_fits(view.index, frame.index, view.format, data.len() as u64)?;

                let offset = view.frame_offset(frame.index);
                timer.time(Stage::Write, || self.store.write_arena(offset, &data))?;
                table.frame_sizes[view.size_offset + frame.index] = len;
                counters.add_frame(data.len());

                debug!(
                    segment = view.index,
                    frame = frame.index,
                    offset,
                    len,
                    head = %fmt_bytes(head(&data, 2)),
                    "frame written"
                );
            }
        }

        let blobs = encode_table(&table);
        timer.time(Stage::Metadata, || write_blobs(&mut self.store, &blobs))?;
        timer.finish();

        let report = TransferReport::from(
            Direction::Export,
            source.to_path_buf(),
            started_at,
            &counters,
            &timer,
            Vec::new(),
        );
        info!(
            frames = report.frames_written,
            bytes = report.bytes_payload,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "export finished"
        );
        Ok(report)
    }
}
