//! codec/import.rs
//! Kernelspace framestore -> fresh userspace tree.
//!
//! Size reconciliation per format:
//! - fixed-size: always read the full slot; an oversized declared size is a
//!   warning (fatal under `strict_raw_sizes`)
//! - variable-size: oversized is fatal, zero is a warning and leaves a hole,
//!   and the payload must start with the format's magic

use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::codec::naming::{frame_file_name, segment_dir_name};
use crate::codec::FramestoreCodec;
use crate::diagnostics::{Diagnostics, Warning};
use crate::layout::{PixelFormat, SegmentView};
use crate::store::RawIo;
use crate::telemetry::{Direction, Stage, TelemetryTimer, TransferCounters, TransferReport};
use crate::types::{FramestoreError, Result};
use crate::utils::{fmt_bytes, head};

/// Outcome of reconciling one declared size against its slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadPlan {
    /// Read this many bytes; `warning` is set when the declared size was clamped.
    Read { len: usize, warning: Option<Warning> },
    /// Write no file for this index.
    Skip(Warning),
}

/// Apply the size-reconciliation policy to frame `frame` of `seg`.
pub fn reconcile(seg: &SegmentView, frame: usize, declared: u32, strict_raw_sizes: bool) -> Result<ReadPlan> {
    let capacity = seg.format.capacity();

    if seg.format.is_fixed_size() {
        if declared <= capacity {
            return Ok(ReadPlan::Read { len: capacity as usize, warning: None });
        }
        if strict_raw_sizes {
            return Err(FramestoreError::FrameTooLarge {
                segment: seg.index,
                frame,
                declared,
                capacity,
            });
        }
        let warning = Warning::OversizedRawFrame {
            segment: seg.index,
            frame,
            declared,
            capacity,
        };
        return Ok(ReadPlan::Read { len: capacity as usize, warning: Some(warning) });
    }

    if declared > capacity {
        return Err(FramestoreError::FrameTooLarge {
            segment: seg.index,
            frame,
            declared,
            capacity,
        });
    }
    if declared == 0 {
        return Ok(ReadPlan::Skip(Warning::EmptyCompressedFrame { segment: seg.index, frame }));
    }
    Ok(ReadPlan::Read { len: declared as usize, warning: None })
}

impl<S: RawIo, D: Diagnostics> FramestoreCodec<S, D> {
    /// Recreate `target` from the framestore, one file per frame.
    ///
    /// `target` is removed first if it exists. A failure midway leaves it
    /// partially populated.
    pub fn import_from_device(&mut self, target: &Path) -> Result<TransferReport> {
        let started_at = Utc::now();
        let mut timer = TelemetryTimer::new();
        let mut counters = TransferCounters::default();
        let mut warnings = Vec::new();

        let table = timer.time(Stage::Metadata, || self.read_table())?;
        table.check_bounds()?;
        if let Err(e) = table.validate() {
            warn!(error = %e, "offset tables are not prefix sums; using stored offsets");
        }
        if !table.padding_is_zero() {
            debug!("metadata slots past the segment count are not zero");
        }
        let segments = table.segments()?;
        info!(
            target = %target.display(),
            segments = segments.len(),
            frames = table.total_frames(),
            "importing from framestore"
        );

        if target.exists() {
            fs::remove_dir_all(target)?;
        }
        fs::create_dir_all(target)?;

        for seg in &segments {
            let sizes = table.frame_sizes_of(seg.index)?;
            let dir = target.join(segment_dir_name(seg.index));
            fs::create_dir(&dir)?;
            counters.add_segment(seg.slot_bytes());
            info!(
                segment = seg.index,
                format = %seg.format,
                frames = seg.frame_count,
                data_offset = seg.data_offset,
                size_offset = seg.size_offset,
                "segment"
            );

            for (j, &declared) in sizes.iter().enumerate() {
                let len = match reconcile(seg, j, declared, self.config.strict_raw_sizes)? {
                    ReadPlan::Read { len, warning } => {
                        if let Some(w) = warning {
                            self.diagnostics.warn(w.clone());
                            warnings.push(w);
                            counters.add_warning();
                        }
                        len
                    }
                    ReadPlan::Skip(w) => {
                        self.diagnostics.warn(w.clone());
                        warnings.push(w);
                        counters.add_warning();
                        counters.add_skipped();
                        continue;
                    }
                };

                let offset = seg.frame_offset(j);
                let data = timer.time(Stage::Read, || self.store.read_arena(offset, len))?;

                if let Some(magic) = seg.format.magic() {
                    if !data.starts_with(&magic) {
                        return Err(FramestoreError::MagicMismatch {
                            segment: seg.index,
                            frame: j,
                            have: head(&data, magic.len()).to_vec(),
                            need: magic.to_vec(),
                        });
                    }
                }

                let path = dir.join(frame_file_name(j, seg.format));
                timer.time(Stage::Write, || fs::write(&path, &data))?;
                counters.add_frame(data.len());

                if let (Some(hook), PixelFormat::RawPlanar) = (&self.raw_post, seg.format) {
                    hook(&path)?;
                }

                debug!(
                    segment = seg.index,
                    frame = j,
                    offset,
                    declared,
                    len,
                    head = %fmt_bytes(head(&data, 2)),
                    "frame read"
                );
            }
        }

        timer.finish();
        let report = TransferReport::from(
            Direction::Import,
            target.to_path_buf(),
            started_at,
            &counters,
            &timer,
            warnings,
        );
        info!(
            frames = report.frames_written,
            skipped = report.frames_skipped,
            warnings = report.warnings.len(),
            "import finished"
        );
        Ok(report)
    }
}
