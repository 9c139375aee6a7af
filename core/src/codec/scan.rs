//! codec/scan.rs
//! Discovery of segments and frames in a userspace tree.
//!
//! Entries that do not look like segment directories or frame files are
//! ignored, as are frame files with an extension no format claims (such as
//! `frame_0000.png` previews next to raw frames). Everything else must be
//! numbered contiguously from zero.

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::naming::{parse_frame_file_name, parse_segment_dir_name};
use crate::constants::N_SEGMS_MAX;
use crate::layout::{LayoutError, PixelFormat};
use crate::types::{FramestoreError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFrame {
    pub index: usize,
    pub path: PathBuf,
    /// File length at scan time.
    pub len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedSegment {
    pub index: usize,
    pub path: PathBuf,
    /// `None` when the segment holds no frame files.
    pub format: Option<PixelFormat>,
    pub frames: Vec<ScannedFrame>,
}

/// Walk `root` once and return its segments in index order.
pub fn scan_tree(root: &Path) -> Result<Vec<ScannedSegment>> {
    if !root.is_dir() {
        return Err(FramestoreError::precondition(root, "source directory does not exist"));
    }

    let mut dirs = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        match name.to_str().and_then(parse_segment_dir_name) {
            Some(index) => dirs.push((index, entry.path())),
            None => tracing::debug!(path = %entry.path().display(), "ignoring non-segment directory"),
        }
    }
    dirs.sort();

    if dirs.len() > N_SEGMS_MAX {
        return Err(LayoutError::TooManySegments { have: dirs.len(), max: N_SEGMS_MAX }.into());
    }
    check_contiguous(root, "segment", dirs.iter().map(|(i, _)| *i))?;

    dirs.into_iter()
        .map(|(index, path)| scan_segment(index, &path))
        .collect()
}

/// List the frame files of one segment directory.
pub fn scan_segment(index: usize, dir: &Path) -> Result<ScannedSegment> {
    let mut frames = Vec::new();
    let mut format: Option<PixelFormat> = None;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            entries.push(entry);
        }
    }

    for entry in entries {
        let name = entry.file_name();
        let Some((frame_index, ext)) = name.to_str().and_then(parse_frame_file_name) else {
            tracing::debug!(path = %entry.path().display(), "ignoring non-frame file");
            continue;
        };

        let Some(this) = PixelFormat::from_extension(ext) else {
            tracing::debug!(path = %entry.path().display(), ext, "ignoring frame file of unknown format");
            continue;
        };
        match format {
            None => format = Some(this),
            Some(seen) if seen != this => {
                return Err(FramestoreError::precondition(
                    dir,
                    format!("mixed formats in one segment: {} and {}", seen, this),
                ));
            }
            Some(_) => {}
        }

        frames.push(ScannedFrame {
            index: frame_index,
            path: entry.path(),
            len: entry.metadata()?.len(),
        });
    }

    frames.sort_by_key(|f| f.index);
    check_contiguous(dir, "frame", frames.iter().map(|f| f.index))?;

    Ok(ScannedSegment {
        index,
        path: dir.to_path_buf(),
        format,
        frames,
    })
}

/// Sorted indices must be exactly `0..n`.
fn check_contiguous(path: &Path, what: &str, sorted: impl Iterator<Item = usize>) -> Result<()> {
    for (expected, found) in sorted.enumerate() {
        if found != expected {
            let reason = if found < expected {
                format!("duplicate {} index {}", what, found)
            } else {
                format!("{} index {} missing (next found is {})", what, expected, found)
            };
            return Err(FramestoreError::precondition(path, reason));
        }
    }
    Ok(())
}
