//! codec/naming.rs
//! Userspace tree naming: `NN/frame_NNNN.<ext>`.

use crate::constants::naming::{FRAME_DIGITS, FRAME_PREFIX, SEGMENT_DIGITS};
use crate::layout::PixelFormat;

pub fn segment_dir_name(index: usize) -> String {
    format!("{:0width$}", index, width = SEGMENT_DIGITS)
}

pub fn frame_file_name(index: usize, format: PixelFormat) -> String {
    format!("{}{:0width$}.{}", FRAME_PREFIX, index, format.extension(), width = FRAME_DIGITS)
}

/// Segment index of a directory name made only of ASCII digits.
pub fn parse_segment_dir_name(name: &str) -> Option<usize> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

/// `(frame index, extension)` of a `frame_<digits>.<ext>` file name.
///
/// The extension is returned as written; mapping it to a format is the
/// caller's decision.
pub fn parse_frame_file_name(name: &str) -> Option<(usize, &str)> {
    let rest = name.strip_prefix(FRAME_PREFIX)?;
    let (digits, ext) = rest.split_once('.')?;
    if digits.is_empty() || ext.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, ext))
}
