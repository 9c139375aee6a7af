//! capture/split.rs
//! Splitting one concatenated capture stream into frame files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::codec::frame_file_name;
use crate::constants::MARKER_EOI;
use crate::layout::PixelFormat;

/// Fixed-size chunks of `frame_len` bytes; the last chunk may be short.
pub fn split_raw_planar(data: &[u8], frame_len: usize) -> Vec<&[u8]> {
    if frame_len == 0 {
        return Vec::new();
    }
    data.chunks(frame_len).collect()
}

/// Frames ending at each end-of-image marker, marker included.
///
/// Bytes after the last marker are not a complete frame and are dropped.
pub fn split_compressed(data: &[u8]) -> Vec<&[u8]> {
    let mut frames = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + MARKER_EOI.len() <= data.len() {
        if data[i..i + MARKER_EOI.len()] == MARKER_EOI {
            let end = i + MARKER_EOI.len();
            frames.push(&data[start..end]);
            start = end;
            i = end;
        } else {
            i += 1;
        }
    }
    frames
}

/// Split a stream by the rules of `format`.
pub fn split_stream(data: &[u8], format: PixelFormat) -> Vec<&[u8]> {
    match format {
        PixelFormat::Compressed => split_compressed(data),
        PixelFormat::RawPlanar => split_raw_planar(data, format.capacity() as usize),
    }
}

/// Write `frame_NNNN.<ext>` files into `dir`, returning their paths in order.
pub fn write_frames<B: AsRef<[u8]>>(
    dir: &Path,
    format: PixelFormat,
    frames: &[B],
) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::with_capacity(frames.len());
    for (i, frame) in frames.iter().enumerate() {
        let path = dir.join(frame_file_name(i, format));
        fs::write(&path, frame.as_ref())?;
        paths.push(path);
    }
    Ok(paths)
}
