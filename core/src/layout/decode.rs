//! layout/decode.rs
//!
//! Metadata decoding utilities.
//!
//! Design notes:
//! - The driver exposes whole fixed-size blobs, so arrays may be longer than
//!   needed. Only the first `segment_count` entries are required; anything
//!   past `N_SEGMS_MAX` is ignored.
//! - Blob lengths that are not a multiple of the element width are rejected.

use byteorder::{ByteOrder, LittleEndian};

use crate::constants::N_SEGMS_MAX;
use crate::layout::table::SegmentTable;
use crate::layout::types::{LayoutError, MetaBlobs, MetaFile};

/// Parse the ASCII segment count, tolerating trailing whitespace and NULs.
pub fn decode_count(buf: &[u8]) -> Result<usize, LayoutError> {
    let text = String::from_utf8_lossy(buf);
    let trimmed = text.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0');
    trimmed
        .parse::<usize>()
        .map_err(|_| LayoutError::BadCount(text.into_owned()))
}

fn check_width(file: MetaFile, buf: &[u8], width: usize) -> Result<usize, LayoutError> {
    if buf.len() % width != 0 {
        return Err(LayoutError::Misaligned { file, len: buf.len(), width });
    }
    Ok(buf.len() / width)
}

pub fn decode_u16s_le(file: MetaFile, buf: &[u8]) -> Result<Vec<u16>, LayoutError> {
    let n = check_width(file, buf, 2)?;
    let mut out = vec![0u16; n];
    LittleEndian::read_u16_into(buf, &mut out);
    Ok(out)
}

pub fn decode_u32s_le(file: MetaFile, buf: &[u8]) -> Result<Vec<u32>, LayoutError> {
    let n = check_width(file, buf, 4)?;
    let mut out = vec![0u32; n];
    LittleEndian::read_u32_into(buf, &mut out);
    Ok(out)
}

/// Copy the leading `need` entries of `src` into a zeroed fixed-capacity array.
fn into_fixed<T: Copy + Default>(
    file: MetaFile,
    src: &[T],
    need: usize,
) -> Result<[T; N_SEGMS_MAX], LayoutError> {
    if src.len() < need {
        return Err(LayoutError::TooShort { file, have: src.len(), need });
    }
    let mut out = [T::default(); N_SEGMS_MAX];
    let n = src.len().min(N_SEGMS_MAX);
    out[..n].copy_from_slice(&src[..n]);
    Ok(out)
}

/// Deserialize the six metadata blobs into a `SegmentTable`.
///
/// Only shape is checked here; offset consistency is `SegmentTable::validate`.
pub fn decode_table(blobs: &MetaBlobs) -> Result<SegmentTable, LayoutError> {
    let segment_count = decode_count(&blobs.segment_count)?;
    if segment_count > N_SEGMS_MAX {
        return Err(LayoutError::TooManySegments { have: segment_count, max: N_SEGMS_MAX });
    }

    let formats = into_fixed(MetaFile::SegmentFormats, &blobs.segment_formats, segment_count)?;
    let frame_counts = into_fixed(
        MetaFile::SegmentFrameCounts,
        &decode_u16s_le(MetaFile::SegmentFrameCounts, &blobs.segment_frame_counts)?,
        segment_count,
    )?;
    let data_offsets = into_fixed(
        MetaFile::DataOffsets,
        &decode_u32s_le(MetaFile::DataOffsets, &blobs.data_offsets)?,
        segment_count,
    )?;
    let size_offsets = into_fixed(
        MetaFile::SizeTableOffsets,
        &decode_u16s_le(MetaFile::SizeTableOffsets, &blobs.size_offsets)?,
        segment_count,
    )?;
    let frame_sizes = decode_u32s_le(MetaFile::FrameSizes, &blobs.frame_sizes)?;

    Ok(SegmentTable {
        segment_count,
        formats,
        frame_counts,
        data_offsets,
        size_offsets,
        frame_sizes,
    })
}
