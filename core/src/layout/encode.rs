//! layout/encode.rs
//!
//! Metadata encoding utilities.
//!
//! Design notes:
//! - Fixed-capacity arrays are always emitted whole, unused slots zeroed.
//! - The frame-size table is emitted with exactly one entry per frame.
//! - The segment count is ASCII decimal, no trailing newline.

use byteorder::{ByteOrder, LittleEndian};

use crate::layout::table::SegmentTable;
use crate::layout::types::MetaBlobs;

#[inline]
pub fn encode_count(n: usize) -> Vec<u8> {
    n.to_string().into_bytes()
}

#[inline]
pub fn encode_u16s_le(values: &[u16]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * 2];
    LittleEndian::write_u16_into(values, &mut out);
    out
}

#[inline]
pub fn encode_u32s_le(values: &[u32]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * 4];
    LittleEndian::write_u32_into(values, &mut out);
    out
}

/// Serialize a `SegmentTable` into the six metadata blobs.
pub fn encode_table(t: &SegmentTable) -> MetaBlobs {
    MetaBlobs {
        segment_count: encode_count(t.segment_count),
        segment_formats: t.formats.to_vec(),
        segment_frame_counts: encode_u16s_le(&t.frame_counts),
        data_offsets: encode_u32s_le(&t.data_offsets),
        size_offsets: encode_u16s_le(&t.size_offsets),
        frame_sizes: encode_u32s_le(&t.frame_sizes),
    }
}
