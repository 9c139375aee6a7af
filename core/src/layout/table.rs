//! layout/table.rs
//! The segment table: five fixed-capacity parallel arrays plus the flat
//! frame-size table.
//!
//! Offsets are never stored independently of the frame counts that produce
//! them: `push_segment` derives both offsets by prefix sum from the previous
//! segment, so the export side cannot build an inconsistent table.

use crate::constants::N_SEGMS_MAX;
use crate::layout::types::{LayoutError, MetaFile, PixelFormat};

/// Fixed-stride byte offset of frame `index` within a segment starting at `data_offset`.
#[inline]
pub fn frame_offset(data_offset: u64, index: usize, format: PixelFormat) -> u64 {
    data_offset + index as u64 * format.capacity() as u64
}

/// Typed view of one used segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentView {
    pub index: usize,
    pub format: PixelFormat,
    pub frame_count: usize,
    pub data_offset: u64,
    pub size_offset: usize,
}

impl SegmentView {
    #[inline]
    pub fn frame_offset(&self, frame: usize) -> u64 {
        frame_offset(self.data_offset, frame, self.format)
    }

    /// Arena bytes reserved by this segment's slots.
    #[inline]
    pub fn slot_bytes(&self) -> u64 {
        self.frame_count as u64 * self.format.capacity() as u64
    }

    /// One past the last arena byte this segment may address.
    #[inline]
    pub fn data_end(&self) -> u64 {
        self.data_offset + self.slot_bytes()
    }
}

/// Kernelspace metadata, decoded.
///
/// Slots at and beyond `segment_count` are zero on the export side and
/// ignored on the import side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    pub segment_count: usize,
    pub formats: [u8; N_SEGMS_MAX],
    pub frame_counts: [u16; N_SEGMS_MAX],
    pub data_offsets: [u32; N_SEGMS_MAX],
    pub size_offsets: [u16; N_SEGMS_MAX],
    pub frame_sizes: Vec<u32>,
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self {
            segment_count: 0,
            formats: [0; N_SEGMS_MAX],
            frame_counts: [0; N_SEGMS_MAX],
            data_offsets: [0; N_SEGMS_MAX],
            size_offsets: [0; N_SEGMS_MAX],
            frame_sizes: Vec::new(),
        }
    }
}

impl SegmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offsets the next pushed segment will receive, as (data offset, size-table offset).
    pub fn next_offsets(&self) -> (u64, usize) {
        match self.segment_count {
            0 => (0, 0),
            n => {
                let prev = n - 1;
                let fmt_prev = PixelFormat::try_from(self.formats[prev])
                    .map(PixelFormat::capacity)
                    .unwrap_or(0);
                let count_prev = self.frame_counts[prev] as u64;
                (
                    self.data_offsets[prev] as u64 + count_prev * fmt_prev as u64,
                    self.size_offsets[prev] as usize + count_prev as usize,
                )
            }
        }
    }

    /// Append a segment, deriving its offsets from the previous one.
    ///
    /// Frame sizes of all previous segments must already be recorded: the
    /// size table and the size-table offsets are kept in lockstep.
    pub fn push_segment(
        &mut self,
        format: PixelFormat,
        frame_count: usize,
    ) -> Result<SegmentView, LayoutError> {
        let index = self.segment_count;
        if index >= N_SEGMS_MAX {
            return Err(LayoutError::TooManySegments { have: index + 1, max: N_SEGMS_MAX });
        }

        let (data_offset, size_offset) = self.next_offsets();
        if self.frame_sizes.len() != size_offset {
            return Err(LayoutError::OffsetMismatch {
                field: MetaFile::SizeTableOffsets,
                segment: index,
                have: self.frame_sizes.len() as u64,
                need: size_offset as u64,
            });
        }

        self.frame_counts[index] = narrow_u16(MetaFile::SegmentFrameCounts, frame_count as u64)?;
        self.data_offsets[index] = narrow_u32(MetaFile::DataOffsets, data_offset)?;
        self.size_offsets[index] = narrow_u16(MetaFile::SizeTableOffsets, size_offset as u64)?;
        self.formats[index] = format.code();
        self.segment_count += 1;

        Ok(SegmentView {
            index,
            format,
            frame_count,
            data_offset,
            size_offset,
        })
    }

    /// Record the real payload length of the next frame slot.
    pub fn push_frame_size(&mut self, size: u32) {
        self.frame_sizes.push(size);
    }

    /// View of used segment `i`.
    pub fn segment(&self, i: usize) -> Result<SegmentView, LayoutError> {
        if i >= self.segment_count.min(N_SEGMS_MAX) {
            return Err(LayoutError::TooManySegments { have: i + 1, max: self.segment_count });
        }
        Ok(SegmentView {
            index: i,
            format: PixelFormat::verify(self.formats[i], i)?,
            frame_count: self.frame_counts[i] as usize,
            data_offset: self.data_offsets[i] as u64,
            size_offset: self.size_offsets[i] as usize,
        })
    }

    pub fn segments(&self) -> Result<Vec<SegmentView>, LayoutError> {
        (0..self.segment_count).map(|i| self.segment(i)).collect()
    }

    /// Slice of the flat frame-size table belonging to segment `i`.
    pub fn frame_sizes_of(&self, i: usize) -> Result<&[u32], LayoutError> {
        let seg = self.segment(i)?;
        let end = seg.size_offset + seg.frame_count;
        if end > self.frame_sizes.len() {
            return Err(LayoutError::SizeTableOutOfRange {
                segment: i,
                end,
                len: self.frame_sizes.len(),
            });
        }
        Ok(&self.frame_sizes[seg.size_offset..end])
    }

    /// The flat frame-size table regrouped per segment.
    pub fn grouped(&self) -> Result<Vec<&[u32]>, LayoutError> {
        (0..self.segment_count).map(|i| self.frame_sizes_of(i)).collect()
    }

    /// Total frames described by the used segments.
    pub fn total_frames(&self) -> usize {
        self.frame_counts[..self.segment_count.min(N_SEGMS_MAX)]
            .iter()
            .map(|&n| n as usize)
            .sum()
    }

    /// Arena bytes reserved by the used segments.
    pub fn required_arena_bytes(&self) -> Result<u64, LayoutError> {
        Ok(self.segments()?.iter().map(SegmentView::slot_bytes).sum())
    }

    /// Structural checks needed before any read: segment count, format
    /// codes and size-table slices.
    pub fn check_bounds(&self) -> Result<(), LayoutError> {
        if self.segment_count > N_SEGMS_MAX {
            return Err(LayoutError::TooManySegments { have: self.segment_count, max: N_SEGMS_MAX });
        }
        for i in 0..self.segment_count {
            self.frame_sizes_of(i)?;
        }
        Ok(())
    }

    /// Full validation: bounds plus the prefix-sum invariants on both offset arrays.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.check_bounds()?;

        let mut data_need = 0u64;
        let mut size_need = 0u64;
        for seg in self.segments()? {
            if seg.data_offset != data_need {
                return Err(LayoutError::OffsetMismatch {
                    field: MetaFile::DataOffsets,
                    segment: seg.index,
                    have: seg.data_offset,
                    need: data_need,
                });
            }
            if seg.size_offset as u64 != size_need {
                return Err(LayoutError::OffsetMismatch {
                    field: MetaFile::SizeTableOffsets,
                    segment: seg.index,
                    have: seg.size_offset as u64,
                    need: size_need,
                });
            }
            data_need += seg.slot_bytes();
            size_need += seg.frame_count as u64;
        }
        Ok(())
    }

    /// True when every slot beyond `segment_count` is zero.
    pub fn padding_is_zero(&self) -> bool {
        let n = self.segment_count.min(N_SEGMS_MAX);
        self.formats[n..].iter().all(|&v| v == 0)
            && self.frame_counts[n..].iter().all(|&v| v == 0)
            && self.data_offsets[n..].iter().all(|&v| v == 0)
            && self.size_offsets[n..].iter().all(|&v| v == 0)
    }

    /// One line per segment: index, format, frame count and sizes.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for i in 0..self.segment_count.min(N_SEGMS_MAX) {
            let fmt = PixelFormat::try_from(self.formats[i])
                .map(|f| f.extension().to_string())
                .unwrap_or_else(|_| format!("0x{:02x}", self.formats[i]));
            match self.frame_sizes_of(i) {
                Ok(sizes) => out.push_str(&format!("{} {} ({}) {:?}\n", i, fmt, sizes.len(), sizes)),
                Err(e) => out.push_str(&format!("{} {} <{}>\n", i, fmt, e)),
            }
        }
        out
    }
}

fn narrow_u16(field: MetaFile, value: u64) -> Result<u16, LayoutError> {
    u16::try_from(value).map_err(|_| LayoutError::FieldOverflow { field, value, max: u16::MAX as u64 })
}

fn narrow_u32(field: MetaFile, value: u64) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::FieldOverflow { field, value, max: u32::MAX as u64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MJPG_FRAME_SIZE_MAX, YUYV_FRAME_SIZE};

    #[test]
    fn first_segment_starts_at_zero() {
        let mut t = SegmentTable::new();
        let seg = t.push_segment(PixelFormat::Compressed, 4).unwrap();
        assert_eq!((seg.data_offset, seg.size_offset), (0, 0));
    }

    #[test]
    fn push_requires_previous_sizes() {
        let mut t = SegmentTable::new();
        t.push_segment(PixelFormat::RawPlanar, 2).unwrap();
        t.push_frame_size(YUYV_FRAME_SIZE);
        let err = t.push_segment(PixelFormat::RawPlanar, 1).unwrap_err();
        assert!(matches!(err, LayoutError::OffsetMismatch { field: MetaFile::SizeTableOffsets, .. }));
    }

    #[test]
    fn frame_offset_is_fixed_stride() {
        assert_eq!(frame_offset(100, 0, PixelFormat::Compressed), 100);
        assert_eq!(
            frame_offset(100, 3, PixelFormat::Compressed),
            100 + 3 * MJPG_FRAME_SIZE_MAX as u64
        );
    }

    #[test]
    fn summary_lists_segments() {
        let mut t = SegmentTable::new();
        t.push_segment(PixelFormat::Compressed, 1).unwrap();
        t.push_frame_size(9);
        assert_eq!(t.summary(), "0 mjpg (1) [9]\n");
    }
}
