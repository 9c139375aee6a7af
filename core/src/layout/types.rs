//! layout/types.rs
//! Wire-level types shared by both marshalling directions.
//!
//! Notes:
//! - Format codes are single ASCII bytes so the driver can print them.
//! - Every multi-byte integer on the interface is little-endian.
//! - Slot capacities are per format and never change at runtime; the arena
//!   is addressed with a fixed stride per segment.

use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

use crate::constants::{format_codes, geometry, MAGIC_SOI, MJPG_FRAME_SIZE_MAX, YUYV_FRAME_SIZE};
use crate::utils::enum_name_or_hex;

/// Pixel format of a segment, as stored in `segm_fmats`.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Motion JPEG: variable-length frames up to a fixed ceiling.
    Compressed = format_codes::MJPG,
    /// Packed YUYV 4:2:2: every frame has one exact size.
    RawPlanar = format_codes::YUYV,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 2] = [PixelFormat::Compressed, PixelFormat::RawPlanar];

    /// Parse a wire code, reporting the segment it came from on failure.
    pub fn verify(raw: u8, segment: usize) -> Result<Self, LayoutError> {
        PixelFormat::try_from_primitive(raw).map_err(|_| LayoutError::UnknownFormat { segment, raw })
    }

    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Slot size reserved in the arena for every frame of this format.
    #[inline]
    pub const fn capacity(self) -> u32 {
        match self {
            PixelFormat::Compressed => MJPG_FRAME_SIZE_MAX,
            PixelFormat::RawPlanar => YUYV_FRAME_SIZE,
        }
    }

    /// True when every frame occupies exactly `capacity()` bytes.
    #[inline]
    pub const fn is_fixed_size(self) -> bool {
        matches!(self, PixelFormat::RawPlanar)
    }

    /// Leading signature every payload must carry, if the format has one.
    #[inline]
    pub const fn magic(self) -> Option<[u8; 2]> {
        match self {
            PixelFormat::Compressed => Some(MAGIC_SOI),
            PixelFormat::RawPlanar => None,
        }
    }

    /// File extension used for frame files in the userspace tree.
    pub const fn extension(self) -> &'static str {
        match self {
            PixelFormat::Compressed => "mjpg",
            PixelFormat::RawPlanar => "yuyv",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        PixelFormat::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// V4L2 pixelformat name passed to the capture tool.
    pub const fn fourcc(self) -> &'static str {
        match self {
            PixelFormat::Compressed => "MJPG",
            PixelFormat::RawPlanar => "YUYV",
        }
    }

    /// One-letter code used in capture plans (`3y,2m`).
    pub const fn plan_letter(self) -> char {
        match self {
            PixelFormat::Compressed => 'm',
            PixelFormat::RawPlanar => 'y',
        }
    }

    pub fn from_plan_letter(c: char) -> Option<Self> {
        PixelFormat::ALL.into_iter().find(|f| f.plan_letter() == c)
    }

    /// Default (width, height) requested from the camera.
    pub const fn default_geometry(self) -> (u32, u32) {
        match self {
            PixelFormat::Compressed => geometry::MJPG,
            PixelFormat::RawPlanar => geometry::YUYV,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// The metadata pseudo-files exposed next to the arena.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetaFile {
    SegmentCount,
    SegmentFormats,
    SegmentFrameCounts,
    DataOffsets,
    SizeTableOffsets,
    FrameSizes,
}

impl MetaFile {
    /// Write order used by export: the count first, the flat size table last.
    pub const ALL: [MetaFile; 6] = [
        MetaFile::SegmentCount,
        MetaFile::SegmentFormats,
        MetaFile::SegmentFrameCounts,
        MetaFile::DataOffsets,
        MetaFile::SizeTableOffsets,
        MetaFile::FrameSizes,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            MetaFile::SegmentCount => "n_segms",
            MetaFile::SegmentFormats => "segm_fmats",
            MetaFile::SegmentFrameCounts => "segm_nframes",
            MetaFile::DataOffsets => "offsets_fdata",
            MetaFile::SizeTableOffsets => "offsets_fsizes",
            MetaFile::FrameSizes => "fsizes",
        }
    }

    /// Element width in bytes; `None` for the ASCII scalar.
    pub const fn element_width(self) -> Option<usize> {
        match self {
            MetaFile::SegmentCount => None,
            MetaFile::SegmentFormats => Some(1),
            MetaFile::SegmentFrameCounts => Some(2),
            MetaFile::DataOffsets => Some(4),
            MetaFile::SizeTableOffsets => Some(2),
            MetaFile::FrameSizes => Some(4),
        }
    }
}

impl fmt::Display for MetaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Name of the arena pseudo-file.
pub const ARENA_FILE: &str = "fdata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Segment format byte is not a recognised code.
    UnknownFormat { segment: usize, raw: u8 },

    /// Array byte length is not a multiple of its element width.
    Misaligned { file: MetaFile, len: usize, width: usize },

    /// Array holds fewer elements than the segment count requires.
    TooShort { file: MetaFile, have: usize, need: usize },

    /// More segments than the fixed-capacity arrays can describe.
    TooManySegments { have: usize, max: usize },

    /// A value does not fit the fixed-width field it is stored in.
    FieldOverflow { field: MetaFile, value: u64, max: u64 },

    /// The ASCII segment count could not be parsed.
    BadCount(String),

    /// An offset does not match the prefix sum over the previous segments.
    OffsetMismatch { field: MetaFile, segment: usize, have: u64, need: u64 },

    /// A segment's slice of the frame-size table runs past its end.
    SizeTableOutOfRange { segment: usize, end: usize, len: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LayoutError::*;
        match self {
            UnknownFormat { segment, raw } =>
                write!(f, "segment {}: unknown format code {}", segment,
                    enum_name_or_hex::<PixelFormat>(*raw)),
            Misaligned { file, len, width } =>
                write!(f, "{}: {} bytes is not a multiple of {}", file, len, width),
            TooShort { file, have, need } =>
                write!(f, "{}: {} elements < {}", file, have, need),
            TooManySegments { have, max } =>
                write!(f, "too many segments: {} > {}", have, max),
            FieldOverflow { field, value, max } =>
                write!(f, "{}: value {} exceeds field maximum {}", field, value, max),
            BadCount(text) =>
                write!(f, "n_segms: cannot parse {:?}", text),
            OffsetMismatch { field, segment, have, need } =>
                write!(f, "{}[{}] = {}, prefix sum gives {}", field, segment, have, need),
            SizeTableOutOfRange { segment, end, len } =>
                write!(f, "segment {}: frame sizes end at {} but table holds {}", segment, end, len),
        }
    }
}

impl std::error::Error for LayoutError {}

/// Raw contents of the six metadata pseudo-files, exactly as read or written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaBlobs {
    pub segment_count: Vec<u8>,
    pub segment_formats: Vec<u8>,
    pub segment_frame_counts: Vec<u8>,
    pub data_offsets: Vec<u8>,
    pub size_offsets: Vec<u8>,
    pub frame_sizes: Vec<u8>,
}

impl MetaBlobs {
    pub fn get(&self, file: MetaFile) -> &[u8] {
        match file {
            MetaFile::SegmentCount => &self.segment_count,
            MetaFile::SegmentFormats => &self.segment_formats,
            MetaFile::SegmentFrameCounts => &self.segment_frame_counts,
            MetaFile::DataOffsets => &self.data_offsets,
            MetaFile::SizeTableOffsets => &self.size_offsets,
            MetaFile::FrameSizes => &self.frame_sizes,
        }
    }

    pub fn get_mut(&mut self, file: MetaFile) -> &mut Vec<u8> {
        match file {
            MetaFile::SegmentCount => &mut self.segment_count,
            MetaFile::SegmentFormats => &mut self.segment_formats,
            MetaFile::SegmentFrameCounts => &mut self.segment_frame_counts,
            MetaFile::DataOffsets => &mut self.data_offsets,
            MetaFile::SizeTableOffsets => &mut self.size_offsets,
            MetaFile::FrameSizes => &mut self.frame_sizes,
        }
    }

    /// Blobs in export write order.
    pub fn iter(&self) -> impl Iterator<Item = (MetaFile, &[u8])> {
        MetaFile::ALL.into_iter().map(move |f| (f, self.get(f)))
    }
}
