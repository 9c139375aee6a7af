//! constants.rs
//! Fixed geometry of the kernelspace framestore.
//!
//! These values are shared with the driver that owns the arena; both sides
//! must agree on them byte for byte.

/// Slot ceiling for a compressed (MJPG) frame. Frames are variable-length up to this.
pub const MJPG_FRAME_SIZE_MAX: u32 = 0x80000;

/// Exact slot size of a raw-planar (YUYV 640x480, 2 bytes per pixel) frame.
pub const YUYV_FRAME_SIZE: u32 = 614_400;

/// Total capacity of the frame data arena (`fdata`).
pub const FDATA_MAX: u64 = 2000 * YUYV_FRAME_SIZE as u64;

/// Capacity of every per-segment metadata array.
pub const N_SEGMS_MAX: usize = 20;

/// Upper bound on the flat frame-size table: the most slots the arena can address.
pub const N_FRAMES_MAX: usize = (FDATA_MAX / MJPG_FRAME_SIZE_MAX as u64) as usize;

/// Default location of the framestore pseudo-files exposed by the uvcvideo driver.
pub const DEFAULT_FRAMESTORE_DIR: &str = "/sys/kernel/debug/usb/uvcvideo/sb/framestore";

/// JPEG start-of-image marker, the first two bytes of every compressed frame.
pub const MAGIC_SOI: [u8; 2] = [0xFF, 0xD8];

/// JPEG end-of-image marker, used to split a raw MJPG capture into frames.
pub const MARKER_EOI: [u8; 2] = [0xFF, 0xD9];

/// Wire codes stored in `segm_fmats`, one byte per segment.
pub mod format_codes {
    pub const UNUSED: u8 = 0x00;
    pub const MJPG: u8 = b'M';
    pub const YUYV: u8 = b'Y';
}

/// Userspace directory naming.
pub mod naming {
    /// Zero-padded width of a segment directory name (`00`, `01`, ...).
    pub const SEGMENT_DIGITS: usize = 2;
    /// Zero-padded width of the frame index in `frame_0000.<ext>`.
    pub const FRAME_DIGITS: usize = 4;
    pub const FRAME_PREFIX: &str = "frame_";
}

/// Default capture geometry per format (width, height).
pub mod geometry {
    pub const YUYV: (u32, u32) = (640, 480);
    pub const MJPG: (u32, u32) = (1280, 720);
}

/// Default capture device node.
pub const DEFAULT_CAPTURE_DEVICE: &str = "/dev/video2";
