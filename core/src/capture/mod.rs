//! capture/mod.rs
//! Producing a userspace segment tree from a camera.
//!
//! The camera is driven through `v4l2-ctl`, which writes one concatenated
//! stream per segment; the stream is then split into frame files.

pub mod plan;
pub mod split;
pub mod mirror;

pub use plan::*;
pub use split::*;
pub use mirror::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec::segment_dir_name;
use crate::layout::PixelFormat;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("bad capture plan: {0}")]
    BadPlan(String),

    #[error("frame is {len} bytes, {width}x{height} YUYV needs {need}")]
    BadFrameLength {
        len: usize,
        width: usize,
        height: usize,
        need: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Something that can record `spec.frames` frames into `out`.
pub trait StreamSource {
    fn capture(&mut self, spec: &CaptureSpec, out: &Path) -> Result<(), CaptureError>;
}

/// `v4l2-ctl` on the host.
#[derive(Debug, Clone, Default)]
pub struct V4l2Ctl;

pub const V4L2_CTL: &str = "v4l2-ctl";

impl StreamSource for V4l2Ctl {
    fn capture(&mut self, spec: &CaptureSpec, out: &Path) -> Result<(), CaptureError> {
        capture_stream(spec, out)
    }
}

/// Run `v4l2-ctl` once, streaming `spec.frames` frames into `out`.
pub fn capture_stream(spec: &CaptureSpec, out: &Path) -> Result<(), CaptureError> {
    let args = [
        "--device".to_string(),
        spec.device.display().to_string(),
        "--stream-mmap".to_string(),
        "-v".to_string(),
        spec.format_arg(),
        format!("--stream-to={}", out.display()),
        format!("--stream-count={}", spec.frames),
    ];
    debug!(program = V4L2_CTL, ?args, "spawning capture");

    let output = Command::new(V4L2_CTL)
        .args(&args)
        .output()
        .map_err(|source| CaptureError::Spawn { program: V4L2_CTL.to_string(), source })?;

    if !output.status.success() {
        return Err(CaptureError::Failed {
            program: V4L2_CTL.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Per-frame hook run on raw-planar frame files after splitting.
pub type PostProcess<'a> = &'a dyn Fn(&Path) -> Result<(), CaptureError>;

/// Mirror a raw-planar frame file in place.
pub fn mirror_file(path: &Path, width: usize, height: usize) -> Result<(), CaptureError> {
    let data = fs::read(path)?;
    let out = mirror_yuyv(&data, width, height)?;
    fs::write(path, out)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedSegment {
    pub index: usize,
    pub format: PixelFormat,
    pub frames: Vec<PathBuf>,
}

/// Capture every segment of `plan` from `device` into `root` using `v4l2-ctl`.
pub fn capture_sequence(
    root: &Path,
    plan: &CapturePlan,
    device: &Path,
    post: Option<PostProcess<'_>>,
) -> Result<Vec<CapturedSegment>, CaptureError> {
    capture_sequence_with(&mut V4l2Ctl, root, plan, device, post)
}

/// Like `capture_sequence`, with an explicit stream source.
///
/// `root` is replaced, never merged. Each segment streams into a temporary
/// `tmp.<ext>` inside its own directory, which is removed after splitting.
pub fn capture_sequence_with<C: StreamSource + ?Sized>(
    source: &mut C,
    root: &Path,
    plan: &CapturePlan,
    device: &Path,
    post: Option<PostProcess<'_>>,
) -> Result<Vec<CapturedSegment>, CaptureError> {
    if root.exists() {
        fs::remove_dir_all(root)?;
    }
    fs::create_dir_all(root)?;

    let mut captured = Vec::with_capacity(plan.len());
    for (index, seg) in plan.segments.iter().enumerate() {
        let dir = root.join(segment_dir_name(index));
        fs::create_dir(&dir)?;

        let spec = CaptureSpec::new(device, seg.format, seg.frames);
        let tmp = dir.join(format!("tmp.{}", seg.format.extension()));
        info!(segment = index, format = %seg.format, frames = seg.frames, "capturing");
        source.capture(&spec, &tmp)?;

        let data = fs::read(&tmp)?;
        let chunks = split_stream(&data, seg.format);
        let frames = write_frames(&dir, seg.format, &chunks)?;
        fs::remove_file(&tmp)?;
        debug!(segment = index, written = frames.len(), "stream split");

        if let (Some(post), PixelFormat::RawPlanar) = (post, seg.format) {
            let slot = seg.format.capacity() as usize;
            for (frame, chunk) in frames.iter().zip(&chunks) {
                if chunk.len() != slot {
                    warn!(
                        path = %frame.display(),
                        len = chunk.len(),
                        slot,
                        "partial raw frame; not post-processed"
                    );
                    continue;
                }
                post(frame)?;
            }
        }

        captured.push(CapturedSegment { index, format: seg.format, frames });
    }
    Ok(captured)
}
