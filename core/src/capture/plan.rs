//! capture/plan.rs
//! Capture plans: `3y,2m` means three raw-planar frames, then two compressed.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::capture::CaptureError;
use crate::constants::N_SEGMS_MAX;
use crate::layout::PixelFormat;

/// One segment to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedSegment {
    pub format: PixelFormat,
    pub frames: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturePlan {
    pub segments: Vec<PlannedSegment>,
}

impl CapturePlan {
    pub fn parse(s: &str) -> Result<Self, CaptureError> {
        let mut segments = Vec::new();
        for item in s.split(',').map(str::trim) {
            let Some(letter) = item.chars().last() else {
                return Err(CaptureError::BadPlan(format!("empty entry in {:?}", s)));
            };
            let format = PixelFormat::from_plan_letter(letter.to_ascii_lowercase()).ok_or_else(|| {
                CaptureError::BadPlan(format!("{:?}: unknown format letter {:?}", item, letter))
            })?;
            let count = &item[..item.len() - letter.len_utf8()];
            let frames = count
                .parse::<u32>()
                .map_err(|_| CaptureError::BadPlan(format!("{:?}: bad frame count", item)))?;
            if frames == 0 {
                return Err(CaptureError::BadPlan(format!("{:?}: frame count must be at least 1", item)));
            }
            segments.push(PlannedSegment { format, frames });
        }
        if segments.len() > N_SEGMS_MAX {
            return Err(CaptureError::BadPlan(format!(
                "{} segments, the framestore holds at most {}",
                segments.len(),
                N_SEGMS_MAX
            )));
        }
        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for CapturePlan {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CapturePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}{}", seg.frames, seg.format.plan_letter())?;
        }
        Ok(())
    }
}

/// Everything the capture tool needs for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSpec {
    pub device: PathBuf,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub frames: u32,
}

impl CaptureSpec {
    /// Capture request using the format's default geometry.
    pub fn new(device: impl Into<PathBuf>, format: PixelFormat, frames: u32) -> Self {
        let (width, height) = format.default_geometry();
        Self {
            device: device.into(),
            format,
            width,
            height,
            frames,
        }
    }

    /// `width=..,height=..,pixelformat=..` for `v4l2-ctl -v`.
    pub fn format_arg(&self) -> String {
        format!(
            "width={},height={},pixelformat={}",
            self.width,
            self.height,
            self.format.fourcc()
        )
    }
}
