//! Camera capture and frame mirroring.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use framestore_core::capture::{capture_sequence, mirror_file, mirror_yuyv, CapturePlan, PostProcess};
use framestore_core::constants::geometry;

/// Run the capture command.
pub fn capture(dir: &Path, plan: &str, device: &Path, mirror: bool) -> Result<()> {
    let plan = CapturePlan::parse(plan)?;
    tracing::info!(dir = %dir.display(), %plan, device = %device.display(), mirror, "Capturing");

    let (width, height) = (geometry::YUYV.0 as usize, geometry::YUYV.1 as usize);
    let mirror_post = move |p: &Path| mirror_file(p, width, height);
    let post: Option<PostProcess<'_>> = if mirror { Some(&mirror_post) } else { None };
    let segments = capture_sequence(dir, &plan, device, post)
        .with_context(|| format!("Capture into {} failed", dir.display()))?;

    for seg in &segments {
        println!("{:02} {} ({} frames)", seg.index, seg.format, seg.frames.len());
    }
    Ok(())
}

/// Run the mirror command.
pub fn mirror(input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let out = mirror_yuyv(&data, width as usize, height as usize)?;
    fs::write(output, out).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}
