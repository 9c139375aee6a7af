//! capture/mirror.rs
//! Horizontal mirror of a packed YUYV 4:2:2 frame.

use crate::capture::CaptureError;

/// Mirror `data` left to right.
///
/// Each macropixel `Y0 U Y1 V` is taken from the mirrored column and its
/// two luma samples swapped, so chroma stays paired with the right pixels.
pub fn mirror_yuyv(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, CaptureError> {
    let stride = width * 2;
    let need = stride * height;
    if width % 2 != 0 || data.len() != need {
        return Err(CaptureError::BadFrameLength {
            len: data.len(),
            width,
            height,
            need,
        });
    }

    let mut out = vec![0u8; need];
    for (src, dst) in data.chunks_exact(stride).zip(out.chunks_exact_mut(stride)) {
        for (col, px) in dst.chunks_exact_mut(4).enumerate() {
            let inv = stride - 4 - col * 4;
            let (y0, u, y1, v) = (src[inv], src[inv + 1], src[inv + 2], src[inv + 3]);
            px.copy_from_slice(&[y1, u, y0, v]);
        }
    }
    Ok(out)
}
