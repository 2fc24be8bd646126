//! Raw frame handling — YUYV conversion, dark-frame detection, JPEG encoding.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("JPEG encoding failed: {0}")]
    Encode(String),
}

/// Convert packed YUYV (4:2:2) to RGB24 using BT.601 coefficients.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]. The U/V pair is
/// shared by both pixels.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for chunk in yuyv[..expected].chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&yuv_to_rgb(y0, u, v));
        rgb.extend_from_slice(&yuv_to_rgb(y1, u, v));
    }
    Ok(rgb)
}

fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = y as f32 - 16.0;
    let d = u as f32 - 128.0;
    let e = v as f32 - 128.0;
    [
        clamp_channel(1.164 * c + 1.596 * e),
        clamp_channel(1.164 * c - 0.392 * d - 0.813 * e),
        clamp_channel(1.164 * c + 2.017 * d),
    ]
}

fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Check if a YUYV frame is dark by sampling its luma (even-indexed) bytes.
///
/// Returns true if more than `threshold_pct` of pixels fall in the
/// darkest range (0–31). Used to skip frames while auto-exposure settles.
pub fn yuyv_is_dark(yuyv: &[u8], threshold_pct: f32) -> bool {
    let luma_count = yuyv.len() / 2;
    if luma_count == 0 {
        return true;
    }
    let dark_count = yuyv.iter().step_by(2).filter(|&&y| y < 32).count();
    (dark_count as f32 / luma_count as f32) > threshold_pct
}

/// Encode an RGB24 buffer as JPEG at the given quality (1–100).
pub fn encode_jpeg(rgb: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, FrameError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode(rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| FrameError::Encode(e.to_string()))?;
    Ok(out)
}
