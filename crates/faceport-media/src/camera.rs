//! V4L2 camera capture via the `v4l` crate.

use crate::frame;
use crate::types::ImageReference;
use std::path::Path;
use thiserror::Error;
use v4l::buffer::Type as BufType;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("camera access denied: {0}")]
    AccessDenied(String),
    #[error("device busy")]
    DeviceBusy,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("format negotiation failed: {0}")]
    FormatNegotiationFailed(String),
    #[error("streaming not supported")]
    StreamingNotSupported,
}

/// Info about a discovered V4L2 device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
    pub driver: String,
    pub bus: String,
}

/// Negotiated pixel format for the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Motion-JPEG: each buffer is already a complete JPEG image.
    Mjpeg,
    /// YUYV 4:2:2 packed (2 bytes/pixel, converted to RGB for encoding).
    Yuyv,
}

/// V4L2 camera device handle.
///
/// Ownership of the handle is the "camera session": the detection view
/// holds it while live and drops it on close.
pub struct Camera {
    device: Device,
    pub width: u32,
    pub height: u32,
    pub device_path: String,
    pub fourcc: FourCC,
    pixel_format: PixelFormat,
}

impl Camera {
    /// Open a V4L2 camera device by path (e.g., "/dev/video0").
    ///
    /// Opening is also the lazy camera-permission check: a missing,
    /// busy, or unreadable device maps to a distinct error so callers
    /// can refuse to open the detection view.
    pub fn open(device_path: &str) -> Result<Self, CameraError> {
        if !Path::new(device_path).exists() {
            return Err(CameraError::DeviceNotFound(device_path.to_string()));
        }

        let device = Device::with_path(device_path).map_err(|e| {
            let text = e.to_string();
            if text.contains("busy") || text.contains("EBUSY") {
                CameraError::DeviceBusy
            } else if text.contains("denied") || text.contains("EACCES") {
                CameraError::AccessDenied(format!("{device_path}: {e}"))
            } else {
                CameraError::DeviceNotFound(format!("{device_path}: {e}"))
            }
        })?;

        let caps = device.query_caps().map_err(|e| {
            CameraError::CaptureFailed(format!("failed to query capabilities: {e}"))
        })?;

        tracing::info!(
            device = device_path,
            driver = %caps.driver,
            card = %caps.card,
            "opened camera"
        );

        if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
            return Err(CameraError::StreamingNotSupported);
        }

        // Request 1280x720 MJPG first (buffers arrive as ready-made JPEG);
        // fall back to YUYV if the driver will not negotiate it.
        let mut fmt = device.format().map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to get format: {e}"))
        })?;
        fmt.width = 1280;
        fmt.height = 720;
        fmt.fourcc = FourCC::new(b"MJPG");

        let mut negotiated = device.set_format(&fmt).map_err(|e| {
            CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
        })?;

        if negotiated.fourcc != FourCC::new(b"MJPG") {
            fmt.fourcc = FourCC::new(b"YUYV");
            negotiated = device.set_format(&fmt).map_err(|e| {
                CameraError::FormatNegotiationFailed(format!("failed to set format: {e}"))
            })?;
        }

        let fourcc = negotiated.fourcc;
        let pixel_format = if fourcc == FourCC::new(b"MJPG") {
            PixelFormat::Mjpeg
        } else if fourcc == FourCC::new(b"YUYV") {
            PixelFormat::Yuyv
        } else {
            return Err(CameraError::FormatNegotiationFailed(format!(
                "unsupported pixel format: {fourcc:?} (need MJPG or YUYV)"
            )));
        };

        tracing::info!(
            width = negotiated.width,
            height = negotiated.height,
            fourcc = ?fourcc,
            "negotiated format"
        );

        Ok(Self {
            device,
            width: negotiated.width,
            height: negotiated.height,
            device_path: device_path.to_string(),
            fourcc,
            pixel_format,
        })
    }

    /// Take a single still photograph and stage it as `photo.jpg` in
    /// `staging_dir`.
    ///
    /// Discards `warmup` frames while auto-exposure settles (plus any
    /// dark YUYV frames, up to a bounded number of attempts), then
    /// encodes the first acceptable frame as JPEG at `quality`.
    pub fn capture_still(
        &self,
        staging_dir: &Path,
        quality: u8,
        warmup: usize,
    ) -> Result<ImageReference, CameraError> {
        let mut stream =
            MmapStream::with_buffers(&self.device, BufType::VideoCapture, 4).map_err(|e| {
                CameraError::CaptureFailed(format!("failed to create mmap stream: {e}"))
            })?;

        let max_attempts = warmup + 6;
        let mut jpeg: Option<Vec<u8>> = None;

        for attempt in 0..max_attempts {
            let (buf, meta) = stream.next().map_err(|e| {
                CameraError::CaptureFailed(format!("failed to dequeue buffer: {e}"))
            })?;

            if attempt < warmup {
                continue;
            }

            let used = (meta.bytesused as usize).min(buf.len());
            if used == 0 {
                tracing::debug!(seq = meta.sequence, "skipping empty buffer");
                continue;
            }
            let data = &buf[..used];

            match self.pixel_format {
                PixelFormat::Mjpeg => {
                    // Drivers occasionally emit truncated junk right after
                    // stream-on; require the JPEG SOI marker.
                    if data.len() < 2 || data[..2] != [0xFF, 0xD8] {
                        tracing::debug!(seq = meta.sequence, "skipping non-JPEG buffer");
                        continue;
                    }
                    jpeg = Some(data.to_vec());
                }
                PixelFormat::Yuyv => {
                    if frame::yuyv_is_dark(data, 0.95) {
                        tracing::debug!(seq = meta.sequence, "skipping dark frame");
                        continue;
                    }
                    let rgb = frame::yuyv_to_rgb(data, self.width, self.height)
                        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
                    let encoded = frame::encode_jpeg(&rgb, self.width, self.height, quality)
                        .map_err(|e| CameraError::CaptureFailed(e.to_string()))?;
                    jpeg = Some(encoded);
                }
            }

            if jpeg.is_some() {
                break;
            }
        }

        let jpeg = jpeg.ok_or_else(|| {
            CameraError::CaptureFailed("capture produced no usable image".to_string())
        })?;

        std::fs::create_dir_all(staging_dir).map_err(|e| {
            CameraError::CaptureFailed(format!("failed to create staging dir: {e}"))
        })?;
        let staged = staging_dir.join(crate::types::DEFAULT_FILE_NAME);
        std::fs::write(&staged, &jpeg).map_err(|e| {
            CameraError::CaptureFailed(format!("failed to stage capture: {e}"))
        })?;

        tracing::info!(
            path = %staged.display(),
            bytes = jpeg.len(),
            "captured still"
        );

        Ok(ImageReference::for_capture(&staged))
    }

    /// List available V4L2 video capture devices.
    pub fn list_devices() -> Vec<DeviceInfo> {
        let mut devices = Vec::new();

        for i in 0..16 {
            let path = format!("/dev/video{i}");
            if !Path::new(&path).exists() {
                continue;
            }
            let Ok(dev) = Device::with_path(&path) else {
                continue;
            };
            let Ok(caps) = dev.query_caps() else {
                continue;
            };
            if !caps.capabilities.contains(v4l::capability::Flags::VIDEO_CAPTURE) {
                continue;
            }
            devices.push(DeviceInfo {
                path,
                name: caps.card.clone(),
                driver: caps.driver.clone(),
                bus: caps.bus.clone(),
            });
        }

        devices
    }
}
