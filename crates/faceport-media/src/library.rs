//! Photo library — a directory of images standing in for the device gallery.

use crate::frame;
use crate::types::{self, ImageReference};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("image not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("failed to stage image: {0}")]
    Staging(#[from] std::io::Error),
}

/// Single-selection picker over the library directory.
///
/// Mirrors the system photo picker's configuration: single selection,
/// square-crop editing, and ~0.8 JPEG compression on the way out.
pub struct PhotoLibrary {
    dir: PathBuf,
    staging_dir: PathBuf,
    jpeg_quality: u8,
    square_crop: bool,
}

impl PhotoLibrary {
    /// Open the library, probing read access once as a side effect.
    ///
    /// An inaccessible directory is logged but does not block later
    /// picks; a pick of an unreachable file fails naturally instead.
    pub fn open(dir: PathBuf, staging_dir: PathBuf, jpeg_quality: u8, square_crop: bool) -> Self {
        match std::fs::read_dir(&dir) {
            Ok(_) => tracing::debug!(dir = %dir.display(), "photo library accessible"),
            Err(e) => tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "photo library not accessible; picks may fail"
            ),
        }
        Self {
            dir,
            staging_dir,
            jpeg_quality,
            square_crop,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Pick a single image from the library.
    ///
    /// `None` means the pick was canceled: no image, no state change.
    /// A relative selection is resolved against the library directory.
    /// With editing enabled the image is center-cropped square and
    /// re-encoded as JPEG into the staging directory; otherwise the
    /// source file is forwarded verbatim.
    pub fn pick(&self, selection: Option<&Path>) -> Result<Option<ImageReference>, LibraryError> {
        let Some(selection) = selection else {
            tracing::debug!("pick canceled");
            return Ok(None);
        };

        let path = if selection.is_absolute() {
            selection.to_path_buf()
        } else {
            self.dir.join(selection)
        };
        if !path.exists() {
            return Err(LibraryError::NotFound(path));
        }

        if !self.square_crop {
            let image = ImageReference::for_path(&path);
            tracing::info!(uri = %image.uri, mime = %image.mime_type, "picked image verbatim");
            return Ok(Some(image));
        }

        let decoded = image::open(&path).map_err(|e| LibraryError::Decode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let (w, h) = (decoded.width(), decoded.height());
        let side = w.min(h);
        let cropped = decoded
            .crop_imm((w - side) / 2, (h - side) / 2, side, side)
            .to_rgb8();
        let jpeg = frame::encode_jpeg(cropped.as_raw(), side, side, self.jpeg_quality)
            .map_err(|e| LibraryError::Decode {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let file_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| format!("{s}.jpg"))
            .unwrap_or_else(|| types::DEFAULT_FILE_NAME.to_string());

        std::fs::create_dir_all(&self.staging_dir)?;
        let staged = self.staging_dir.join(&file_name);
        std::fs::write(&staged, &jpeg)?;

        tracing::info!(
            source = %path.display(),
            staged = %staged.display(),
            side,
            "picked and staged image"
        );

        Ok(Some(ImageReference {
            uri: staged.to_string_lossy().into_owned(),
            mime_type: types::DEFAULT_MIME.to_string(),
            file_name,
        }))
    }
}
