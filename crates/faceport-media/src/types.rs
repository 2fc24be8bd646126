use serde::{Deserialize, Serialize};
use std::path::Path;

/// MIME type used when the source does not supply one.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// Filename used when the source does not supply one.
pub const DEFAULT_FILE_NAME: &str = "photo.jpg";

/// A photo staged for upload, from either the library or the camera.
///
/// Holds everything the upload needs: a local resource locator, the
/// MIME type, and the filename to present to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Local resource locator (a filesystem path).
    pub uri: String,
    pub mime_type: String,
    pub file_name: String,
}

impl ImageReference {
    /// Reference a library file verbatim, guessing the MIME type from the
    /// extension and the filename from the path, with defaults where the
    /// source supplies neither.
    pub fn for_path(path: &Path) -> Self {
        Self {
            uri: path.to_string_lossy().into_owned(),
            mime_type: mime_for_path(path).unwrap_or(DEFAULT_MIME).to_string(),
            file_name: path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_FILE_NAME)
                .to_string(),
        }
    }

    /// Reference a camera still. Capture output is always a JPEG named
    /// `photo.jpg`, regardless of capture metadata.
    pub fn for_capture(path: &Path) -> Self {
        Self {
            uri: path.to_string_lossy().into_owned(),
            mime_type: DEFAULT_MIME.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// MIME type for a known image extension; `None` for anything else.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path
        .extension()?
        .to_str()?
        .to_ascii_lowercase()
        .as_str()
    {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_known_extensions() {
        assert_eq!(mime_for_path(Path::new("a.jpg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.JPEG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.png")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a.webp")), Some("image/webp"));
    }

    #[test]
    fn test_mime_for_unknown_extension() {
        assert_eq!(mime_for_path(Path::new("a.txt")), None);
        assert_eq!(mime_for_path(Path::new("noext")), None);
    }

    #[test]
    fn test_for_path_fills_fields() {
        let image = ImageReference::for_path(Path::new("/pics/me.png"));
        assert_eq!(image.uri, "/pics/me.png");
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.file_name, "me.png");
    }

    #[test]
    fn test_for_path_defaults_when_source_is_silent() {
        let image = ImageReference::for_path(Path::new("/pics/selfie"));
        assert_eq!(image.mime_type, DEFAULT_MIME);
        assert_eq!(image.file_name, "selfie");

        // A bare root has no filename component at all.
        let image = ImageReference::for_path(Path::new("/"));
        assert_eq!(image.file_name, DEFAULT_FILE_NAME);
    }

    #[test]
    fn test_for_capture_is_fixed_jpeg() {
        let image = ImageReference::for_capture(Path::new("/tmp/faceport/photo.jpg"));
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.file_name, "photo.jpg");
    }
}
