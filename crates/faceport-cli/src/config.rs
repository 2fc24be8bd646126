//! Application configuration, from an optional TOML file with
//! `FACEPORT_*` environment overrides.

use faceport_client::{ClientConfig, Endpoints};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base address of the face service.
    pub base_url: String,
    /// Explicit endpoint overrides; derived from `base_url` when absent.
    pub register_url: Option<String>,
    pub detect_url: Option<String>,
    /// Bound on a detect round trip, in seconds.
    pub detect_timeout_secs: u64,
    /// V4L2 device path for detection captures.
    pub camera_device: String,
    /// Directory of images standing in for the device gallery.
    pub library_dir: PathBuf,
    /// Where staged uploads are written.
    pub staging_dir: PathBuf,
    /// JPEG quality for staged images (1–100).
    pub jpeg_quality: u8,
    /// Center-crop library picks square before upload.
    pub square_crop: bool,
    /// Frames to discard while camera auto-exposure settles.
    pub warmup_frames: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self {
            base_url: faceport_client::config::DEFAULT_BASE_URL.to_string(),
            register_url: None,
            detect_url: None,
            detect_timeout_secs: 30,
            camera_device: "/dev/video0".to_string(),
            library_dir: PathBuf::from(home).join("Pictures"),
            staging_dir: std::env::temp_dir().join("faceport"),
            jpeg_quality: 80,
            square_crop: true,
            warmup_frames: 4,
        }
    }
}

impl AppConfig {
    /// Load configuration: TOML file first (explicit path, else
    /// `FACEPORT_CONFIG`, else `./faceport.toml`), then environment
    /// overrides on top.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("FACEPORT_CONFIG").map(PathBuf::from).ok())
            .unwrap_or_else(|| PathBuf::from("faceport.toml"));

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str(&text) {
                Ok(config) => {
                    tracing::debug!(path = %path.display(), "loaded config file");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "bad config file; using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        };
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("FACEPORT_BASE_URL") {
            self.base_url = v;
        }
        if let Ok(v) = std::env::var("FACEPORT_REGISTER_URL") {
            self.register_url = Some(v);
        }
        if let Ok(v) = std::env::var("FACEPORT_DETECT_URL") {
            self.detect_url = Some(v);
        }
        if let Ok(v) = std::env::var("FACEPORT_CAMERA_DEVICE") {
            self.camera_device = v;
        }
        if let Ok(v) = std::env::var("FACEPORT_LIBRARY_DIR") {
            self.library_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("FACEPORT_STAGING_DIR") {
            self.staging_dir = PathBuf::from(v);
        }
        self.detect_timeout_secs = env_u64("FACEPORT_DETECT_TIMEOUT_SECS", self.detect_timeout_secs);
        self.jpeg_quality = env_u8("FACEPORT_JPEG_QUALITY", self.jpeg_quality);
        self.warmup_frames = env_usize("FACEPORT_WARMUP_FRAMES", self.warmup_frames);
        if let Ok(v) = std::env::var("FACEPORT_SQUARE_CROP") {
            self.square_crop = v != "0";
        }
    }

    /// Gateway configuration with the endpoint overrides applied.
    pub fn client_config(&self) -> ClientConfig {
        let mut endpoints = Endpoints::from_base(&self.base_url);
        if let Some(url) = &self.register_url {
            endpoints.register_url = url.clone();
        }
        if let Some(url) = &self.detect_url {
            endpoints.detect_url = url.clone();
        }
        ClientConfig {
            endpoints,
            detect_timeout: Duration::from_secs(self.detect_timeout_secs),
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u8(key: &str, default: u8) -> u8 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
