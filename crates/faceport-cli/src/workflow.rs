//! Workflow controller — the view and busy state machines over the
//! registration and detection flows.

use crate::notice::Notice;
use faceport_client::{ApiClient, DetectionOutcome, RegistrationRequest};
use faceport_media::{Camera, ImageReference, PhotoLibrary};
use std::path::{Path, PathBuf};

/// Which screen the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Form,
    CameraLive,
}

/// Per-action busy flag gating duplicate submissions of that action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Busy {
    #[default]
    Idle,
    Loading,
}

/// Camera settings the controller needs for a detection round.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    pub device: String,
    pub staging_dir: PathBuf,
    pub jpeg_quality: u8,
    pub warmup_frames: usize,
}

/// Drives media acquisition and the backend gateway, holding the form
/// state (name, staged photo) and the two state machines of the flow.
///
/// The camera handle is exclusively owned here while the live view is
/// open and torn down whenever it closes.
pub struct Controller {
    gateway: ApiClient,
    library: PhotoLibrary,
    camera_settings: CameraSettings,

    name: String,
    staged: Option<ImageReference>,
    view: View,
    camera: Option<Camera>,
    register_busy: Busy,
    detect_busy: Busy,
}

impl Controller {
    pub fn new(gateway: ApiClient, library: PhotoLibrary, camera_settings: CameraSettings) -> Self {
        Self {
            gateway,
            library,
            camera_settings,
            name: String::new(),
            staged: None,
            view: View::Form,
            camera: None,
            register_busy: Busy::Idle,
            detect_busy: Busy::Idle,
        }
    }

    pub fn gateway(&self) -> &ApiClient {
        &self.gateway
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn register_busy(&self) -> Busy {
        self.register_busy
    }

    pub fn detect_busy(&self) -> Busy {
        self.detect_busy
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn staged_photo(&self) -> Option<&ImageReference> {
        self.staged.as_ref()
    }

    /// Pick a photo from the library and stage it. Cancellation (no
    /// selection) leaves any previously staged photo unchanged.
    pub fn pick_photo(&mut self, selection: Option<&Path>) -> Option<Notice> {
        match self.library.pick(selection) {
            Ok(Some(image)) => {
                tracing::info!(uri = %image.uri, "photo staged");
                self.staged = Some(image);
                None
            }
            Ok(None) => None,
            Err(e) => Some(Notice::error("Error", format!("Failed to pick image: {e}"))),
        }
    }

    /// Submit the registration form.
    ///
    /// A blank name or a missing photo is a validation notice and never
    /// issues a network call. On success the form is cleared; on
    /// failure it is preserved for retry. The busy flag always returns
    /// to idle.
    pub async fn submit_registration(&mut self) -> Notice {
        if self.register_busy == Busy::Loading {
            return Notice::info("Please Wait", "Registration is already in progress");
        }
        if self.name.trim().is_empty() {
            return Notice::validation("Please enter a name");
        }
        let Some(photo) = self.staged.clone() else {
            return Notice::validation("Please upload a photo");
        };

        self.register_busy = Busy::Loading;
        let request = RegistrationRequest {
            name: self.name.trim().to_string(),
            photo,
        };
        let result = self.gateway.register(&request).await;
        self.register_busy = Busy::Idle;

        match result {
            Ok(receipt) => {
                self.name.clear();
                self.staged = None;
                Notice::success("Success", receipt.message)
            }
            Err(e) => Notice::from_gateway_error("Registration", &e),
        }
    }

    /// Open the detection view, requesting camera access lazily.
    ///
    /// Returns a denial notice and stays on the form when the camera
    /// cannot be opened; returns `None` once the live view is open.
    pub fn start_detection(&mut self) -> Option<Notice> {
        match Camera::open(&self.camera_settings.device) {
            Ok(camera) => {
                self.camera = Some(camera);
                self.view = View::CameraLive;
                tracing::info!(device = %self.camera_settings.device, "detection view opened");
                None
            }
            Err(e) => {
                tracing::warn!(device = %self.camera_settings.device, error = %e, "camera access refused");
                Some(Notice::error(
                    "Permission Required",
                    format!("Camera permission is required for detection: {e}"),
                ))
            }
        }
    }

    /// Capture a still and run one detection round.
    ///
    /// The round always ends back on the form with the camera released
    /// and the action idle, whatever the outcome.
    pub async fn run_detection(&mut self) -> Notice {
        if self.detect_busy == Busy::Loading {
            return Notice::info("Please Wait", "Detection is already in progress");
        }
        if self.camera.is_none() {
            return Notice::error("Error", "Camera is not ready yet");
        }

        self.detect_busy = Busy::Loading;
        let result = self.capture_and_detect().await;
        self.close_camera();

        match result {
            Ok(outcome) => Notice::from_detection(&outcome),
            Err(notice) => notice,
        }
    }

    async fn capture_and_detect(&self) -> Result<DetectionOutcome, Notice> {
        let Some(camera) = self.camera.as_ref() else {
            return Err(Notice::error("Error", "Camera is not ready yet"));
        };
        let image = camera
            .capture_still(
                &self.camera_settings.staging_dir,
                self.camera_settings.jpeg_quality,
                self.camera_settings.warmup_frames,
            )
            .map_err(|e| Notice::error("Error", format!("Capture failed: {e}")))?;

        self.gateway
            .detect(&image)
            .await
            .map_err(|e| Notice::from_gateway_error("Detection", &e))
    }

    /// Close the live view: discard the camera handle, return to the
    /// form, and settle the detect action back to idle.
    pub fn close_camera(&mut self) {
        if self.camera.take().is_some() {
            tracing::debug!("camera session released");
        }
        self.view = View::Form;
        self.detect_busy = Busy::Idle;
    }
}
