use faceport_media::ImageReference;
use serde::Deserialize;

/// Fallback confirmation text when the backend omits `message`.
pub const DEFAULT_REGISTER_MESSAGE: &str = "User registered successfully";

/// Fallback confirmation text for user removal.
pub const DEFAULT_REMOVE_MESSAGE: &str = "User deleted successfully";

/// A validated registration submission: non-empty trimmed name plus a
/// staged photo. Presence of both is enforced before any network call.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub name: String,
    pub photo: ImageReference,
}

/// Outcome of a successful registration call.
#[derive(Debug, Clone)]
pub struct RegistrationReceipt {
    /// User-visible confirmation text.
    pub message: String,
    pub user_id: Option<String>,
}

impl RegistrationReceipt {
    /// Build a receipt from a 2xx response body, falling back to a
    /// generic confirmation when the body carries no `message`.
    pub(crate) fn from_body(body: &str) -> Self {
        let parsed: Option<MessageBody> = serde_json::from_str(body).ok();
        let parsed = parsed.unwrap_or_default();
        Self {
            message: parsed
                .message
                .unwrap_or_else(|| DEFAULT_REGISTER_MESSAGE.to_string()),
            user_id: parsed.user_id,
        }
    }
}

/// Normalized interpretation of a detection response.
///
/// `recognized` and its dependent fields are only meaningful under
/// `faces_detected > 0`; normalization enforces that a zero-face
/// response carries no recognition data at all.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    pub faces_detected: u32,
    pub recognized: bool,
    pub user_name: Option<String>,
    /// Match confidence in [0, 1], present only when recognized.
    pub confidence: Option<f32>,
    /// Recognition-technique label, present only when recognized.
    pub method: Option<String>,
    /// Backend explanation when a face was detected but not recognized.
    pub message: Option<String>,
}

impl DetectionOutcome {
    /// Parse a 2xx detect body.
    ///
    /// A body missing expected keys is zero faces detected, not an
    /// error; only syntactically invalid JSON is rejected.
    pub fn from_body(body: &str) -> Result<Self, serde_json::Error> {
        let wire: DetectBody = serde_json::from_str(body)?;
        Ok(Self::from_wire(wire))
    }

    fn from_wire(wire: DetectBody) -> Self {
        let faces_detected = wire.faces_detected;
        if faces_detected == 0 {
            return Self {
                faces_detected: 0,
                ..Self::default()
            };
        }

        let recognition = wire.recognition.unwrap_or_default();
        if recognition.recognized {
            Self {
                faces_detected,
                recognized: true,
                user_name: recognition.user_name,
                confidence: recognition.confidence,
                method: recognition.method,
                message: None,
            }
        } else {
            Self {
                faces_detected,
                recognized: false,
                user_name: None,
                confidence: None,
                method: None,
                message: recognition.message,
            }
        }
    }
}

/// A registered user as listed by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    #[serde(alias = "_id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Listing returned by the users endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserListing {
    #[serde(default)]
    pub users: Vec<RegisteredUser>,
    #[serde(default)]
    pub total_count: u64,
}

/// Backend health report.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Wire shape of a detect response. Everything is optional: the
/// distinction between "key absent" and "no face" is not one the
/// caller should ever see.
#[derive(Debug, Clone, Default, Deserialize)]
struct DetectBody {
    #[serde(default)]
    faces_detected: u32,
    #[serde(default)]
    recognition: Option<RecognitionBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RecognitionBody {
    #[serde(default)]
    recognized: bool,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Generic `{message, error, ...}` body used by register, remove, and
/// error responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// User-visible text from a non-2xx JSON body, preferring the backend's
/// `error` key over `message`.
pub(crate) fn api_error_text(body: &str) -> Option<String> {
    let parsed: MessageBody = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.message)
}
