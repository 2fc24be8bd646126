//! User-visible notices — the single surface every outcome funnels into.

use faceport_client::{DetectionOutcome, GatewayError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// A notice shown to the user at the end of an operation. Errors are
/// never fatal; the user may always retry.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn success(title: &str, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.to_string(),
            body: body.into(),
        }
    }

    pub fn info(title: &str, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.to_string(),
            body: body.into(),
        }
    }

    pub fn error(title: &str, body: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            body: body.into(),
        }
    }

    /// Client-side validation failure; no I/O has happened.
    pub fn validation(body: impl Into<String>) -> Self {
        Self::error("Error", body)
    }

    /// Interpret a detection outcome into one of the three results.
    pub fn from_detection(outcome: &DetectionOutcome) -> Self {
        if outcome.faces_detected == 0 {
            return Self::info(
                "No Face Detected",
                "No face was detected in the captured image.",
            );
        }

        if outcome.recognized {
            let name = outcome.user_name.as_deref().unwrap_or("Unknown user");
            let mut body = match outcome.confidence {
                Some(confidence) => {
                    format!("{name} recognized with {:.1}% confidence", confidence * 100.0)
                }
                None => format!("{name} recognized"),
            };
            if let Some(method) = &outcome.method {
                body.push_str(&format!(" ({method})"));
            }
            Self::success("Recognition Successful", body)
        } else {
            Self::info(
                "Face Detected",
                outcome
                    .message
                    .clone()
                    .unwrap_or_else(|| "Face detected but not recognized.".to_string()),
            )
        }
    }

    /// Convert a gateway failure into a notice, preferring the
    /// backend-supplied text for API rejections.
    pub fn from_gateway_error(action: &str, err: &GatewayError) -> Self {
        let body = match err {
            GatewayError::Api { .. } => err
                .api_message()
                .unwrap_or_else(|| format!("{action} failed")),
            GatewayError::Timeout(deadline) => {
                format!("{action} timed out after {}s", deadline.as_secs())
            }
            other => format!("{action} failed: {other}"),
        };
        Self::error("Error", body)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}
