//! HTTP gateway to the face service — multipart request construction,
//! dispatch, and response normalization.

use crate::config::ClientConfig;
use crate::types::{
    self, DetectionOutcome, HealthReport, RegistrationReceipt, RegistrationRequest, UserListing,
};
use faceport_media::ImageReference;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("detection timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed backend response: {0}")]
    Parse(String),
    #[error("failed to read staged photo {uri}: {source}")]
    Staging {
        uri: String,
        source: std::io::Error,
    },
    #[error("invalid upload payload: {0}")]
    Payload(String),
}

impl GatewayError {
    /// Backend-supplied `error`/`message` text from a non-2xx JSON body.
    pub fn api_message(&self) -> Option<String> {
        match self {
            Self::Api { body, .. } => types::api_error_text(body),
            _ => None,
        }
    }
}

/// Client for the face service. Endpoints and the detect deadline are
/// injected at construction; no call is ever retried automatically.
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("faceport/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Register a name with a photo.
    ///
    /// Multipart body: trimmed `name` text field plus a `photo` file
    /// field with the reference's URI contents, MIME type, and filename
    /// forwarded verbatim. Any 2xx is success.
    pub async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<RegistrationReceipt, GatewayError> {
        let form = Form::new()
            .text("name", request.name.trim().to_string())
            .part("photo", photo_part(&request.photo).await?);

        tracing::debug!(
            url = %self.config.endpoints.register_url,
            name = %request.name.trim(),
            photo = %request.photo.file_name,
            "sending registration"
        );

        let response = self
            .http
            .post(&self.config.endpoints.register_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "registration rejected");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let receipt = RegistrationReceipt::from_body(&body);
        tracing::info!(user_id = ?receipt.user_id, "registration accepted");
        Ok(receipt)
    }

    /// Submit a captured photo for detection, bounded by the configured
    /// deadline. Exceeding it aborts the in-flight request.
    pub async fn detect(&self, image: &ImageReference) -> Result<DetectionOutcome, GatewayError> {
        let form = Form::new().part("photo", photo_part(image).await?);

        tracing::debug!(
            url = %self.config.endpoints.detect_url,
            timeout = ?self.config.detect_timeout,
            "sending detection capture"
        );

        let result = self
            .http
            .post(&self.config.endpoints.detect_url)
            .multipart(form)
            .timeout(self.config.detect_timeout)
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(GatewayError::Timeout(self.config.detect_timeout))
            }
            Err(e) => return Err(GatewayError::Transport(e.to_string())),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                return Err(GatewayError::Timeout(self.config.detect_timeout))
            }
            Err(e) => return Err(GatewayError::Transport(e.to_string())),
        };

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "detection rejected");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let outcome = DetectionOutcome::from_body(&body)
            .map_err(|e| GatewayError::Parse(e.to_string()))?;
        tracing::info!(
            faces = outcome.faces_detected,
            recognized = outcome.recognized,
            "detection outcome"
        );
        Ok(outcome)
    }

    /// List registered users.
    pub async fn list_users(&self) -> Result<UserListing, GatewayError> {
        let body = self.get_checked(&self.config.endpoints.users_url()).await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Parse(e.to_string()))
    }

    /// Remove a registered user by id. Returns the backend confirmation.
    pub async fn remove_user(&self, id: &str) -> Result<String, GatewayError> {
        let url = self.config.endpoints.user_url(id);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(id, "user removed");
        let parsed: types::MessageBody = serde_json::from_str(&body).unwrap_or_default();
        Ok(parsed
            .message
            .unwrap_or_else(|| types::DEFAULT_REMOVE_MESSAGE.to_string()))
    }

    /// Fetch the backend health report.
    pub async fn health(&self) -> Result<HealthReport, GatewayError> {
        let body = self.get_checked(&self.config.endpoints.health_url()).await?;
        serde_json::from_str(&body).map_err(|e| GatewayError::Parse(e.to_string()))
    }

    async fn get_checked(&self, url: &str) -> Result<String, GatewayError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Build the `photo` file part from an image reference.
async fn photo_part(image: &ImageReference) -> Result<Part, GatewayError> {
    let bytes = tokio::fs::read(&image.uri)
        .await
        .map_err(|source| GatewayError::Staging {
            uri: image.uri.clone(),
            source,
        })?;
    Part::bytes(bytes)
        .file_name(image.file_name.clone())
        .mime_str(&image.mime_type)
        .map_err(|e| GatewayError::Payload(e.to_string()))
}
