//! faceport-client — Backend gateway for the face registration/detection
//! service.
//!
//! Builds the multipart register/detect requests and normalizes backend
//! responses into client-side result shapes. All of the actual
//! computer-vision work happens behind these endpoints.

pub mod config;
pub mod gateway;
pub mod types;

pub use config::{ClientConfig, Endpoints};
pub use gateway::{ApiClient, GatewayError};
pub use types::{
    DetectionOutcome, HealthReport, RegisteredUser, RegistrationReceipt, RegistrationRequest,
    UserListing,
};
