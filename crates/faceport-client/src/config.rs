use std::time::Duration;

/// Base address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Default bound on a detect round trip.
pub const DEFAULT_DETECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolved endpoint addresses for the face service.
///
/// Register and detect may be overridden individually; the remaining
/// routes derive from the base address.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub base_url: String,
    pub register_url: String,
    pub detect_url: String,
}

impl Endpoints {
    /// Derive all endpoints from a base address such as
    /// `http://host:5000/api`.
    pub fn from_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            base_url: base.to_string(),
            register_url: format!("{base}/register"),
            detect_url: format!("{base}/detect"),
        }
    }

    pub fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }

    pub fn user_url(&self, id: &str) -> String {
        format!("{}/user/{id}", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::from_base(DEFAULT_BASE_URL)
    }
}

/// Configuration injected into the gateway at construction time.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: Endpoints,
    /// Bound on a detect round trip; exceeding it aborts the request.
    pub detect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            detect_timeout: DEFAULT_DETECT_TIMEOUT,
        }
    }
}
