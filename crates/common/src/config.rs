use serde::{Deserialize, Serialize};

use crate::validation::MAX_IMAGE_BYTES;

/// Top-level front end configuration, deserialized from floodaware.toml.
///
/// Every section is optional in the file; missing sections and keys take
/// the defaults below.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub uploads: UploadLimits,
    pub pages: PageSessionConfig,
}

impl FrontendConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// HTTP listener settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// The external flood analysis service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Upper bound on one analysis request, after which it counts as failed.
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://flood-risk-backend-production.up.railway.app".into(),
            request_timeout_seconds: 30,
            user_agent: "FloodAware-Web/0.1".into(),
        }
    }
}

/// Image upload limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadLimits {
    /// Largest image accepted by validation.
    pub max_image_bytes: u64,
    /// Largest body read for form posts. Image uploads are streamed and
    /// capped by `max_image_bytes` instead.
    pub request_body_limit_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_BYTES,
            request_body_limit_bytes: 32 * 1024 * 1024,
        }
    }
}

/// Lifetime of mounted flood-detection pages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSessionConfig {
    /// A page not touched for this long is unmounted.
    pub idle_ttl_seconds: u64,
    /// Cap on concurrently mounted pages. The least recently used is evicted.
    pub max_sessions: usize,
}

impl Default for PageSessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_seconds: 1800,
            max_sessions: 1000,
        }
    }
}
