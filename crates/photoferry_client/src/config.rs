//! Service endpoint configuration.

use photoferry_core::DeviceProfile;
use serde::{Deserialize, Serialize};

/// Endpoint that issues upload tokens and receives file data.
pub const DEFAULT_UPLOAD_ENDPOINT: &str =
    "https://photos.googleapis.com/data/upload/uploadmedia/interactive";

/// Base URL of the library RPC endpoints.
pub const DEFAULT_API_ENDPOINT: &str = "https://photosdata-pa.googleapis.com";

pub(crate) const HASH_CHECK_PATH: &str = "/6439526531001121323/5084965799730810217";
pub(crate) const COMMIT_PATH: &str = "/6439526531001121323/16538846908252377752";
pub(crate) const MEDIA_LIST_PATH: &str = "/6439526531001121323/18047484249733410717";

fn default_upload_endpoint() -> String {
    DEFAULT_UPLOAD_ENDPOINT.to_string()
}

fn default_api_endpoint() -> String {
    DEFAULT_API_ENDPOINT.to_string()
}

fn default_language() -> String {
    "en_US".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

/// Where and how to reach the service.
///
/// Deserializes from the `[service]` table of the application config.
/// Every field has a default, so an empty table is valid.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(
    default,
    setter(into),
    build_fn(error = "photoferry_error::BuilderError")
)]
pub struct ServiceConfig {
    /// Upload token and data endpoint
    #[serde(default = "default_upload_endpoint")]
    upload_endpoint: String,

    /// Base URL for hash check, commit and listing
    #[serde(default = "default_api_endpoint")]
    api_endpoint: String,

    /// Overrides the generated Android user agent
    #[serde(default)]
    #[setters(strip_option)]
    #[builder(setter(strip_option))]
    user_agent: Option<String>,

    /// Sent as `Accept-Language` and embedded in the user agent
    #[serde(default = "default_language")]
    language: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            upload_endpoint: default_upload_endpoint(),
            api_endpoint: default_api_endpoint(),
            user_agent: None,
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Start a builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// User agent for requests made on behalf of `device`.
    pub fn user_agent_for(&self, device: &DeviceProfile) -> String {
        match &self.user_agent {
            Some(agent) => agent.clone(),
            None => format!(
                "com.google.android.apps.photos/49029607 (Linux; U; Android 9; {}; {}; Build/PQ2A.190205.001; Cronet/127.0.6510.5) (gzip)",
                self.language,
                device.model()
            ),
        }
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_endpoint.trim_end_matches('/'), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photoferry_core::QualityTier;

    #[test]
    fn test_user_agent_names_device_model() {
        let config = ServiceConfig::default();
        let agent = config.user_agent_for(&DeviceProfile::for_upload(QualityTier::Saver, false));
        assert!(agent.contains("; en_US; Pixel 2;"));
    }

    #[test]
    fn test_explicit_user_agent_wins() {
        let config = ServiceConfig::default().with_user_agent("custom/1.0".to_string());
        assert_eq!(config.user_agent_for(&DeviceProfile::default()), "custom/1.0");
    }

    #[test]
    fn test_api_url_joins_without_double_slash() {
        let config = ServiceConfig::default().with_api_endpoint("http://localhost:9/".to_string());
        assert_eq!(
            config.api_url(COMMIT_PATH),
            "http://localhost:9/6439526531001121323/16538846908252377752"
        );
    }
}
