//! Client configuration surface.
//!
//! Both structs derive `Deserialize` so an external loader (config file,
//! environment, secret store) can produce them; this crate never parses
//! configuration sources itself.

use serde::Deserialize;
use sonyci_transfer::UploadConfig;

/// Service API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.cimediacloud.com";

/// Upload host base URL.
pub const DEFAULT_UPLOAD_HOST: &str = "https://io.cimediacloud.com";

/// Default workspace listing page size.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// OAuth password-grant credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// Client settings with service-documented defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub upload_host: String,
    /// Explicit workspace id; when unset a "Personal" workspace is resolved
    /// from the listing at connect time.
    pub workspace_id: Option<String>,
    /// Page size for paginated listings.
    pub page_size: u64,
    pub upload: UploadConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            upload_host: DEFAULT_UPLOAD_HOST.to_string(),
            workspace_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            upload: UploadConfig::default(),
        }
    }
}
