//! Mediabox creation: shareable links bundling assets for recipients.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CiClient;
use crate::error::Error;

/// Parameters for a new mediabox.
///
/// Optional fields are omitted from the request body when unset.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaboxRequest {
    pub name: String,
    pub asset_ids: Vec<String>,
    /// Mediabox type, e.g. "Public" or "Protected".
    #[serde(rename = "type")]
    pub kind: String,
    pub recipients: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub allow_download: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub send_notifications: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub notify_on_open: bool,
}

/// A created mediabox: its id and shareable link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mediabox {
    pub mediabox_id: String,
    pub link: String,
}

impl CiClient {
    /// Creates a mediabox and returns its id and link.
    pub async fn create_mediabox(&self, request: &MediaboxRequest) -> Result<Mediabox, Error> {
        let mediabox: Mediabox = self.post_json("/mediaboxes", request).await?;
        debug!(mediabox_id = %mediabox.mediabox_id, "mediabox created");
        Ok(mediabox)
    }
}
