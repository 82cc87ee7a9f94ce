//! Folder and asset management passthroughs.
//!
//! The service answers 200 with a human-readable `message` even for soft
//! failures, so the boolean operations compare that message rather than
//! the status code.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::client::CiClient;
use crate::error::Error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_folder_id: Option<&'a str>,
    workspace_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderResponse {
    folder_id: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: String,
}

impl CiClient {
    /// Creates a folder and returns its id.
    ///
    /// Defaults to the session workspace unless `workspace_id` names one.
    pub async fn create_folder(
        &self,
        name: &str,
        parent_folder_id: Option<&str>,
        workspace_id: Option<&str>,
    ) -> Result<String, Error> {
        let body = CreateFolderBody {
            name,
            parent_folder_id,
            workspace_id: workspace_id.unwrap_or_else(|| self.workspace_id()),
        };
        let resp: CreateFolderResponse = self.post_json("/folders", &body).await?;
        debug!(folder_id = %resp.folder_id, name = %name, "folder created");
        Ok(resp.folder_id)
    }

    /// Fetches a folder's detail record.
    pub async fn folder_detail(&self, folder_id: &str) -> Result<serde_json::Value, Error> {
        self.get_json(&format!("/folders/{folder_id}"), &[]).await
    }

    /// Permanently deletes a folder. Returns whether the service confirmed.
    pub async fn delete_folder(&self, folder_id: &str) -> Result<bool, Error> {
        let resp: MessageResponse = self.delete_json(&format!("/folders/{folder_id}")).await?;
        Ok(resp.message == "Folder was deleted.")
    }

    /// Moves a folder to the trash. Returns whether the service confirmed.
    pub async fn trash_folder(&self, folder_id: &str) -> Result<bool, Error> {
        let resp: MessageResponse = self
            .post_empty(&format!("/folders/{folder_id}/trash"))
            .await?;
        Ok(resp.message == "Folder was trashed.")
    }

    /// Starts archiving an asset. Returns whether the service confirmed.
    pub async fn archive_asset(&self, asset_id: &str) -> Result<bool, Error> {
        let resp: MessageResponse = self
            .post_empty(&format!("/assets/{asset_id}/archive"))
            .await?;
        Ok(resp.message == "Asset archive has started.")
    }

    /// Permanently deletes an asset. Returns whether the service confirmed.
    pub async fn delete_asset(&self, asset_id: &str) -> Result<bool, Error> {
        let resp: MessageResponse = self.delete_json(&format!("/assets/{asset_id}")).await?;
        Ok(resp.message == "Asset was deleted.")
    }
}
