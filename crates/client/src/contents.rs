//! Workspace content browsing, search, and asset download.
//!
//! Thin request/response passthroughs over the shared client; the service
//! does the filtering.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::client::CiClient;
use crate::error::Error;

/// One page of a listing: the total count plus this page's items.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Listing filter for workspace contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentKind {
    #[default]
    All,
    Asset,
    Folder,
}

impl ContentKind {
    fn as_str(self) -> &'static str {
        match self {
            ContentKind::All => "all",
            ContentKind::Asset => "asset",
            ContentKind::Folder => "folder",
        }
    }
}

/// An asset or folder entry from a listing or search.
///
/// Only `id` is guaranteed; the rest depend on the requested `fields`.
/// Anything the service returns beyond the typed fields lands in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadLocation {
    location: String,
}

impl CiClient {
    /// Lists one page of the active workspace's contents.
    pub async fn list(
        &self,
        kind: ContentKind,
        limit: u64,
        offset: u64,
        fields: &str,
    ) -> Result<Page<ContentItem>, Error> {
        let path = format!("/workspaces/{}/contents", self.workspace_id());
        let page: Page<ContentItem> = self
            .get_json(
                &path,
                &[
                    ("limit", limit.to_string()),
                    ("offset", offset.to_string()),
                    ("kind", kind.as_str().to_string()),
                    ("fields", fields.to_string()),
                ],
            )
            .await?;
        debug!(kind = kind.as_str(), count = page.count, "listed contents");
        Ok(page)
    }

    /// First page of all items in the active workspace.
    pub async fn items(&self) -> Result<Vec<ContentItem>, Error> {
        Ok(self
            .list(ContentKind::All, self.page_size, 0, "metadata")
            .await?
            .items)
    }

    /// First page of assets in the active workspace.
    pub async fn assets(&self) -> Result<Vec<ContentItem>, Error> {
        Ok(self
            .list(ContentKind::Asset, self.page_size, 0, "metadata")
            .await?
            .items)
    }

    /// First page of folders in the active workspace.
    pub async fn folders(&self) -> Result<Vec<ContentItem>, Error> {
        Ok(self
            .list(ContentKind::Folder, self.page_size, 0, "metadata")
            .await?
            .items)
    }

    /// Searches a workspace by name.
    ///
    /// `workspace_id` overrides the session's workspace when given.
    pub async fn search(
        &self,
        query: &str,
        kind: ContentKind,
        limit: u64,
        offset: u64,
        workspace_id: Option<&str>,
    ) -> Result<Page<ContentItem>, Error> {
        let workspace = workspace_id.unwrap_or_else(|| self.workspace_id());
        let path = format!("/workspaces/{workspace}/search");
        self.get_json(
            &path,
            &[
                ("kind", kind.as_str().to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("query", query.to_string()),
            ],
        )
        .await
    }

    /// Downloads an asset to `dest`.
    ///
    /// Two steps: the API returns a signed `location` URL, then the blob is
    /// streamed from it to disk. The signed URL is fetched without the
    /// bearer header.
    pub async fn download(&self, asset_id: &str, dest: &Path) -> Result<(), Error> {
        let path = format!("/assets/{asset_id}/download");
        let loc: DownloadLocation = self.get_json(&path, &[]).await?;

        // Plain client: the location is pre-signed and external.
        let resp = reqwest::Client::new().get(&loc.location).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                body: format!("download of {asset_id} failed"),
            });
        }

        let mut resp = resp;
        let mut file = tokio::fs::File::create(dest).await?;
        while let Some(chunk) = resp.chunk().await? {
            tokio::io::AsyncWriteExt::write_all(&mut file, &chunk).await?;
        }
        tokio::io::AsyncWriteExt::flush(&mut file).await?;
        debug!(asset_id = %asset_id, dest = %dest.display(), "asset downloaded");
        Ok(())
    }
}
