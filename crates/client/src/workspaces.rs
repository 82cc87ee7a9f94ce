//! Workspace listing and default-workspace resolution.

use serde::Deserialize;
use tracing::debug;

use crate::client::CiClient;
use crate::contents::Page;
use crate::error::Error;

/// Capability tag identifying a user's own workspace.
const PERSONAL_CLASS: &str = "Personal";

/// A workspace summary from the listing.
///
/// Fields beyond `id` are only populated when requested via the `fields`
/// parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Capability tag string, e.g. "Personal" or "Shared".
    #[serde(default)]
    pub class: String,
}

impl CiClient {
    /// Lists every workspace visible to the session, paging to exhaustion.
    pub async fn workspaces(&self, fields: &str) -> Result<Vec<Workspace>, Error> {
        let mut items = Vec::new();
        let mut offset = 0u64;
        loop {
            let page = self.workspace_page(offset, fields).await?;
            let fetched = page.items.len() as u64;
            items.extend(page.items);
            offset += fetched;
            if fetched == 0 || offset >= page.count {
                break;
            }
        }
        Ok(items)
    }

    /// Determines the active workspace id.
    ///
    /// An explicit non-empty `configured` id wins without a network call.
    /// Otherwise the listing is paged until a workspace whose class
    /// contains "Personal" turns up; exhausting all pages without a match
    /// is [`Error::NoPersonalWorkspace`].
    pub(crate) async fn resolve_workspace(
        &self,
        configured: Option<&str>,
    ) -> Result<String, Error> {
        if let Some(id) = configured {
            if !id.is_empty() {
                return Ok(id.to_string());
            }
        }

        let mut offset = 0u64;
        loop {
            let page = self.workspace_page(offset, "name,class").await?;
            let fetched = page.items.len() as u64;
            for workspace in page.items {
                if workspace.class.contains(PERSONAL_CLASS) {
                    debug!(workspace_id = %workspace.id, name = %workspace.name, "resolved personal workspace");
                    return Ok(workspace.id);
                }
            }
            offset += fetched;
            if fetched == 0 || offset >= page.count {
                return Err(Error::NoPersonalWorkspace);
            }
        }
    }

    async fn workspace_page(&self, offset: u64, fields: &str) -> Result<Page<Workspace>, Error> {
        self.get_json(
            "/workspaces",
            &[
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
                ("fields", fields.to_string()),
            ],
        )
        .await
    }
}
