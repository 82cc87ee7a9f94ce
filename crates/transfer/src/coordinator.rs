//! Upload orchestration: strategy selection and the three-phase
//! initiate / transfer / complete protocol.
//!
//! The flow per upload is linear: Start → Initiated → Transferring →
//! Completed, failing out of Start (initiate rejected) or Transferring
//! (one or more parts Failed, or cancellation). The coordinator never
//! re-initiates an asset; callers holding the [`UploadJob`] can retry the
//! failed part subset via [`UploadCoordinator::retry_parts`] and then call
//! [`UploadCoordinator::complete`] themselves.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::plan::total_parts;
use crate::uploader::{PartResult, PartStatus, PartUploader};
use crate::{UploadConfig, UploadError};

/// Caller-supplied description of one upload.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub file_path: PathBuf,
    /// Target folder; the workspace root when unset.
    pub folder_id: Option<String>,
    /// Overrides the session's default workspace when set.
    pub workspace_id: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl UploadRequest {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }
}

/// A live multipart job, minted by initiate.
///
/// `asset_id` is the join key for every subsequent part PUT and the final
/// complete call. `chunk_size` is fixed for the job's lifetime; changing it
/// would invalidate in-flight part numbering.
#[derive(Debug, Clone)]
pub struct UploadJob {
    pub asset_id: String,
    pub file_size: u64,
    pub chunk_size: u64,
    pub total_parts: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InitiateBody<'a> {
    name: &'a str,
    size: u64,
    metadata: &'a HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    workspace_id: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetIdResponse {
    asset_id: String,
}

/// Drives end-to-end uploads against the upload host.
pub struct UploadCoordinator {
    http: reqwest::Client,
    singlepart_url: String,
    multipart_url: String,
    auth_header: String,
    config: UploadConfig,
}

impl UploadCoordinator {
    /// Creates a coordinator for the given upload host.
    ///
    /// `upload_host` is the base, e.g. `https://io.cimediacloud.com`;
    /// `auth_header` the full `Bearer <token>` value.
    pub fn new(
        http: reqwest::Client,
        upload_host: &str,
        auth_header: String,
        config: UploadConfig,
    ) -> Self {
        Self {
            http,
            singlepart_url: format!("{upload_host}/upload"),
            multipart_url: format!("{upload_host}/upload/multipart"),
            auth_header,
            config,
        }
    }

    /// Uploads a file and returns the server-assigned asset id.
    ///
    /// Files smaller than `singlepart_threshold` go through one request;
    /// everything else takes the multipart path. `default_workspace_id` is
    /// used when the request does not name a workspace.
    ///
    /// On cancellation no finalize call is issued and, for multipart jobs,
    /// the initiated asset record is left orphaned on the service.
    pub async fn upload(
        &self,
        request: &UploadRequest,
        default_workspace_id: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<String, UploadError> {
        let file_size = tokio::fs::metadata(&request.file_path).await?.len();

        if file_size < self.config.singlepart_threshold {
            return self.singlepart(request, default_workspace_id).await;
        }

        let job = self.initiate(request, default_workspace_id, file_size).await?;

        let uploader = self.part_uploader();
        let results = uploader
            .transfer(&job.asset_id, &request.file_path, cancel)
            .await?;

        let failed_parts = incomplete_parts(&results, job.total_parts);
        if !failed_parts.is_empty() {
            return Err(UploadError::Incomplete { failed_parts });
        }

        self.complete(&job.asset_id).await?;
        info!(
            asset_id = %job.asset_id,
            parts = job.total_parts,
            size = job.file_size,
            "multipart upload completed"
        );
        Ok(job.asset_id)
    }

    /// Starts a multipart job. Called at most once per upload.
    pub async fn initiate(
        &self,
        request: &UploadRequest,
        default_workspace_id: Option<&str>,
        file_size: u64,
    ) -> Result<UploadJob, UploadError> {
        let name = basename(&request.file_path);
        let workspace_id = request
            .workspace_id
            .as_deref()
            .or(default_workspace_id);
        let body = InitiateBody {
            name: &name,
            size: file_size,
            metadata: &request.metadata,
            folder_id: request.folder_id.as_deref(),
            workspace_id,
        };

        let resp = self
            .http
            .post(&self.multipart_url)
            .header(AUTHORIZATION, &self.auth_header)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Initiate {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AssetIdResponse = resp.json().await?;
        info!(asset_id = %parsed.asset_id, name = %name, size = file_size, "multipart upload initiated");

        Ok(UploadJob {
            asset_id: parsed.asset_id,
            file_size,
            chunk_size: self.config.chunk_size,
            total_parts: total_parts(file_size, self.config.chunk_size),
        })
    }

    /// Retries only the given part indices of an existing job.
    pub async fn retry_parts(
        &self,
        job: &UploadJob,
        path: &Path,
        indices: &[u32],
        cancel: &CancellationToken,
    ) -> Result<Vec<PartResult>, UploadError> {
        let plan = crate::plan::plan_parts(job.file_size, job.chunk_size)?;
        let parts: Vec<_> = plan
            .into_iter()
            .filter(|p| indices.contains(&p.index))
            .collect();
        self.part_uploader()
            .transfer_parts(&job.asset_id, path, &parts, cancel)
            .await
    }

    /// Finalizes a job. Must only be called once every part is Done;
    /// the service does not guarantee idempotency across retries.
    pub async fn complete(&self, asset_id: &str) -> Result<(), UploadError> {
        let url = format!("{}/{asset_id}/complete", self.multipart_url);
        let resp = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::Complete {
                status: status.as_u16(),
                body,
            });
        }
        debug!(asset_id = %asset_id, "multipart upload finalized");
        Ok(())
    }

    /// One-request upload for files below the threshold.
    async fn singlepart(
        &self,
        request: &UploadRequest,
        default_workspace_id: Option<&str>,
    ) -> Result<String, UploadError> {
        let name = basename(&request.file_path);
        let bytes = tokio::fs::read(&request.file_path).await?;
        info!(name = %name, size = bytes.len(), "single-part upload");

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(name),
            )
            .text(
                "metadata",
                serde_json::to_string(&request.metadata).unwrap_or_else(|_| "{}".into()),
            );
        if let Some(ws) = request
            .workspace_id
            .as_deref()
            .or(default_workspace_id)
        {
            form = form.text("workspaceId", ws.to_string());
        }
        if let Some(folder) = request.folder_id.as_deref() {
            form = form.text("folderId", folder.to_string());
        }

        let resp = self
            .http
            .post(&self.singlepart_url)
            .header(AUTHORIZATION, &self.auth_header)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UploadError::SinglePart {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AssetIdResponse = resp.json().await?;
        Ok(parsed.asset_id)
    }

    fn part_uploader(&self) -> PartUploader {
        PartUploader::new(
            self.http.clone(),
            self.multipart_url.clone(),
            self.auth_header.clone(),
            self.config.clone(),
        )
    }
}

/// Indices in `[1, total_parts]` that are not Done, ascending. A part some
/// worker marked Failed and a part nobody reported both count: finalize must
/// only ever see a full set of Done results.
fn incomplete_parts(results: &[PartResult], total_parts: u32) -> Vec<u32> {
    let done: HashSet<u32> = results
        .iter()
        .filter(|r| r.status == PartStatus::Done)
        .map(|r| r.index)
        .collect();
    (1..=total_parts).filter(|i| !done.contains(i)).collect()
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
