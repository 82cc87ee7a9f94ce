//! Part transfer: sequential or via a fixed worker pool.
//!
//! The file is always read by a single producer ([`ChunkReader`]); in
//! concurrent mode workers receive ready chunks over a bounded channel and
//! only ever talk to the network. Channel capacity is `2 × workers`, so peak
//! memory stays at a small multiple of the chunk size and the producer is
//! backpressured instead of buffering the whole file.

use std::path::Path;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::chunked::{Chunk, ChunkReader};
use crate::plan::{Part, plan_parts};
use crate::{TransferMode, UploadConfig, UploadError};

/// Outcome of one part transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartStatus {
    Done,
    Failed,
}

/// Per-part result collected by the coordinator.
#[derive(Debug)]
pub struct PartResult {
    /// 1-based part number.
    pub index: u32,
    pub status: PartStatus,
    /// [`UploadError::Part`] for a rejected PUT, [`UploadError::Http`] for a
    /// transport failure, `None` when Done.
    pub error: Option<UploadError>,
}

/// Transfers the parts of one multipart job.
pub struct PartUploader {
    http: reqwest::Client,
    multipart_url: String,
    auth_header: String,
    config: UploadConfig,
}

impl PartUploader {
    /// Creates an uploader.
    ///
    /// `multipart_url` is the multipart endpoint base, e.g.
    /// `https://io.cimediacloud.com/upload/multipart`. `auth_header` is the
    /// full `Bearer <token>` value; it is never mutated after construction,
    /// so the uploader can be shared freely across jobs.
    pub fn new(
        http: reqwest::Client,
        multipart_url: String,
        auth_header: String,
        config: UploadConfig,
    ) -> Self {
        Self {
            http,
            multipart_url,
            auth_header,
            config,
        }
    }

    /// Transfers every part of `path` for the given asset.
    ///
    /// Returns one [`PartResult`] per part, sorted by index, regardless of
    /// the order in which workers finished. A failed part does not abort
    /// its siblings. Cancelling `cancel` stops the reader and all in-flight
    /// workers; the file handle is dropped on every exit path.
    pub async fn transfer(
        &self,
        asset_id: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<PartResult>, UploadError> {
        let mut reader = ChunkReader::open(path, self.config.chunk_size).await?;

        match self.config.mode {
            TransferMode::Sequential => self.run_sequential(asset_id, &mut reader, cancel).await,
            TransferMode::Concurrent => self.run_concurrent(asset_id, &mut reader, cancel).await,
        }
    }

    /// Transfers only the given parts, reading each at its planned offset.
    ///
    /// Used to retry Failed parts against an existing asset before calling
    /// complete again. Runs sequentially.
    pub async fn transfer_parts(
        &self,
        asset_id: &str,
        path: &Path,
        parts: &[Part],
        cancel: &CancellationToken,
    ) -> Result<Vec<PartResult>, UploadError> {
        let mut reader = ChunkReader::open(path, self.config.chunk_size).await?;
        let mut results = Vec::with_capacity(parts.len());
        for part in parts {
            if cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }
            let chunk = reader.read_part(*part).await?;
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(UploadError::Cancelled),
                result = self.put_part(asset_id, chunk) => result,
            };
            results.push(result);
        }
        Ok(results)
    }

    /// Plans the part layout for a file of `file_size` bytes.
    pub fn plan(&self, file_size: u64) -> Result<Vec<Part>, UploadError> {
        plan_parts(file_size, self.config.chunk_size)
    }

    async fn run_sequential(
        &self,
        asset_id: &str,
        reader: &mut ChunkReader,
        cancel: &CancellationToken,
    ) -> Result<Vec<PartResult>, UploadError> {
        let mut results = Vec::new();
        loop {
            if cancel.is_cancelled() {
                return Err(UploadError::Cancelled);
            }
            let chunk = tokio::select! {
                _ = cancel.cancelled() => return Err(UploadError::Cancelled),
                chunk = reader.next_chunk() => chunk?,
            };
            let Some(chunk) = chunk else { break };
            // The PUT itself races the token, so an in-flight request is
            // abandoned the moment cancellation fires.
            let result = tokio::select! {
                _ = cancel.cancelled() => return Err(UploadError::Cancelled),
                result = self.put_part(asset_id, chunk) => result,
            };
            results.push(result);
        }
        Ok(results)
    }

    async fn run_concurrent(
        &self,
        asset_id: &str,
        reader: &mut ChunkReader,
        cancel: &CancellationToken,
    ) -> Result<Vec<PartResult>, UploadError> {
        let workers = self.config.workers.max(1);
        // Bound the queue so at most 2×workers chunks sit in memory.
        let (tx, rx) = mpsc::channel::<Chunk>(workers * 2);
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let rx = Arc::clone(&rx);
            let cancel = cancel.clone();
            let http = self.http.clone();
            let url_base = self.multipart_url.clone();
            let auth = self.auth_header.clone();
            let asset_id = asset_id.to_string();

            handles.push(tokio::spawn(async move {
                let mut results = Vec::new();
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    let chunk = tokio::select! {
                        _ = cancel.cancelled() => None,
                        chunk = async { rx.lock().await.recv().await } => chunk,
                    };
                    let Some(chunk) = chunk else { break };
                    let result = tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = put_part(&http, &url_base, &auth, &asset_id, chunk) => result,
                    };
                    results.push(result);
                }
                results
            }));
        }
        // Workers hold the only receiver references from here on, so a send
        // against a dead pool fails instead of blocking.
        drop(rx);

        // Single producer: the only task touching the file handle.
        let mut cancelled = false;
        loop {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let chunk = tokio::select! {
                _ = cancel.cancelled() => {
                    cancelled = true;
                    break;
                }
                chunk = reader.next_chunk() => chunk?,
            };
            let Some(chunk) = chunk else { break };
            if tx.send(chunk).await.is_err() {
                // All workers gone; only happens on cancellation.
                cancelled = true;
                break;
            }
        }
        drop(tx);

        // Join barrier: every worker reports before we return.
        let mut results = Vec::new();
        let mut join_error = None;
        for handle in handles {
            match handle.await {
                Ok(mut worker_results) => results.append(&mut worker_results),
                Err(e) => {
                    warn!(error = %e, "part upload worker terminated abnormally");
                    join_error = Some(e);
                }
            }
        }

        if cancelled || cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        // A lost worker means lost results; the job must not look complete.
        if let Some(e) = join_error {
            return Err(UploadError::Worker(e));
        }

        results.sort_by_key(|r| r.index);
        Ok(results)
    }

    async fn put_part(&self, asset_id: &str, chunk: Chunk) -> PartResult {
        put_part(
            &self.http,
            &self.multipart_url,
            &self.auth_header,
            asset_id,
            chunk,
        )
        .await
    }
}

/// Issues one part PUT and classifies the outcome.
async fn put_part(
    http: &reqwest::Client,
    multipart_url: &str,
    auth_header: &str,
    asset_id: &str,
    chunk: Chunk,
) -> PartResult {
    let index = chunk.index;
    let url = format!("{multipart_url}/{asset_id}/{index}");

    let resp = http
        .put(&url)
        .header(AUTHORIZATION, auth_header)
        .header(CONTENT_TYPE, "application/octet-stream")
        .body(chunk.data)
        .send()
        .await;

    match resp {
        Ok(resp) if resp.status().is_success() => {
            debug!(asset_id = %asset_id, part = index, "part uploaded");
            PartResult {
                index,
                status: PartStatus::Done,
                error: None,
            }
        }
        Ok(resp) => {
            let status = resp.status().as_u16();
            warn!(asset_id = %asset_id, part = index, status, "part rejected");
            PartResult {
                index,
                status: PartStatus::Failed,
                error: Some(UploadError::Part { index, status }),
            }
        }
        Err(e) => {
            warn!(asset_id = %asset_id, part = index, error = %e, "part transfer failed");
            PartResult {
                index,
                status: PartStatus::Failed,
                error: Some(UploadError::Http(e)),
            }
        }
    }
}
