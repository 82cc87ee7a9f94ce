//! Chunked multipart upload for the Ci media cloud service.
//!
//! Large files are uploaded with the three-phase multipart protocol:
//! initiate (mints an asset id), N part PUTs, complete. Small files go
//! through a single multipart-form request instead. Part transfer runs
//! either sequentially or through a fixed pool of worker tasks fed by a
//! bounded channel from a single file reader.

mod chunked;
mod coordinator;
mod plan;
#[cfg(test)]
mod testutil;
mod uploader;

pub use chunked::{Chunk, ChunkReader};
pub use coordinator::{UploadCoordinator, UploadJob, UploadRequest};
pub use plan::{Part, plan_parts, total_parts};
pub use uploader::{PartResult, PartStatus, PartUploader};

/// Default chunk size: 10 MiB, matching the service's recommended part size.
pub const DEFAULT_CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Default single-part threshold: 5 MiB.
///
/// Files below this go through one multipart-form POST; at or above it the
/// multipart protocol is used. A threshold of 0 forces multipart for
/// everything.
pub const DEFAULT_SINGLEPART_THRESHOLD: u64 = 5 * 1024 * 1024;

/// Default number of concurrent part upload workers.
pub const DEFAULT_WORKERS: usize = 4;

/// How parts are transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferMode {
    /// One part in flight at a time, strictly ordered.
    Sequential,
    /// A fixed worker pool consumes parts from a bounded queue.
    #[default]
    Concurrent,
}

/// Tunable upload parameters.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Part size in bytes. Must be non-zero.
    pub chunk_size: u64,
    /// Files smaller than this are uploaded in a single request.
    pub singlepart_threshold: u64,
    /// Worker pool size for [`TransferMode::Concurrent`].
    pub workers: usize,
    pub mode: TransferMode,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            singlepart_threshold: DEFAULT_SINGLEPART_THRESHOLD,
            workers: DEFAULT_WORKERS,
            mode: TransferMode::default(),
        }
    }
}

/// Errors produced by the upload subsystem.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("multipart initiate failed ({status}): {body}")]
    Initiate { status: u16, body: String },

    #[error("single-part upload failed ({status}): {body}")]
    SinglePart { status: u16, body: String },

    #[error("part {index} upload failed ({status})")]
    Part { index: u32, status: u16 },

    #[error("upload incomplete, failed parts: {failed_parts:?}")]
    Incomplete { failed_parts: Vec<u32> },

    #[error("part upload worker terminated abnormally: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("multipart complete failed ({status}): {body}")]
    Complete { status: u16, body: String },

    #[error("upload cancelled")]
    Cancelled,

    #[error("chunk size must be non-zero")]
    InvalidChunkSize,
}
