//! Client for the Ci media cloud REST API.
//!
//! [`CiClient::connect`] exchanges credentials for an access token,
//! resolves the active workspace, and returns a facade over the service:
//! workspace/folder/asset browsing, search, mediabox creation, download,
//! and file upload (delegated to `sonyci-transfer` for the chunked
//! multipart protocol).
//!
//! ```no_run
//! # async fn run() -> Result<(), sonyci_client::Error> {
//! use sonyci_client::{CiClient, ClientConfig, Credentials};
//! use sonyci_transfer::UploadRequest;
//!
//! let credentials = Credentials {
//!     client_id: "id".into(),
//!     client_secret: "secret".into(),
//!     username: "user".into(),
//!     password: "pass".into(),
//! };
//! let client = CiClient::connect(&credentials, ClientConfig::default()).await?;
//! let asset_id = client.upload(&UploadRequest::new("/media/cosmos.mp4")).await?;
//! # let _ = asset_id;
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
mod config;
mod contents;
mod error;
mod folders;
mod mediabox;
mod session;
#[cfg(test)]
mod testutil;
mod workspaces;

pub use client::CiClient;
pub use config::{ClientConfig, Credentials};
pub use contents::{ContentItem, ContentKind, Page};
pub use error::Error;
pub use mediabox::{Mediabox, MediaboxRequest};
pub use session::Session;
pub use workspaces::Workspace;

// Upload surface, re-exported so callers need only this crate.
pub use sonyci_transfer::{
    TransferMode, UploadConfig, UploadCoordinator, UploadError, UploadJob, UploadRequest,
};
