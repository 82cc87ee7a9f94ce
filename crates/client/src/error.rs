//! Client error types.

/// Errors produced by the Ci client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {code} -> {description}")]
    Auth { code: String, description: String },

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("no personal workspace found")]
    NoPersonalWorkspace,

    #[error("access token is not usable as a header value")]
    InvalidToken,

    #[error("upload failed: {0}")]
    Upload(#[from] sonyci_transfer::UploadError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
