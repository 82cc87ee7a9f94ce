//! Authenticated session state.

/// The authenticated context shared by every call after connect.
///
/// Created once per client lifetime and immutable afterwards; all
/// components receive it by reference, so concurrent use needs no locking.
#[derive(Debug, Clone)]
pub struct Session {
    /// Raw OAuth access token.
    pub access_token: String,
    /// Derived `Bearer <token>` header value.
    pub auth_header: String,
    /// Active workspace, filled in by workspace resolution at connect time.
    pub workspace_id: Option<String>,
}

impl Session {
    pub(crate) fn new(access_token: String) -> Self {
        let auth_header = format!("Bearer {access_token}");
        Self {
            access_token,
            auth_header,
            workspace_id: None,
        }
    }
}
