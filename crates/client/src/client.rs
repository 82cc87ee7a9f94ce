//! The `CiClient` facade.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sonyci_transfer::{UploadConfig, UploadCoordinator, UploadRequest};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::auth;
use crate::config::{ClientConfig, Credentials};
use crate::error::Error;
use crate::session::Session;

/// Authenticated client for the Ci media cloud service.
///
/// Holds the session exclusively; every operation borrows it for the
/// duration of the call. The underlying HTTP client carries the bearer
/// header as a default and is cheap to clone.
#[derive(Debug)]
pub struct CiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    upload_host: String,
    pub(crate) page_size: u64,
    upload_config: UploadConfig,
    session: Session,
}

impl CiClient {
    /// Authenticates and resolves the active workspace.
    ///
    /// Two to N round trips: the token exchange, then (unless
    /// `config.workspace_id` is set) as many workspace listing pages as it
    /// takes to find a "Personal" one.
    pub async fn connect(credentials: &Credentials, config: ClientConfig) -> Result<Self, Error> {
        let session =
            auth::authenticate(&reqwest::Client::new(), &config.base_url, credentials).await?;
        Self::with_session(session, config).await
    }

    /// Builds a client around an already-acquired session.
    ///
    /// Performs workspace resolution if the session has no workspace and
    /// the config names none.
    pub async fn with_session(session: Session, config: ClientConfig) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&session.auth_header).map_err(|_| Error::InvalidToken)?,
        );
        let http = reqwest::Client::builder().default_headers(headers).build()?;

        let configured = config
            .workspace_id
            .clone()
            .or_else(|| session.workspace_id.clone());

        let mut client = Self {
            http,
            base_url: config.base_url,
            upload_host: config.upload_host,
            page_size: config.page_size,
            upload_config: config.upload,
            session,
        };

        let workspace_id = client.resolve_workspace(configured.as_deref()).await?;
        info!(workspace_id = %workspace_id, "session established");
        client.session.workspace_id = Some(workspace_id);
        Ok(client)
    }

    /// The authenticated session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The resolved workspace id.
    pub fn workspace_id(&self) -> &str {
        self.session.workspace_id.as_deref().unwrap_or_default()
    }

    /// Uploads a file and returns the server-assigned asset id.
    ///
    /// Strategy, chunking, and worker-pool behavior follow the
    /// [`UploadConfig`] given at connect time.
    pub async fn upload(&self, request: &UploadRequest) -> Result<String, Error> {
        self.upload_cancellable(request, &CancellationToken::new())
            .await
    }

    /// [`upload`](Self::upload) with caller-controlled cancellation.
    ///
    /// On cancellation no finalize call is issued; an already-initiated
    /// multipart asset record remains on the service as an orphan.
    pub async fn upload_cancellable(
        &self,
        request: &UploadRequest,
        cancel: &CancellationToken,
    ) -> Result<String, Error> {
        let asset_id = self
            .upload_coordinator()
            .upload(request, self.session.workspace_id.as_deref(), cancel)
            .await?;
        Ok(asset_id)
    }

    /// A coordinator bound to this session, for callers that drive the
    /// multipart phases themselves (e.g. retrying failed parts).
    pub fn upload_coordinator(&self) -> UploadCoordinator {
        UploadCoordinator::new(
            self.http.clone(),
            &self.upload_host,
            self.session.auth_header.clone(),
            self.upload_config.clone(),
        )
    }

    // -----------------------------------------------------------------
    // Request helpers
    // -----------------------------------------------------------------

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.get(&url).query(params).send().await?;
        parse(resp).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(&url).json(body).send().await?;
        parse(resp).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.post(&url).send().await?;
        parse(resp).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.http.delete(&url).send().await?;
        parse(resp).await
    }
}

async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp.json().await?)
}
