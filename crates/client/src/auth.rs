//! OAuth2 password-grant token exchange.

use serde::Deserialize;
use tracing::debug;

use crate::config::Credentials;
use crate::error::Error;
use crate::session::Session;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct TokenError {
    error: String,
    error_description: String,
}

/// Exchanges credentials for a [`Session`].
///
/// One round trip: `POST {base}/oauth2/token` with the client id/secret in
/// the form body and `username:password` as HTTP basic auth. A non-success
/// response surfaces the server-reported error code and description
/// verbatim as [`Error::Auth`]; there is no retry. The returned session has
/// no workspace yet — resolution is the caller's next step.
pub(crate) async fn authenticate(
    http: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<Session, Error> {
    let url = format!("{base_url}/oauth2/token");
    let form = [
        ("grant_type", "password"),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
    ];

    let resp = http
        .post(&url)
        .basic_auth(&credentials.username, Some(&credentials.password))
        .form(&form)
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return match serde_json::from_str::<TokenError>(&body) {
            Ok(err) => Err(Error::Auth {
                code: err.error,
                description: err.error_description,
            }),
            Err(_) => Err(Error::Api {
                status: status.as_u16(),
                body,
            }),
        };
    }

    let token: TokenResponse = resp.json().await?;
    debug!("token exchange succeeded");
    Ok(Session::new(token.access_token))
}
