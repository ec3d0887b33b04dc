// Token authentication
//
// Username/password exchange for a bearer token. The token is stored on
// the client and attached to every subsequent request.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::ConnectClient;
use crate::error::Error;
use crate::models::TokenResponse;

/// Token endpoint, relative to the API base URL.
pub const TOKEN_PATH: &str = "api/v1/authentication/token";

impl ConnectClient {
    /// Authenticate with username/password.
    ///
    /// On success the access token replaces any token held from a previous
    /// login. A non-2xx response is an [`Error::Authentication`].
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.api_url(TOKEN_PATH)?;

        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let token: TokenResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("token response: {e}"),
                body: body.clone(),
            })?;

        self.set_token(SecretString::from(token.access_token));

        debug!("login successful");
        Ok(())
    }

    /// Forget the current token. Purely local; the service expires
    /// tokens on its own.
    pub fn logout(&self) {
        self.clear_token();
        debug!("token discarded");
    }
}

pub(crate) fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}
