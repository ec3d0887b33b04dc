// Vehicle cloud HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer-token injection,
// and response classification. Endpoint methods for the garage and the
// charging resources live here; the login flow is in `auth.rs`.

use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::preview;
use crate::error::Error;
use crate::models::{GarageResponse, GarageVehicle, JsonObject};
use crate::transport::TransportConfig;

/// Production endpoint of the Skoda Connect API.
pub const DEFAULT_BASE_URL: &str = "https://api.connect.skoda-auto.cz";

const GARAGE_PATH: &str = "api/v3/garage/vehicles";

/// Raw HTTP client for the vehicle cloud API.
///
/// One client corresponds to one login: the bearer token captured by
/// [`login()`](Self::login) is held until [`logout()`](Self::logout) or
/// until the client is dropped.
pub struct ConnectClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl ConnectClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://api.connect.skoda-auto.cz`).
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The API base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a bearer token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token.read().expect("token lock poisoned").is_some()
    }

    // ── Token management ─────────────────────────────────────────────

    pub(crate) fn set_token(&self, token: SecretString) {
        *self.token.write().expect("token lock poisoned") = Some(token);
    }

    pub(crate) fn clear_token(&self) {
        *self.token.write().expect("token lock poisoned") = None;
    }

    fn bearer(&self) -> Result<String, Error> {
        let guard = self.token.read().expect("token lock poisoned");
        guard
            .as_ref()
            .map(|t| t.expose_secret().to_owned())
            .ok_or(Error::NotLoggedIn)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Join a relative API path onto the base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    fn charging_url(&self, vin: &str, resource: &str) -> Result<Url, Error> {
        self.api_url(&format!("api/v1/charging/{vin}/{resource}"))
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List the vehicles registered to the account.
    pub async fn list_vehicles(&self) -> Result<Vec<GarageVehicle>, Error> {
        let url = self.api_url(GARAGE_PATH)?;
        let resp: GarageResponse = self.get(url).await?;
        Ok(resp.into())
    }

    /// Charging status categories (`battery`, `charging`, `plug`, ...).
    pub async fn charging_status(&self, vin: &str) -> Result<JsonObject, Error> {
        let url = self.charging_url(vin, "status")?;
        self.get(url).await
    }

    /// Charger settings (`maxChargeCurrentAc`, `targetStateOfChargeInPercent`, ...).
    pub async fn charging_settings(&self, vin: &str) -> Result<JsonObject, Error> {
        let url = self.charging_url(vin, "settings")?;
        self.get(url).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let token = self.bearer()?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(Error::Transport)?;

        Self::handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::VehicleApi {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }
}

/// Ensure the base URL ends with `/` so relative joins append instead of
/// replacing the last path segment.
fn normalize_base_url(raw: &Url) -> Url {
    let mut url = raw.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
