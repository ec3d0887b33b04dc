// Time-series write client
//
// Posts line-protocol bodies to an InfluxDB 1.x compatible `/write`
// endpoint. Stateless: every call is one independent request.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;
use url::Url;

use crate::auth::preview;
use crate::error::Error;
use crate::transport::TransportConfig;

/// Timestamp precision passed as the `precision` query parameter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum Precision {
    #[strum(serialize = "n")]
    #[serde(rename = "n")]
    Nanoseconds,
    #[strum(serialize = "u")]
    #[serde(rename = "u")]
    Microseconds,
    #[strum(serialize = "ms")]
    #[serde(rename = "ms")]
    Milliseconds,
    #[strum(serialize = "s")]
    #[serde(rename = "s")]
    Seconds,
    #[default]
    #[strum(serialize = "m")]
    #[serde(rename = "m")]
    Minutes,
    #[strum(serialize = "h")]
    #[serde(rename = "h")]
    Hours,
}

/// Client for `POST {host}/write?db={database}&precision={precision}`.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    http: reqwest::Client,
    write_url: Url,
}

impl InfluxClient {
    /// Build a client for the given host and database.
    pub fn new(
        host: &Url,
        database: &str,
        precision: Precision,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, host, database, precision))
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        host: &Url,
        database: &str,
        precision: Precision,
    ) -> Self {
        Self {
            http,
            write_url: write_url(host, database, precision),
        }
    }

    /// The fully-qualified write URL, including query parameters.
    pub fn write_url(&self) -> &Url {
        &self.write_url
    }

    /// Write one or more line-protocol lines.
    pub async fn write(&self, body: String) -> Result<(), Error> {
        debug!("POST {}", self.write_url);

        let resp = self
            .http
            .post(self.write_url.clone())
            .body(body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::WriteRejected {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }
        Ok(())
    }
}

fn write_url(host: &Url, database: &str, precision: Precision) -> Url {
    let mut url = host.clone();
    let path = format!("{}/write", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut()
        .clear()
        .append_pair("db", database)
        .append_pair("precision", &precision.to_string());
    url
}
