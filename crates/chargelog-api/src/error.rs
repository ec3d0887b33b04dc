use thiserror::Error;

/// Top-level error type for the `chargelog-api` crate.
///
/// Covers every failure mode of both HTTP surfaces: the vehicle cloud
/// (authentication, garage, charging endpoints) and the time-series
/// `/write` endpoint. `chargelog-core` maps these into run-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Bearer token rejected or revoked.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// A request that needs a token was issued before `login()`.
    #[error("Not logged in")]
    NotLoggedIn,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Vehicle API ─────────────────────────────────────────────────
    /// Non-success response from a vehicle endpoint.
    #[error("Vehicle API error (HTTP {status}): {message}")]
    VehicleApi { status: u16, message: String },

    // ── Time-series ─────────────────────────────────────────────────
    /// The time-series endpoint refused a write.
    #[error("Time-series write rejected (HTTP {status}): {message}")]
    WriteRejected { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}
