// ── Core error types ──
//
// Run-level errors from chargelog-core. The `From<chargelog_api::Error>`
// impl translates transport-layer errors into these variants so the CLI
// never matches on HTTP details.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Snapshot for {vin} has no '{category}.{field}'")]
    MissingField {
        vin: String,
        category: String,
        field: String,
    },

    // ── Sink errors ──────────────────────────────────────────────────
    #[error("CSV write to {path} failed: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Time-series write failed: {message}")]
    TimeSeries { message: String, status: Option<u16> },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Wrap a CSV error with the file it concerns.
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Wrap an I/O error with the file it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Any failure of a time-series write, transport included.
    pub(crate) fn time_series(err: chargelog_api::Error) -> Self {
        match err {
            chargelog_api::Error::WriteRejected { status, message } => Self::TimeSeries {
                message,
                status: Some(status),
            },
            other => Self::TimeSeries {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<chargelog_api::Error> for CoreError {
    fn from(err: chargelog_api::Error) -> Self {
        match err {
            chargelog_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            chargelog_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            chargelog_api::Error::NotLoggedIn => CoreError::AuthenticationFailed {
                message: "request issued before login".into(),
            },
            chargelog_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            chargelog_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            chargelog_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            chargelog_api::Error::VehicleApi { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            chargelog_api::Error::WriteRejected { status, message } => CoreError::TimeSeries {
                message,
                status: Some(status),
            },
            chargelog_api::Error::Deserialization { message, body: _ } => CoreError::Api {
                message: format!("Deserialization error: {message}"),
                status: None,
            },
        }
    }
}
