//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use chargelog_config::ConfigError;
use chargelog_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(chargelog::connection_failed),
        help("Check your network connection and the configured host.\nReason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(chargelog::timeout),
        help("Increase connect.timeout in the config file or retry later.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(chargelog::auth_failed),
        help(
            "Verify your Skoda Connect username and password.\n\
             Run: chargelog config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No username configured")]
    #[diagnostic(
        code(chargelog::no_username),
        help(
            "Pass --username, set CHARGELOG_USERNAME, or add connect.username\n\
             to the config file (chargelog config init)."
        )
    )]
    NoUsername,

    #[error("No password available for '{username}'")]
    #[diagnostic(
        code(chargelog::no_password),
        help(
            "Store one with: chargelog config set-password\n\
             Or set CHARGELOG_PASSWORD, or pass --password."
        )
    )]
    NoPassword { username: String },

    // ── Recording ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(chargelog::missing_field),
        help("The service returned a snapshot without a charging field this tool records.")
    )]
    MissingField { message: String },

    #[error("Time-series write failed: {message}")]
    #[diagnostic(
        code(chargelog::influx),
        help("Check --influx-host and --influx-database, and that the database exists.")
    )]
    TimeSeries { message: String },

    #[error("{message}")]
    #[diagnostic(code(chargelog::csv), help("Check that the CSV folder is writable."))]
    Sink { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(chargelog::api_error))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(chargelog::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(chargelog::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error("Keyring error: {message}")]
    #[diagnostic(code(chargelog::keyring))]
    Keyring { message: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(chargelog::config))]
    Config { message: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoUsername | Self::NoPassword { .. } => {
                exit_code::AUTH
            }
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout => CliError::Timeout,

            e @ CoreError::MissingField { .. } => CliError::MissingField {
                message: e.to_string(),
            },

            e @ (CoreError::Csv { .. } | CoreError::Io { .. }) => CliError::Sink {
                message: e.to_string(),
            },

            CoreError::TimeSeries { message, status } => CliError::TimeSeries {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },

            CoreError::Api { message, status } => CliError::ApiError {
                message: match status {
                    Some(code) => format!("HTTP {code}: {message}"),
                    None => message,
                },
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoUsername => CliError::NoUsername,
            ConfigError::NoPassword { username } => CliError::NoPassword { username },
            ConfigError::Keyring(message) => CliError::Keyring { message },
            ConfigError::Io(e) => CliError::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => {
                CliError::Config {
                    message: other.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_exit_with_auth_code() {
        let err: CliError = CoreError::AuthenticationFailed {
            message: "bad credentials".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(CliError::NoUsername.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn transport_errors_keep_their_codes() {
        let conn: CliError = CoreError::ConnectionFailed {
            url: "http://localhost:8086/write".into(),
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);
        assert_eq!(CliError::from(CoreError::Timeout).exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn rejected_write_is_general_failure_with_status() {
        let err: CliError = CoreError::TimeSeries {
            message: "database not found".into(),
            status: Some(404),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
        assert_eq!(
            err.to_string(),
            "Time-series write failed: HTTP 404: database not found"
        );
    }

    #[test]
    fn config_validation_is_usage_error() {
        let err: CliError = ConfigError::Validation {
            field: "connect.poll_interval".into(),
            reason: "must be at least 5 seconds, got 3".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
