//! Configuration for chargelog.
//!
//! TOML file + `CHARGELOG_` environment, password resolution (env +
//! keyring + plaintext), and translation to `chargelog_core::PollerConfig`.
//! The CLI applies its flag overrides on top before translating.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use chargelog_core::{
    ConnectConfig, Credentials, CsvConfig, InfluxConfig, PollerConfig, Precision, REFRESH_LEAD,
    TlsMode,
};

/// Keyring service name; the account is the vehicle-cloud username.
pub const KEYRING_SERVICE: &str = "chargelog";

/// Prefix of environment overrides. Nested keys use `__`
/// (`CHARGELOG_CONNECT__POLL_INTERVAL`).
pub const ENV_PREFIX: &str = "CHARGELOG_";

/// Environment variable consulted for the password.
pub const PASSWORD_ENV: &str = "CHARGELOG_PASSWORD";

/// Config file picked up from the working directory when present.
pub const LOCAL_CONFIG_FILE: &str = "chargelog.toml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no username configured")]
    NoUsername,

    #[error("no password found for '{username}'")]
    NoPassword { username: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub connect: ConnectSection,

    #[serde(default)]
    pub influxdb: InfluxSection,

    #[serde(default)]
    pub csv: CsvSection,
}

/// Vehicle cloud account and polling cadence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plaintext password. Prefer the keyring or `CHARGELOG_PASSWORD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between ticks.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Minutes before the session is dropped and a fresh login happens.
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for ConnectSection {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            base_url: default_base_url(),
            poll_interval: default_poll_interval(),
            reconnect_interval: default_reconnect_interval(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    chargelog_core::DEFAULT_BASE_URL.into()
}
fn default_poll_interval() -> u64 {
    60
}
fn default_reconnect_interval() -> u64 {
    5
}
fn default_timeout() -> u64 {
    30
}

/// Time-series sink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InfluxSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_influx_host")]
    pub host: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default)]
    pub precision: Precision,

    /// Accept invalid certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for InfluxSection {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_influx_host(),
            database: default_database(),
            precision: Precision::default(),
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_influx_host() -> String {
    "http://localhost:8086".into()
}
fn default_database() -> String {
    "sampledb".into()
}

/// CSV sink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CsvSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_folder")]
    pub folder: PathBuf,
}

impl Default for CsvSection {
    fn default() -> Self {
        Self {
            enabled: true,
            folder: default_folder(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_folder() -> PathBuf {
    PathBuf::from("logs")
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file path (XDG on Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "chargelog", "chargelog").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("chargelog");
    p
}

/// Pick the config file: `explicit`, else `./chargelog.toml` if it exists,
/// else the platform path.
pub fn discover_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return local;
    }
    config_path()
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then `path` (if it exists), then the environment.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the password for `username`: env var, then keyring, then the
/// plaintext value in the config file.
pub fn resolve_password(
    connect: &ConnectSection,
    username: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(SecretString::from(pw));
        }
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, username) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = connect.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoPassword {
        username: username.into(),
    })
}

/// Store `password` for `username` in the system keyring.
pub fn store_password(username: &str, password: &SecretString) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, username)
        .map_err(|e| ConfigError::Keyring(format!("failed to access keyring: {e}")))?;
    entry
        .set_password(password.expose_secret())
        .map_err(|e| ConfigError::Keyring(format!("failed to store password: {e}")))
}

// ── Translation to core config ──────────────────────────────────────

/// Validate `cfg` and build the poller configuration.
pub fn to_poller_config(cfg: &Config, password: SecretString) -> Result<PollerConfig, ConfigError> {
    let username = cfg
        .connect
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or(ConfigError::NoUsername)?;

    let base_url = parse_url("connect.base_url", &cfg.connect.base_url)?;

    if cfg.connect.poll_interval < REFRESH_LEAD.as_secs() {
        return Err(ConfigError::Validation {
            field: "connect.poll_interval".into(),
            reason: format!(
                "must be at least {} seconds, got {}",
                REFRESH_LEAD.as_secs(),
                cfg.connect.poll_interval
            ),
        });
    }
    if cfg.connect.reconnect_interval == 0 {
        return Err(ConfigError::Validation {
            field: "connect.reconnect_interval".into(),
            reason: "must be at least 1 minute".into(),
        });
    }
    if cfg.connect.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "connect.timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let csv = cfg.csv.enabled.then(|| CsvConfig {
        folder: cfg.csv.folder.clone(),
    });

    let influx = if cfg.influxdb.enabled {
        if cfg.influxdb.database.is_empty() {
            return Err(ConfigError::Validation {
                field: "influxdb.database".into(),
                reason: "must not be empty".into(),
            });
        }
        let tls = if cfg.influxdb.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = cfg.influxdb.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };
        Some(InfluxConfig {
            host: parse_url("influxdb.host", &cfg.influxdb.host)?,
            database: cfg.influxdb.database.clone(),
            precision: cfg.influxdb.precision,
            tls,
        })
    } else {
        None
    };

    Ok(PollerConfig {
        connect: ConnectConfig {
            base_url,
            credentials: Credentials { username, password },
            timeout: Duration::from_secs(cfg.connect.timeout),
        },
        poll_interval: Duration::from_secs(cfg.connect.poll_interval),
        reconnect_interval: Duration::from_secs(cfg.connect.reconnect_interval.saturating_mul(60)),
        csv,
        influx,
    })
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}
