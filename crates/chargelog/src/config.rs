//! CLI configuration -- thin wrapper around `chargelog_config`.
//!
//! Adds the recording flag overrides (--username, --interval, --influx,
//! etc.) and the interactive password prompt.

use std::io::IsTerminal;
use std::path::PathBuf;

use secrecy::SecretString;

use chargelog_config::ConfigError;
use chargelog_core::PollerConfig;

use crate::cli::{GlobalOpts, RunOpts};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use chargelog_config::{Config, discover_config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Load the config file selected by `--config` (or discovered).
pub fn load(global: &GlobalOpts) -> Result<(Config, PathBuf), CliError> {
    let path = discover_config_path(global.config.as_deref());
    let cfg = load_config(&path)?;
    Ok((cfg, path))
}

/// Apply recording flags on top of file + env values.
///
/// CLI flags take priority. `--password` is not stored here; see
/// [`resolve_password`].
pub fn apply_overrides(cfg: &mut Config, run: &RunOpts) {
    if let Some(ref username) = run.username {
        cfg.connect.username = Some(username.clone());
    }
    if let Some(interval) = run.interval {
        cfg.connect.poll_interval = interval;
    }
    if let Some(minutes) = run.reconnect {
        cfg.connect.reconnect_interval = minutes;
    }

    if run.influx {
        cfg.influxdb.enabled = true;
    }
    if let Some(ref host) = run.influx_host {
        cfg.influxdb.host = host.clone();
    }
    if let Some(ref database) = run.influx_database {
        cfg.influxdb.database = database.clone();
    }
    if let Some(precision) = run.influx_precision {
        cfg.influxdb.precision = precision;
    }

    if run.csv {
        cfg.csv.enabled = true;
    }
    if run.no_csv {
        cfg.csv.enabled = false;
    }
    if let Some(ref folder) = run.csv_folder {
        cfg.csv.folder = folder.clone();
    }
}

/// Resolve the password: flag, then env/keyring/plaintext, then an
/// interactive prompt when stdin is a terminal.
pub fn resolve_password(cfg: &Config, run: &RunOpts) -> Result<SecretString, CliError> {
    if let Some(ref pw) = run.password {
        return Ok(SecretString::from(pw.clone()));
    }

    let username = cfg
        .connect
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or(CliError::NoUsername)?;

    match chargelog_config::resolve_password(&cfg.connect, username) {
        Ok(pw) => Ok(pw),
        Err(ConfigError::NoPassword { .. }) if std::io::stdin().is_terminal() => {
            prompt_password(username)
        }
        Err(e) => Err(e.into()),
    }
}

/// Prompt for the password of `username` without echo.
pub fn prompt_password(username: &str) -> Result<SecretString, CliError> {
    let pw = rpassword::prompt_password(format!("Password for {username}: "))?;
    if pw.is_empty() {
        return Err(CliError::NoPassword {
            username: username.into(),
        });
    }
    Ok(SecretString::from(pw))
}

/// Validate the merged config and build the poller configuration.
pub fn build_poller_config(cfg: &Config, run: &RunOpts) -> Result<PollerConfig, CliError> {
    if cfg.connect.username.as_deref().is_none_or(str::is_empty) {
        return Err(CliError::NoUsername);
    }
    let password = resolve_password(cfg, run)?;
    Ok(chargelog_config::to_poller_config(cfg, password)?)
}
