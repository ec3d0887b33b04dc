//! Output formatting: startup banner and settings tables.
//!
//! Tables use `tabled`; color goes through `owo-colors` and is only
//! applied when [`should_color`] says so.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use chargelog_config::Config;

use crate::cli::ColorMode;

/// Shown instead of secrets.
const MASK: &str = "****";

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Settings table ───────────────────────────────────────────────────

#[derive(Debug, Tabled)]
pub struct SettingRow {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl SettingRow {
    fn new(key: &str, value: impl ToString) -> Self {
        Self {
            key: key.to_owned(),
            value: value.to_string(),
        }
    }
}

/// One row per effective setting. `password` is masked: pass
/// `password_known = true` when a password has been resolved from any
/// source.
pub fn settings_rows(cfg: &Config, password_known: bool) -> Vec<SettingRow> {
    let on_off = |b: bool| if b { "enabled" } else { "disabled" };
    let password = if password_known || cfg.connect.password.is_some() {
        MASK
    } else {
        "(not stored)"
    };

    let mut rows = vec![
        SettingRow::new(
            "connect.username",
            cfg.connect.username.as_deref().unwrap_or("(not set)"),
        ),
        SettingRow::new("connect.password", password),
        SettingRow::new("connect.base_url", &cfg.connect.base_url),
        SettingRow::new(
            "connect.poll_interval",
            format!("{}s", cfg.connect.poll_interval),
        ),
        SettingRow::new(
            "connect.reconnect_interval",
            format!("{}min", cfg.connect.reconnect_interval),
        ),
        SettingRow::new("connect.timeout", format!("{}s", cfg.connect.timeout)),
        SettingRow::new("influxdb", on_off(cfg.influxdb.enabled)),
    ];
    if cfg.influxdb.enabled {
        rows.push(SettingRow::new("influxdb.host", &cfg.influxdb.host));
        rows.push(SettingRow::new("influxdb.database", &cfg.influxdb.database));
        rows.push(SettingRow::new("influxdb.precision", cfg.influxdb.precision));
    }
    rows.push(SettingRow::new("csv", on_off(cfg.csv.enabled)));
    if cfg.csv.enabled {
        rows.push(SettingRow::new("csv.folder", cfg.csv.folder.display()));
    }
    rows
}

/// Render rows as a rounded table.
pub fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Banner ───────────────────────────────────────────────────────────

/// Startup banner plus the effective settings, written to stderr.
pub fn print_startup(cfg: &Config, color: bool) {
    let title = format!("chargelog v{}", env!("CARGO_PKG_VERSION"));
    let mut stderr = io::stderr().lock();
    if color {
        let _ = writeln!(stderr, "{}", title.bold().cyan());
    } else {
        let _ = writeln!(stderr, "{title}");
    }
    let _ = writeln!(stderr, "{}", render_table(&settings_rows(cfg, true)));
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_never_rendered() {
        let mut cfg = Config::default();
        cfg.connect.username = Some("driver@example.com".into());
        cfg.connect.password = Some("hunter2".into());

        let table = render_table(&settings_rows(&cfg, false));

        assert!(!table.contains("hunter2"));
        assert!(table.contains(MASK));
        assert!(table.contains("driver@example.com"));
    }

    #[test]
    fn disabled_sinks_hide_their_details() {
        let mut cfg = Config::default();
        cfg.csv.enabled = false;

        let keys: Vec<String> = settings_rows(&cfg, false)
            .into_iter()
            .map(|r| r.key)
            .collect();

        assert!(keys.contains(&"csv".to_owned()));
        assert!(!keys.contains(&"csv.folder".to_owned()));
        assert!(!keys.contains(&"influxdb.host".to_owned()));
    }
}
