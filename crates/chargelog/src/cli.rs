//! Clap derive structures for the `chargelog` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use chargelog_core::Precision;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// chargelog -- record vehicle charging telemetry
#[derive(Debug, Parser)]
#[command(
    name = "chargelog",
    version,
    about = "Record Skoda Connect charging telemetry to CSV files and InfluxDB",
    long_about = "Logs in to the Skoda Connect cloud, reads every vehicle's charging state\n\
        at a fixed interval, and records each reading to a CSV file and/or an\n\
        InfluxDB database. The session is renewed periodically.\n\n\
        Running without a subcommand starts recording.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(flatten)]
    pub run: RunOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (default: ./chargelog.toml, then the platform config dir)
    #[arg(long, env = "CHARGELOG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors; skip the startup summary
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Recording options ────────────────────────────────────────────────

#[derive(Debug, Default, Args)]
pub struct RunOpts {
    /// Skoda Connect username (e-mail)
    #[arg(long, short = 'u', env = "CHARGELOG_USERNAME", global = true)]
    pub username: Option<String>,

    /// Skoda Connect password (prefer the keyring: `chargelog config set-password`)
    #[arg(long, short = 'p', global = true)]
    pub password: Option<String>,

    /// Seconds between readings
    #[arg(long, short = 'i', value_name = "SECONDS", global = true)]
    pub interval: Option<u64>,

    /// Minutes before the session is renewed
    #[arg(long, value_name = "MINUTES", global = true)]
    pub reconnect: Option<u64>,

    /// Write readings to InfluxDB
    #[arg(long, visible_alias = "ife", global = true)]
    pub influx: bool,

    /// InfluxDB server URL
    #[arg(long, value_name = "URL", global = true)]
    pub influx_host: Option<String>,

    /// InfluxDB database
    #[arg(long, value_name = "NAME", global = true)]
    pub influx_database: Option<String>,

    /// Timestamp precision of InfluxDB writes (n, u, ms, s, m, h)
    #[arg(long, value_name = "PRECISION", global = true)]
    pub influx_precision: Option<Precision>,

    /// Write readings to CSV files
    #[arg(long, visible_alias = "ce", conflicts_with = "no_csv", global = true)]
    pub csv: bool,

    /// Do not write CSV files
    #[arg(long, global = true)]
    pub no_csv: bool,

    /// Directory receiving CSV files
    #[arg(long, value_name = "DIR", global = true)]
    pub csv_folder: Option<PathBuf>,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration and stored credentials
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration (secrets masked)
    Show,

    /// Print the config file path in use
    Path,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Store the account password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
