// ── Runtime poller configuration ──
//
// These types describe *how* to poll and where to record. They carry
// credential data and timing, but never touch disk. The CLI resolves
// flags + config file into a `PollerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use chargelog_api::{DEFAULT_BASE_URL, Precision, TlsMode};

/// Fixed tail of every tick: the refresh request is issued this long
/// before the tick ends.
pub const REFRESH_LEAD: Duration = Duration::from_secs(5);

/// Measurement name of every time-series point.
pub const MEASUREMENT: &str = "charging";

/// Account credentials for the vehicle cloud.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Vehicle cloud connection settings.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    /// API root (e.g., `https://api.connect.skoda-auto.cz`).
    pub base_url: Url,
    pub credentials: Credentials,
    /// Request timeout.
    pub timeout: Duration,
}

/// CSV sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    /// Directory receiving one file per epoch (and vehicle).
    pub folder: PathBuf,
}

/// Time-series sink settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfluxConfig {
    /// Server root (e.g., `http://localhost:8086`).
    pub host: Url,
    pub database: String,
    pub precision: Precision,
    pub tls: TlsMode,
}

/// Immutable configuration for a [`Poller`](crate::Poller) run.
///
/// Built by the CLI, passed to the poller at construction -- core never
/// reads config files or environment variables.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub connect: ConnectConfig,
    /// Total delay per tick.
    pub poll_interval: Duration,
    /// Session age after which the epoch ends and a fresh login happens.
    pub reconnect_interval: Duration,
    /// `None` disables the CSV sink.
    pub csv: Option<CsvConfig>,
    /// `None` disables the time-series sink.
    pub influx: Option<InfluxConfig>,
}

impl PollerConfig {
    /// Sleep before the refresh request: `poll_interval - 5s`, saturating.
    pub fn pre_refresh_delay(&self) -> Duration {
        self.poll_interval.saturating_sub(REFRESH_LEAD)
    }

    /// Sleep after the refresh request. Never longer than the tick itself.
    pub fn post_refresh_delay(&self) -> Duration {
        self.poll_interval.min(REFRESH_LEAD)
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            connect: ConnectConfig {
                base_url: DEFAULT_BASE_URL
                    .parse()
                    .expect("default base URL is valid"),
                credentials: Credentials {
                    username: String::new(),
                    password: SecretString::from(String::new()),
                },
                timeout: Duration::from_secs(30),
            },
            poll_interval: Duration::from_secs(60),
            reconnect_interval: Duration::from_secs(5 * 60),
            csv: Some(CsvConfig {
                folder: PathBuf::from("logs"),
            }),
            influx: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_delays_sum_to_interval() {
        let cfg = PollerConfig {
            poll_interval: Duration::from_secs(60),
            ..PollerConfig::default()
        };
        assert_eq!(cfg.pre_refresh_delay(), Duration::from_secs(55));
        assert_eq!(cfg.post_refresh_delay(), Duration::from_secs(5));
        assert_eq!(
            cfg.pre_refresh_delay() + cfg.post_refresh_delay(),
            cfg.poll_interval
        );
    }

    #[test]
    fn short_interval_never_exceeds_itself() {
        let cfg = PollerConfig {
            poll_interval: Duration::from_secs(3),
            ..PollerConfig::default()
        };
        assert_eq!(cfg.pre_refresh_delay(), Duration::ZERO);
        assert_eq!(cfg.post_refresh_delay(), Duration::from_secs(3));
    }
}
