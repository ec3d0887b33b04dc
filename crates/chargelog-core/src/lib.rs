// chargelog-core: Polling loop between chargelog-api and the CLI.
//
// Owns the epoch/tick state machine, snapshot flattening, and the CSV and
// time-series sinks. Configuration arrives fully resolved; nothing here
// reads files or the environment.

pub mod config;
pub mod csv_sink;
pub mod error;
pub mod model;
pub mod point;
pub mod poller;
pub mod record;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    ConnectConfig, Credentials, CsvConfig, InfluxConfig, MEASUREMENT, PollerConfig, REFRESH_LEAD,
};
pub use csv_sink::{CsvSink, csv_path};
pub use error::CoreError;
pub use model::{CHARGER_SETTINGS, Category, StateSnapshot, Vehicle};
pub use point::ChargingPoint;
pub use poller::{EpochState, Poller, RunSummary, WallClock};
pub use record::{FlatRecord, TIME_COLUMN};
pub use session::{ConnectConnector, ConnectSession, Connector, Session};

// Callers configure transport and precision without a direct api dependency.
pub use chargelog_api::{DEFAULT_BASE_URL, Precision, TlsMode};
