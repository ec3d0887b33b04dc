// ── Poller ──
//
// Reconnect-and-record loop: log in, tick at a fixed cadence until the
// session reaches the reconnect interval, then start over with a fresh
// session. Cancellation is cooperative and observed at tick boundaries,
// inside both sleeps, and before every side effect that follows an await.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use chargelog_api::{InfluxClient, TransportConfig};

use crate::config::{MEASUREMENT, PollerConfig};
use crate::csv_sink::{CsvSink, csv_path};
use crate::error::CoreError;
use crate::model::Vehicle;
use crate::point::ChargingPoint;
use crate::record::FlatRecord;
use crate::session::{Connector, Session};

/// Local wall clock used for file names and the `Time` column.
pub type WallClock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

// ── EpochState ───────────────────────────────────────────────────

/// Poller state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochState {
    /// No session; a login is about to be attempted.
    Disconnected,
    /// Login succeeded; sinks are being opened.
    Connected,
    /// Ticking.
    Polling,
    /// Cancelled. Terminal.
    Terminated,
    /// Login failed. Terminal.
    FatalExit,
}

/// Counters reported when a run ends by cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub epochs: u32,
    pub ticks: u64,
    pub records: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpochEnd {
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TickEnd {
    Completed,
    Cancelled,
}

// ── Poller ───────────────────────────────────────────────────────

/// Drives sessions from a [`Connector`] and records every reading.
pub struct Poller<C: Connector> {
    config: PollerConfig,
    connector: C,
    influx: Option<InfluxClient>,
    cancel: CancellationToken,
    state: watch::Sender<EpochState>,
    clock: WallClock,
}

impl<C: Connector> Poller<C> {
    /// Create a poller. Does NOT connect -- call [`run()`](Self::run).
    ///
    /// Builds the time-series client up front so a bad host fails before
    /// the first login.
    pub fn new(
        config: PollerConfig,
        connector: C,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError> {
        let influx = match &config.influx {
            Some(ic) => {
                let transport = TransportConfig {
                    tls: ic.tls.clone(),
                    timeout: config.connect.timeout,
                };
                Some(InfluxClient::new(
                    &ic.host,
                    &ic.database,
                    ic.precision,
                    &transport,
                )?)
            }
            None => None,
        };
        let (state, _) = watch::channel(EpochState::Disconnected);

        Ok(Self {
            config,
            connector,
            influx,
            cancel,
            state,
            clock: Arc::new(|| Local::now().naive_local()),
        })
    }

    /// Replace the wall clock.
    pub fn with_clock(mut self, clock: WallClock) -> Self {
        self.clock = clock;
        self
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<EpochState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: EpochState) {
        debug!(?state, "poller state");
        self.state.send_replace(state);
    }

    // ── Run loop ─────────────────────────────────────────────────

    /// Run epochs until cancelled.
    ///
    /// Returns `Ok` only on cancellation. A failed login, a rejected
    /// time-series write, a CSV I/O failure, or a snapshot missing a
    /// charging field ends the run with an error.
    pub async fn run(&self) -> Result<RunSummary, CoreError> {
        let mut summary = RunSummary::default();

        loop {
            if self.cancel.is_cancelled() {
                self.set_state(EpochState::Terminated);
                return Ok(summary);
            }

            self.set_state(EpochState::Disconnected);
            let mut session = self.connector.open()?;

            info!(
                username = %self.config.connect.credentials.username,
                "logging in to vehicle service"
            );
            if let Err(e) = session.login().await {
                error!(error = %e, "login failed, exiting");
                self.set_state(EpochState::FatalExit);
                return Err(e);
            }
            self.set_state(EpochState::Connected);
            summary.epochs += 1;

            match self.run_epoch(&mut session, &mut summary).await {
                Ok(EpochEnd::Expired) => {
                    info!(
                        after = ?self.config.reconnect_interval,
                        "reconnect interval reached, starting a new session"
                    );
                }
                Ok(EpochEnd::Cancelled) => {
                    info!("cancelled, stopping");
                    self.set_state(EpochState::Terminated);
                    return Ok(summary);
                }
                Err(e) => {
                    self.set_state(EpochState::Terminated);
                    return Err(e);
                }
            }
            // `session` drops here: the next epoch logs in from scratch.
        }
    }

    /// One epoch: open sinks, tick until expiry or cancellation, close sinks.
    async fn run_epoch<S: Session>(
        &self,
        session: &mut S,
        summary: &mut RunSummary,
    ) -> Result<EpochEnd, CoreError> {
        let login_instant = Instant::now();
        let login_time = (self.clock)();
        info!(at = %login_time, "login success");

        if session.vehicles().is_empty() {
            warn!("account has no vehicles; waiting for the next reconnect");
        }

        let mut sinks = self.open_sinks(session.vehicles(), login_time)?;
        self.set_state(EpochState::Polling);

        let result = self
            .tick_until_expiry(session, &mut sinks, login_instant, summary)
            .await;

        close_sinks(sinks);
        result
    }

    async fn tick_until_expiry<S: Session>(
        &self,
        session: &mut S,
        sinks: &mut IndexMap<String, CsvSink>,
        login_instant: Instant,
        summary: &mut RunSummary,
    ) -> Result<EpochEnd, CoreError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(EpochEnd::Cancelled);
            }
            if login_instant.elapsed() >= self.config.reconnect_interval {
                return Ok(EpochEnd::Expired);
            }

            match self.tick(session, sinks, summary).await? {
                TickEnd::Completed => summary.ticks += 1,
                TickEnd::Cancelled => return Ok(EpochEnd::Cancelled),
            }
        }
    }

    /// Open one CSV file per vehicle for this epoch, if CSV is enabled.
    fn open_sinks(
        &self,
        vehicles: &[Vehicle],
        login_time: NaiveDateTime,
    ) -> Result<IndexMap<String, CsvSink>, CoreError> {
        let mut sinks = IndexMap::new();
        let Some(csv) = &self.config.csv else {
            return Ok(sinks);
        };

        let suffix_vin = vehicles.len() > 1;
        for vehicle in vehicles {
            let vin = suffix_vin.then_some(vehicle.vin.as_str());
            let path = csv_path(&csv.folder, login_time, vin);
            match CsvSink::create(&path) {
                Ok(sink) => {
                    info!(path = %path.display(), vehicle = vehicle.label(), "recording to CSV");
                    sinks.insert(vehicle.vin.clone(), sink);
                }
                Err(e) => {
                    close_sinks(sinks);
                    return Err(e);
                }
            }
        }
        Ok(sinks)
    }

    // ── Tick ─────────────────────────────────────────────────────

    /// Read, flatten, record; sleep; refresh; sleep; write time-series.
    async fn tick<S: Session>(
        &self,
        session: &mut S,
        sinks: &mut IndexMap<String, CsvSink>,
        summary: &mut RunSummary,
    ) -> Result<TickEnd, CoreError> {
        let vehicles = session.vehicles();
        let tag_vin = vehicles.len() > 1;
        let mut points = Vec::with_capacity(vehicles.len());

        for vehicle in vehicles {
            let point = ChargingPoint::from_vehicle(vehicle)?;
            info!(
                vehicle = vehicle.label(),
                tags = %point.tags_line(),
                fields = %point.fields_line(),
                "reading"
            );

            let record = FlatRecord::flatten(&vehicle.state, (self.clock)());
            if let Some(sink) = sinks.get_mut(&vehicle.vin) {
                sink.append(&record)?;
                summary.records += 1;
            }

            points.push(if tag_vin {
                point.with_tag("vin", &vehicle.vin)
            } else {
                point
            });
        }

        if !self.pause(self.config.pre_refresh_delay()).await {
            return Ok(TickEnd::Cancelled);
        }

        match session.refresh().await {
            Ok(()) => info!("refresh succeeded"),
            Err(e) => warn!(error = %e, "refresh failed, keeping previous snapshot"),
        }

        if !self.pause(self.config.post_refresh_delay()).await {
            return Ok(TickEnd::Cancelled);
        }

        if let Some(influx) = &self.influx {
            for point in points {
                if self.cancel.is_cancelled() {
                    return Ok(TickEnd::Cancelled);
                }
                if !point.has_fields() {
                    warn!("all charging fields are null, skipping time-series write");
                    continue;
                }
                influx
                    .write(point.to_line(MEASUREMENT))
                    .await
                    .map_err(CoreError::time_series)?;
            }
        }

        Ok(TickEnd::Completed)
    }

    /// Sleep for `period`. Returns `false` if cancelled first.
    async fn pause(&self, period: Duration) -> bool {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => false,
            () = tokio::time::sleep(period) => true,
        }
    }
}

/// Close every sink, logging but otherwise ignoring failures.
fn close_sinks(sinks: IndexMap<String, CsvSink>) {
    for (_, sink) in sinks {
        let path = sink.path().to_path_buf();
        if let Err(e) = sink.close() {
            warn!(path = %path.display(), error = %e, "closing CSV file failed");
        }
    }
}
