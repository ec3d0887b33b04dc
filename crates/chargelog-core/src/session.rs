// ── Session seam ──
//
// The poller drives a session through these traits. The production
// implementation sits on `ConnectClient`; tests substitute scripted ones.

use std::future::Future;

use tracing::{debug, info};

use chargelog_api::{ConnectClient, TransportConfig};

use crate::config::{ConnectConfig, Credentials};
use crate::error::CoreError;
use crate::model::{StateSnapshot, Vehicle};

/// An authenticated connection to the vehicle cloud for one epoch.
pub trait Session: Send {
    /// Authenticate and load the initial vehicle list and snapshots.
    fn login(&mut self) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Vehicles loaded by the last successful `login()` or `refresh()`.
    fn vehicles(&self) -> &[Vehicle];

    /// Re-fetch every vehicle's snapshot. On failure the previous
    /// snapshots stay in place.
    fn refresh(&mut self) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Factory for fresh, not yet authenticated sessions.
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Build a new session. Each epoch gets its own.
    fn open(&self) -> Result<Self::Session, CoreError>;
}

// ── HTTP implementation ──────────────────────────────────────────────

/// [`Connector`] producing [`ConnectSession`]s.
#[derive(Debug, Clone)]
pub struct ConnectConnector {
    config: ConnectConfig,
}

impl ConnectConnector {
    pub fn new(config: ConnectConfig) -> Self {
        Self { config }
    }
}

impl Connector for ConnectConnector {
    type Session = ConnectSession;

    fn open(&self) -> Result<ConnectSession, CoreError> {
        let transport = TransportConfig::default().with_timeout(self.config.timeout);
        let client = ConnectClient::new(&self.config.base_url, &transport)?;
        Ok(ConnectSession::new(client, self.config.credentials.clone()))
    }
}

/// Session backed by a [`ConnectClient`].
pub struct ConnectSession {
    client: ConnectClient,
    credentials: Credentials,
    vehicles: Vec<Vehicle>,
}

impl ConnectSession {
    pub fn new(client: ConnectClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            vehicles: Vec::new(),
        }
    }

    async fn fetch_state(&self, vin: &str) -> Result<StateSnapshot, CoreError> {
        let status = self.client.charging_status(vin).await?;
        let settings = self.client.charging_settings(vin).await?;
        Ok(StateSnapshot::from_payloads(status, settings))
    }
}

impl Drop for ConnectSession {
    fn drop(&mut self) {
        self.client.logout();
    }
}

impl Session for ConnectSession {
    async fn login(&mut self) -> Result<(), CoreError> {
        self.client
            .login(&self.credentials.username, &self.credentials.password)
            .await?;

        let garage = self.client.list_vehicles().await?;
        let mut vehicles = Vec::with_capacity(garage.len());
        for entry in garage {
            let state = self.fetch_state(&entry.vin).await?;
            vehicles.push(Vehicle {
                vin: entry.vin,
                name: entry.name,
                state,
            });
        }
        info!(count = vehicles.len(), "vehicles loaded");
        self.vehicles = vehicles;
        Ok(())
    }

    fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    async fn refresh(&mut self) -> Result<(), CoreError> {
        // Fetch everything first so a mid-way failure leaves all
        // snapshots at the previous tick's values.
        let mut fresh = Vec::with_capacity(self.vehicles.len());
        for vehicle in &self.vehicles {
            fresh.push(self.fetch_state(&vehicle.vin).await?);
        }
        for (vehicle, state) in self.vehicles.iter_mut().zip(fresh) {
            vehicle.state = state;
        }
        debug!("snapshots refreshed");
        Ok(())
    }
}
