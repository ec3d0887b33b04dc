// chargelog-api: Async Rust clients for the Skoda Connect charging API
// and InfluxDB line-protocol writes.

pub mod auth;
pub mod client;
pub mod error;
pub mod influx;
pub mod models;
pub mod transport;

pub use client::{ConnectClient, DEFAULT_BASE_URL};
pub use error::Error;
pub use influx::{InfluxClient, Precision};
pub use models::{GarageVehicle, JsonObject, TokenResponse};
pub use transport::{TlsMode, TransportConfig};
