// Wire types for the vehicle cloud API.
//
// Kept close to the JSON the service returns. Charging payloads are not
// modelled field-by-field: they are category objects whose members change
// between firmware releases, so they stay as ordered JSON maps.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered JSON object as returned by the charging endpoints.
pub type JsonObject = IndexMap<String, Value>;

/// Response of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A vehicle entry from the garage endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarageVehicle {
    pub vin: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// The garage endpoint has returned both a bare array and a wrapped
/// `{ "vehicles": [...] }` object across API revisions.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum GarageResponse {
    Bare(Vec<GarageVehicle>),
    Wrapped { vehicles: Vec<GarageVehicle> },
}

impl From<GarageResponse> for Vec<GarageVehicle> {
    fn from(resp: GarageResponse) -> Self {
        match resp {
            GarageResponse::Bare(v) | GarageResponse::Wrapped { vehicles: v } => v,
        }
    }
}
