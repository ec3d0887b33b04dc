// ── Domain model ──
//
// A vehicle and the two-level state snapshot read from it on each tick.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use chargelog_api::JsonObject;

use crate::error::CoreError;

/// Category holding the charger settings payload.
pub const CHARGER_SETTINGS: &str = "chargerSettings";

/// Field name → scalar value within one category.
pub type Category = IndexMap<String, Value>;

/// Category name → fields, in the order the service returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot(IndexMap<String, Category>);

impl StateSnapshot {
    /// Assemble a snapshot from the charging status and settings payloads.
    ///
    /// Every object-valued member of `status` becomes a category; the
    /// settings payload becomes the `chargerSettings` category. Top-level
    /// scalars in `status` (capture timestamps and the like) are not part of
    /// any category and are skipped.
    pub fn from_payloads(status: JsonObject, settings: JsonObject) -> Self {
        let mut categories: IndexMap<String, Category> = IndexMap::new();
        for (name, value) in status {
            match value {
                Value::Object(fields) => {
                    categories.insert(name, fields.into_iter().collect());
                }
                other => trace!(key = %name, value = %other, "skipping top-level scalar"),
            }
        }
        categories.insert(CHARGER_SETTINGS.to_owned(), settings);
        Self(categories)
    }

    /// Iterate categories in snapshot order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, category: &str, field: &str) -> Option<&Value> {
        self.0.get(category).and_then(|c| c.get(field))
    }
}

impl FromIterator<(String, Category)> for StateSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Category)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A controllable vehicle and its most recently fetched state.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub vin: String,
    pub name: Option<String>,
    pub state: StateSnapshot,
}

impl Vehicle {
    /// Look up a field that downstream consumers require.
    pub fn require(&self, category: &str, field: &str) -> Result<&Value, CoreError> {
        self.state
            .get(category, field)
            .ok_or_else(|| CoreError::MissingField {
                vin: self.vin.clone(),
                category: category.to_owned(),
                field: field.to_owned(),
            })
    }

    /// Display label: the vehicle name when known, the VIN otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.vin)
    }
}
