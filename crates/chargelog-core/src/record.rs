// ── Record flattening ──
//
// Collapses a two-level snapshot into a single `category_field` keyed row
// with a leading `Time` column.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde_json::Value;

use crate::model::StateSnapshot;

/// Name of the timestamp column, always first.
pub const TIME_COLUMN: &str = "Time";

/// One flattened reading. Keys keep snapshot order, `Time` first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    cells: IndexMap<String, String>,
}

impl FlatRecord {
    /// Flatten `snapshot` as read at `time` (local wall clock).
    pub fn flatten(snapshot: &StateSnapshot, time: NaiveDateTime) -> Self {
        let mut cells = IndexMap::new();
        cells.insert(
            TIME_COLUMN.to_owned(),
            time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        );
        for (category, fields) in snapshot.categories() {
            for (field, value) in fields {
                cells.insert(column_name(category, field), cell_text(value));
            }
        }
        Self { cells }
    }

    /// Column names in record order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }
}

/// `category_field`.
pub fn column_name(category: &str, field: &str) -> String {
    format!("{category}_{field}")
}

/// Text form of a snapshot value for a CSV cell.
///
/// Strings are written without JSON quotes, `null` as an empty cell, and
/// anything nested deeper than two levels as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            value.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::Category;

    fn category(v: Value) -> Category {
        match v {
            Value::Object(map) => map.into_iter().collect(),
            _ => Category::new(),
        }
    }

    fn at_midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, 1)
            .and_then(|d| d.and_hms_micro_opt(0, 1, 0, 250))
            .expect("valid timestamp")
    }

    #[test]
    fn one_column_per_field_plus_time() {
        let snapshot: StateSnapshot = [
            (
                "battery".to_owned(),
                category(json!({ "stateOfChargeInPercent": 80, "cruisingRangeElectricInMeters": 310_000 })),
            ),
            (
                "plug".to_owned(),
                category(json!({ "connectionState": "Connected", "lockState": "Locked" })),
            ),
            ("empty".to_owned(), Category::new()),
        ]
        .into_iter()
        .collect();

        let record = FlatRecord::flatten(&snapshot, at_midnight());

        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(
            columns,
            [
                "Time",
                "battery_stateOfChargeInPercent",
                "battery_cruisingRangeElectricInMeters",
                "plug_connectionState",
                "plug_lockState",
            ]
        );
        assert_eq!(record.get("Time"), Some("2023-01-01T00:01:00.000250"));
        assert_eq!(record.get("plug_connectionState"), Some("Connected"));
        assert_eq!(record.get("battery_stateOfChargeInPercent"), Some("80"));
    }

    #[test]
    fn empty_snapshot_still_has_time() {
        let record = FlatRecord::flatten(&StateSnapshot::default(), at_midnight());
        assert_eq!(record.columns().collect::<Vec<_>>(), ["Time"]);
    }

    #[test]
    fn cell_text_renders_scalars() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&json!(12.5)), "12.5");
        assert_eq!(cell_text(&json!("Ready")), "Ready");
        assert_eq!(cell_text(&json!({ "a": 1 })), r#"{"a":1}"#);
    }
}
