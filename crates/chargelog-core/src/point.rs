// ── Time-series point ──
//
// Picks the charging tags and fields out of a snapshot and renders them
// as one line-protocol point.

use std::fmt::Write;

use serde_json::Value;

use crate::error::CoreError;
use crate::model::{CHARGER_SETTINGS, Vehicle};

/// `(tag key, category, field)` in emission order.
const TAG_SOURCES: [(&str, &str, &str); 7] = [
    ("connectionState", "plug", "connectionState"),
    ("state", "charging", "state"),
    ("chargingType", "charging", "chargingType"),
    ("chargeMode", "charging", "chargeMode"),
    ("maxChargeCurrentAc", CHARGER_SETTINGS, "maxChargeCurrentAc"),
    ("autoUnlockPlugWhenCharged", CHARGER_SETTINGS, "autoUnlockPlugWhenCharged"),
    ("lockState", "plug", "lockState"),
];

/// `(field key, category, field)` in emission order.
const FIELD_SOURCES: [(&str, &str, &str); 5] = [
    ("chargingPowerInWatts", "charging", "chargingPowerInWatts"),
    ("remainingToCompleteInSeconds", "charging", "remainingToCompleteInSeconds"),
    ("stateOfChargeInPercent", "battery", "stateOfChargeInPercent"),
    ("targetStateOfChargeInPercent", CHARGER_SETTINGS, "targetStateOfChargeInPercent"),
    ("cruisingRangeElectricInMeters", "battery", "cruisingRangeElectricInMeters"),
];

/// Tags and fields derived from one vehicle reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingPoint {
    tags: Vec<(String, String)>,
    fields: Vec<(String, Value)>,
}

impl ChargingPoint {
    /// Derive the point from `vehicle`'s current snapshot.
    ///
    /// Every source field must be present; a missing one is an error.
    /// Present-but-null values are dropped from the point, as are empty
    /// tag values (line protocol has no empty tag).
    pub fn from_vehicle(vehicle: &Vehicle) -> Result<Self, CoreError> {
        let mut tags = Vec::with_capacity(TAG_SOURCES.len());
        for (key, category, field) in TAG_SOURCES {
            match vehicle.require(category, field)? {
                Value::Null => {}
                Value::String(s) if s.is_empty() => {}
                value => tags.push((key.to_owned(), tag_text(value))),
            }
        }

        let mut fields = Vec::with_capacity(FIELD_SOURCES.len());
        for (key, category, field) in FIELD_SOURCES {
            match vehicle.require(category, field)? {
                Value::Null => {}
                value => fields.push((key.to_owned(), value.clone())),
            }
        }

        Ok(Self { tags, fields })
    }

    /// Append a tag (e.g. `vin` when several vehicles share a database).
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Whether the point has at least one field. Line protocol rejects
    /// points without fields.
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    /// `key=value,...` tag set, escaped.
    pub fn tags_line(&self) -> String {
        let mut out = String::new();
        for (i, (k, v)) in self.tags.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}={}", escape_key(k), escape_key(v));
        }
        out
    }

    /// `key=value,...` field set, with strings quoted.
    pub fn fields_line(&self) -> String {
        let mut out = String::new();
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}={}", escape_key(k), field_text(v));
        }
        out
    }

    /// Full line-protocol point for `measurement`.
    pub fn to_line(&self, measurement: &str) -> String {
        let tags = self.tags_line();
        if tags.is_empty() {
            format!("{} {}", escape_measurement(measurement), self.fields_line())
        } else {
            format!(
                "{},{tags} {}",
                escape_measurement(measurement),
                self.fields_line()
            )
        }
    }
}

fn tag_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field_text(value: &Value) -> String {
    match value {
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_string(s),
        other => quote_string(&other.to_string()),
    }
}

/// Tag keys, tag values and field keys escape commas, equals signs and spaces.
fn escape_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, ',' | '=' | ' ') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Measurements escape commas and spaces only.
fn escape_measurement(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, ',' | ' ') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn quote_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for ch in raw.chars() {
        if matches!(ch, '"' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::{Category, StateSnapshot};

    fn category(v: Value) -> Category {
        match v {
            Value::Object(map) => map.into_iter().collect(),
            _ => Category::new(),
        }
    }

    fn enyaq() -> Vehicle {
        let state: StateSnapshot = [
            (
                "battery".to_owned(),
                category(json!({
                    "cruisingRangeElectricInMeters": 312_000,
                    "stateOfChargeInPercent": 64
                })),
            ),
            (
                "charging".to_owned(),
                category(json!({
                    "remainingToCompleteInSeconds": 5400,
                    "chargingPowerInWatts": 7200.0,
                    "chargingRateInKilometersPerHour": 42.0,
                    "chargeMode": "MANUAL",
                    "state": "Charging",
                    "chargingType": "AC"
                })),
            ),
            (
                "plug".to_owned(),
                category(json!({ "connectionState": "Connected", "lockState": "Locked" })),
            ),
            (
                CHARGER_SETTINGS.to_owned(),
                category(json!({
                    "maxChargeCurrentAc": "Maximum",
                    "autoUnlockPlugWhenCharged": "Permanent",
                    "targetStateOfChargeInPercent": 80
                })),
            ),
        ]
        .into_iter()
        .collect();
        Vehicle {
            vin: "TMBJC7NY1MF000001".into(),
            name: Some("Enyaq".into()),
            state,
        }
    }

    #[test]
    fn renders_charging_line() {
        let point = ChargingPoint::from_vehicle(&enyaq()).expect("complete snapshot");
        assert_eq!(
            point.to_line("charging"),
            "charging,connectionState=Connected,state=Charging,chargingType=AC,\
             chargeMode=MANUAL,maxChargeCurrentAc=Maximum,\
             autoUnlockPlugWhenCharged=Permanent,lockState=Locked \
             chargingPowerInWatts=7200.0,remainingToCompleteInSeconds=5400,\
             stateOfChargeInPercent=64,targetStateOfChargeInPercent=80,\
             cruisingRangeElectricInMeters=312000"
        );
    }

    #[test]
    fn missing_source_field_is_an_error() {
        let mut vehicle = enyaq();
        vehicle.state = vehicle
            .state
            .categories()
            .filter(|(name, _)| *name != "plug")
            .map(|(name, fields)| (name.to_owned(), fields.clone()))
            .collect();

        let err = ChargingPoint::from_vehicle(&vehicle).expect_err("plug category removed");
        assert!(matches!(
            err,
            CoreError::MissingField { ref category, ref field, .. }
                if category == "plug" && field == "connectionState"
        ));
    }

    #[test]
    fn escapes_tag_values_and_quotes_string_fields() {
        let point = ChargingPoint {
            tags: vec![("state".into(), "Ready For Charging".into())],
            fields: vec![
                ("note".into(), json!("say \"hi\"")),
                ("ok".into(), json!(true)),
            ],
        }
        .with_tag("vin", "A,B=C");

        assert_eq!(
            point.to_line("charging"),
            r#"charging,state=Ready\ For\ Charging,vin=A\,B\=C note="say \"hi\"",ok=true"#
        );
    }

    #[test]
    fn null_values_are_omitted() {
        let mut vehicle = enyaq();
        let mut categories: Vec<(String, Category)> = vehicle
            .state
            .categories()
            .map(|(n, c)| (n.to_owned(), c.clone()))
            .collect();
        for (name, fields) in &mut categories {
            if name == "charging" {
                fields.insert("chargingPowerInWatts".into(), Value::Null);
                fields.insert("chargeMode".into(), Value::Null);
            }
        }
        vehicle.state = categories.into_iter().collect();

        let point = ChargingPoint::from_vehicle(&vehicle).expect("nulls are present keys");
        assert!(!point.tags_line().contains("chargeMode"));
        assert!(!point.fields_line().contains("chargingPowerInWatts"));
        assert!(point.has_fields());
    }

    #[test]
    fn empty_tag_values_are_omitted() {
        let mut vehicle = enyaq();
        let mut categories: Vec<(String, Category)> = vehicle
            .state
            .categories()
            .map(|(n, c)| (n.to_owned(), c.clone()))
            .collect();
        for (name, fields) in &mut categories {
            if name == "charging" {
                fields.insert("chargeMode".into(), json!(""));
                fields.insert("state".into(), json!(""));
            }
        }
        vehicle.state = categories.into_iter().collect();

        let line = ChargingPoint::from_vehicle(&vehicle)
            .expect("empty strings are present keys")
            .to_line("charging");
        assert_eq!(
            line,
            "charging,connectionState=Connected,chargingType=AC,\
             maxChargeCurrentAc=Maximum,autoUnlockPlugWhenCharged=Permanent,\
             lockState=Locked \
             chargingPowerInWatts=7200.0,remainingToCompleteInSeconds=5400,\
             stateOfChargeInPercent=64,targetStateOfChargeInPercent=80,\
             cruisingRangeElectricInMeters=312000"
        );
    }
}
