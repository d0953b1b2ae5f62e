use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A simulated Tive tracker reading, as posted to the webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TelemetryRecord {
    pub entry_time_epoch: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_time_utc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub device_id: String,
    pub device_name: String,
    pub temperature: Temperature,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<Battery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<Humidity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<Light>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accelerometer: Option<Accelerometer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular: Option<Cellular>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment: Option<Shipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_shipment_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Temperature {
    pub celsius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fahrenheit: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_method: Option<LocationMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<Accuracy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geolocation_source_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_tower_used_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi_access_point_used_count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMethod {
    Gps,
    Wifi,
    Cell,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Accuracy {
    pub meters: u32,
    pub kilometers: f64,
    pub miles: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Battery {
    pub percentage: u32,
    pub estimation: BatteryEstimation,
    pub is_charging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatteryEstimation {
    Days,
    Weeks,
    Months,
    #[serde(rename = "N/A")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Humidity {
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Light {
    pub lux: f64,
}

/// Acceleration per axis plus overall magnitude, in g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Accelerometer {
    pub g: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cellular {
    pub signal_strength: SignalStrength,
    pub dbm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalStrength {
    Poor,
    Fair,
    Good,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Shipment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub device_id: String,
    pub ship_from: Place,
    pub ship_to: Place,
    pub carrier: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
}

/// Top-level fields to lay over a generated record.
///
/// Nested objects replace the generated ones whole; they are never merged
/// field by field.
#[derive(Debug, Clone, Default)]
pub struct TelemetryPatch {
    pub entry_time_epoch: Option<i64>,
    pub entry_time_utc: Option<String>,
    pub entity_name: Option<String>,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub temperature: Option<Temperature>,
    pub location: Option<Location>,
    pub battery: Option<Battery>,
    pub humidity: Option<Humidity>,
    pub light: Option<Light>,
    pub accelerometer: Option<Accelerometer>,
    pub cellular: Option<Cellular>,
    pub shipment: Option<Shipment>,
    pub account_id: Option<u32>,
    pub shipment_id: Option<String>,
    pub public_shipment_id: Option<String>,
}

impl TelemetryRecord {
    /// JSON form of the record with whole floats written as integers, so
    /// `-110.0` goes out as `-110`.
    pub fn to_payload(&self) -> serde_json::Result<Value> {
        let mut value = serde_json::to_value(self)?;
        integral_floats_to_ints(&mut value);
        Ok(value)
    }

    pub fn merge(mut self, patch: TelemetryPatch) -> Self {
        if let Some(v) = patch.entry_time_epoch {
            self.entry_time_epoch = v;
        }
        if let Some(v) = patch.entry_time_utc {
            self.entry_time_utc = Some(v);
        }
        if let Some(v) = patch.entity_name {
            self.entity_name = Some(v);
        }
        if let Some(v) = patch.device_id {
            self.device_id = v;
        }
        if let Some(v) = patch.device_name {
            self.device_name = v;
        }
        if let Some(v) = patch.temperature {
            self.temperature = v;
        }
        if let Some(v) = patch.location {
            self.location = v;
        }
        if patch.battery.is_some() {
            self.battery = patch.battery;
        }
        if patch.humidity.is_some() {
            self.humidity = patch.humidity;
        }
        if patch.light.is_some() {
            self.light = patch.light;
        }
        if patch.accelerometer.is_some() {
            self.accelerometer = patch.accelerometer;
        }
        if patch.cellular.is_some() {
            self.cellular = patch.cellular;
        }
        if patch.shipment.is_some() {
            self.shipment = patch.shipment;
        }
        if patch.account_id.is_some() {
            self.account_id = patch.account_id;
        }
        if patch.shipment_id.is_some() {
            self.shipment_id = patch.shipment_id;
        }
        if patch.public_shipment_id.is_some() {
            self.public_shipment_id = patch.public_shipment_id;
        }
        self
    }
}

fn integral_floats_to_ints(value: &mut Value) {
    match value {
        Value::Number(n) if n.is_f64() => {
            if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    *n = Number::from(f as i64);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integral_floats_to_ints),
        Value::Object(map) => map.values_mut().for_each(integral_floats_to_ints),
        _ => {}
    }
}
