use crate::generator::{generate_full, generate_full_record, generate_minimal};
use crate::telemetry::{
    Battery, BatteryEstimation, Cellular, SignalStrength, Temperature, TelemetryPatch,
    TelemetryRecord,
};
use lazy_static::lazy_static;
use serde_json::{json, Value};
use tracing::error;

/// A named payload offered for quick selection.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: &'static str,
    pub payload: Value,
}

lazy_static! {
    // Built once per process; the generated entries must not change between lookups.
    static ref CATALOG: Vec<Sample> = build_catalog();
}

/// All samples, in display order.
pub fn catalog() -> &'static [Sample] {
    &CATALOG
}

pub fn find_sample(name: &str) -> Option<&'static Sample> {
    CATALOG.iter().find(|s| s.name == name)
}

fn generated(name: &'static str, record: TelemetryRecord) -> Sample {
    let payload = record.to_payload().unwrap_or_else(|e| {
        error!("Failed to serialize sample {}: {}", name, e);
        Value::Null
    });
    Sample { name, payload }
}

fn fixture(name: &'static str, payload: Value) -> Sample {
    Sample { name, payload }
}

fn build_catalog() -> Vec<Sample> {
    vec![
        generated("Full Payload", generate_full_record()),
        generated("Minimal Payload", generate_minimal()),
        generated(
            "High Temperature Alert",
            generate_full(TelemetryPatch {
                temperature: Some(Temperature {
                    celsius: 45.5,
                    fahrenheit: Some(113.9),
                }),
                ..Default::default()
            }),
        ),
        generated(
            "Low Battery",
            generate_full(TelemetryPatch {
                battery: Some(Battery {
                    percentage: 15,
                    estimation: BatteryEstimation::Days,
                    is_charging: false,
                }),
                ..Default::default()
            }),
        ),
        generated(
            "Poor Signal",
            generate_full(TelemetryPatch {
                cellular: Some(Cellular {
                    signal_strength: SignalStrength::Poor,
                    dbm: -110.0,
                }),
                ..Default::default()
            }),
        ),
        fixture(
            "Standard Temperature Shipment",
            json!({
                "EntityName": "A571992",
                "EntryTimeEpoch": 1739215646000_i64,
                "EntryTimeUtc": "2025-02-10T19:27:26Z",
                "Cellular": { "SignalStrength": "Poor", "Dbm": -100 },
                "Temperature": { "Celsius": 10.078125, "Fahrenheit": 50.140625 },
                "ProbeTemperature": null,
                "Humidity": { "Percentage": 38.70000076293945 },
                "Accelerometer": {
                    "G": 0.9901862198596787,
                    "X": -0.5625,
                    "Y": -0.4375,
                    "Z": 0.6875
                },
                "Light": { "Lux": 0 },
                "Battery": { "Percentage": 65, "Estimation": "N/A", "IsCharging": false },
                "Shipment": {
                    "Id": "CL-13686/PHARMA-SHIP/COLD-LOGISTICS",
                    "Description": null,
                    "DeviceId": "866088073468439",
                    "ShipFrom": {
                        "Latitude": 26.09891,
                        "Longitude": -98.18494,
                        "FormattedAddress": "1460 E Hi Line Rd, Pharr, TX 78577, USA"
                    },
                    "ShipTo": {
                        "Latitude": 40.815468,
                        "Longitude": -73.8805,
                        "FormattedAddress": "772 Edgewater Rd, Bronx, NY 10474, USA"
                    },
                    "Carrier": "EXCALIBUR"
                },
                "AccountId": 478,
                "DeviceId": "863257063350583",
                "DeviceName": "A571992",
                "ShipmentId": "CL-13686/PHARMA-SHIP/COLD-LOGISTICS",
                "PublicShipmentId": "40X614N4WC",
                "Location": {
                    "Latitude": 40.810562,
                    "Longitude": -73.879285,
                    "FormattedAddress": "114 Hunts Point Market, Bronx, NY 10474, USA",
                    "LocationMethod": "wifi",
                    "Accuracy": {
                        "Meters": 23,
                        "Kilometers": 0.023,
                        "Miles": 0.014291572942945556
                    },
                    "GeolocationSourceName": "skyhook",
                    "CellTowerUsedCount": 1,
                    "WifiAccessPointUsedCount": 5
                }
            }),
        ),
        fixture(
            "GPS Location Shipment",
            json!({
                "EntityName": "B234567",
                "EntryTimeEpoch": 1739302046000_i64,
                "EntryTimeUtc": "2025-02-11T19:27:26Z",
                "Cellular": { "SignalStrength": "Good", "Dbm": -75 },
                "Temperature": { "Celsius": 4.5, "Fahrenheit": 40.1 },
                "ProbeTemperature": null,
                "Humidity": { "Percentage": 55.3 },
                "Accelerometer": { "G": 1.012, "X": 0.125, "Y": -0.25, "Z": 0.98 },
                "Light": { "Lux": 125.5 },
                "Battery": { "Percentage": 82, "Estimation": "Weeks", "IsCharging": false },
                "Shipment": {
                    "Id": "INV-45678/VACCINE-BATCH",
                    "Description": "COVID Vaccine Shipment",
                    "DeviceId": "866088073468440",
                    "ShipFrom": {
                        "Latitude": 42.3601,
                        "Longitude": -71.0589,
                        "FormattedAddress": "Boston, MA 02101, USA"
                    },
                    "ShipTo": {
                        "Latitude": 33.749,
                        "Longitude": -84.388,
                        "FormattedAddress": "Atlanta, GA 30303, USA"
                    },
                    "Carrier": "FEDEX-COLD"
                },
                "AccountId": 478,
                "DeviceId": "866088073468440",
                "DeviceName": "B234567",
                "ShipmentId": "INV-45678/VACCINE-BATCH",
                "PublicShipmentId": "7YK832MNP1",
                "Location": {
                    "Latitude": 37.7749,
                    "Longitude": -122.4194,
                    "FormattedAddress": "San Francisco, CA 94102, USA",
                    "LocationMethod": "gps",
                    "Accuracy": { "Meters": 5, "Kilometers": 0.005, "Miles": 0.003 },
                    "GeolocationSourceName": "gnss",
                    "CellTowerUsedCount": 0,
                    "WifiAccessPointUsedCount": 0
                }
            }),
        ),
        fixture(
            "Cellular Location Only",
            json!({
                "EntityName": "C345678",
                "EntryTimeEpoch": 1739388446000_i64,
                "EntryTimeUtc": "2025-02-12T19:27:26Z",
                "Cellular": { "SignalStrength": "Fair", "Dbm": -90 },
                "Temperature": { "Celsius": -18.5, "Fahrenheit": -1.3 },
                "ProbeTemperature": null,
                "Humidity": { "Percentage": 25 },
                "Accelerometer": { "G": 0.995, "X": 0.0, "Y": 0.0, "Z": 0.995 },
                "Light": { "Lux": 0 },
                "Battery": { "Percentage": 45, "Estimation": "Days", "IsCharging": false },
                "Shipment": null,
                "AccountId": 478,
                "DeviceId": "866088073468441",
                "DeviceName": "C345678",
                "ShipmentId": null,
                "PublicShipmentId": null,
                "Location": {
                    "Latitude": 51.5074,
                    "Longitude": -0.1278,
                    "FormattedAddress": "London, UK",
                    "LocationMethod": "cell",
                    "Accuracy": { "Meters": 500, "Kilometers": 0.5, "Miles": 0.31 },
                    "GeolocationSourceName": "cell-triangulation",
                    "CellTowerUsedCount": 3,
                    "WifiAccessPointUsedCount": 0
                }
            }),
        ),
        fixture(
            "Minimal Data Payload",
            json!({
                "EntryTimeEpoch": 1739474846000_i64,
                "EntityName": "D456789",
                "DeviceId": "866088073468442",
                "DeviceName": "D456789",
                "Temperature": { "Celsius": 22.0, "Fahrenheit": 71.6 },
                "Location": {
                    "Latitude": 35.6762,
                    "Longitude": 139.6503,
                    "LocationMethod": null,
                    "Accuracy": null
                }
            }),
        ),
        fixture(
            "Invalid - Missing Device ID",
            json!({
                "EntryTimeEpoch": 1739215646000_i64,
                "DeviceName": "A571992",
                "Temperature": { "Celsius": 10.0 },
                "Location": { "Latitude": 40.0, "Longitude": -73.0 }
            }),
        ),
        fixture("Invalid - Invalid Latitude", invalid_reading(1739215646000, 95.0, -73.0)),
        fixture("Invalid - Invalid Longitude", invalid_reading(1739215646000, 40.0, -200.0)),
        fixture("Invalid - Timestamp in Future", invalid_reading(1893456000000, 40.0, -73.0)),
        fixture("Invalid - Old Timestamp", invalid_reading(1609459200000, 40.0, -73.0)),
    ]
}

/// Bare reading for the deliberately broken samples.
fn invalid_reading(epoch_ms: i64, latitude: f64, longitude: f64) -> Value {
    json!({
        "EntryTimeEpoch": epoch_ms,
        "EntityName": "A571992",
        "DeviceId": "863257063350583",
        "DeviceName": "A571992",
        "Temperature": { "Celsius": 10.0 },
        "Location": { "Latitude": latitude, "Longitude": longitude }
    })
}
