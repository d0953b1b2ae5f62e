use crate::telemetry::{
    Accelerometer, Accuracy, Battery, BatteryEstimation, Cellular, Humidity, Light, Location,
    LocationMethod, SignalStrength, Temperature, TelemetryPatch, TelemetryRecord,
};
use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

const NAME_PREFIXES: [&str; 4] = ["TIVE", "TRACK", "SENSOR", "MONITOR"];
const METERS_PER_MILE: f64 = 0.000621371;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// IMEI-shaped id: `35` followed by 13 digits.
pub fn generate_device_imei() -> String {
    let mut rng = rand::thread_rng();
    format!("35{:013}", rng.gen_range(0..10_000_000_000_000_u64))
}

pub fn generate_device_name() -> String {
    let mut rng = rand::thread_rng();
    let prefix = NAME_PREFIXES.choose(&mut rng).copied().unwrap_or("TIVE");
    format!("{}-{:04}", prefix, rng.gen_range(0..10_000))
}

/// Somewhere in the continental US.
pub fn generate_coordinates() -> Coordinates {
    let mut rng = rand::thread_rng();
    Coordinates {
        lat: rng.gen_range(25.0..50.0),
        lng: rng.gen_range(-125.0..-70.0),
    }
}

/// Celsius in 20-35, two decimals.
pub fn generate_temperature() -> f64 {
    round_to(rand::thread_rng().gen_range(20.0..35.0), 2)
}

/// Fully populated record with every optional sensor block filled in.
pub fn generate_full_record() -> TelemetryRecord {
    generate_full(TelemetryPatch::default())
}

/// Fully populated record, with `patch` laid over the top-level fields.
pub fn generate_full(patch: TelemetryPatch) -> TelemetryRecord {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let coords = generate_coordinates();

    // Fahrenheit comes from its own draw, so it need not match Celsius.
    let celsius = generate_temperature();
    let fahrenheit = round_to(generate_temperature() * 9.0 / 5.0 + 32.0, 2);

    let record = TelemetryRecord {
        entry_time_epoch: now.timestamp(),
        entry_time_utc: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        entity_name: None,
        device_id: generate_device_imei(),
        device_name: generate_device_name(),
        temperature: Temperature {
            celsius,
            fahrenheit: Some(fahrenheit),
        },
        location: Location {
            latitude: coords.lat,
            longitude: coords.lng,
            formatted_address: Some(format!(
                "{} Main St, City, ST {}, USA",
                rng.gen_range(0..1000),
                rng.gen_range(10_000..100_000)
            )),
            location_method: [LocationMethod::Gps, LocationMethod::Wifi, LocationMethod::Cell]
                .choose(&mut rng)
                .copied(),
            accuracy: Some(Accuracy {
                meters: rng.gen_range(5.0_f64..55.0).floor() as u32,
                kilometers: round_to(rng.gen_range(5.0..55.0) / 1000.0, 2),
                miles: round_to(rng.gen_range(5.0..55.0) * METERS_PER_MILE, 2),
            }),
            geolocation_source_name: None,
            cell_tower_used_count: None,
            wifi_access_point_used_count: None,
        },
        battery: Some(Battery {
            percentage: rng.gen_range(20..100),
            estimation: *[
                BatteryEstimation::Days,
                BatteryEstimation::Weeks,
                BatteryEstimation::Months,
            ]
            .choose(&mut rng)
            .unwrap_or(&BatteryEstimation::Days),
            is_charging: rng.gen_bool(0.3),
        }),
        humidity: Some(Humidity {
            percentage: round_to(rng.gen_range(30.0..80.0), 1),
        }),
        light: Some(Light {
            lux: round_to(rng.gen_range(100.0..1000.0), 1),
        }),
        accelerometer: Some(Accelerometer {
            g: round_to(rng.gen_range(0.5..1.0), 3),
            x: round_to(rng.gen_range(-1.0..1.0), 3),
            y: round_to(rng.gen_range(-1.0..1.0), 3),
            z: round_to(rng.gen_range(-1.0..1.0), 3),
        }),
        cellular: Some(Cellular {
            signal_strength: *[SignalStrength::Poor, SignalStrength::Fair, SignalStrength::Good]
                .choose(&mut rng)
                .unwrap_or(&SignalStrength::Fair),
            dbm: round_to(rng.gen_range(-100.0..-50.0), 2),
        }),
        shipment: None,
        account_id: Some(rng.gen_range(1000..10_000)),
        shipment_id: Some(format!("SHIP-{}", rng.gen_range(0..1_000_000))),
        public_shipment_id: None,
    };

    record.merge(patch)
}

/// Smallest record a receiver should accept: ids, Celsius and a position.
pub fn generate_minimal() -> TelemetryRecord {
    let coords = generate_coordinates();

    TelemetryRecord {
        entry_time_epoch: Utc::now().timestamp(),
        entry_time_utc: None,
        entity_name: None,
        device_id: generate_device_imei(),
        device_name: generate_device_name(),
        temperature: Temperature {
            celsius: 25.0,
            fahrenheit: None,
        },
        location: Location {
            latitude: coords.lat,
            longitude: coords.lng,
            formatted_address: None,
            location_method: None,
            accuracy: None,
            geolocation_source_name: None,
            cell_tower_used_count: None,
            wifi_access_point_used_count: None,
        },
        battery: None,
        humidity: None,
        light: None,
        accelerometer: None,
        cellular: None,
        shipment: None,
        account_id: None,
        shipment_id: None,
        public_shipment_id: None,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::collections::BTreeSet;

    #[test]
    fn test_device_imei_shape() {
        for _ in 0..100 {
            let imei = generate_device_imei();
            assert_eq!(imei.len(), 15);
            assert!(imei.starts_with("35"));
            assert!(imei.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_device_name_shape() {
        for _ in 0..100 {
            let name = generate_device_name();
            let (prefix, number) = name.split_once('-').unwrap();
            assert!(NAME_PREFIXES.contains(&prefix));
            assert_eq!(number.len(), 4);
            assert!(number.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_full_record_ranges() {
        for _ in 0..500 {
            let record = generate_full_record();
            assert!((25.0..=50.0).contains(&record.location.latitude));
            assert!((-125.0..=-70.0).contains(&record.location.longitude));
            assert!((20.0..=35.0).contains(&record.temperature.celsius));

            let battery = record.battery.as_ref().unwrap();
            assert!((20..=100).contains(&battery.percentage));

            let humidity = record.humidity.as_ref().unwrap();
            assert!((30.0..=80.0).contains(&humidity.percentage));

            let lux = record.light.as_ref().unwrap().lux;
            assert!((100.0..=1000.0).contains(&lux));

            let accel = record.accelerometer.as_ref().unwrap();
            assert!((0.5..=1.0).contains(&accel.g));
            for axis in [accel.x, accel.y, accel.z] {
                assert!((-1.0..=1.0).contains(&axis));
            }

            let dbm = record.cellular.as_ref().unwrap().dbm;
            assert!((-100.0..=-50.0).contains(&dbm));

            let account = record.account_id.unwrap();
            assert!((1000..10_000).contains(&account));
            assert!(record.shipment_id.as_ref().unwrap().starts_with("SHIP-"));
        }
    }

    #[test]
    fn test_full_record_timestamp_is_now_in_seconds() {
        let before = Utc::now().timestamp();
        let record = generate_full_record();
        let after = Utc::now().timestamp();
        assert!(record.entry_time_epoch >= before && record.entry_time_epoch <= after);

        let utc = record.entry_time_utc.unwrap();
        assert!(utc.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&utc).is_ok());
    }

    #[test]
    fn test_minimal_record_fields() {
        let value = serde_json::to_value(generate_minimal()).unwrap();
        let top: BTreeSet<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            top,
            BTreeSet::from([
                "EntryTimeEpoch",
                "DeviceId",
                "DeviceName",
                "Temperature",
                "Location"
            ])
        );

        let temperature = value["Temperature"].as_object().unwrap();
        assert_eq!(temperature.len(), 1);
        assert_eq!(temperature["Celsius"], Value::from(25.0));

        let location: BTreeSet<&str> = value["Location"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(location, BTreeSet::from(["Latitude", "Longitude"]));
    }

    #[test]
    fn test_patch_overrides_generated_fields() {
        let record = generate_full(TelemetryPatch {
            device_name: Some("FIXED-0001".to_string()),
            cellular: Some(Cellular {
                signal_strength: SignalStrength::Poor,
                dbm: -110.0,
            }),
            ..Default::default()
        });
        assert_eq!(record.device_name, "FIXED-0001");
        assert_eq!(record.cellular.unwrap().dbm, -110.0);
        assert!(record.battery.is_some());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.25, 1), 2.3);
    }
}
