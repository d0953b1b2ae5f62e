use serde_json::{Number, Value};

/// Field carrying the reading's epoch timestamp.
pub const EPOCH_FIELD: &str = "EntryTimeEpoch";

/// Values below this are taken to be seconds rather than milliseconds.
///
/// This is a heuristic: a seconds count at or above 10^12 (year 33658) would be
/// taken for milliseconds, and a malformed millisecond value below it would be
/// scaled again. The threshold is kept as-is for compatibility with existing
/// receivers.
pub const SECONDS_THRESHOLD: f64 = 1e12;

/// Result of inspecting an inbound body.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Body was not JSON; forward the raw bytes.
    Passthrough,
    /// Body was JSON but needed no rewrite.
    Unchanged,
    /// `EntryTimeEpoch` was scaled from seconds to milliseconds.
    Normalized(Vec<u8>),
}

/// Inspects a request body and rewrites `EntryTimeEpoch` from seconds to
/// milliseconds when it looks like seconds.
pub fn normalize_body(body: &[u8]) -> Outcome {
    let mut parsed: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return Outcome::Passthrough,
    };

    let Some(epoch) = parsed.get_mut(EPOCH_FIELD) else {
        return Outcome::Unchanged;
    };

    match scale_epoch(epoch) {
        Some(scaled) => {
            *epoch = Value::Number(scaled);
            match serde_json::to_vec(&parsed) {
                Ok(bytes) => Outcome::Normalized(bytes),
                Err(_) => Outcome::Unchanged,
            }
        }
        None => Outcome::Unchanged,
    }
}

fn scale_epoch(value: &Value) -> Option<Number> {
    let Value::Number(n) = value else {
        return None;
    };

    if let Some(secs) = n.as_i64() {
        if secs > 0 && (secs as f64) < SECONDS_THRESHOLD {
            return Some(Number::from(secs * 1000));
        }
        return None;
    }

    // u64 values above i64::MAX are far past the threshold
    if n.is_u64() {
        return None;
    }

    let secs = n.as_f64()?;
    if !(secs > 0.0 && secs < SECONDS_THRESHOLD) {
        return None;
    }

    // Whole products are written as integers; below the threshold they fit in i64.
    let millis = secs * 1000.0;
    if millis.fract() == 0.0 {
        Some(Number::from(millis as i64))
    } else {
        Number::from_f64(millis)
    }
}
