//! Embedded timestamp recovery.
//!
//! Some responses carry the moment they were produced as
//! `{"data": {"ts": <milliseconds since the Unix epoch>}}`.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde_json::Value;

/// Raw `data.ts` value, if present, numeric and non-zero.
pub fn epoch_millis(content: &Value) -> Option<i64> {
    let ts = content.get("data")?.as_object()?.get("ts")?;
    let millis = match ts.as_i64() {
        Some(millis) => millis,
        None => {
            let float = ts.as_f64()?;
            if !float.is_finite() || float.abs() >= i64::MAX as f64 {
                return None;
            }
            float.trunc() as i64
        }
    };
    (millis != 0).then_some(millis)
}

/// Convert epoch milliseconds to the local time zone.
pub fn from_epoch_millis(millis: i64) -> Option<DateTime<Local>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|utc| utc.with_timezone(&Local))
}

/// Timestamp embedded in decoded content, in local time.
pub fn extract_timestamp(content: &Value) -> Option<DateTime<Local>> {
    epoch_millis(content).and_then(from_epoch_millis)
}
