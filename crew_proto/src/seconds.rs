//! Lenient decoding for "seconds remaining" counters.
//!
//! The authority reports countdowns as integers, but `null`, floats and
//! numeric strings have all been observed. Everything collapses to a
//! non-negative whole number of seconds, truncating fractions.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(from_value).unwrap_or(0))
}

pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse))
}

/// Interpret a JSON value as seconds, returning `0` for anything unusable.
pub fn from_value(value: &Value) -> u32 {
    parse(value).unwrap_or(0)
}

fn parse(value: &Value) -> Option<u32> {
    let raw = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.trunc().clamp(0.0, u32::MAX as f64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncates_and_clamps() {
        assert_eq!(from_value(&json!(12)), 12);
        assert_eq!(from_value(&json!(12.9)), 12);
        assert_eq!(from_value(&json!(-4)), 0);
        assert_eq!(from_value(&json!("7")), 7);
        assert_eq!(from_value(&json!(null)), 0);
        assert_eq!(from_value(&json!({"x": 1})), 0);
    }
}
