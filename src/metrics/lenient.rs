//! Numeric decoding that tolerates numbers sent as strings (`"97.50"`).
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse().ok(),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(super) fn gauge<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_number(&value)
        .filter(|number| number.is_finite())
        .unwrap_or(0.0))
}

pub(super) fn counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Some(exact) = value.as_u64() {
        return Ok(exact);
    }
    let number = as_number(&value).unwrap_or(0.0);
    if number.is_finite() && number > 0.0 {
        Ok(number.round() as u64)
    } else {
        Ok(0)
    }
}
