//! Lenient deserializers for values that arrive either as JSON numbers or as strings.
//!
//! Campaign payloads are produced by the publishing side and historically mix
//! `"42"` and `42` for the same field.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a string or a number and yields its string form.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Like [`string_or_number`], but `null`, absent and empty values become `None`.
pub fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Count given as a number, a numeric string, or empty/null (zero).
///
/// Negative values read as zero, i.e. an unenforced bound. Floats must be whole.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(count_from_f64)
            .ok_or_else(|| de::Error::custom(format!("invalid count {n}"))),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(0);
            }
            s.parse::<f64>()
                .ok()
                .and_then(count_from_f64)
                .ok_or_else(|| de::Error::custom(format!("invalid count '{s}'")))
        }
        Some(other) => Err(de::Error::custom(format!("invalid count {other}"))),
    }
}

fn count_from_f64(value: f64) -> Option<u32> {
    if !value.is_finite() {
        return None;
    }
    if value <= 0.0 {
        return Some(0);
    }
    if value.fract() != 0.0 {
        return None;
    }
    Some(value.min(u32::MAX as f64) as u32)
}

fn id_from_value<E: de::Error>(value: &Value) -> Result<u64, E> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| E::custom(format!("invalid id {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| E::custom(format!("invalid id '{s}'"))),
        other => Err(E::custom(format!("invalid id {other}"))),
    }
}

/// Optional numeric id, accepting numeric strings.
pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => id_from_value(&v).map(Some),
    }
}

/// A list of ids given as a JSON array or a comma-separated string.
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.iter().map(id_from_value::<D::Error>).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| <D::Error as de::Error>::custom(format!("invalid id '{part}'")))
            })
            .collect(),
        Some(Value::Number(n)) => id_from_value(&Value::Number(n)).map(|id| vec![id]),
        Some(other) => Err(de::Error::custom(format!("invalid id list {other}"))),
    }
}
