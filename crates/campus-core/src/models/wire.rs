//! Lenient decoders for fields the backend does not serialize consistently.

use serde::de::{self, Deserializer, Visitor};
use serde_json::Value;
use std::fmt;

use super::timestamp::Timestamp;

/// Accepts an identifier serialized either as a JSON string or as an integer.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or integer identifier")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Accepts an optional count given as a number, a numeric string, or null.
/// Anything else (negative, free text) decodes as absent instead of failing the record.
pub fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

/// Timestamp that never fails its record: null or a non-string value decodes
/// as a blank timestamp, numbers are kept as their text.
pub fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_timestamp(deserializer)?.unwrap_or_default())
}

pub fn lenient_optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => Some(Timestamp::parse(raw)),
        Some(Value::Number(n)) => Some(Timestamp::parse(n.to_string())),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Record {
        #[serde(deserialize_with = "string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "lenient_count")]
        capacity: Option<u32>,
        #[serde(default, deserialize_with = "lenient_timestamp")]
        at: Timestamp,
    }

    #[test]
    fn test_numeric_id_becomes_string() {
        let record: Record = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.capacity, None);
    }

    #[test]
    fn test_capacity_accepts_numeric_string() {
        let record: Record = serde_json::from_str(r#"{"id": "a", "capacity": " 30 "}"#).unwrap();
        assert_eq!(record.capacity, Some(30));
    }

    #[test]
    fn test_capacity_ignores_garbage() {
        let record: Record = serde_json::from_str(r#"{"id": "a", "capacity": "lots"}"#).unwrap();
        assert_eq!(record.capacity, None);
        let record: Record = serde_json::from_str(r#"{"id": "a", "capacity": -3}"#).unwrap();
        assert_eq!(record.capacity, None);
    }

    #[test]
    fn test_timestamp_null_or_odd_type_is_blank() {
        let record: Record = serde_json::from_str(r#"{"id": "a", "at": null}"#).unwrap();
        assert!(record.at.is_blank());
        let record: Record = serde_json::from_str(r#"{"id": "a", "at": {"x": 1}}"#).unwrap();
        assert!(record.at.is_blank());
        let record: Record = serde_json::from_str(r#"{"id": "a", "at": "2026-10-19"}"#).unwrap();
        assert!(record.at.parsed().is_some());
    }
}
