//! Deserializers for query-string values.
//!
//! `axum::extract::Query` hands every value over as a string, and flattened
//! structs lose the type hints serde would otherwise use. These helpers accept
//! either the string form or the native JSON form, and treat empty strings as
//! absent.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose<T> {
    Native(T),
    Text(String),
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose<i64>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Native(n)) => Ok(Some(n)),
        Some(Loose::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Loose::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose<bool>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Loose::Native(b)) => Ok(Some(b)),
        Some(Loose::Text(s)) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid boolean value: {}",
                other
            ))),
        },
    }
}

/// Treats an empty or whitespace-only string as absent.
pub fn deserialize_optional_trimmed<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Trims surrounding whitespace before validation sees the value.
pub fn deserialize_trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Like [`deserialize_trimmed`] for optional fields. An empty string stays
/// `Some("")` so validators still reject it.
pub fn deserialize_trimmed_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|s| s.trim().to_string()))
}

/// Keeps an explicit `null` apart from a missing field in partial updates.
///
/// Use with `#[serde(default)]`: a missing key stays `None`, `null` becomes
/// `Some(None)` and a value becomes `Some(Some(v))`.
pub fn deserialize_nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_i64")]
        id: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
        search: Option<String>,
    }

    #[test]
    fn test_string_values() {
        let q: Query =
            serde_json::from_str(r#"{"id": "42", "flag": "true", "search": " ada "}"#).unwrap();
        assert_eq!(q.id, Some(42));
        assert_eq!(q.flag, Some(true));
        assert_eq!(q.search.as_deref(), Some("ada"));
    }

    #[test]
    fn test_native_values() {
        let q: Query = serde_json::from_str(r#"{"id": 7, "flag": false}"#).unwrap();
        assert_eq!(q.id, Some(7));
        assert_eq!(q.flag, Some(false));
    }

    #[test]
    fn test_empty_values_are_none() {
        let q: Query = serde_json::from_str(r#"{"id": "", "flag": "", "search": "  "}"#).unwrap();
        assert_eq!(q.id, None);
        assert_eq!(q.flag, None);
        assert_eq!(q.search, None);
    }

    #[test]
    fn test_missing_values_are_none() {
        let q: Query = serde_json::from_str("{}").unwrap();
        assert_eq!(q.id, None);
        assert_eq!(q.flag, None);
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_nullable")]
        phone: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_null_from_missing() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"phone": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"phone": "555"}"#).unwrap();

        assert_eq!(missing.phone, None);
        assert_eq!(cleared.phone, Some(None));
        assert_eq!(set.phone, Some(Some("555".to_string())));
    }

    #[derive(Deserialize)]
    struct Body {
        #[serde(deserialize_with = "deserialize_trimmed")]
        email: String,
        #[serde(default, deserialize_with = "deserialize_trimmed_option")]
        backup: Option<String>,
    }

    #[test]
    fn test_trimmed_fields() {
        let body: Body =
            serde_json::from_str(r#"{"email": "  Ada@School.com ", "backup": "  "}"#).unwrap();
        assert_eq!(body.email, "Ada@School.com");
        assert_eq!(body.backup.as_deref(), Some(""));

        let body: Body = serde_json::from_str(r#"{"email": "a@b.com"}"#).unwrap();
        assert_eq!(body.backup, None);
    }

    #[test]
    fn test_invalid_number_is_error() {
        let result: Result<Query, _> = serde_json::from_str(r#"{"id": "abc"}"#);
        assert!(result.is_err());
    }
}
