//! Canonicalizer (C1)
//!
//! Stable JSON canonicalization, SHA-256 content hashing, and ISO-8601
//! normalization. Every hash-identified object in the system (plan_hash,
//! journal_id, evidence_id, artifact hashes) is the SHA-256 of the output
//! of [`canonical_json`] applied to that object's canonical form.
//!
//! Rules:
//! - keys sorted lexicographically
//! - no insignificant whitespace
//! - no trailing zeros on integer-valued numbers
//! - numeric-string preservation for arbitrary-precision offsets (callers
//!   pass those fields as JSON strings, never as `serde_json::Number`)
//! - null/absent keys dropped
//! - arrays preserved in input order; callers pre-sort where order must
//!   not affect the hash

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Errors raised while canonicalizing a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    /// Value failed to serialize to JSON.
    Serialize(String),
    /// A number was NaN or infinite, which has no canonical JSON form.
    NonFiniteNumber,
    /// An offset decimal string was malformed (non-digit or negative).
    InvalidOffsetDecimal(String),
}

impl fmt::Display for CanonicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize(msg) => write!(f, "failed to serialize value: {msg}"),
            Self::NonFiniteNumber => write!(f, "non-finite number has no canonical JSON form"),
            Self::InvalidOffsetDecimal(s) => write!(f, "invalid offset decimal string: {s}"),
        }
    }
}

impl std::error::Error for CanonicalError {}

pub type CanonicalResult<T> = Result<T, CanonicalError>;

/// Produces byte-for-byte deterministic JSON for `value`.
///
/// Accepts anything `Serialize`; serializes to `serde_json::Value` first so
/// the sorting/formatting rules below apply uniformly regardless of the
/// source type.
pub fn canonical_json<T: Serialize>(value: &T) -> CanonicalResult<String> {
    let v = serde_json::to_value(value).map_err(|e| CanonicalError::Serialize(e.to_string()))?;
    let mut out = String::new();
    write_canonical(&v, &mut out)?;
    Ok(out)
}

/// As [`canonical_json`] but for a value already parsed into
/// `serde_json::Value` (e.g. an opaque row payload read back from storage).
pub fn canonical_json_value(value: &Value) -> CanonicalResult<String> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, out: &mut String) -> CanonicalResult<()> {
    match value {
        Value::Null => {
            out.push_str("null");
            Ok(())
        }
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(CanonicalError::NonFiniteNumber);
                }
            }
            // serde_json already renders integer-valued numbers without a
            // trailing ".0"; we rely on that and never round-trip through
            // f64 ourselves to avoid precision loss.
            out.push_str(&n.to_string());
            Ok(())
        }
        Value::String(s) => {
            write_json_string(s, out);
            Ok(())
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
            Ok(())
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k)
                .collect();
            keys.sort();
            out.push('{');
            for (i, k) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(k, out);
                out.push(':');
                write_canonical(&map[*k], out)?;
            }
            out.push('}');
            Ok(())
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// `sha256Hex(canonicalJson(value))` — the universal content hash.
pub fn sha256_hex_of<T: Serialize>(value: &T) -> CanonicalResult<String> {
    let json = canonical_json(value)?;
    Ok(sha256_hex(json.as_bytes()))
}

/// Lowercase hex SHA-256 of arbitrary bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for b in digest {
        hex.push_str(&format!("{b:02x}"));
    }
    hex
}

/// Renders `t` as ISO-8601 with millisecond precision: `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn normalize_iso(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `#[serde(with = "crate::canonical::iso8601")]` for a required `DateTime<Utc>`
/// field — every persisted or hash-covered timestamp goes through
/// [`normalize_iso`] on the wire instead of chrono's default variable-precision
/// RFC3339 so plan hashes and evidence manifests are stable on precision.
pub mod iso8601 {
    use super::normalize_iso;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&normalize_iso(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Same as [`iso8601`] for `Option<DateTime<Utc>>` fields.
pub mod iso8601_option {
    use super::normalize_iso;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&normalize_iso(t)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|raw| {
            DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

/// Strips leading zeros from an arbitrary-precision offset decimal string
/// and rejects negatives or non-digit characters.
pub fn canonicalize_offset_decimal_string(s: &str) -> CanonicalResult<String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CanonicalError::InvalidOffsetDecimal(s.to_string()));
    }
    let trimmed = s.trim_start_matches('0');
    Ok(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys() {
        let v = json!({"b": 1, "a": 2});
        assert_eq!(canonical_json_value(&v).unwrap(), r#"{"a":2,"b":1}"#);
    }

    #[test]
    fn drops_null_keys() {
        let v = json!({"a": 1, "b": null});
        assert_eq!(canonical_json_value(&v).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn preserves_array_order() {
        let v = json!([3, 1, 2]);
        assert_eq!(canonical_json_value(&v).unwrap(), "[3,1,2]");
    }

    #[test]
    fn no_trailing_zero_on_integers() {
        let v = json!({"n": 5});
        assert_eq!(canonical_json_value(&v).unwrap(), r#"{"n":5}"#);
    }

    #[test]
    fn round_trip_is_idempotent() {
        let v = json!({"z": [1, 2, {"y": "x"}], "a": true});
        let once = canonical_json_value(&v).unwrap();
        let parsed: Value = serde_json::from_str(&once).unwrap();
        let twice = canonical_json_value(&parsed).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn offset_decimal_strips_leading_zeros() {
        assert_eq!(canonicalize_offset_decimal_string("00042").unwrap(), "42");
        assert_eq!(canonicalize_offset_decimal_string("0").unwrap(), "0");
        assert!(canonicalize_offset_decimal_string("-1").is_err());
        assert!(canonicalize_offset_decimal_string("12a").is_err());
    }

    #[test]
    fn sha256_hex_is_stable() {
        let h1 = sha256_hex_of(&json!({"a": 1, "b": 2})).unwrap();
        let h2 = sha256_hex_of(&json!({"b": 2, "a": 1})).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }
}
