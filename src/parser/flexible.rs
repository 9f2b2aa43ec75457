//! Tolerant value types for catalogue payloads.
//!
//! The catalogue API is not consistent about encodings: ratings come back either as
//! JSON numbers or as numeric strings, and dates show up in several textual layouts.
//! `FlexibleFloat` and `FlexibleDate` accept every known wire form and always write
//! back a single canonical one.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Raised when a raw JSON value matches none of the accepted encodings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unable to decode {raw}: tried {}", .attempted.join(", "))]
pub struct DecodeError {
    /// Offending literal, as it appeared on the wire.
    pub raw: String,
    /// Encodings or layouts attempted, in order.
    pub attempted: Vec<&'static str>,
}

impl DecodeError {
    fn new(raw: &Value, attempted: Vec<&'static str>) -> Self {
        Self { raw: raw.to_string(), attempted }
    }
}

// ================================
// FlexibleFloat
// ================================

const FLOAT_KINDS: [&str; 2] = ["number", "string"];

/// A float that decodes from a JSON number or a numeric string.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct FlexibleFloat(pub f64);

impl FlexibleFloat {
    /// JSON null decodes to zero.
    pub fn decode(raw: &Value) -> Result<Self, DecodeError> {
        if raw.is_null() {
            return Ok(Self(0.0));
        }
        if let Some(number) = raw.as_f64() {
            return Ok(Self(number));
        }
        raw.as_str()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(Self)
            .ok_or_else(|| DecodeError::new(raw, FLOAT_KINDS.to_vec()))
    }

    /// Always a JSON number. Non-finite values have no JSON number form and become null.
    pub fn encode(&self) -> Value {
        serde_json::Number::from_f64(self.0)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl From<f64> for FlexibleFloat {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<FlexibleFloat> for f64 {
    fn from(value: FlexibleFloat) -> Self {
        value.0
    }
}

impl fmt::Display for FlexibleFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for FlexibleFloat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::decode(&raw).map_err(de::Error::custom)
    }
}

impl Serialize for FlexibleFloat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

// ================================
// FlexibleDate
// ================================

/// Date layouts accepted by [`FlexibleDate`], in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLayout {
    /// `YYYY-MM-DD`, midnight UTC
    DateOnly,
    /// RFC3339 without fractional seconds
    Rfc3339,
    /// RFC3339 with fractional seconds
    Rfc3339Fractional,
    /// `YYYY-MM-DDTHH:MM:SS`, read as UTC
    NaiveT,
    /// `YYYY-MM-DD HH:MM:SS`, read as UTC
    NaiveSpace,
}

impl DateLayout {
    pub const ORDERED: [DateLayout; 5] = [
        DateLayout::DateOnly,
        DateLayout::Rfc3339,
        DateLayout::Rfc3339Fractional,
        DateLayout::NaiveT,
        DateLayout::NaiveSpace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateLayout::DateOnly => "YYYY-MM-DD",
            DateLayout::Rfc3339 => "RFC3339",
            DateLayout::Rfc3339Fractional => "RFC3339 with fractional seconds",
            DateLayout::NaiveT => "YYYY-MM-DDTHH:MM:SS",
            DateLayout::NaiveSpace => "YYYY-MM-DD HH:MM:SS",
        }
    }

    fn parse(&self, s: &str) -> Option<DateTime<Utc>> {
        match self {
            DateLayout::DateOnly => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            DateLayout::Rfc3339 if s.contains('.') => None,
            DateLayout::Rfc3339 | DateLayout::Rfc3339Fractional => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateLayout::NaiveT => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc()),
            DateLayout::NaiveSpace => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.and_utc()),
        }
    }
}

/// A timestamp that decodes from several textual layouts.
///
/// Empty strings and JSON null decode to the unset value, which encodes back as null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlexibleDate(Option<DateTime<Utc>>);

impl FlexibleDate {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(Some(instant))
    }

    pub fn unset() -> Self {
        Self(None)
    }

    pub fn is_unset(&self) -> bool {
        self.0.is_none()
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    pub fn decode(raw: &Value) -> Result<Self, DecodeError> {
        let literal = match raw {
            Value::Null => return Ok(Self::unset()),
            Value::String(s) => s.trim_matches('"'),
            _ => return Err(DecodeError::new(raw, Self::attempted())),
        };
        if literal.is_empty() || literal == "null" {
            return Ok(Self::unset());
        }

        DateLayout::ORDERED
            .iter()
            .find_map(|layout| layout.parse(literal))
            .map(Self::new)
            .ok_or_else(|| DecodeError::new(raw, Self::attempted()))
    }

    pub fn encode(&self) -> Value {
        match self.0 {
            Some(instant) => Value::String(instant.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => Value::Null,
        }
    }

    fn attempted() -> Vec<&'static str> {
        DateLayout::ORDERED.iter().map(DateLayout::as_str).collect()
    }
}

impl From<DateTime<Utc>> for FlexibleDate {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::new(instant)
    }
}

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::decode(&raw).map_err(de::Error::custom)
    }
}

impl Serialize for FlexibleDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.encode().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn float_accepts_number_and_string() {
        let from_number: FlexibleFloat = serde_json::from_str("7.5").unwrap();
        let from_string: FlexibleFloat = serde_json::from_str("\"7.5\"").unwrap();
        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_f64(), 7.5);

        assert_eq!(serde_json::from_str::<FlexibleFloat>("10").unwrap().0, 10.0);
        assert_eq!(serde_json::from_str::<FlexibleFloat>("\"10\"").unwrap().0, 10.0);
        assert_eq!(serde_json::from_str::<FlexibleFloat>("\"-3.14\"").unwrap().0, -3.14);
        assert_eq!(serde_json::from_str::<FlexibleFloat>("0").unwrap().0, 0.0);
    }

    #[test]
    fn float_null_is_zero() {
        assert_eq!(FlexibleFloat::decode(&Value::Null).unwrap(), FlexibleFloat(0.0));
        assert_eq!(serde_json::from_str::<FlexibleFloat>("null").unwrap().0, 0.0);
    }

    #[test]
    fn float_rejects_garbage() {
        let err = FlexibleFloat::decode(&json!("not a number")).unwrap_err();
        assert_eq!(err.raw, "\"not a number\"");
        assert_eq!(err.attempted, vec!["number", "string"]);

        assert!(FlexibleFloat::decode(&json!(true)).is_err());
        assert!(serde_json::from_str::<FlexibleFloat>("[1]").is_err());
    }

    #[test]
    fn float_encodes_as_number() {
        assert_eq!(serde_json::to_string(&FlexibleFloat(7.5)).unwrap(), "7.5");
        assert_eq!(serde_json::to_string(&FlexibleFloat(-3.14)).unwrap(), "-3.14");
        assert_eq!(FlexibleFloat(7.5).encode(), json!(7.5));
        assert_eq!(serde_json::to_value(FlexibleFloat(f64::NAN)).unwrap(), FlexibleFloat(f64::NAN).encode());
        assert_eq!(FlexibleFloat(f64::NAN).encode(), Value::Null);

        for f in [0.0, 1.25, -42.0, 1e-9, 123456.789] {
            let encoded = FlexibleFloat(f).encode();
            assert_eq!(FlexibleFloat::decode(&encoded).unwrap().0, f);
        }
    }

    #[test]
    fn date_accepts_every_layout() {
        let cases = [
            ("\"1983-08-06\"", utc(1983, 8, 6, 0, 0, 0)),
            ("\"2023-01-15T10:30:00Z\"", utc(2023, 1, 15, 10, 30, 0)),
            ("\"2023-01-15T10:30:00-05:00\"", utc(2023, 1, 15, 15, 30, 0)),
            ("\"2023-01-15T10:30:00.000Z\"", utc(2023, 1, 15, 10, 30, 0)),
            ("\"2023-01-15T10:30:00\"", utc(2023, 1, 15, 10, 30, 0)),
            ("\"2023-01-15 10:30:00\"", utc(2023, 1, 15, 10, 30, 0)),
        ];
        for (input, want) in cases {
            let got: FlexibleDate = serde_json::from_str(input).unwrap();
            assert_eq!(got.instant(), Some(want), "input {input}");
        }
    }

    #[test]
    fn same_instant_in_every_layout_is_equal() {
        let forms = [
            json!("2024-02-29"),
            json!("2024-02-29T00:00:00Z"),
            json!("2024-02-29T00:00:00.000000Z"),
            json!("2024-02-29T00:00:00"),
            json!("2024-02-29 00:00:00"),
        ];
        let decoded: Vec<FlexibleDate> =
            forms.iter().map(|f| FlexibleDate::decode(f).unwrap()).collect();
        assert!(decoded.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn date_empty_and_null_are_unset() {
        assert!(FlexibleDate::decode(&json!("")).unwrap().is_unset());
        assert!(FlexibleDate::decode(&Value::Null).unwrap().is_unset());
        assert!(FlexibleDate::decode(&json!("null")).unwrap().is_unset());
        let parsed: FlexibleDate = serde_json::from_str("null").unwrap();
        assert!(parsed.is_unset());
    }

    #[test]
    fn date_rejects_garbage() {
        let err = FlexibleDate::decode(&json!("not a date")).unwrap_err();
        assert_eq!(err.attempted.len(), DateLayout::ORDERED.len());
        assert!(err.to_string().contains("not a date"));

        assert!(FlexibleDate::decode(&json!(1700000000)).is_err());
        assert!(serde_json::from_str::<FlexibleDate>("\"2023-13-45\"").is_err());
    }

    #[test]
    fn date_encodes_rfc3339_or_null() {
        let date = FlexibleDate::new(utc(1983, 8, 6, 0, 0, 0));
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"1983-08-06T00:00:00Z\"");
        assert_eq!(serde_json::to_string(&FlexibleDate::unset()).unwrap(), "null");

        let encoded = date.encode();
        assert_eq!(serde_json::to_value(date).unwrap(), encoded);
        let again = FlexibleDate::decode(&encoded).unwrap().encode();
        assert_eq!(encoded, again);
    }
}
