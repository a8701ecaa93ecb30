//! Serde adapter for `f64` fields that may hold `±inf` or NaN.
//!
//! JSON has no representation for non-finite numbers, so they are written as
//! the strings `"inf"`, `"-inf"` and `"nan"`. Finite values stay plain numbers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_finite() {
        Repr::Number(*value).serialize(serializer)
    } else if value.is_nan() {
        Repr::Text("nan".to_string()).serialize(serializer)
    } else if *value > 0.0 {
        Repr::Text("inf".to_string()).serialize(serializer)
    } else {
        Repr::Text("-inf".to_string()).serialize(serializer)
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Repr::deserialize(deserializer)? {
        Repr::Number(v) => Ok(v),
        Repr::Text(s) => match s.to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            "nan" => Ok(f64::NAN),
            other => Err(D::Error::custom(format!("invalid float literal '{other}'"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::Envelope;

    #[test]
    fn sentinel_envelope_round_trips_through_json() {
        let json = serde_json::to_string(&Envelope::empty()).unwrap();
        assert!(json.contains("\"inf\""));
        assert!(json.contains("\"-inf\""));

        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.min_temperature, f64::INFINITY);
        assert_eq!(back.max_pressure, f64::NEG_INFINITY);
    }

    #[test]
    fn rejects_unknown_literals() {
        let json = r#"{"min_temperature":"warm","max_temperature":1,"min_pressure":1,"max_pressure":2}"#;
        assert!(serde_json::from_str::<Envelope>(json).is_err());
    }
}
