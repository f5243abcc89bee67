//! Serde adapters for proto3 `int64` fields.
//!
//! The JSON mapping encodes 64-bit integers as strings, but some emulators
//! and hand-written fixtures use plain numbers, so both are accepted.

use serde::{Deserialize, Deserializer, Serializer, de::Error};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(i64),
    Text(String),
}

impl Raw {
    fn into_i64<E: Error>(self) -> Result<i64, E> {
        match self {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid int64 value: {s:?}"))),
        }
    }
}

pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Raw::deserialize(deserializer)?.into_i64()
}

/// Same as the parent module, for optional fields. Use together with `#[serde(default)]`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        Option::<Raw>::deserialize(deserializer)?
            .map(Raw::into_i64)
            .transpose()
    }
}

/// Same as the parent module, for repeated fields.
pub mod vec {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(values: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for v in values {
            seq.serialize_element(&v.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
        Vec::<Raw>::deserialize(deserializer)?
            .into_iter()
            .map(Raw::into_i64)
            .collect()
    }
}
