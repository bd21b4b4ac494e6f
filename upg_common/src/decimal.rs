//! Serde adapters that represent [`MicroUsdc`] as a decimal amount rather than raw micro-units.
//!
//! Serialization always produces a string (`"2.000123"`) so that no precision is lost on the way out.
//! Deserialization accepts a JSON number (`2.000123`), an integer (`2`) or a decimal string.
//!
//! ```rust,ignore
//! #[derive(Deserialize)]
//! struct Token {
//!     #[serde(default, deserialize_with = "upg_common::decimal::deserialize_opt")]
//!     token_amount: Option<MicroUsdc>,
//! }
//! ```
use std::fmt;

use serde::{de, Deserializer, Serializer};

use crate::MicroUsdc;

pub fn serialize<S>(amount: &MicroUsdc, serializer: S) -> Result<S::Ok, S::Error>
where S: Serializer {
    serializer.serialize_str(&amount.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<MicroUsdc, D::Error>
where D: Deserializer<'de> {
    deserializer.deserialize_any(DecimalVisitor)
}

pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<MicroUsdc>, D::Error>
where D: Deserializer<'de> {
    deserializer.deserialize_option(OptionalDecimalVisitor)
}

struct DecimalVisitor;

impl<'de> de::Visitor<'de> for DecimalVisitor {
    type Value = MicroUsdc;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a number or a string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        MicroUsdc::from_f64(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        v.checked_mul(crate::MICRO_PER_UNIT)
            .map(MicroUsdc::from)
            .ok_or_else(|| E::custom(format!("{v} is out of range")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        let v = i64::try_from(v).map_err(|_| E::custom(format!("{v} is out of range")))?;
        self.visit_i64(v)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

struct OptionalDecimalVisitor;

impl<'de> de::Visitor<'de> for OptionalDecimalVisitor {
    type Value = Option<MicroUsdc>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an optional decimal amount")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where D: Deserializer<'de> {
        deserialize(deserializer).map(Some)
    }
}
