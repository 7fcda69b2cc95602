//! Lossless wire encoding for [`BigDecimal`] values
//!
//! Values are written as JSON strings, in plain notation unless their exponent is far from
//! zero. For interoperability the decoder also accepts JSON numbers. Floats are taken at their
//! shortest textual representation instead of their binary value.

use bigdecimal::{BigDecimal, Zero};
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest distance of the leading digit from the decimal point still written in plain notation
pub const PLAIN_NOTATION_LIMIT: i64 = 64;

/// Largest order of magnitude, in either direction, accepted for an operand
pub const OPERAND_EXPONENT_LIMIT: i64 = i32::MAX as i64;

/// Textual form of a decimal
///
/// Plain notation is used while the leading digit is at most [`PLAIN_NOTATION_LIMIT`] places
/// away from the decimal point, scientific notation (`1.5e100`) beyond that.
pub fn to_text(value: &BigDecimal) -> String {
    if value.is_zero() {
        "0".to_owned()
    } else if value.order_of_magnitude().abs() <= PLAIN_NOTATION_LIMIT {
        value.to_plain_string()
    } else {
        value.to_scientific_notation()
    }
}

/// Checks whether a value may be used as an operand, mapping zeros of any exponent to plain zero
pub fn as_operand(value: BigDecimal) -> Option<BigDecimal> {
    if value.is_zero() {
        Some(BigDecimal::zero())
    } else if value.order_of_magnitude().abs() <= OPERAND_EXPONENT_LIMIT {
        Some(value)
    } else {
        None
    }
}

/// Serializes a decimal as a string, see [`to_text`]
pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&to_text(value))
}

/// Deserializes a decimal from a string or number
pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(DecimalVisitor)
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = BigDecimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal number or a string containing one")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        BigDecimal::from_str(value.trim())
            .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(BigDecimal::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(BigDecimal::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if !value.is_finite() {
            return Err(E::invalid_value(de::Unexpected::Float(value), &self));
        }

        self.visit_str(&value.to_string())
    }
}

/// Same encoding for operands, rejecting values outside the [`OPERAND_EXPONENT_LIMIT`]
pub mod operand {
    use bigdecimal::BigDecimal;
    use serde::{de, Deserializer, Serializer};

    /// Serializes an operand
    pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::serialize(value, serializer)
    }

    /// Deserializes an operand
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = super::deserialize(deserializer)?;

        super::as_operand(value).ok_or_else(|| {
            de::Error::custom(format!(
                "operand exponent exceeds {}",
                super::OPERAND_EXPONENT_LIMIT
            ))
        })
    }
}

/// Same encoding for optional values, `None` maps to `null`
pub mod option {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    struct Wrapped(#[serde(with = "super")] BigDecimal);

    /// Serializes an optional decimal
    pub fn serialize<S>(value: &Option<BigDecimal>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes an optional decimal
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let wrapped: Option<Wrapped> = Option::deserialize(deserializer)?;
        Ok(wrapped.map(|Wrapped(value)| value))
    }
}
