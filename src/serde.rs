//! Extra serde support for on-chain integers.
//!
//! Example:
//! ```
//! use serde::{Serialize, Deserialize};
//! use opentask_client::serde::*;
//! use opentask_client::types::U256;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Escrow {
//!     #[serde(with = "U256Dec")]
//!     amount: U256,
//! }
//!
//! let json = serde_json::to_string(&Escrow { amount: U256::from(1000u64) }).unwrap();
//! assert_eq!(json, r#"{"amount":"1000"}"#);
//! ```
use core::fmt;

use serde::de::{Deserializer, Error, Unexpected, Visitor};
use serde::ser::Serializer;

use crate::types::U256;

/// Helper trait add serde support to `U256` using decimal string literal encoding.
///
/// ethers encodes `U256` as a `0x` hex quantity by default, which is not what a
/// reader of a task listing expects.
pub trait U256Dec<'de>: Sized {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer;
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;
}

impl<'de> U256Dec<'de> for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }

    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct U256DecVisitor;

        impl<'de> Visitor<'de> for U256DecVisitor {
            type Value = U256;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a U256 in decimal str repr")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: Error,
            {
                U256::from_dec_str(v).map_err(|_| Error::invalid_value(Unexpected::Str(v), &self))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: Error,
            {
                Ok(U256::from(v))
            }
        }

        deserializer.deserialize_any(U256DecVisitor)
    }
}
