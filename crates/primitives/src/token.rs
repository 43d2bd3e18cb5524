//! Token amounts.

use std::{
    fmt,
    io::{Error as IoError, ErrorKind, Read, Write},
    str::FromStr,
};

use borsh::{BorshDeserialize, BorshSerialize};
use num_bigint::{BigUint, ParseBigIntError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Arbitrary-precision non-negative token quantity.
///
/// Borsh encodes it as a length-prefixed big-endian byte string with no leading zero
/// bytes; zero is the empty string. Decoding rejects non-minimal encodings so every
/// value has exactly one byte form.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(BigUint);

impl Quantity {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    fn to_minimal_be(&self) -> Vec<u8> {
        if self.is_zero() {
            Vec::new()
        } else {
            self.0.to_bytes_be()
        }
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Quantity {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Quantity {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl FromStr for Quantity {
    type Err = ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigUint::from_str(s).map(Self)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl BorshSerialize for Quantity {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        BorshSerialize::serialize(&self.to_minimal_be(), writer)
    }
}

impl BorshDeserialize for Quantity {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let raw: Vec<u8> = BorshDeserialize::deserialize_reader(reader)?;
        if raw.first() == Some(&0) {
            return Err(IoError::new(
                ErrorKind::InvalidData,
                "non-canonical quantity: leading zero byte",
            ));
        }
        Ok(Self(BigUint::from_bytes_be(&raw)))
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Token identifier. The empty identifier is the native token.
#[derive(
    Clone,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Denomination(#[serde(with = "hex::serde")] Vec<u8>);

impl Denomination {
    /// The native token.
    pub const NATIVE: Denomination = Denomination(Vec::new());

    pub fn new(raw: impl Into<Vec<u8>>) -> Self {
        Self(raw.into())
    }

    pub fn is_native(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Denomination({self})")
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            return f.write_str("<native>");
        }
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.write_str(s),
            Err(_) => f.write_str(&hex::encode(&self.0)),
        }
    }
}

/// An amount of a particular token.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct BaseUnits {
    amount: Quantity,
    denomination: Denomination,
}

impl BaseUnits {
    pub fn new(amount: impl Into<Quantity>, denomination: Denomination) -> Self {
        Self {
            amount: amount.into(),
            denomination,
        }
    }

    /// Amount of the native token.
    pub fn native(amount: impl Into<Quantity>) -> Self {
        Self::new(amount, Denomination::NATIVE)
    }

    pub fn amount(&self) -> &Quantity {
        &self.amount
    }

    pub fn denomination(&self) -> &Denomination {
        &self.denomination
    }
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.denomination)
    }
}
