//! Commitment and Salt for commit-reveal scheme.

use crate::bet::Bet;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Width of salts and commitments in bytes
pub const HASH_LEN: usize = 32;

/// Error parsing a hex-encoded salt or commitment
#[derive(Debug, thiserror::Error)]
pub enum HexParseError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected 32 bytes, got {0}")]
    Length(usize),
}

fn parse_fixed(s: &str) -> Result<[u8; HASH_LEN], HexParseError> {
    let raw = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(raw)?;
    if bytes.len() != HASH_LEN {
        return Err(HexParseError::Length(bytes.len()));
    }
    let mut arr = [0u8; HASH_LEN];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

/// Salt for commitment scheme
#[derive(Clone, PartialEq, Eq)]
pub struct Salt([u8; HASH_LEN]);

impl Salt {
    /// Create a new random salt
    pub fn random() -> Self {
        let mut bytes = [0u8; HASH_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Salt {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s).map(Self)
    }
}

/// Commitment = H(bet || salt)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; HASH_LEN]);

impl Commitment {
    /// Create a commitment from a bet and salt
    pub fn new(bet: Bet, salt: &Salt) -> Self {
        let mut hasher = Sha256::new();
        hasher.update([bet.as_byte()]);
        hasher.update(salt.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Verify that the given bet and salt produce this commitment
    pub fn verify(&self, bet: Bet, salt: &Salt) -> bool {
        *self == Self::new(bet, salt)
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Commitment {
    type Err = HexParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s).map(Self)
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let hex_str = String::deserialize(d)?;
                hex_str.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(Salt);
hex_serde!(Commitment);
