//! Caller identities.

use crate::{Error, Hash};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An identity is the hash of its owner's public key bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Hash);

impl Identity {
    /// Derive the identity owning a public key. The core treats the key as
    /// opaque bytes.
    pub fn from_public_key(key: &[u8]) -> Self {
        Self(Hash::of(key))
    }

    /// Wrap raw identity bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_hex(s)
            .map(Self)
            .ok_or_else(|| Error::InvalidHex(s.to_string()))
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
