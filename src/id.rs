//! Record identifiers.
//!
//! Every stored record (user, admin, session, attempt) is keyed by a
//! 24-character lowercase hex string encoding 12 random bytes.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::AuthError;

const ID_BYTES: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; ID_BYTES]);

impl ObjectId {
    /// The root admin. Root is the only admin allowed to manage other admins
    /// and cannot itself be modified.
    pub const ROOT: ObjectId = ObjectId([0; ID_BYTES]);

    pub fn new() -> Self {
        let mut bytes = [0u8; ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn parse(value: &str) -> Result<Self, AuthError> {
        if value.len() != ID_BYTES * 2 {
            return Err(AuthError::InvalidId);
        }

        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(value, &mut bytes).map_err(|_| AuthError::InvalidId)?;
        Ok(Self(bytes))
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
