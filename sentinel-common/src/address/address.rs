use std::fmt;
use std::str::FromStr;

use bech32::{decode, encode, FromBase32, ToBase32, Variant};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::errors::AddressError;
use crate::crypto::hash::{decode_fixed, digest};
use crate::crypto::schnorr::ValidatorPublicKey;

pub const ADDRESS_HRP: &str = "stn";
pub const ADDRESS_LENGTH: usize = 20;

/// Account identity: the first 20 bytes of SHA-256(public key).
///
/// Ordering is plain byte order, which is what authority ranking uses to break
/// ties between equal stakes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    pub fn from_public_key(public_key: &ValidatorPublicKey) -> Self {
        let hash = digest(public_key.as_bytes());
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes.copy_from_slice(&hash.0[..ADDRESS_LENGTH]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Encodes the address as bech32m with the `stn` prefix.
    pub fn to_bech32(&self) -> Result<String, AddressError> {
        Ok(encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32m)?)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(s) => write!(f, "{}", s),
            // The prefix is a valid constant, so this only guards the type.
            Err(_) => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data, variant) = decode(s)?;
        if hrp != ADDRESS_HRP || variant != Variant::Bech32m {
            return Err(AddressError::InvalidPrefix(s.to_string()));
        }

        let bytes = Vec::<u8>::from_base32(&data)?;
        let array: [u8; ADDRESS_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

impl Encodable for Address {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for Address {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        decode_fixed::<ADDRESS_LENGTH>(rlp).map(Self)
    }
}
