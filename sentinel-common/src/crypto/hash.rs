use std::fmt;
use std::str::FromStr;

use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// 256-bit digest, used for block hashes and signing messages.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct H256(#[serde(with = "hex::serde")] pub [u8; 32]);

impl H256 {
    pub const LEN: usize = 32;

    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 32] = bytes.try_into().ok()?;
        Some(Self(array))
    }
}

impl From<[u8; 32]> for H256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for H256 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl Encodable for H256 {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(&self.0);
    }
}

impl Decodable for H256 {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        decode_fixed::<32>(rlp).map(Self)
    }
}

/// Reads an RLP byte string that must be exactly `N` bytes wide.
pub fn decode_fixed<const N: usize>(rlp: &Rlp) -> Result<[u8; N], DecoderError> {
    if !rlp.is_data() {
        return Err(DecoderError::RlpExpectedToBeData);
    }
    let bytes = rlp.data()?;
    bytes.try_into().map_err(|_| {
        if bytes.len() < N {
            DecoderError::RlpIsTooShort
        } else {
            DecoderError::RlpIsTooBig
        }
    })
}

/// Decodes a whole buffer as one RLP item, rejecting trailing bytes.
pub fn decode_exact<T: Decodable>(bytes: &[u8]) -> Result<T, DecoderError> {
    let rlp = Rlp::new(bytes);
    let info = rlp.payload_info()?;
    if info.total() != bytes.len() {
        return Err(DecoderError::RlpInconsistentLengthAndData);
    }
    rlp.as_val()
}

/// Computes the SHA-256 digest of the given data.
pub fn digest(data: &[u8]) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    H256(hasher.finalize().into())
}

/// Hex rendering of [`digest`], for logs and audit output.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(digest(data).0)
}
