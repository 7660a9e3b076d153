use bech32::Error as Bech32Error;
use thiserror::Error;

/// Errors related specifically to address formatting and encoding.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The bech32 payload could not be decoded.
    #[error("Failed to decode address: {0}")]
    Bech32(#[from] Bech32Error),

    /// Human readable part or variant does not match sentinel addresses.
    #[error("Invalid address prefix or variant: {0}")]
    InvalidPrefix(String),

    /// Decoded payload is not 20 bytes.
    #[error("Invalid address length: {0}")]
    InvalidLength(usize),
}
