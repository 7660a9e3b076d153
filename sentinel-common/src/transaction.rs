use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::crypto::hash::{digest, H256};

/// Upper bound on a custom action payload.
pub const MAX_CUSTOM_PAYLOAD: usize = 4096;

/// A custom-action transaction handed over by the transaction-execution layer.
///
/// Account signatures and sequence numbers are checked before the transaction
/// reaches this crate; `sender` is already authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomTransaction {
    pub sender: Address,
    pub handler_id: u64,
    #[serde(with = "hex::serde")]
    pub payload: Vec<u8>,
}

impl CustomTransaction {
    pub fn new(sender: Address, handler_id: u64, payload: Vec<u8>) -> Self {
        Self { sender, handler_id, payload }
    }

    /// Hash used to identify the transaction in receipts and logs.
    pub fn hash(&self) -> H256 {
        let mut bytes = Vec::with_capacity(self.payload.len() + 28);
        bytes.extend_from_slice(self.sender.as_bytes());
        bytes.extend_from_slice(&self.handler_id.to_be_bytes());
        bytes.extend_from_slice(&self.payload);
        digest(&bytes)
    }

    /// Stateless checks:
    /// 1. Payload is not empty.
    /// 2. Payload is within [`MAX_CUSTOM_PAYLOAD`].
    pub fn validate_stateless(&self) -> Result<(), String> {
        if self.payload.is_empty() {
            return Err("Custom transaction payload is empty".to_string());
        }
        if self.payload.len() > MAX_CUSTOM_PAYLOAD {
            return Err(format!(
                "Custom transaction payload too large ({} bytes, max {})",
                self.payload.len(),
                MAX_CUSTOM_PAYLOAD
            ));
        }
        Ok(())
    }
}
