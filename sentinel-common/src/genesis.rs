use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::crypto::schnorr::ValidatorPublicKey;
use crate::error::{Result, SentinelError};

/// A validator candidate present at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub public_key: ValidatorPublicKey,
    pub deposit: u64,
}

impl GenesisValidator {
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisDelegation {
    pub delegator: Address,
    pub delegatee: Address,
    pub amount: u64,
}

/// Represents the initial validator set and delegations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub validators: Vec<GenesisValidator>,
    #[serde(default)]
    pub delegations: Vec<GenesisDelegation>,
}

impl GenesisState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let genesis: GenesisState = serde_json::from_str(&data)?;
        genesis.validate()?;
        Ok(genesis)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Rejects duplicate validators, zero amounts and delegations to
    /// addresses that are not genesis validators.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for validator in &self.validators {
            if !seen.insert(validator.address()) {
                return Err(SentinelError::Config(format!(
                    "Duplicate genesis validator {}",
                    validator.address()
                )));
            }
        }

        for delegation in &self.delegations {
            if delegation.amount == 0 {
                return Err(SentinelError::Config(format!(
                    "Zero delegation from {} to {}",
                    delegation.delegator, delegation.delegatee
                )));
            }
            if !seen.contains(&delegation.delegatee) {
                return Err(SentinelError::Config(format!(
                    "Delegation to unknown validator {}",
                    delegation.delegatee
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ed25519_dalek::SigningKey;

    use super::*;

    fn validator(seed: u8) -> GenesisValidator {
        GenesisValidator {
            public_key: ValidatorPublicKey::from_signing_key(&SigningKey::from_bytes(&[seed; 32])),
            deposit: 10_000_000,
        }
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let genesis = GenesisState {
            validators: vec![validator(1), validator(1)],
            delegations: vec![],
        };
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_delegatee() {
        let genesis = GenesisState {
            validators: vec![validator(1)],
            delegations: vec![GenesisDelegation {
                delegator: Address([9u8; 20]),
                delegatee: validator(2).address(),
                amount: 5_000,
            }],
        };
        assert!(genesis.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.json");
        let genesis = GenesisState {
            validators: vec![validator(1), validator(2)],
            delegations: vec![GenesisDelegation {
                delegator: Address([9u8; 20]),
                delegatee: validator(2).address(),
                amount: 5_000,
            }],
        };
        genesis.save_to_file(&path).unwrap();
        assert_eq!(GenesisState::load_from_file(&path).unwrap(), genesis);
    }
}
