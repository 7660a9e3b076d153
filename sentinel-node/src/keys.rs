use std::fs;
use std::path::Path;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sentinel_common::address::Address;
use sentinel_common::crypto::schnorr::ValidatorPublicKey;
use sentinel_common::error::{Result, SentinelError};

/// Validator key as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    pub address: Address,
    pub public_key: ValidatorPublicKey,
    #[serde(with = "hex::serde")]
    pub secret_key: [u8; 32],
}

impl KeyFile {
    pub fn generate() -> Self {
        Self::from_signing_key(&SigningKey::generate(&mut OsRng))
    }

    pub fn from_signing_key(key: &SigningKey) -> Self {
        let public_key = ValidatorPublicKey::from_signing_key(key);
        Self {
            address: Address::from_public_key(&public_key),
            public_key,
            secret_key: key.to_bytes(),
        }
    }

    pub fn signing_key(&self) -> Result<SigningKey> {
        let key = SigningKey::from_bytes(&self.secret_key);
        if ValidatorPublicKey::from_signing_key(&key) != self.public_key {
            return Err(SentinelError::Crypto("Key file public key does not match secret".to_string()));
        }
        Ok(key)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let key: KeyFile = serde_json::from_str(&data)?;
        key.signing_key()?;
        Ok(key)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
