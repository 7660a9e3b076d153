pub mod hash;
pub mod schnorr;

pub use hash::{digest, H256};
pub use schnorr::{SchnorrSignature, ValidatorPublicKey};
