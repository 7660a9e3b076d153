use thiserror::Error;

/// Crate-wide error shared by every sentinel crate.
#[derive(Debug, Error)]
pub enum SentinelError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid config: {0}")]
    Config(String),

    /// A query asked for state past the last committed block.
    #[error("Unknown height {requested} (best block is {best})")]
    UnknownHeight { requested: u64, best: u64 },

    #[error("Stake rule violated: {0}")]
    Stake(String),

    #[error("Unknown validator: {0}")]
    UnknownValidator(String),

    #[error("Block height mismatch: expected {expected}, got {got}")]
    HeightMismatch { expected: u64, got: u64 },

    #[error("State not initialised: {0}")]
    Uninitialised(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Other: {0}")]
    Other(String),
}

impl From<rlp::DecoderError> for SentinelError {
    fn from(err: rlp::DecoderError) -> Self {
        SentinelError::Codec(err.to_string())
    }
}

impl From<bincode::Error> for SentinelError {
    fn from(err: bincode::Error) -> Self {
        SentinelError::Codec(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SentinelError>;
