use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sentinel_common::error::{Result, SentinelError};
use sentinel_ledger::ElectionParams;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Nothing survives the process. In-process use only; the CLI rejects it.
    Memory,
    Redb,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub data_dir: PathBuf,
    pub backend: BackendKind,
    pub election: ElectionParams,
    #[serde(default)]
    pub genesis_path: Option<PathBuf>,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/db"),
            backend: BackendKind::Redb,
            election: ElectionParams::default(),
            genesis_path: Some(PathBuf::from("genesis.json")),
            log_file: Some(PathBuf::from("logs/audit.log")),
        }
    }
}

impl NodeConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads `path`, writing a default config there first if it is missing.
    pub fn ensure<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("⚠️ Config not found. Writing defaults to {}", path.display());
            NodeConfig::default().save_to_file(path)?;
        }
        Self::load_from_file(path)
    }

    pub fn validate(&self) -> Result<()> {
        self.election.validate()?;
        if self.backend == BackendKind::Redb && self.data_dir.as_os_str().is_empty() {
            return Err(SentinelError::Config("data_dir is required for the redb backend".to_string()));
        }
        Ok(())
    }

    /// Fails unless the backend keeps state between separate CLI invocations.
    pub fn require_persistent(&self) -> Result<()> {
        match self.backend {
            BackendKind::Redb => Ok(()),
            BackendKind::Memory => Err(SentinelError::Config(
                "memory backend does not persist between CLI invocations; use redb".to_string(),
            )),
        }
    }
}
