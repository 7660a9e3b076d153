use std::fs;
use std::path::PathBuf;

use clap::Parser;
use sentinel_common::crypto::hash::H256;
use sentinel_common::env::consensus::types::{VoteStep, VoteTarget};
use sentinel_common::env::vote_data::SignedVote;
use sentinel_common::error::SentinelError;
use sentinel_common::genesis::GenesisState;
use sentinel_common::transaction::CustomTransaction;
use sentinel_consensus::{StakeAction, STAKE_HANDLER_ID};
use sentinel_node::{
    cli::{Cli, Commands},
    config::NodeConfig,
    keys::KeyFile,
    logging::init_logging,
    node::Node,
};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Offline commands need no config and log to stderr only.
    let needs_node = matches!(
        cli.command,
        Commands::Init { .. } | Commands::Execute { .. } | Commands::Query { .. }
    );
    let config = if needs_node {
        let config = NodeConfig::ensure(&cli.config)?;
        config.require_persistent()?;
        Some(config)
    } else {
        None
    };
    let _guard = init_logging(config.as_ref().and_then(|c| c.log_file.as_deref()))?;

    if let Err(e) = run(cli.command, config) {
        error!("❌ {}", e);
        return Err(e);
    }
    Ok(())
}

fn run(command: Commands, config: Option<NodeConfig>) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Init { genesis } => {
            let config = require(config)?;
            let path = genesis
                .or_else(|| config.genesis_path.clone())
                .ok_or_else(|| SentinelError::Config("No genesis file given".to_string()))?;
            let genesis = GenesisState::load_from_file(&path)?;

            let mut node = Node::open(&config)?;
            node.init(&genesis)?;
            info!("✅ Genesis from {} applied", path.display());
        }
        Commands::Execute { txs, height } => {
            let config = require(config)?;
            let transactions: Vec<CustomTransaction> = match txs {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => Vec::new(),
            };
            let mut node = Node::open(&config)?;
            let receipt = node.execute(height, &transactions)?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Commands::SignVote { key, height, view, step, block_hash, signer_index } => {
            let key = KeyFile::load_from_file(&key)?.signing_key()?;
            let block_hash = block_hash.map(|h| h.parse::<H256>()).transpose()?;
            let target = VoteTarget::new(VoteStep::new(height, view, step), block_hash);
            let vote = SignedVote::sign(target, signer_index, &key);
            println!("{}", hex::encode(vote.rlp_bytes()));
        }
        Commands::Report { sender, message1, message2, out } => {
            let action = StakeAction::ReportDoubleVote {
                message1: decode_hex(&message1)?,
                message2: decode_hex(&message2)?,
            };
            let tx = CustomTransaction::new(sender, STAKE_HANDLER_ID, action.rlp_bytes());
            let json = serde_json::to_string_pretty(&vec![tx])?;
            match out {
                Some(path) => {
                    write_file(&path, &json)?;
                    info!("Report transaction written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Query { what, address, block } => {
            let config = require(config)?;
            let node = Node::open(&config)?;
            let value = node.query(what.into(), address, block)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Keygen { out } => {
            let key = KeyFile::generate();
            key.save_to_file(&out)?;
            println!("Address: {}", key.address);
            println!("PublicKey: {}", hex::encode(key.public_key.0));
        }
    }
    Ok(())
}

fn require(config: Option<NodeConfig>) -> Result<NodeConfig, SentinelError> {
    config.ok_or_else(|| SentinelError::Config("Config not loaded".to_string()))
}

fn decode_hex(s: &str) -> Result<Vec<u8>, SentinelError> {
    hex::decode(s.trim_start_matches("0x")).map_err(|e| SentinelError::Codec(format!("Invalid hex: {}", e)))
}

fn write_file(path: &PathBuf, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}
