use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sentinel_common::address::Address;
use sentinel_common::env::consensus::types::Step;

use crate::node::QueryKind;

#[derive(Parser)]
#[command(name = "sentinel-node")]
#[command(about = "Validator-set node with double-vote banning")]
pub struct Cli {
    /// Node config (JSON). Created with defaults if missing.
    #[arg(short, long, global = true, default_value = "sentinel.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the genesis validator set
    Init {
        /// Genesis file; falls back to `genesis_path` from the config
        #[arg(short, long, value_name = "FILE")]
        genesis: Option<PathBuf>,
    },
    /// Execute one block of custom transactions read from a JSON array
    Execute {
        #[arg(long, value_name = "FILE")]
        txs: Option<PathBuf>,
        /// Defaults to the block after the best one
        #[arg(long)]
        height: Option<u64>,
    },
    /// Sign a consensus vote and print it as RLP hex
    SignVote {
        #[arg(short, long, value_name = "FILE")]
        key: PathBuf,
        #[arg(long)]
        height: u64,
        #[arg(long, default_value_t = 0)]
        view: u64,
        #[arg(long)]
        step: Step,
        /// 32-byte hex hash; omit for a nil vote
        #[arg(long)]
        block_hash: Option<String>,
        /// Position in the possible-authors list at `height`
        #[arg(long)]
        signer_index: u64,
    },
    /// Build a double-vote report transaction from two signed votes
    Report {
        #[arg(long)]
        sender: Address,
        #[arg(long, value_name = "HEX")]
        message1: String,
        #[arg(long, value_name = "HEX")]
        message2: String,
        /// Write a JSON transaction list usable by `execute --txs`
        #[arg(short, long, value_name = "OUT")]
        out: Option<PathBuf>,
    },
    /// Read validator-set state at a block
    Query {
        #[arg(value_enum)]
        what: QueryTarget,
        #[arg(long)]
        address: Option<Address>,
        /// Defaults to the block after the best one
        #[arg(long)]
        block: Option<u64>,
    },
    /// Generate a validator key
    Keygen {
        #[arg(short, long, value_name = "OUT")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryTarget {
    BestBlock,
    Authors,
    Banned,
    Delegations,
    Term,
    Validator,
    Candidates,
}

impl From<QueryTarget> for QueryKind {
    fn from(target: QueryTarget) -> Self {
        match target {
            QueryTarget::BestBlock => QueryKind::BestBlock,
            QueryTarget::Authors => QueryKind::Authors,
            QueryTarget::Banned => QueryKind::Banned,
            QueryTarget::Delegations => QueryKind::Delegations,
            QueryTarget::Term => QueryKind::Term,
            QueryTarget::Validator => QueryKind::Validator,
            QueryTarget::Candidates => QueryKind::Candidates,
        }
    }
}
