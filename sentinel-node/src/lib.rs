pub mod cli;
pub mod config;
pub mod keys;
pub mod logging;
pub mod node;

pub use config::{BackendKind, NodeConfig};
pub use node::{Node, QueryKind};
