pub mod evidence;
pub mod types;

pub use evidence::DoubleVoteEvidence;
pub use types::{Step, VoteStep, VoteTarget};
