pub mod consensus;
pub mod vote_data;

pub use vote_data::SignedVote;
