//! consensus
//!
//! Double-vote accountability for the validator set.
//!
//! Signed votes travel as RLP. Two votes from one author for the same
//! (height, view, step) with different targets are evidence; once verified,
//! the author is banned on the block being executed and drops out of the
//! possible-authors list from the next height on.

pub mod banning;
pub mod detector;
pub mod engine;
pub mod query;
pub mod stake;

pub use engine::BlockExecutor;
