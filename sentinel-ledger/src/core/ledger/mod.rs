pub mod election;
pub mod errors;
pub mod staged;
pub mod state;
pub mod term;
pub mod validator_set;
