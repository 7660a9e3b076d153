pub mod address;
pub mod errors;

pub use address::{Address, ADDRESS_HRP};
pub use errors::AddressError;
