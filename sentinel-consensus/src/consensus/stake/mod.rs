pub mod actions;
pub mod handler;

pub use actions::{StakeAction, STAKE_HANDLER_ID};
pub use handler::{ActionEffect, ActionHandler, HandlerError, StakeHandler};
