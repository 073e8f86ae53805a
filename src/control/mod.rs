//! Command validation and dispatch for the control endpoint

mod command;
pub mod status;

pub use command::{Command, CommandDispatcher, ConfirmFn, Dispatch, ValidationError, Verb};
pub use status::{classify, StatusKind};
