//! Composing the inverse transfer that undoes a booked transaction.

pub mod error;
pub mod service;

pub use error::ReversalError;
pub use service::{DEFAULT_REVERSAL_REASON, ReversalService, RevertCommand};
