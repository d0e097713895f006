//! Event gateway that prunes fields from incoming JSON events before
//! handing them to sinks. The pruning engine lives in [`prune`] and can be
//! used on its own.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod prune;
pub mod server;
pub mod sources;

pub use error::{AppError, Result};
