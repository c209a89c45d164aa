//! Domain layer for cardsignal
//!
//! This module contains the prediction model and the ports the engine
//! talks to. It has no knowledge of files, terminals or chat networks.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
