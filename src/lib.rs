//! Cardsignal - prediction tracker for card-game result channels
//!
//! Cardsignal watches a stream of result lines, publishes a prediction when
//! a line matches the trigger pattern, and follows every published
//! prediction over the next few games until it is won or lost. A second
//! source of predictions is an imported schedule, launched as the live game
//! number approaches each entry.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Parser, trigger policy, verifier, trackers, engine
//! - **Adapters** (`adapters`): Record stores and transports
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cardsignal::adapters::{MemoryStore, MemoryTransport};
//! use cardsignal::{Config, InboundMessage, PredictionEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut engine = PredictionEngine::open(
//!         &Config::default(),
//!         Arc::new(MemoryTransport::new()),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(MemoryStore::new()),
//!     )
//!     .await?;
//!     engine.handle(&InboundMessage::new("#N881. 7(A♠6♠) ✅ 7(3♦4♣) #T12")).await;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, InboundMessage, Outcome, ParsedMessage, PredictionRecord, PredictionStatus, Tunables,
};
pub use domain::ports::{RecordStore, Transport};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{PredictionEngine, ProcessReport};
