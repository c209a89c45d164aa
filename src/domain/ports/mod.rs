//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - Transport: publishing and editing messages on the display channel
//! - RecordStore: whole-snapshot persistence of tracker state

pub mod record_store;
pub mod transport;

pub use record_store::RecordStore;
pub use transport::Transport;
