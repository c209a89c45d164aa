//! Infrastructure adapters for external systems.

pub mod store;
pub mod transport;

pub use store::{MemoryStore, YamlStore};
pub use transport::{ConsoleTransport, MemoryTransport, TransportEffect};
