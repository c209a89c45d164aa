//! Record store adapters.

pub mod memory;
pub mod yaml;

pub use memory::MemoryStore;
pub use yaml::YamlStore;
