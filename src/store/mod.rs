//! Memory-resident storage. Nothing here survives a restart.

pub mod memory;

pub use memory::{CacheEntry, MemoryCache};
