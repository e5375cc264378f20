//! Store Layer
//!
//! This module defines the boundary to the content repository that owns the
//! tree:
//!
//! - `ContentStore` - async trait the services read and edit through
//! - `MemoryStore` - in-process implementation (tests, benchmarks, embedding)
//! - `StoreEvent` - change notifications broadcast by stores
//! - `StoreError` - failures raised by the in-memory store
//!
//! The reference repair services never create or delete nodes; they only
//! read, and mutate fields and language versions through scoped edits.

mod content_store;
mod error;
pub mod events;
mod memory_store;

pub use content_store::ContentStore;
pub use error::StoreError;
pub use events::StoreEvent;
pub use memory_store::{MemoryStore, NewNode};
