//! DeepCopy Core
//!
//! This crate repairs internal references after a content subtree is
//! duplicated, and fills language versions on nodes instantiated from a
//! branch template.
//!
//! # Architecture
//!
//! - **Store boundary**: all reads and edits go through the async
//!   [`ContentStore`] trait; the crate never creates or deletes nodes
//! - **Scoped edits**: every write happens inside a begin/end edit pair
//!   that is closed on the path taken ([`EditScope`])
//! - **Pure JSON definitions**: presentation definitions are parsed into a
//!   typed model that carries unknown attributes through untouched
//!
//! # Modules
//!
//! - [`models`] - Content nodes, language versions, presentation definitions
//! - [`db`] - Store trait, in-memory store and store events
//! - [`services`] - Remapper, pair walker, copy processor, branch handler, version propagator
//! - [`operations`] - Copy command and pipeline request types
//! - [`config`] - Runtime configuration
//! - [`utils`] - Path helpers and tracing setup
//!
//! # Example
//!
//! ```rust
//! use deepcopy_core::{DeepCopyConfig, MemoryStore, NewNode, ReferenceRemapper};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(MemoryStore::new("master"));
//! let a = store.create_root("a", "{FOLDER}").await?;
//! let page = store
//!     .create_node(&a.id, NewNode::new("page", "{PAGE}").with_field(
//!         "__Renderings",
//!         r#"{"devices":[{"renderings":[{"ds":"/a/page/data"}]}]}"#,
//!     ))
//!     .await?;
//! store.create_node(&page.id, NewNode::new("data", "{DATA}")).await?;
//! let b = store.create_root("b", "{FOLDER}").await?;
//! let copy = store.copy_subtree(&page.id, &b.id, None).await?;
//!
//! let remapper = ReferenceRemapper::new(store.clone(), &DeepCopyConfig::default());
//! let outcome = remapper.remap(&page, &copy).await?;
//! assert_eq!(outcome.rewritten, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # }).unwrap();
//! ```

pub mod config;
pub mod db;
pub mod models;
pub mod operations;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::DeepCopyConfig;
pub use db::{ContentStore, MemoryStore, NewNode, StoreError, StoreEvent};
pub use models::*;
pub use operations::{CommandState, CopyItemsArgs, CopyParameters, CopyRequest, DeepCopyCommand};
pub use services::*;
