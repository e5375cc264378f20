//! ContentStore Trait - Content Tree Abstraction Layer
//!
//! This module defines the `ContentStore` trait: the boundary between the
//! reference repair services and whatever content repository owns the tree.
//! The services never create or delete nodes through it; they read nodes,
//! walk the hierarchy, and mutate fields and language versions through the
//! store's scoped edit primitive.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All data methods are async so the same services run
//!    against embedded and remote repositories
//! 2. **Absence Is Not Failure**: Lookups return `Ok(None)` for missing nodes;
//!    `Err(_)` is reserved for store access failures
//! 3. **Error Handling**: Uses `anyhow::Result` for flexible error context
//! 4. **Scoped Edits**: `begin_edit` / `end_edit` bracket a set of field
//!    writes that the store applies all-or-nothing; `cancel_edit` discards
//!    them. Callers go through [`EditScope`](crate::services::EditScope)
//!    rather than pairing these calls by hand
//!
//! # Examples
//!
//! ```rust,no_run
//! use deepcopy_core::db::{ContentStore, MemoryStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MemoryStore::new("master");
//!     let home = store.create_root("content", "{ROOT}").await?;
//!
//!     match store.get_node(&home.path).await? {
//!         Some(node) => println!("Found {}", node.id),
//!         None => println!("Not found"),
//!     }
//!     Ok(())
//! }
//! ```

use crate::models::{ContentNode, EditTarget, LanguageVersion};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction over a hierarchical content repository.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so services holding an
/// `Arc<dyn ContentStore>` can be moved across tasks.
///
/// # Method Categories
///
/// - **Identity**: `name`
/// - **Reading**: `get_node`, `get_children`, `get_descendants`
/// - **Languages**: `get_languages`, `get_versions`, `add_version`
/// - **Scoped edits**: `is_editing`, `begin_edit`, `set_field`, `end_edit`,
///   `cancel_edit`
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store (database) name, e.g. `master`
    fn name(&self) -> &str;

    //
    // READING
    //

    /// Get a node by identifier or full path
    ///
    /// Values starting with `/` are treated as paths, anything else as an
    /// identifier.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(node))` if the node exists
    /// - `Ok(None)` if it doesn't (not an error)
    /// - `Err(_)` if the store cannot be accessed
    async fn get_node(&self, id_or_path: &str) -> Result<Option<ContentNode>>;

    /// Ordered children of a node
    async fn get_children(&self, id: &str) -> Result<Vec<ContentNode>>;

    /// All descendants of a node in document order (depth-first, pre-order),
    /// excluding the node itself
    ///
    /// Positional pairing of copied subtrees relies on this order being
    /// stable for structurally identical subtrees.
    async fn get_descendants(&self, id: &str) -> Result<Vec<ContentNode>>;

    //
    // LANGUAGES & VERSIONS
    //

    /// Languages known to the store
    async fn get_languages(&self) -> Result<Vec<String>>;

    /// Versions of a node in one language, ordered by version number
    ///
    /// An empty list means the node has no version in that language.
    async fn get_versions(&self, id: &str, language: &str) -> Result<Vec<LanguageVersion>>;

    /// Add a new, empty version of a node in one language
    ///
    /// # Returns
    ///
    /// The created version (number = previous highest + 1)
    async fn add_version(&self, id: &str, language: &str) -> Result<LanguageVersion>;

    //
    // SCOPED EDITS
    //

    /// Whether an edit is currently open on the target
    async fn is_editing(&self, target: &EditTarget) -> Result<bool>;

    /// Open an edit on the target
    ///
    /// # Errors
    ///
    /// Returns error if the target doesn't exist or is already being edited
    async fn begin_edit(&self, target: &EditTarget) -> Result<()>;

    /// Stage a field write inside an open edit
    async fn set_field(&self, target: &EditTarget, field: &str, value: &str) -> Result<()>;

    /// Commit all staged writes atomically and close the edit
    async fn end_edit(&self, target: &EditTarget) -> Result<()>;

    /// Discard staged writes and close the edit
    async fn cancel_edit(&self, target: &EditTarget) -> Result<()>;
}
