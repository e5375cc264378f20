//! Reference Repair Services
//!
//! This module contains the services that repair a copied or instantiated
//! subtree:
//!
//! - `ReferenceRemapper` - rewrites the datasources of one copied node
//! - `SubtreePairWalker` - pairs a copied subtree with its original, node by node
//! - `DeepCopyProcessor` - the copy pipeline step driving the walker
//! - `BranchInstantiationHandler` - reacts to nodes created from a branch template
//! - `VersionPropagator` - fills missing language versions from a template subtree
//! - `EditScope` - begin/end edit pairing closed on every path
//!
//! Services only read the tree and write fields and versions through scoped
//! edits; nodes are never created or deleted here.

pub mod branch_handler;
pub mod copy_processor;
pub mod copy_walker;
pub mod edit_scope;
pub mod error;
pub mod reference_remapper;
pub mod version_propagator;

#[cfg(test)]
pub(crate) mod test_support;

pub use branch_handler::{BranchInstantiationHandler, BranchOutcome, IgnoreReason};
pub use copy_processor::DeepCopyProcessor;
pub use copy_walker::{CopyReport, SubtreePairWalker};
pub use edit_scope::{apply_field_edits, EditScope};
pub use error::DeepCopyError;
pub use reference_remapper::{ReferenceRemapper, RemapOutcome};
pub use version_propagator::{PropagationReport, VersionPropagator};
