//! Store Error Types
//!
//! This module defines error types raised by the in-memory content store,
//! covering hierarchy violations and misuse of the scoped edit primitive.

use crate::models::EditTarget;
use thiserror::Error;

/// Content store operation errors
///
/// These surface through the `ContentStore` trait as `anyhow::Error`; callers
/// that need to branch on them can `downcast_ref::<StoreError>()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Node not found by ID or path
    #[error("Node not found: {id}")]
    NodeNotFound { id: String },

    /// Another node already lives at the path
    #[error("Path already in use: {path}")]
    PathConflict { path: String },

    /// Node names may not be empty or contain the path separator
    #[error("Invalid node name: '{name}'")]
    InvalidName { name: String },

    /// Language version does not exist
    #[error("Version not found: {target}")]
    VersionNotFound { target: String },

    /// Field write or commit without an open edit
    #[error("No edit in progress for {target}")]
    NotEditing { target: String },

    /// Second `begin_edit` on the same target
    #[error("Edit already in progress for {target}")]
    AlreadyEditing { target: String },
}

impl StoreError {
    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        Self::NodeNotFound { id: id.into() }
    }

    /// Create a path conflict error
    pub fn path_conflict(path: impl Into<String>) -> Self {
        Self::PathConflict { path: path.into() }
    }

    /// Create an invalid name error
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Create a version not found error
    pub fn version_not_found(target: &EditTarget) -> Self {
        Self::VersionNotFound {
            target: target.to_string(),
        }
    }

    /// Create a not editing error
    pub fn not_editing(target: &EditTarget) -> Self {
        Self::NotEditing {
            target: target.to_string(),
        }
    }

    /// Create an already editing error
    pub fn already_editing(target: &EditTarget) -> Self {
        Self::AlreadyEditing {
            target: target.to_string(),
        }
    }
}
