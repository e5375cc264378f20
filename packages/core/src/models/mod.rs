//! Data Models
//!
//! This module contains the data structures the reference repair services
//! operate on:
//!
//! - `ContentNode` - A node of the content tree (read model, owned by the store)
//! - `LanguageVersion` / `Field` - Per-language content payload
//! - `EditTarget` - Addressing for scoped edits
//! - `LayoutDefinition` - The serialized presentation definition and its
//!   datasource references

mod layout;
mod node;

pub use layout::{
    DeviceDefinition, LayoutDefinition, ReferenceHandle, RenderingDefinition,
    DATASOURCE_ATTRIBUTE, LEGACY_DATASOURCE_ATTRIBUTE,
};
pub use node::{
    latest_version, new_node_id, BranchPair, ContentNode, CopyPair, EditTarget, Field,
    LanguageVersion,
};
