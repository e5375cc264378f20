//! Content Node Data Structures
//!
//! This module defines the read model of a content tree as seen by the
//! reference repair services: nodes, their language versions and fields,
//! plus the ephemeral pairings handed in by copy and creation flows.
//!
//! # Ownership
//!
//! Nodes are owned by the external [`ContentStore`](crate::db::ContentStore).
//! Values here are snapshots; mutation always goes back through the store's
//! scoped edit primitive (see [`EditTarget`]).
//!
//! # Examples
//!
//! ```rust
//! use deepcopy_core::models::ContentNode;
//!
//! let page = ContentNode::new("page", "/content/home/page", "master", "{TEMPLATE-PAGE}");
//! assert_eq!(page.name, "page");
//! assert!(page.field("__Renderings").is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// A node in a hierarchical content tree.
///
/// # Fields
///
/// - `id`: Stable identifier (`{GUID}` formatted)
/// - `name`: Last path segment
/// - `path`: Full slash-separated path, unique per store at a point in time
/// - `database`: Name of the store that owns this node
/// - `parent_id`: Parent node, `None` for a tree root
/// - `template_id`: Template the node was created from
/// - `branch_id`: Branch template the node was instantiated from, if any
/// - `fields`: Shared field values (common to all language versions)
/// - `revision`: Incremented on each committed shared-field edit
/// - `read_only`: Whether the node is protected against user edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Stable identifier
    pub id: String,

    /// Node name (last segment of `path`)
    pub name: String,

    /// Full path, e.g. `/content/home/page`
    pub path: String,

    /// Owning store name
    pub database: String,

    /// Parent node ID (`None` for roots)
    pub parent_id: Option<String>,

    /// Template identifier
    pub template_id: String,

    /// Branch template this node was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,

    /// Shared field values
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    /// Committed shared-field edit counter
    #[serde(default)]
    pub revision: u64,

    /// Protected against user edits
    #[serde(default)]
    pub read_only: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub modified_at: DateTime<Utc>,
}

impl ContentNode {
    /// Create a detached node snapshot with a generated identifier.
    ///
    /// Stores use this as the starting point for nodes they insert; `name`
    /// is expected to equal the last segment of `path`.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        database: impl Into<String>,
        template_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_node_id(),
            name: name.into(),
            path: path.into(),
            database: database.into(),
            parent_id: None,
            template_id: template_id.into(),
            branch_id: None,
            fields: BTreeMap::new(),
            revision: 0,
            read_only: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Shared field value, `None` when the field is absent
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Generate a node identifier in braced upper-case GUID form.
pub fn new_node_id() -> String {
    format!("{{{}}}", Uuid::new_v4().to_string().to_uppercase())
}

/// A single field value carried by a language version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    /// Shared fields hold one value across all language versions
    #[serde(default)]
    pub shared: bool,
}

impl Field {
    pub fn versioned(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            shared: false,
        }
    }

    pub fn shared(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            shared: true,
        }
    }
}

/// The content of a node in one language.
///
/// A node has zero or more versions per language. The latest version is the
/// one with the highest `number`; `revision` counts committed edits of this
/// particular version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageVersion {
    pub node_id: String,
    pub language: String,
    /// Version ordinal, starting at 1
    pub number: u32,
    /// Committed edit counter
    pub revision: u64,
    /// Versioned fields followed by the node's shared fields
    pub fields: Vec<Field>,
    pub updated_at: DateTime<Utc>,
}

impl LanguageVersion {
    /// Field value by name, `None` when absent
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Fields that belong to this version only
    pub fn versioned_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.shared)
    }

    /// Edit target addressing this version
    pub fn edit_target(&self) -> EditTarget {
        EditTarget::version(&self.node_id, &self.language, self.number)
    }
}

/// Pick the latest version (highest number) out of a version list.
pub fn latest_version(versions: &[LanguageVersion]) -> Option<&LanguageVersion> {
    versions.iter().max_by_key(|v| v.number)
}

/// What a scoped edit applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditTarget {
    /// Shared fields of a node
    #[serde(rename_all = "camelCase")]
    Shared { node_id: String },
    /// One language version of a node
    #[serde(rename_all = "camelCase")]
    Version {
        node_id: String,
        language: String,
        number: u32,
    },
}

impl EditTarget {
    pub fn shared(node_id: impl Into<String>) -> Self {
        Self::Shared {
            node_id: node_id.into(),
        }
    }

    pub fn version(node_id: impl Into<String>, language: impl Into<String>, number: u32) -> Self {
        Self::Version {
            node_id: node_id.into(),
            language: language.into(),
            number,
        }
    }

    pub fn node_id(&self) -> &str {
        match self {
            EditTarget::Shared { node_id } | EditTarget::Version { node_id, .. } => node_id,
        }
    }
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::Shared { node_id } => write!(f, "{}", node_id),
            EditTarget::Version {
                node_id,
                language,
                number,
            } => write!(f, "{}[{}#{}]", node_id, language, number),
        }
    }
}

/// An original node and the copy an external copy step produced for it.
///
/// The copy is asserted to be structurally and positionally equivalent to
/// the original inside the new subtree.
#[derive(Debug, Clone)]
pub struct CopyPair {
    pub original: ContentNode,
    pub copy: ContentNode,
}

impl CopyPair {
    pub fn new(original: ContentNode, copy: ContentNode) -> Self {
        Self { original, copy }
    }
}

/// A branch template child and the node freshly instantiated from it.
#[derive(Debug, Clone)]
pub struct BranchPair {
    pub template: ContentNode,
    pub created: ContentNode,
}
