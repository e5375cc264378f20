//! MemoryStore - In-Process ContentStore Implementation
//!
//! A complete `ContentStore` backed by process memory. It is the store used by
//! the test suites and benchmarks, and it doubles as a reference for the
//! contract real repository adapters must honour:
//!
//! - Paths are unique and looked up ASCII case-insensitively
//! - Identifiers are braced GUIDs, looked up case-insensitively
//! - Descendants come back in document order (depth-first, pre-order)
//! - Field writes are staged between `begin_edit` and `end_edit` and applied
//!   all-or-nothing; `cancel_edit` drops them
//! - Every creation, committed edit and added version is broadcast as a
//!   [`StoreEvent`]
//!
//! Besides the trait, the store can simulate the two external operations the
//! services react to: copying a subtree (`copy_subtree`) and instantiating a
//! branch template (`instantiate_branch`). Both duplicate field values
//! verbatim, exactly like a repository's own copy step would, which is what
//! leaves references pointing into the source tree.

use super::content_store::ContentStore;
use super::error::StoreError;
use super::events::StoreEvent;
use crate::models::{ContentNode, EditTarget, Field, LanguageVersion};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{broadcast, RwLock};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Parameters for inserting a node into a [`MemoryStore`]
#[derive(Debug, Clone, Default)]
pub struct NewNode {
    pub name: String,
    pub template_id: String,
    pub branch_id: Option<String>,
    pub fields: BTreeMap<String, String>,
    pub read_only: bool,
}

impl NewNode {
    pub fn new(name: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template_id: template_id.into(),
            ..Default::default()
        }
    }

    /// Add a shared field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_branch(mut self, branch_id: impl Into<String>) -> Self {
        self.branch_id = Some(branch_id.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

#[derive(Debug, Clone)]
struct StoredVersion {
    number: u32,
    revision: u64,
    fields: BTreeMap<String, String>,
    updated_at: DateTime<Utc>,
}

impl StoredVersion {
    fn new(number: u32) -> Self {
        Self {
            number,
            revision: 0,
            fields: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredNode {
    node: ContentNode,
    children: Vec<String>,
    versions: BTreeMap<String, Vec<StoredVersion>>,
}

impl StoredNode {
    fn language_versions(&self, language: &str) -> Vec<LanguageVersion> {
        let Some(versions) = self.versions.get(language) else {
            return Vec::new();
        };

        versions
            .iter()
            .map(|v| {
                let mut fields: Vec<Field> = v
                    .fields
                    .iter()
                    .map(|(name, value)| Field::versioned(name, value))
                    .collect();
                fields.extend(
                    self.node
                        .fields
                        .iter()
                        .map(|(name, value)| Field::shared(name, value)),
                );
                LanguageVersion {
                    node_id: self.node.id.clone(),
                    language: language.to_string(),
                    number: v.number,
                    revision: v.revision,
                    fields,
                    updated_at: v.updated_at,
                }
            })
            .collect()
    }

    fn version_mut(&mut self, language: &str, number: u32) -> Option<&mut StoredVersion> {
        self.versions
            .get_mut(language)?
            .iter_mut()
            .find(|v| v.number == number)
    }
}

#[derive(Debug, Default)]
struct StoreState {
    nodes: HashMap<String, StoredNode>,
    /// Lower-cased path -> node ID
    paths: HashMap<String, String>,
    /// Staged writes per open edit
    edits: HashMap<EditTarget, Vec<(String, String)>>,
}

impl StoreState {
    fn lookup(&self, id_or_path: &str) -> Option<&StoredNode> {
        if id_or_path.starts_with('/') {
            let key = normalize_path(id_or_path);
            let id = self.paths.get(&key)?;
            self.nodes.get(id)
        } else {
            self.nodes.get(&id_or_path.to_ascii_uppercase())
        }
    }

    fn stored(&self, id: &str) -> Result<&StoredNode, StoreError> {
        self.nodes
            .get(&id.to_ascii_uppercase())
            .ok_or_else(|| StoreError::node_not_found(id))
    }

    fn stored_mut(&mut self, id: &str) -> Result<&mut StoredNode, StoreError> {
        self.nodes
            .get_mut(&id.to_ascii_uppercase())
            .ok_or_else(|| StoreError::node_not_found(id))
    }

    fn insert(
        &mut self,
        database: &str,
        parent_id: Option<&str>,
        new: NewNode,
    ) -> Result<ContentNode, StoreError> {
        if new.name.is_empty() || new.name.contains('/') {
            return Err(StoreError::invalid_name(new.name));
        }

        let (parent_key, path) = match parent_id {
            Some(parent_id) => {
                let parent = self.stored(parent_id)?;
                (
                    Some(parent.node.id.clone()),
                    format!("{}/{}", parent.node.path, new.name),
                )
            }
            None => (None, format!("/{}", new.name)),
        };

        let path_key = normalize_path(&path);
        if self.paths.contains_key(&path_key) {
            return Err(StoreError::path_conflict(path));
        }

        let mut node = ContentNode::new(new.name, path, database, new.template_id);
        node.parent_id = parent_key.clone();
        node.branch_id = new.branch_id;
        node.fields = new.fields;
        node.read_only = new.read_only;

        self.paths.insert(path_key, node.id.clone());
        if let Some(parent) = parent_key {
            self.stored_mut(&parent)?.children.push(node.id.clone());
        }
        self.nodes.insert(
            node.id.clone(),
            StoredNode {
                node: node.clone(),
                children: Vec::new(),
                versions: BTreeMap::new(),
            },
        );

        Ok(node)
    }

    fn descendant_ids(&self, id: &str) -> Result<Vec<String>, StoreError> {
        let root = self.stored(id)?;
        let mut ordered = Vec::new();
        let mut stack: Vec<String> = root.children.iter().rev().cloned().collect();

        while let Some(next) = stack.pop() {
            if let Some(stored) = self.nodes.get(&next) {
                stack.extend(stored.children.iter().rev().cloned());
            }
            ordered.push(next);
        }

        Ok(ordered)
    }

    fn snapshots(&self, ids: &[String]) -> Vec<ContentNode> {
        ids.iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|stored| stored.node.clone())
            .collect()
    }

    fn check_target(&self, target: &EditTarget) -> Result<(), StoreError> {
        let stored = self.stored(target.node_id())?;
        if let EditTarget::Version {
            language, number, ..
        } = target
        {
            let exists = stored
                .versions
                .get(language)
                .map(|vs| vs.iter().any(|v| v.number == *number))
                .unwrap_or(false);
            if !exists {
                return Err(StoreError::version_not_found(target));
            }
        }
        Ok(())
    }

    /// Copy `source_id` and its subtree under `parent_id`.
    ///
    /// `language` restricts copied versions to one language; `branch_id` is
    /// stamped on every created node.
    #[allow(clippy::too_many_arguments)]
    fn copy_recursive(
        &mut self,
        database: &str,
        source_id: &str,
        parent_id: &str,
        name: String,
        language: Option<&str>,
        branch_id: Option<&str>,
        created: &mut Vec<ContentNode>,
    ) -> Result<(), StoreError> {
        let source = self.stored(source_id)?.clone();

        let new = NewNode {
            name,
            template_id: source.node.template_id.clone(),
            branch_id: branch_id.map(str::to_string),
            fields: source.node.fields.clone(),
            read_only: source.node.read_only,
        };
        let node = self.insert(database, Some(parent_id), new)?;

        let versions: BTreeMap<String, Vec<StoredVersion>> = source
            .versions
            .into_iter()
            .filter(|(lang, _)| language.map_or(true, |wanted| wanted == lang))
            .collect();
        self.stored_mut(&node.id)?.versions = versions;
        let node_id = node.id.clone();
        created.push(node);

        for child_id in &source.children {
            let child_name = self.stored(child_id)?.node.name.clone();
            self.copy_recursive(
                database, child_id, &node_id, child_name, language, branch_id, created,
            )?;
        }

        Ok(())
    }
}

/// Lower-case a path and strip a trailing separator
fn normalize_path(path: &str) -> String {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    trimmed.to_ascii_lowercase()
}

/// In-memory content store
pub struct MemoryStore {
    name: String,
    languages: Vec<String>,
    state: RwLock<StoreState>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    /// Create an empty store with the single language `en`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_languages(name, &["en"])
    }

    /// Create an empty store that knows the given languages
    pub fn with_languages(name: impl Into<String>, languages: &[&str]) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            languages: languages.iter().map(|l| l.to_string()).collect(),
            state: RwLock::new(StoreState::default()),
            event_tx,
        }
    }

    /// Subscribe to store events
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }

    /// Emit one creation event per node, yielding after each so listeners
    /// can drain the channel before a large subtree overruns it.
    async fn emit_created(&self, created: &[ContentNode]) {
        for node in created {
            self.emit(StoreEvent::NodeCreated(node.clone()));
            tokio::task::yield_now().await;
        }
    }

    /// Create a top-level node
    pub async fn create_root(
        &self,
        name: impl Into<String>,
        template_id: impl Into<String>,
    ) -> Result<ContentNode> {
        let node = {
            let mut state = self.state.write().await;
            state.insert(&self.name, None, NewNode::new(name, template_id))?
        };
        self.emit(StoreEvent::NodeCreated(node.clone()));
        Ok(node)
    }

    /// Create a node under `parent_id`
    pub async fn create_node(&self, parent_id: &str, new: NewNode) -> Result<ContentNode> {
        let node = {
            let mut state = self.state.write().await;
            state.insert(&self.name, Some(parent_id), new)?
        };
        tracing::debug!("Created node {} at {}", node.id, node.path);
        self.emit(StoreEvent::NodeCreated(node.clone()));
        Ok(node)
    }

    /// Add a version and fill its versioned fields in one committed edit
    pub async fn add_version_with_fields(
        &self,
        id: &str,
        language: &str,
        fields: &[(&str, &str)],
    ) -> Result<LanguageVersion> {
        let version = self.add_version(id, language).await?;
        let target = version.edit_target();
        self.begin_edit(&target).await?;
        for (name, value) in fields {
            self.set_field(&target, name, value).await?;
        }
        self.end_edit(&target).await?;

        let versions = self.get_versions(id, language).await?;
        versions
            .into_iter()
            .find(|v| v.number == version.number)
            .ok_or_else(|| StoreError::version_not_found(&target).into())
    }

    /// Write one shared field in its own committed edit
    pub async fn set_shared_field(&self, id: &str, field: &str, value: &str) -> Result<()> {
        let target = EditTarget::shared(id);
        self.begin_edit(&target).await?;
        self.set_field(&target, field, value).await?;
        self.end_edit(&target).await
    }

    /// Copy a subtree the way a repository's copy command does: new
    /// identifiers, same structure and document order, field values and
    /// versions duplicated verbatim.
    ///
    /// # Returns
    ///
    /// The copy of `source_id` (the root of the new subtree)
    pub async fn copy_subtree(
        &self,
        source_id: &str,
        destination_id: &str,
        new_name: Option<&str>,
    ) -> Result<ContentNode> {
        let created = {
            let mut state = self.state.write().await;
            let source = state.stored(source_id)?.node.clone();
            let destination = state.stored(destination_id)?.node.clone();

            let inside_source = destination.id == source.id
                || state.descendant_ids(&source.id)?.contains(&destination.id);
            if inside_source {
                bail!(
                    "Cannot copy {} into its own subtree ({})",
                    source.path,
                    destination.path
                );
            }

            let name = new_name.map(str::to_string).unwrap_or(source.name);
            let mut created = Vec::new();
            state.copy_recursive(
                &self.name,
                &source.id,
                &destination.id,
                name,
                None,
                None,
                &mut created,
            )?;
            created
        };

        self.emit_created(&created).await;
        created
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::node_not_found(source_id).into())
    }

    /// Instantiate a branch template under `parent_id`.
    ///
    /// The branch template's single child becomes a node named `name`; its
    /// subtree follows. Only `language` versions are created, and every new
    /// node records `branch_id`. Creation events are emitted top-down.
    pub async fn instantiate_branch(
        &self,
        branch_id: &str,
        parent_id: &str,
        name: &str,
        language: &str,
    ) -> Result<ContentNode> {
        let created = {
            let mut state = self.state.write().await;
            let branch = state.stored(branch_id)?.clone();
            let Some(branch_child) = branch.children.first().cloned() else {
                bail!("Branch template {} has no child to instantiate", branch.node.path);
            };
            let mut created = Vec::new();
            state.copy_recursive(
                &self.name,
                &branch_child,
                parent_id,
                name.to_string(),
                Some(language),
                Some(branch.node.id.as_str()),
                &mut created,
            )?;
            created
        };

        self.emit_created(&created).await;
        created
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::node_not_found(branch_id).into())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_node(&self, id_or_path: &str) -> Result<Option<ContentNode>> {
        let state = self.state.read().await;
        Ok(state.lookup(id_or_path).map(|stored| stored.node.clone()))
    }

    async fn get_children(&self, id: &str) -> Result<Vec<ContentNode>> {
        let state = self.state.read().await;
        let children = state.stored(id)?.children.clone();
        Ok(state.snapshots(&children))
    }

    async fn get_descendants(&self, id: &str) -> Result<Vec<ContentNode>> {
        let state = self.state.read().await;
        let ids = state.descendant_ids(id)?;
        Ok(state.snapshots(&ids))
    }

    async fn get_languages(&self) -> Result<Vec<String>> {
        Ok(self.languages.clone())
    }

    async fn get_versions(&self, id: &str, language: &str) -> Result<Vec<LanguageVersion>> {
        let state = self.state.read().await;
        Ok(state.stored(id)?.language_versions(language))
    }

    async fn add_version(&self, id: &str, language: &str) -> Result<LanguageVersion> {
        let version = {
            let mut state = self.state.write().await;
            let stored = state.stored_mut(id)?;
            let versions = stored.versions.entry(language.to_string()).or_default();
            let number = versions.iter().map(|v| v.number).max().unwrap_or(0) + 1;
            versions.push(StoredVersion::new(number));
            stored
                .language_versions(language)
                .into_iter()
                .find(|v| v.number == number)
                .ok_or_else(|| StoreError::node_not_found(id))?
        };

        self.emit(StoreEvent::VersionAdded {
            node_id: version.node_id.clone(),
            language: version.language.clone(),
            number: version.number,
        });
        Ok(version)
    }

    async fn is_editing(&self, target: &EditTarget) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.edits.contains_key(target))
    }

    async fn begin_edit(&self, target: &EditTarget) -> Result<()> {
        let mut state = self.state.write().await;
        state.check_target(target)?;
        if state.edits.contains_key(target) {
            return Err(StoreError::already_editing(target).into());
        }
        state.edits.insert(target.clone(), Vec::new());
        Ok(())
    }

    async fn set_field(&self, target: &EditTarget, field: &str, value: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let staged = state
            .edits
            .get_mut(target)
            .ok_or_else(|| StoreError::not_editing(target))?;
        staged.push((field.to_string(), value.to_string()));
        Ok(())
    }

    async fn end_edit(&self, target: &EditTarget) -> Result<()> {
        {
            let mut state = self.state.write().await;
            let staged = state
                .edits
                .remove(target)
                .ok_or_else(|| StoreError::not_editing(target))?;
            let now = Utc::now();
            let stored = state.stored_mut(target.node_id())?;

            match target {
                EditTarget::Shared { .. } => {
                    stored.node.fields.extend(staged);
                    stored.node.revision += 1;
                    stored.node.modified_at = now;
                }
                EditTarget::Version {
                    language, number, ..
                } => {
                    // Writes to shared fields land on the node, not the version
                    let (shared, versioned): (Vec<_>, Vec<_>) = staged
                        .into_iter()
                        .partition(|(name, _)| stored.node.fields.contains_key(name));
                    stored.node.fields.extend(shared);
                    let version = stored
                        .version_mut(language, *number)
                        .ok_or_else(|| StoreError::version_not_found(target))?;
                    version.fields.extend(versioned);
                    version.revision += 1;
                    version.updated_at = now;
                }
            }
        }

        self.emit(StoreEvent::EditCommitted(target.clone()));
        Ok(())
    }

    async fn cancel_edit(&self, target: &EditTarget) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .edits
            .remove(target)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_editing(target).into())
    }
}
