//! Reference Remapper
//!
//! Repairs the datasource references of a copied node. A copy step
//! duplicates the presentation definition verbatim, so every datasource on
//! the copy still points into the *original* subtree. For each reference the
//! remapper decides one of three outcomes:
//!
//! 1. **Rewrite**: the target lies under the original node and the copy has
//!    a node at the same relative path; the reference now names that node's
//!    identifier
//! 2. **Clear**: the target cannot be resolved at all; a broken reference is
//!    not carried forward
//! 3. **Keep**: the target resolves but has no counterpart under the copy
//!    (it lives outside the copied subtree, or the copy is shallower); the
//!    reference stays on the shared original target
//!
//! The node is written back only when at least one reference changed, in a
//! single scoped edit of its shared fields. Running the remapper twice on
//! the same pair is a no-op the second time.

use crate::config::DeepCopyConfig;
use crate::db::ContentStore;
use crate::models::{ContentNode, EditTarget, LayoutDefinition};
use crate::services::edit_scope::apply_field_edits;
use crate::services::error::DeepCopyError;
use crate::utils::{join_path, relative_path, resolve_by_path};
use std::sync::Arc;

/// Per-node tally of what happened to its references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemapOutcome {
    /// References pointed at the copy-side counterpart
    pub rewritten: usize,
    /// Unresolvable references emptied
    pub cleared: usize,
    /// References left as they were
    pub preserved: usize,
    /// Empty references, not looked at
    pub skipped: usize,
    /// Whether the node was written back
    pub written: bool,
}

impl RemapOutcome {
    /// Whether any reference changed value
    pub fn changed(&self) -> bool {
        self.rewritten + self.cleared > 0
    }
}

/// Rewrites datasource references on copied nodes.
pub struct ReferenceRemapper {
    store: Arc<dyn ContentStore>,
    rendering_field: String,
}

impl ReferenceRemapper {
    pub fn new(store: Arc<dyn ContentStore>, config: &DeepCopyConfig) -> Self {
        Self {
            store,
            rendering_field: config.rendering_field.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Remap the references on `copy`, using `original` as the anchor the
    /// references are relative to.
    ///
    /// The reference field is read from the store, not from `copy`, so edits
    /// made after the caller took its snapshot are kept. A copy that no
    /// longer exists is a no-op, as is a missing or unparsable field. Only
    /// store access failures are returned as errors.
    pub async fn remap(
        &self,
        original: &ContentNode,
        copy: &ContentNode,
    ) -> Result<RemapOutcome, DeepCopyError> {
        let mut outcome = RemapOutcome::default();

        let Some(copy) = self.store.get_node(&copy.id).await? else {
            return Ok(outcome);
        };
        let Some(raw) = copy.field(&self.rendering_field) else {
            return Ok(outcome);
        };
        let Some(mut layout) = LayoutDefinition::parse(raw) else {
            return Ok(outcome);
        };

        let store = self.store.as_ref();
        for mut handle in layout.reference_handles() {
            if handle.is_empty() {
                outcome.skipped += 1;
                continue;
            }

            let Some(referenced) = store.get_node(handle.get()).await? else {
                tracing::debug!(
                    "Clearing unresolvable datasource '{}' on {}",
                    handle.get(),
                    copy.path
                );
                if handle.clear() {
                    outcome.cleared += 1;
                }
                continue;
            };

            let counterpart = match relative_path(&original.path, &referenced.path) {
                Some(relative) => {
                    resolve_by_path(store, &join_path(&copy.path, relative)).await?
                }
                None => None,
            };

            match counterpart {
                Some(target) => {
                    if handle.set(&target.id) {
                        tracing::debug!(
                            "Datasource {} -> {} ({}) on {}",
                            referenced.path,
                            target.path,
                            target.id,
                            copy.path
                        );
                        outcome.rewritten += 1;
                    } else {
                        outcome.preserved += 1;
                    }
                }
                None => {
                    tracing::debug!(
                        "Keeping datasource {} on {}: no counterpart under the copy",
                        referenced.path,
                        copy.path
                    );
                    outcome.preserved += 1;
                }
            }
        }

        if !outcome.changed() {
            return Ok(outcome);
        }

        let serialized = layout.serialize()?;
        apply_field_edits(
            store,
            EditTarget::shared(&copy.id),
            &[(self.rendering_field.clone(), serialized)],
        )
        .await?;
        outcome.written = true;

        tracing::info!(
            "Remapped datasources on {} ({} rewritten, {} cleared)",
            copy.path,
            outcome.rewritten,
            outcome.cleared
        );
        Ok(outcome)
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "reference_remapper_test.rs"]
mod reference_remapper_test;
