//! Version Propagator
//!
//! Fills language version gaps on a freshly instantiated subtree from the
//! template subtree it was stamped from. Only languages the target has no
//! version in at all are filled; existing versions are never touched. Only
//! versioned fields are copied, shared fields already came along with the
//! node itself.

use crate::db::ContentStore;
use crate::models::{latest_version, ContentNode};
use crate::services::edit_scope::apply_field_edits;
use crate::services::error::DeepCopyError;
use crate::utils::{flatten_descendants, join_path, relative_path, resolve_by_path};
use std::sync::Arc;

/// Totals for one propagation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropagationReport {
    /// Target nodes examined (root included)
    pub nodes_visited: usize,
    /// Target nodes with no template counterpart
    pub unmatched: usize,
    pub versions_created: usize,
    pub fields_copied: usize,
    /// Languages skipped because the target already had a version
    pub skipped_existing: usize,
}

pub struct VersionPropagator {
    store: Arc<dyn ContentStore>,
}

impl VersionPropagator {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Propagate versions from `template_root`'s subtree into
    /// `target_root`'s subtree, matching nodes by relative path.
    pub async fn propagate(
        &self,
        template_root: &ContentNode,
        target_root: &ContentNode,
    ) -> Result<PropagationReport, DeepCopyError> {
        let store = self.store.as_ref();
        let languages = store.get_languages().await?;
        let mut report = PropagationReport::default();

        let mut targets = vec![target_root.clone()];
        targets.extend(flatten_descendants(store, target_root).await?);

        for target in &targets {
            report.nodes_visited += 1;

            let Some(relative) = relative_path(&target_root.path, &target.path) else {
                report.unmatched += 1;
                continue;
            };
            let template_path = join_path(&template_root.path, relative);
            let Some(template) = resolve_by_path(store, &template_path).await? else {
                tracing::debug!("No template counterpart at {} for {}", template_path, target.path);
                report.unmatched += 1;
                continue;
            };

            for language in &languages {
                self.fill_language(&template, target, language, &mut report)
                    .await?;
            }
        }

        tracing::info!(
            "Propagated {} version(s) from {} into {}",
            report.versions_created,
            template_root.path,
            target_root.path
        );
        Ok(report)
    }

    async fn fill_language(
        &self,
        template: &ContentNode,
        target: &ContentNode,
        language: &str,
        report: &mut PropagationReport,
    ) -> Result<(), DeepCopyError> {
        let store = self.store.as_ref();

        let template_versions = store.get_versions(&template.id, language).await?;
        let Some(source) = latest_version(&template_versions) else {
            return Ok(());
        };
        if !store.get_versions(&target.id, language).await?.is_empty() {
            report.skipped_existing += 1;
            return Ok(());
        }

        let created = store.add_version(&target.id, language).await?;
        report.versions_created += 1;

        let writes: Vec<(String, String)> = source
            .versioned_fields()
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();
        apply_field_edits(store, created.edit_target(), &writes).await?;
        report.fields_copied += writes.len();

        tracing::debug!(
            "Created {} version {} on {} with {} field(s)",
            language,
            created.number,
            target.path,
            writes.len()
        );
        Ok(())
    }
}
